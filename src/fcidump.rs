// Copyright © 2024 Qfermion Contributors.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use this file except
// in compliance with the License. You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under the
// License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either
// express or implied. See the License for the specific language governing permissions and
// limitations under the License.

//! Parser for the FCIDUMP electronic-integral exchange format:
//!
//! ```text
//!  &FCI NORB=<n>, NELEC=<m>, MS2=<s>, ORBSYM=<c,c,...>, ISYM=<i>, [UHF=.TRUE.] &END
//! <val> <i> <j> <k> <l>
//! ...
//! ```
//!
//! Body records carry 1-based indices; a `0` in an index slot is a sentinel distinguishing
//! nuclear repulsion, orbital energies, one-body, and two-body records.

use crate::error::QfermionError;
use crate::fermions::FermionOperator;
use crate::integrals;

/// A parsed FCIDUMP file: header fields plus triangularly-stored integral tensors.
#[derive(Debug, Clone, PartialEq)]
pub struct FciDump {
    pub norb: u32,
    pub nelec: u32,
    pub ms2: u32,
    pub orbsym: Option<Vec<u32>>,
    pub isym: Option<u32>,
    pub h1e_a: Vec<f64>,
    pub h1e_b: Option<Vec<f64>>,
    pub h2e_aa: Vec<f64>,
    pub h2e_ab: Option<Vec<f64>>,
    pub h2e_bb: Option<Vec<f64>>,
    pub enuc: f64,
}

impl FciDump {
    /// Whether the integrals are spin-unrestricted (a second integral block was present).
    pub fn is_unrestricted(&self) -> bool {
        self.h1e_b.is_some()
    }

    /// Lifts the parsed integrals into a [`FermionOperator`] over `2 * norb` spin orbitals.
    pub fn to_fermion_operator(&self) -> Result<FermionOperator, QfermionError> {
        let one_body = match &self.h1e_b {
            Some(h1e_b) => integrals::from_1body_tril_spin(&self.h1e_a, h1e_b, self.norb)?,
            None => integrals::from_1body_tril_spin_sym(&self.h1e_a, self.norb)?,
        };
        // The two-block FCIDUMP layout this parser reads carries no separately-encoded
        // alpha-beta two-body block; when the integrals are unrestricted, the alpha-alpha
        // tensor stands in for the mixed-spin block too (see DESIGN.md). `h2e_aa` is stored
        // triangle-of-triangle, but `from_2body_tril_spin` needs the mixed-spin tensor as a full
        // (symmetric) rectangle, so the fallback is expanded into that shape rather than passed
        // through raw.
        let two_body = match &self.h2e_bb {
            Some(h2e_bb) => {
                let fallback;
                let h2e_ab = match &self.h2e_ab {
                    Some(h2e_ab) => h2e_ab,
                    None => {
                        fallback = expand_tri_of_tri_to_rect(&self.h2e_aa, self.norb);
                        &fallback
                    }
                };
                integrals::from_2body_tril_spin(&self.h2e_aa, h2e_ab, h2e_bb, self.norb)?
            }
            None => integrals::from_2body_tril_spin_sym(&self.h2e_aa, self.norb)?,
        };
        Ok(one_body.add(&two_body))
    }
}

/// Expands a triangle-of-triangle two-body tensor (`tri_len(tri_len(norb))` entries) into the
/// full, densely-stored `tri_len(norb) x tri_len(norb)` rectangle `integrals::from_2body_tril_spin`
/// expects for the mixed-spin block. The result is symmetric (`rect[a][b] == rect[b][a]`) since
/// it is read straight out of a triangular lookup that doesn't distinguish the two index orders;
/// this is an honest reflection of the fallback reusing `h2e_aa` verbatim, not a reconstruction
/// of a genuinely asymmetric mixed-spin tensor the file never contained.
fn expand_tri_of_tri_to_rect(h2_tri: &[f64], norb: u32) -> Vec<f64> {
    let tl = integrals::tri_len(norb);
    let mut rect = vec![0.0; tl * tl];
    for a in 0..tl {
        for b in 0..tl {
            rect[a * tl + b] = h2_tri[tri_index(a as u32, b as u32)];
        }
    }
    rect
}

#[derive(Default)]
struct Accumulator {
    h1: Vec<f64>,
    h2: Vec<f64>,
}

impl Accumulator {
    fn new(norb: u32) -> Self {
        Accumulator {
            h1: vec![0.0; integrals::tri_len(norb)],
            h2: vec![0.0; integrals::tri_len(integrals::tri_len(norb) as u32)],
        }
    }

    fn set_h1(&mut self, p: u32, q: u32, value: f64) {
        let idx = tri_index(p, q);
        self.h1[idx] = value;
    }

    fn set_h2(&mut self, p: u32, q: u32, r: u32, s: u32, value: f64) {
        let pq = tri_index(p, q) as u32;
        let rs = tri_index(r, s) as u32;
        let idx = tri_index(pq, rs);
        self.h2[idx] = value;
    }
}

fn tri_index(p: u32, q: u32) -> usize {
    let (p, q) = if p >= q { (p, q) } else { (q, p) };
    (p as usize) * (p as usize + 1) / 2 + q as usize
}

struct Header {
    norb: u32,
    nelec: u32,
    ms2: u32,
    orbsym: Option<Vec<u32>>,
    isym: Option<u32>,
}

/// Header keys are `KEY=value` pairs separated by commas, but `ORBSYM`'s own value is itself a
/// comma-separated list, so fields cannot be split on every comma. Instead, every occurrence of
/// a known `KEY=` is located first; each key's value runs up to the next recognized key (or the
/// end of the header), which correctly swallows `ORBSYM`'s embedded commas.
fn parse_header(text: &str, term_start: usize) -> Result<Header, QfermionError> {
    const KEYS: [&str; 6] = ["NORB", "NELEC", "MS2", "ORBSYM", "ISYM", "UHF"];

    // `term_start` is where the `&END`/`/` terminator begins, so it is excluded from `body` and
    // cannot be mistaken for part of the last key's value.
    let header_text = &text[..term_start];
    let start = header_text.find('&').map(|i| i + 1).unwrap_or(0);
    let body = &header_text[start..];
    let upper = body.to_ascii_uppercase();

    let mut matches: Vec<(usize, usize, &str)> = Vec::new();
    for key in KEYS {
        let pattern = format!("{key}=");
        let mut search_from = 0;
        while let Some(rel) = upper[search_from..].find(&pattern) {
            let key_start = search_from + rel;
            let value_start = key_start + pattern.len();
            matches.push((key_start, value_start, key));
            search_from = value_start;
        }
    }
    matches.sort_by_key(|&(pos, _, _)| pos);

    // Every offset recorded below is relative to `body`; `start` is `body`'s own offset within
    // `text` (the full document passed to `parse`), so `start + pos` is a true byte offset into
    // `text`.
    let abs = |pos: usize| start + pos;

    let mut norb = None;
    let mut nelec = None;
    let mut ms2 = None;
    let mut orbsym = None;
    let mut isym = None;

    for (idx, &(key_start, value_start, key)) in matches.iter().enumerate() {
        let value_end = matches.get(idx + 1).map(|&(pos, _, _)| pos).unwrap_or(body.len());
        let raw = body[value_start..value_end].trim().trim_end_matches(',').trim();
        let offset = abs(key_start);
        match key {
            "NORB" => {
                norb = Some(raw.parse::<u32>().map_err(|_| QfermionError::ParseError {
                    offset,
                    msg: format!("NORB value '{raw}' is not an integer"),
                })?)
            }
            "NELEC" => {
                nelec = Some(raw.parse::<u32>().map_err(|_| QfermionError::ParseError {
                    offset,
                    msg: format!("NELEC value '{raw}' is not an integer"),
                })?)
            }
            "MS2" => {
                ms2 = Some(raw.parse::<u32>().map_err(|_| QfermionError::ParseError {
                    offset,
                    msg: format!("MS2 value '{raw}' is not an integer"),
                })?)
            }
            "ORBSYM" => {
                orbsym = Some(
                    raw.split(',')
                        .map(|v| {
                            v.trim().parse::<u32>().map_err(|_| QfermionError::ParseError {
                                offset,
                                msg: format!("ORBSYM entry '{v}' is not an integer"),
                            })
                        })
                        .collect::<Result<Vec<u32>, QfermionError>>()?,
                )
            }
            "ISYM" => {
                isym = Some(raw.parse::<u32>().map_err(|_| QfermionError::ParseError {
                    offset,
                    msg: format!("ISYM value '{raw}' is not an integer"),
                })?)
            }
            // UHF is accepted but the data model infers spin-unrestriction from the presence
            // of a second integral block instead.
            _ => {}
        }
    }

    Ok(Header {
        norb: norb.ok_or_else(|| QfermionError::ParseError {
            offset: abs(0),
            msg: "missing required header key NORB".to_owned(),
        })?,
        nelec: nelec.ok_or_else(|| QfermionError::ParseError {
            offset: abs(0),
            msg: "missing required header key NELEC".to_owned(),
        })?,
        ms2: ms2.ok_or_else(|| QfermionError::ParseError {
            offset: abs(0),
            msg: "missing required header key MS2".to_owned(),
        })?,
        orbsym,
        isym,
    })
}

struct Record {
    value: f64,
    i: u32,
    j: u32,
    k: u32,
    l: u32,
}

fn parse_record(line: &str, offset: usize) -> Result<Record, QfermionError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 5 {
        return Err(QfermionError::ParseError {
            offset,
            msg: format!("expected 5 fields, found {}", tokens.len()),
        });
    }
    let value = tokens[0].parse::<f64>().map_err(|_| QfermionError::ParseError {
        offset,
        msg: format!("'{}' is not a valid floating-point integral value", tokens[0]),
    })?;
    let parse_index = |tok: &str| -> Result<u32, QfermionError> {
        tok.parse::<u32>().map_err(|_| QfermionError::ParseError {
            offset,
            msg: format!("'{tok}' is not a valid orbital index"),
        })
    };
    Ok(Record {
        value,
        i: parse_index(tokens[1])?,
        j: parse_index(tokens[2])?,
        k: parse_index(tokens[3])?,
        l: parse_index(tokens[4])?,
    })
}

/// Parses a complete FCIDUMP document.
///
/// # Errors
///
/// Returns [`QfermionError::ParseError`] with a byte offset on a malformed header, a missing
/// required header key, a non-numeric integral token, an out-of-range index, or a truncated
/// record.
pub fn parse(input: &str) -> Result<FciDump, QfermionError> {
    let (term_start, header_end) = input
        .find("&END")
        .map(|i| (i, i + 4))
        .or_else(|| input.find('/').map(|i| (i, i + 1)))
        .ok_or_else(|| QfermionError::ParseError {
            offset: 0,
            msg: "missing &END (or '/') header terminator".to_owned(),
        })?;
    let header = parse_header(input, term_start)?;
    let n = header.norb;

    let body = &input[header_end..];
    // Byte offset (relative to `body`) of each non-blank line's trimmed content, so parse
    // errors can report a true position in `input` rather than a post-filtering line count.
    let mut body_lines: Vec<(usize, &str)> = Vec::new();
    let mut scanned = 0usize;
    for raw_line in body.split_inclusive('\n') {
        let line_start = scanned;
        scanned += raw_line.len();
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let leading_ws = raw_line.len() - raw_line.trim_start().len();
        body_lines.push((line_start + leading_ws, trimmed));
    }

    let mut alpha = Accumulator::new(n);
    let mut beta: Option<Accumulator> = None;
    let mut enuc = 0.0f64;

    for (line_no, &(line_rel_offset, line)) in body_lines.iter().enumerate() {
        let offset = header_end + line_rel_offset;
        let record = parse_record(line, offset)?;

        if record.i == 0 && record.j == 0 && record.k == 0 && record.l == 0 {
            if line_no + 1 == body_lines.len() {
                enuc = record.value;
            } else if beta.is_none() {
                beta = Some(Accumulator::new(n));
            } else {
                return Err(QfermionError::ParseError {
                    offset,
                    msg: "unexpected third all-zero separator record".to_owned(),
                });
            }
            continue;
        }

        let acc = beta.as_mut().unwrap_or(&mut alpha);

        if record.j == 0 && record.k == 0 && record.l == 0 {
            // Orbital energy; ignored by the operator lifter.
            continue;
        }

        for (label, idx) in [("i", record.i), ("j", record.j), ("k", record.k), ("l", record.l)] {
            if idx > n {
                return Err(QfermionError::ParseError {
                    offset,
                    msg: format!("index {label}={idx} exceeds NORB={n}"),
                });
            }
        }

        if record.k == 0 && record.l == 0 {
            acc.set_h1(record.i - 1, record.j - 1, record.value);
        } else {
            acc.set_h2(record.i - 1, record.j - 1, record.k - 1, record.l - 1, record.value);
        }
    }

    Ok(FciDump {
        norb: header.norb,
        nelec: header.nelec,
        ms2: header.ms2,
        orbsym: header.orbsym,
        isym: header.isym,
        h1e_a: alpha.h1,
        h1e_b: beta.as_ref().map(|b| b.h1.clone()),
        h2e_aa: alpha.h2,
        h2e_ab: None,
        h2e_bb: beta.as_ref().map(|b| b.h2.clone()),
        enuc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_fields() {
        let text = " &FCI NORB=2,NELEC=2,MS2=0,ORBSYM=1,1,ISYM=1 &END\n0.5 1 1 0 0\n1.0 0 0 0 0\n";
        let dump = parse(text).unwrap();
        assert_eq!(dump.norb, 2);
        assert_eq!(dump.nelec, 2);
        assert_eq!(dump.ms2, 0);
        assert_eq!(dump.orbsym, Some(vec![1, 1]));
        assert_eq!(dump.isym, Some(1));
        assert_eq!(dump.enuc, 1.0);
        assert!(!dump.is_unrestricted());
    }

    #[test]
    fn malformed_record_offset_points_at_the_line_in_input() {
        let text = " &FCI NORB=2,NELEC=2,MS2=0 &END\n1.0 1 1 0 0\nbogus 1 1\n";
        let err = parse(text).unwrap_err();
        let QfermionError::ParseError { offset, .. } = err else {
            panic!("expected ParseError");
        };
        let line_start = text.find("bogus").unwrap();
        assert_eq!(offset, line_start);
    }

    #[test]
    fn malformed_header_value_offset_points_at_the_key_in_input() {
        let text = " &FCI NORB=2,NELEC=xyz,MS2=0 &END\n1.0 0 0 0 0\n";
        let err = parse(text).unwrap_err();
        let QfermionError::ParseError { offset, .. } = err else {
            panic!("expected ParseError");
        };
        let key_start = text.find("NELEC").unwrap();
        assert_eq!(offset, key_start);
    }

    #[test]
    fn missing_norb_is_a_parse_error() {
        let text = " &FCI NELEC=2,MS2=0 &END\n1.0 0 0 0 0\n";
        let err = parse(text).unwrap_err();
        assert!(matches!(err, QfermionError::ParseError { .. }));
    }

    #[test]
    fn one_body_record_lands_in_triangular_storage() {
        // 1-based (i,j)=(2,1) -> 0-based (p,q)=(1,0) -> triangular slot 1*(1+1)/2+0 = 1.
        let text = " &FCI NORB=2,NELEC=2,MS2=0 &END\n3.0 2 1 0 0\n0.0 0 0 0 0\n";
        let dump = parse(text).unwrap();
        assert_eq!(dump.h1e_a[1], 3.0);
    }

    #[test]
    fn out_of_range_index_is_a_parse_error() {
        let text = " &FCI NORB=2,NELEC=2,MS2=0 &END\n1.0 5 1 0 0\n0.0 0 0 0 0\n";
        let err = parse(text).unwrap_err();
        assert!(matches!(err, QfermionError::ParseError { .. }));
    }

    #[test]
    fn truncated_record_is_a_parse_error() {
        let text = " &FCI NORB=2,NELEC=2,MS2=0 &END\n1.0 1 1\n";
        let err = parse(text).unwrap_err();
        assert!(matches!(err, QfermionError::ParseError { .. }));
    }

    #[test]
    fn second_block_marks_unrestricted_integrals() {
        let text = " &FCI NORB=1,NELEC=1,MS2=1,UHF=.TRUE. &END\n1.0 1 1 0 0\n0.0 0 0 0 0\n2.0 1 1 0 0\n0.0 0 0 0 0\n";
        let dump = parse(text).unwrap();
        assert!(dump.is_unrestricted());
        assert_eq!(dump.h1e_a[0], 1.0);
        assert_eq!(dump.h1e_b.unwrap()[0], 2.0);
    }

    #[test]
    fn h2_fixture_reports_restricted_header_fields() {
        let text = std::fs::read_to_string("tests/fixtures/h2.fcidump").unwrap();
        let dump = parse(&text).unwrap();
        assert_eq!(dump.norb, 2);
        assert_eq!(dump.nelec, 2);
        assert_eq!(dump.ms2, 0);
    }

    #[test]
    fn heh_fixture_lifts_to_a_hermitian_operator_via_the_h2e_aa_fallback() {
        // Unrestricted with no separately-encoded mixed-spin block: to_fermion_operator must
        // expand h2e_aa into the rectangle from_2body_tril_spin expects for h2e_ab, rather than
        // erroring on a shape mismatch.
        let text = std::fs::read_to_string("tests/fixtures/heh.fcidump").unwrap();
        let dump = parse(&text).unwrap();
        assert!(dump.h2e_ab.is_none());
        let hamiltonian = dump.to_fermion_operator().unwrap();
        assert!(!hamiltonian.is_empty());
        assert!(hamiltonian.is_hermitian(1e-6));
    }

    #[test]
    fn heh_fixture_reports_unrestricted_header_fields() {
        let text = std::fs::read_to_string("tests/fixtures/heh.fcidump").unwrap();
        let dump = parse(&text).unwrap();
        assert_eq!(dump.norb, 2);
        assert_eq!(dump.nelec, 3);
        assert_eq!(dump.ms2, 1);
    }
}
