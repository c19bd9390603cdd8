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

//! Lifts triangularly-stored one- and two-body electronic integral tensors into a
//! [`FermionOperator`]. Spin convention: alpha orbitals occupy `[0, n)`, beta orbitals occupy
//! `[n, 2n)`.

use crate::error::QfermionError;
use crate::fermions::{Action, FermionOperator};
use crate::Complex64;

/// Index into a lower-triangular row-major array for `p >= q`.
fn tri_index(p: u32, q: u32) -> usize {
    let (p, q) = if p >= q { (p, q) } else { (q, p) };
    (p as usize) * (p as usize + 1) / 2 + q as usize
}

/// Inverse of [`tri_index`]: recovers the unique `(p, q)` with `p >= q` that a triangular
/// index was computed from.
fn pair_for_tri_index(idx: usize) -> (u32, u32) {
    let mut p: usize = 0;
    while (p + 1) * (p + 2) / 2 <= idx {
        p += 1;
    }
    let q = idx - p * (p + 1) / 2;
    (p as u32, q as u32)
}

/// Number of entries in a triangular array over `n` orbitals.
pub fn tri_len(n: u32) -> usize {
    (n as usize) * (n as usize + 1) / 2
}

/// The one or two distinct orderings of a canonical pair: a single entry if `p0 == q0`, else
/// the pair and its swap, canonical order first.
fn arrangements(p0: u32, q0: u32) -> Vec<(u32, u32)> {
    if p0 == q0 {
        vec![(p0, q0)]
    } else {
        vec![(p0, q0), (q0, p0)]
    }
}

fn check_tri_len(h: &[f64], n: u32, what: &str) -> Result<(), QfermionError> {
    let expected = tri_len(n);
    if h.len() != expected {
        return Err(QfermionError::InvalidArgument {
            msg: format!("{what} has length {} but norb={n} requires {expected}", h.len()),
        });
    }
    Ok(())
}

fn check_tri_of_tri_len(h2: &[f64], n: u32, what: &str) -> Result<(), QfermionError> {
    let expected = tri_len(tri_len(n) as u32);
    if h2.len() != expected {
        return Err(QfermionError::InvalidArgument {
            msg: format!("{what} has length {} but norb={n} requires {expected}", h2.len()),
        });
    }
    Ok(())
}

/// Checks the full (non-symmetric) rectangular shape `tri_len(n)^2` used by the mixed-spin
/// two-body tensor: unlike `h2_aa`/`h2_bb`, `h2_ab` need not be symmetric under swapping its two
/// triangular indices, so it is stored densely rather than itself triangularly.
fn check_rect_len(h2: &[f64], n: u32, what: &str) -> Result<(), QfermionError> {
    let tl = tri_len(n);
    let expected = tl * tl;
    if h2.len() != expected {
        return Err(QfermionError::InvalidArgument {
            msg: format!("{what} has length {} but norb={n} requires {expected}", h2.len()),
        });
    }
    Ok(())
}

/// `Σ_{p>=q} h_{pq} (a†_p a_q + a†_q a_p)`, with the diagonal term counted once, replicated
/// identically over both spin sectors at orbital offsets `0` and `n`.
pub fn from_1body_tril_spin_sym(h: &[f64], n: u32) -> Result<FermionOperator, QfermionError> {
    check_tri_len(h, n, "one-body integral array")?;
    let mut op = FermionOperator::zero();
    for p in 0..n {
        for q in 0..=p {
            let coeff = Complex64::new(h[tri_index(p, q)], 0.0);
            for offset in [0, n] {
                let pp = p + offset;
                let qq = q + offset;
                op.add_term(&[Action::Create, Action::Annihilate], &[pp, qq], coeff)?;
                if p != q {
                    op.add_term(&[Action::Create, Action::Annihilate], &[qq, pp], coeff)?;
                }
            }
        }
    }
    Ok(op)
}

/// Spin-unrestricted variant of [`from_1body_tril_spin_sym`] taking distinct tensors for the
/// alpha (`h_a`) and beta (`h_b`) sectors.
pub fn from_1body_tril_spin(h_a: &[f64], h_b: &[f64], n: u32) -> Result<FermionOperator, QfermionError> {
    check_tri_len(h_a, n, "alpha one-body integral array")?;
    check_tri_len(h_b, n, "beta one-body integral array")?;
    let mut op = FermionOperator::zero();
    for (h, offset) in [(h_a, 0), (h_b, n)] {
        for p in 0..n {
            for q in 0..=p {
                let coeff = Complex64::new(h[tri_index(p, q)], 0.0);
                let pp = p + offset;
                let qq = q + offset;
                op.add_term(&[Action::Create, Action::Annihilate], &[pp, qq], coeff)?;
                if p != q {
                    op.add_term(&[Action::Create, Action::Annihilate], &[qq, pp], coeff)?;
                }
            }
        }
    }
    Ok(op)
}

/// One spatial quad contributed by a compressed two-body triangular loop: the pair of orbitals
/// occupying the creation/inner-annihilation slot (`pq`), the pair occupying the
/// outer-creation/annihilation slot (`rs`), and the tensor value shared by both.
type SpatialQuad = ((u32, u32), (u32, u32), f64);

/// Walks the compressed triangular loop `pq_tri in 0..tri_len(n)`, `rs_tri in 0..=pq_tri`,
/// looking up `h2[tri_index(pq_tri, rs_tri)]`, and fanning each nonzero coincidence class out
/// into its spatial-quad arrangements (plus the transpose arrangements when `pq_tri != rs_tri`,
/// since that pair of triangular indices stands for two distinct electron-pair assignments).
/// Used both by the spin-restricted two-body lifter (for all four spin blocks) and by the
/// same-spin blocks of the spin-unrestricted lifter.
fn same_tensor_quads(h2: &[f64], n: u32) -> Vec<SpatialQuad> {
    let tl = tri_len(n);
    let mut quads = Vec::new();
    for pq_tri in 0..tl {
        let pq_pair = pair_for_tri_index(pq_tri);
        for rs_tri in 0..=pq_tri {
            let rs_pair = pair_for_tri_index(rs_tri);
            let v = h2[tri_index(pq_tri as u32, rs_tri as u32)];
            if v == 0.0 {
                continue;
            }
            for rs_arr in arrangements(rs_pair.0, rs_pair.1) {
                for pq_arr in arrangements(pq_pair.0, pq_pair.1) {
                    quads.push((pq_arr, rs_arr, v));
                }
            }
            if pq_tri != rs_tri {
                for rs_arr in arrangements(pq_pair.0, pq_pair.1) {
                    for pq_arr in arrangements(rs_pair.0, rs_pair.1) {
                        quads.push((pq_arr, rs_arr, v));
                    }
                }
            }
        }
    }
    quads
}

/// Emits `a†_{c1} a†_{c2} a_{a1} a_{a2}` for one spatial quad, offsetting `pq = (c1, a2)` by
/// `sigma_off` and `rs = (c2, a1)` by `tau_off`.
fn emit_quad(
    op: &mut FermionOperator,
    pq: (u32, u32),
    rs: (u32, u32),
    sigma_off: u32,
    tau_off: u32,
    coeff: Complex64,
) -> Result<(), QfermionError> {
    let (c1, a2) = pq;
    let (c2, a1) = rs;
    op.add_term(
        &[Action::Create, Action::Create, Action::Annihilate, Action::Annihilate],
        &[c1 + sigma_off, c2 + tau_off, a1 + tau_off, a2 + sigma_off],
        coeff,
    )
}

/// `1/2 Σ_{pqrs,σ1σ2} (pq|rs) a†_{pσ1} a†_{rσ2} a_{sσ2} a_{qσ1}`, chemists' notation, with the
/// same spatial tensor shared by all four spin-sector combinations (`aa`, `ba`, `ab`, `bb`, in
/// that emission order per spatial quad). The outer loop walks the compressed triangular-of-
/// triangular storage (`pq_tri` over the full triangle, `rs_tri` up to `pq_tri`, each coincidence
/// class fanned out over its canonical-pair arrangements, plus the transpose arrangements when
/// `pq_tri != rs_tri`) rather than a flat `O(n^4)` sum, so term order and per-term coefficients
/// match the reference construction bit for bit (see DESIGN.md).
pub fn from_2body_tril_spin_sym(h2: &[f64], n: u32) -> Result<FermionOperator, QfermionError> {
    check_tri_of_tri_len(h2, n, "two-body integral array")?;
    let mut op = FermionOperator::zero();
    for (pq, rs, v) in same_tensor_quads(h2, n) {
        let coeff = Complex64::new(0.5 * v, 0.0);
        for tau in [0, n] {
            for sigma in [0, n] {
                emit_quad(&mut op, pq, rs, sigma, tau, coeff)?;
            }
        }
    }
    Ok(op)
}

/// Spin-unrestricted variant of [`from_2body_tril_spin_sym`]: `h2_aa` and `h2_bb` are triangle-
/// of-triangle tensors supplying the same-spin blocks (walked with [`same_tensor_quads`], spin
/// fixed to all-alpha / all-beta respectively); `h2_ab` supplies the mixed-spin block and is not
/// itself symmetric under swapping its two triangular indices, so it is stored densely as the
/// full `tri_len(n) x tri_len(n)` rectangle and walked directly: for every `(alpha_tri, beta_tri)`
/// entry, the alpha- and beta-spin canonical pairs are each fanned out over their arrangements,
/// and both slot assignments (alpha pair in the leading generator pair, then beta pair leading)
/// are emitted at each arrangement step, since the mixed-spin term needs a generator of each
/// spin in both orderings.
pub fn from_2body_tril_spin(
    h2_aa: &[f64],
    h2_ab: &[f64],
    h2_bb: &[f64],
    n: u32,
) -> Result<FermionOperator, QfermionError> {
    check_tri_of_tri_len(h2_aa, n, "alpha-alpha two-body integral array")?;
    check_rect_len(h2_ab, n, "alpha-beta two-body integral array")?;
    check_tri_of_tri_len(h2_bb, n, "beta-beta two-body integral array")?;
    let mut op = FermionOperator::zero();

    for (pq, rs, v) in same_tensor_quads(h2_aa, n) {
        emit_quad(&mut op, pq, rs, 0, 0, Complex64::new(0.5 * v, 0.0))?;
    }

    let tl = tri_len(n);
    for alpha_tri in 0..tl {
        let alpha_pair = pair_for_tri_index(alpha_tri);
        let alpha_arrs = arrangements(alpha_pair.0, alpha_pair.1);
        for beta_tri in 0..tl {
            let v = h2_ab[alpha_tri * tl + beta_tri];
            if v == 0.0 {
                continue;
            }
            let coeff = Complex64::new(0.5 * v, 0.0);
            let beta_pair = pair_for_tri_index(beta_tri);
            let beta_arrs = arrangements(beta_pair.0, beta_pair.1);
            for beta_arr in &beta_arrs {
                for alpha_arr in &alpha_arrs {
                    emit_quad(&mut op, *alpha_arr, *beta_arr, 0, n, coeff)?;
                    emit_quad(&mut op, *beta_arr, *alpha_arr, n, 0, coeff)?;
                }
            }
        }
    }

    for (pq, rs, v) in same_tensor_quads(h2_bb, n) {
        emit_quad(&mut op, pq, rs, n, n, Complex64::new(0.5 * v, 0.0))?;
    }

    Ok(op)
}
