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

//! Flat, columnar arena storage shared by [`crate::fermions::FermionOperator`] and
//! [`crate::majorana::MajoranaOperator`].
//!
//! A sum of `T` terms over `A` total generators is stored as three parallel arrays rather
//! than `T` separate heap allocations: `coeffs` (length `T`), `payload` (length `A`, the
//! generators of consecutive terms concatenated) and `boundaries` (length `T + 1`, giving
//! the half-open slice of `payload` that belongs to each term). This keeps dense expansions
//! (e.g. `compose`, `normal_ordered`) cache-friendly and matches the builder shape of the
//! external FFI consumer described in the crate-level documentation.

use crate::error::QfermionError;
use crate::Complex64;

/// Flat arena holding a sum of products of generators of type `G`.
///
/// `G` is [`crate::fermions::Generator`] for fermionic operators or `u32` (a Majorana mode
/// index) for Majorana operators.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TermArena<G> {
    coeffs: Vec<Complex64>,
    payload: Vec<G>,
    boundaries: Vec<u32>,
}

impl<G: Copy> TermArena<G> {
    /// The empty sum (`T = 0`).
    pub fn zero() -> Self {
        TermArena {
            coeffs: Vec::new(),
            payload: Vec::new(),
            boundaries: vec![0],
        }
    }

    /// The single-term identity polynomial: coefficient `1+0i`, empty payload.
    pub fn one() -> Self {
        TermArena {
            coeffs: vec![Complex64::new(1.0, 0.0)],
            payload: Vec::new(),
            boundaries: vec![0, 0],
        }
    }

    /// Builds an arena from raw columnar arrays, validating that boundaries are monotone and array lengths agree.
    ///
    /// # Errors
    ///
    /// Returns [`QfermionError::InvalidArgument`] if `boundaries` is not monotone
    /// non-decreasing, does not start at `0`, does not end at `payload.len()`, or if the
    /// array lengths are inconsistent with `num_terms` / `total_payload_len`.
    pub fn new(
        num_terms: usize,
        total_payload_len: usize,
        coeffs: Vec<Complex64>,
        payload: Vec<G>,
        boundaries: Vec<u32>,
    ) -> Result<Self, QfermionError> {
        if coeffs.len() != num_terms {
            return Err(QfermionError::InvalidArgument {
                msg: format!(
                    "coeffs has length {} but num_terms is {num_terms}",
                    coeffs.len()
                ),
            });
        }
        if payload.len() != total_payload_len {
            return Err(QfermionError::InvalidArgument {
                msg: format!(
                    "payload has length {} but total_payload_len is {total_payload_len}",
                    payload.len()
                ),
            });
        }
        if boundaries.len() != num_terms + 1 {
            return Err(QfermionError::InvalidArgument {
                msg: format!(
                    "boundaries has length {} but num_terms + 1 is {}",
                    boundaries.len(),
                    num_terms + 1
                ),
            });
        }
        if boundaries.first().copied() != Some(0) {
            return Err(QfermionError::InvalidArgument {
                msg: "boundaries[0] must be 0".to_owned(),
            });
        }
        if boundaries.last().copied() != Some(total_payload_len as u32) {
            return Err(QfermionError::InvalidArgument {
                msg: "boundaries[T] must equal the payload length".to_owned(),
            });
        }
        if !boundaries.windows(2).all(|w| w[0] <= w[1]) {
            return Err(QfermionError::InvalidArgument {
                msg: "boundaries must be monotone non-decreasing".to_owned(),
            });
        }
        Ok(TermArena {
            coeffs,
            payload,
            boundaries,
        })
    }

    /// Appends one term of `k` generators to the arena in place.
    pub fn add_term(&mut self, generators: &[G], coeff: Complex64) {
        self.payload.extend_from_slice(generators);
        self.coeffs.push(coeff);
        self.boundaries.push(self.payload.len() as u32);
    }

    /// Number of terms stored.
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    /// Whether the arena holds no terms at all (distinct from holding only the identity).
    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Coefficient of term `t`.
    pub fn coeff(&self, t: usize) -> Complex64 {
        self.coeffs[t]
    }

    /// Payload slice of term `t`.
    pub fn term(&self, t: usize) -> &[G] {
        let start = self.boundaries[t] as usize;
        let end = self.boundaries[t + 1] as usize;
        &self.payload[start..end]
    }

    /// Iterates over `(payload, coefficient)` pairs for every term, in storage order.
    pub fn iter_terms(&self) -> impl Iterator<Item = (&[G], Complex64)> {
        (0..self.len()).map(move |t| (self.term(t), self.coeff(t)))
    }

    pub(crate) fn coeffs(&self) -> &[Complex64] {
        &self.coeffs
    }

    pub(crate) fn payload(&self) -> &[G] {
        &self.payload
    }

    pub(crate) fn boundaries(&self) -> &[u32] {
        &self.boundaries
    }

    /// Concatenation of term lists; performs no simplification.
    pub fn add(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for (term, coeff) in other.iter_terms() {
            out.add_term(term, coeff);
        }
        out
    }

    /// Scales every coefficient by `scalar`.
    pub fn mul_scalar(&self, scalar: Complex64) -> Self {
        TermArena {
            coeffs: self.coeffs.iter().map(|c| c * scalar).collect(),
            payload: self.payload.clone(),
            boundaries: self.boundaries.clone(),
        }
    }

    /// Bilinear product: emits `|self| * |other|` terms, one per `(i, j)` pair in row-major
    /// order (`i` over `self`, `j` over `other`), each the concatenation of term `i` of
    /// `self` followed by term `j` of `other`, with coefficient the product of the two.
    pub fn compose(&self, other: &Self) -> Self {
        let mut payload = Vec::with_capacity(self.payload.len() * other.len().max(1)
            + other.payload.len() * self.len().max(1));
        let mut coeffs = Vec::with_capacity(self.len() * other.len());
        let mut boundaries = Vec::with_capacity(self.len() * other.len() + 1);
        boundaries.push(0u32);
        for i in 0..self.len() {
            let (term_a, coeff_a) = (self.term(i), self.coeff(i));
            for j in 0..other.len() {
                let (term_b, coeff_b) = (other.term(j), other.coeff(j));
                payload.extend_from_slice(term_a);
                payload.extend_from_slice(term_b);
                coeffs.push(coeff_a * coeff_b);
                boundaries.push(payload.len() as u32);
            }
        }
        TermArena {
            coeffs,
            payload,
            boundaries,
        }
    }

    /// Drops terms whose coefficient magnitude is `<= tol`, in place.
    pub fn ichop(&mut self, tol: f64) {
        let mut new_coeffs = Vec::with_capacity(self.coeffs.len());
        let mut new_payload = Vec::with_capacity(self.payload.len());
        let mut new_boundaries = vec![0u32];
        for t in 0..self.len() {
            if self.coeffs[t].norm() > tol {
                new_coeffs.push(self.coeffs[t]);
                new_payload.extend_from_slice(self.term(t));
                new_boundaries.push(new_payload.len() as u32);
            }
        }
        self.coeffs = new_coeffs;
        self.payload = new_payload;
        self.boundaries = new_boundaries;
    }

    /// Structural equality: `coeffs`, `payload` and `boundaries` pairwise equal.
    pub fn equal(&self, other: &Self) -> bool
    where
        G: PartialEq,
    {
        self.coeffs == other.coeffs && self.payload == other.payload && self.boundaries == other.boundaries
    }
}

/// Builds the canonical (insertion-ordered, like-term-combined, tolerance-chopped) form of
/// an arena given a per-term canonicalization callback.
///
/// `canonicalize_term` maps one `(payload, coeff)` term onto zero or more
/// `(canonical_payload, coeff)` fragments (fermionic/Majorana normal ordering can both split
/// a term into several and annihilate it outright). Fragments are then combined by
/// insertion-ordered key (first time a canonical payload is seen fixes its position in the
/// output) and coefficients below `tol` in magnitude are dropped. This is the shared engine
/// behind `FermionOperator::simplify` and `MajoranaOperator::simplify`.
pub fn simplify_with<G, F>(arena: &TermArena<G>, tol: f64, mut canonicalize_term: F) -> TermArena<G>
where
    G: Clone + Eq + std::hash::Hash,
    F: FnMut(&[G], Complex64) -> Vec<(Vec<G>, Complex64)>,
{
    let mut map: indexmap::IndexMap<Vec<G>, Complex64> = indexmap::IndexMap::new();
    for (term, coeff) in arena.iter_terms() {
        for (canon_payload, canon_coeff) in canonicalize_term(term, coeff) {
            map.entry(canon_payload)
                .and_modify(|c| *c += canon_coeff)
                .or_insert(canon_coeff);
        }
    }
    let mut out = TermArena::zero();
    for (payload, coeff) in map {
        if coeff.norm() > tol {
            out.add_term(&payload, coeff);
        }
    }
    out
}
