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

//! A minimal spin/Pauli-operator builder, standing in for the external Pauli-operator library
//! that the Jordan-Wigner mapper treats as an opaque consumer. It accepts the same
//! `(coefficient, bit-term-sequence, index-sequence, term-boundary)` builder shape used
//! elsewhere in the crate, indexed per qubit rather than per orbital.

use indexmap::IndexMap;

use crate::Complex64;

/// Which single-qubit Pauli matrix a factor refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PauliBit {
    X,
    Y,
    Z,
}

/// A single-qubit Pauli factor within a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PauliFactor {
    /// Qubit this factor acts on.
    pub qubit: u32,
    /// Which Pauli matrix.
    pub bit: PauliBit,
}

/// A sparse polynomial of Pauli-string terms, each a product of single-qubit `X`/`Y`/`Z`
/// factors (qubits absent from a term's factor list act as identity).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpinPolynomial {
    coeffs: Vec<Complex64>,
    payload: Vec<PauliFactor>,
    boundaries: Vec<u32>,
}

impl SpinPolynomial {
    /// The empty sum.
    pub fn zero() -> Self {
        SpinPolynomial {
            coeffs: Vec::new(),
            payload: Vec::new(),
            boundaries: vec![0],
        }
    }

    /// Appends one term. `factors` need not be sorted or deduplicated by qubit; callers that
    /// want a canonical form should run [`SpinPolynomial::canonicalize`] afterwards.
    pub fn add_term(&mut self, factors: &[PauliFactor], coeff: Complex64) {
        self.coeffs.push(coeff);
        self.payload.extend_from_slice(factors);
        self.boundaries.push(self.payload.len() as u32);
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    /// Whether the polynomial holds no terms.
    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// The factors of term `t`, in insertion order.
    pub fn term(&self, t: usize) -> &[PauliFactor] {
        let start = self.boundaries[t] as usize;
        let end = self.boundaries[t + 1] as usize;
        &self.payload[start..end]
    }

    /// The coefficient of term `t`.
    pub fn coeff(&self, t: usize) -> Complex64 {
        self.coeffs[t]
    }

    /// Concatenation of term lists; performs no simplification.
    pub fn add(&self, other: &Self) -> Self {
        let mut coeffs = self.coeffs.clone();
        coeffs.extend_from_slice(&other.coeffs);
        let mut payload = self.payload.clone();
        payload.extend_from_slice(&other.payload);
        let offset = self.payload.len() as u32;
        let mut boundaries = self.boundaries.clone();
        boundaries.extend(other.boundaries.iter().skip(1).map(|b| b + offset));
        SpinPolynomial {
            coeffs,
            payload,
            boundaries,
        }
    }

    /// Sorts each term's factors by qubit, merges terms with identical sorted factor lists,
    /// and drops anything at or below `tol` in magnitude.
    pub fn canonicalize(&self, tol: f64) -> Self {
        let mut acc: IndexMap<Vec<PauliFactor>, Complex64> = IndexMap::new();
        for t in 0..self.len() {
            let mut key = self.term(t).to_vec();
            key.sort_by_key(|f| f.qubit);
            *acc.entry(key).or_insert(Complex64::new(0.0, 0.0)) += self.coeffs[t];
        }
        let mut out = SpinPolynomial::zero();
        for (factors, coeff) in acc {
            if coeff.norm() > tol {
                out.add_term(&factors, coeff);
            }
        }
        out
    }

    /// Structural equality: coefficients, payload, and boundaries pairwise equal.
    pub fn equal(&self, other: &Self) -> bool {
        self.coeffs == other.coeffs && self.payload == other.payload && self.boundaries == other.boundaries
    }

    /// Numerically equivalent within `tol`, after canonicalization.
    pub fn equiv(&self, other: &Self, tol: f64) -> bool {
        let mut diff = self.clone();
        let mut negated = other.clone();
        for c in negated.coeffs.iter_mut() {
            *c = -*c;
        }
        diff = diff.add(&negated);
        diff.canonicalize(0.0).coeffs.iter().all(|c| c.norm() <= tol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn canonicalize_merges_reordered_factors() {
        let mut op = SpinPolynomial::zero();
        op.add_term(
            &[
                PauliFactor { qubit: 1, bit: PauliBit::Z },
                PauliFactor { qubit: 0, bit: PauliBit::X },
            ],
            c(1.0, 0.0),
        );
        op.add_term(
            &[
                PauliFactor { qubit: 0, bit: PauliBit::X },
                PauliFactor { qubit: 1, bit: PauliBit::Z },
            ],
            c(2.0, 0.0),
        );
        let canon = op.canonicalize(1e-10);
        assert_eq!(canon.len(), 1);
        assert_eq!(canon.coeff(0), c(3.0, 0.0));
    }

    #[test]
    fn canonicalize_drops_small_terms() {
        let mut op = SpinPolynomial::zero();
        op.add_term(&[PauliFactor { qubit: 0, bit: PauliBit::X }], c(1e-12, 0.0));
        let canon = op.canonicalize(1e-8);
        assert!(canon.is_empty());
    }

    #[test]
    fn equiv_cancels_opposite_terms() {
        let mut a = SpinPolynomial::zero();
        a.add_term(&[PauliFactor { qubit: 0, bit: PauliBit::Z }], c(0.5, 0.0));
        let mut b = SpinPolynomial::zero();
        b.add_term(&[PauliFactor { qubit: 0, bit: PauliBit::Z }], c(0.5, 0.0));
        assert!(a.equiv(&b, 1e-10));
    }
}
