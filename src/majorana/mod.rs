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

//! Majorana operators `γ_k` represented as sparse polynomials over a flat arena, with
//! canonical-anticommutation-to-identity semantics `{γ_i, γ_j} = 2δ_ij`.

pub mod normal_order;

use crate::arena::TermArena;
use crate::error::QfermionError;
use crate::Complex64;

/// A Majorana mode index.
pub type Mode = u32;

/// A sparse polynomial of Majorana generators.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MajoranaOperator {
    arena: TermArena<Mode>,
}

impl Default for MajoranaOperator {
    fn default() -> Self {
        Self::zero()
    }
}

impl MajoranaOperator {
    /// The empty sum (`T = 0`).
    pub fn zero() -> Self {
        MajoranaOperator {
            arena: TermArena::zero(),
        }
    }

    /// The single-term identity operator.
    pub fn one() -> Self {
        MajoranaOperator {
            arena: TermArena::one(),
        }
    }

    /// Constructs a [`MajoranaOperator`] from raw columnar arrays.
    pub fn new(
        num_terms: usize,
        total_payload_len: usize,
        coeffs: Vec<Complex64>,
        payload: Vec<Mode>,
        boundaries: Vec<u32>,
    ) -> Result<Self, QfermionError> {
        Ok(MajoranaOperator {
            arena: TermArena::new(num_terms, total_payload_len, coeffs, payload, boundaries)?,
        })
    }

    /// Appends one term of `modes.len()` generators to the operator in place.
    pub fn add_term(&mut self, modes: &[Mode], coeff: Complex64) {
        self.arena.add_term(modes, coeff);
    }

    /// Concatenation of term lists; performs no simplification.
    pub fn add(&self, other: &Self) -> Self {
        MajoranaOperator {
            arena: self.arena.add(&other.arena),
        }
    }

    /// Scales every coefficient by `scalar`.
    pub fn mul(&self, scalar: Complex64) -> Self {
        MajoranaOperator {
            arena: self.arena.mul_scalar(scalar),
        }
    }

    /// Bilinear product: term-wise concatenation, coefficient product.
    pub fn compose(&self, other: &Self) -> Self {
        MajoranaOperator {
            arena: self.arena.compose(&other.arena),
        }
    }

    /// Reverses each term's mode list, conjugates the coefficient, and multiplies by
    /// `(-1)^(k(k-1)/2)` for a term of length `k`.
    pub fn adjoint(&self) -> Self {
        let mut arena = TermArena::zero();
        for (term, coeff) in self.arena.iter_terms() {
            let k = term.len() as u64;
            let sign = if (k * (k.saturating_sub(1)) / 2) % 2 == 0 {
                1.0
            } else {
                -1.0
            };
            let reversed: Vec<Mode> = term.iter().rev().copied().collect();
            arena.add_term(&reversed, coeff.conj() * sign);
        }
        MajoranaOperator { arena }
    }

    /// Drops terms whose coefficient magnitude is `<= tol`, in place.
    pub fn ichop(&mut self, tol: f64) {
        self.arena.ichop(tol);
    }

    /// Rewrites every term into Majorana normal form; when `simplify` is true, additionally
    /// runs simplification afterwards.
    pub fn normal_ordered(&self, simplify: bool) -> Self {
        let mut arena = TermArena::zero();
        for (term, coeff) in self.arena.iter_terms() {
            for (canon_term, canon_coeff) in normal_order::normal_order_term(term, coeff) {
                arena.add_term(&canon_term, canon_coeff);
            }
        }
        let op = MajoranaOperator { arena };
        if simplify {
            op.simplify(0.0)
        } else {
            op
        }
    }

    /// Aggregates like (normal-ordered) terms and drops anything at or below `tol` in
    /// magnitude.
    pub fn simplify(&self, tol: f64) -> Self {
        let arena = crate::arena::simplify_with(&self.arena, tol, |term, coeff| {
            normal_order::normal_order_term(term, coeff)
        });
        MajoranaOperator { arena }
    }

    /// `[a, b] = compose(a, b) - compose(b, a)`.
    pub fn commutator(&self, other: &Self) -> Self {
        self.compose(other)
            .add(&other.compose(self).mul(Complex64::new(-1.0, 0.0)))
    }

    /// `{a, b} = compose(a, b) + compose(b, a)`.
    pub fn anti_commutator(&self, other: &Self) -> Self {
        self.compose(other).add(&other.compose(self))
    }

    /// Nested (anti-)commutators: `[[a,b],c]` when `anti` is false, or the symmetrized
    /// double anti-commutator `1/2 ({[a,b],c} + {[a,c],b})` when `anti` is true (same
    /// convention as `FermionOperator::double_commutator`; see DESIGN.md).
    pub fn double_commutator(&self, b: &Self, c: &Self, anti: bool) -> Self {
        if !anti {
            self.commutator(b).commutator(c)
        } else {
            let half = Complex64::new(0.5, 0.0);
            let left = self.commutator(b).anti_commutator(c);
            let right = self.commutator(c).anti_commutator(b);
            left.add(&right).mul(half)
        }
    }

    /// `equiv(op, adjoint(op), tol)`.
    pub fn is_hermitian(&self, tol: f64) -> bool {
        self.equiv(&self.adjoint(), tol)
    }

    /// Maximum payload length (raw mode count) across terms; `0` for the identity-only case.
    /// Not divided by 2, unlike [`crate::fermions::FermionOperator::many_body_order`]: a
    /// Majorana generator has no create/annihilate distinction to pair up, so there is no
    /// natural "excitation count" to halve against — the raw mode count is already the
    /// operator's body order (see DESIGN.md).
    pub fn many_body_order(&self) -> usize {
        (0..self.arena.len())
            .map(|t| self.arena.term(t).len())
            .max()
            .unwrap_or(0)
    }

    /// True iff every term has an even number of modes.
    pub fn is_even(&self) -> bool {
        (0..self.arena.len()).all(|t| self.arena.term(t).len() % 2 == 0)
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Whether the operator holds no terms.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Structural equality.
    pub fn equal(&self, other: &Self) -> bool {
        self.arena.equal(&other.arena)
    }

    /// Numerically equivalent within `tol`, after canonicalization.
    pub fn equiv(&self, other: &Self, tol: f64) -> bool {
        let diff = self.add(&other.mul(Complex64::new(-1.0, 0.0)));
        let canon = diff.simplify(0.0);
        canon.arena.coeffs().iter().all(|c| c.norm() <= tol)
    }

    pub(crate) fn arena(&self) -> &TermArena<Mode> {
        &self.arena
    }

    pub(crate) fn from_arena(arena: TermArena<Mode>) -> Self {
        MajoranaOperator { arena }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    #[test]
    fn add_is_concatenation() {
        let op = MajoranaOperator::zero().add(&MajoranaOperator::one());
        assert!(op.equal(&MajoranaOperator::one()));
    }

    #[test]
    fn compose_matches_hand_worked_example() {
        let mut op1 = MajoranaOperator::zero();
        op1.add_term(&[], c(2.0));
        op1.add_term(&[0, 1], c(3.0));

        let mut op2 = MajoranaOperator::zero();
        op2.add_term(&[], c(1.5));
        op2.add_term(&[1, 0], c(4.0));

        let result = op1.compose(&op2);

        let mut expected = MajoranaOperator::zero();
        expected.add_term(&[], c(3.0));
        expected.add_term(&[1, 0], c(8.0));
        expected.add_term(&[0, 1], c(4.5));
        expected.add_term(&[1, 0, 0, 1], c(12.0));

        assert!(result.equal(&expected));
    }

    #[test]
    fn adjoint_of_two_mode_term_picks_up_minus_one() {
        // k=2: (-1)^(2*1/2) = (-1)^1 = -1
        let mut op = MajoranaOperator::zero();
        op.add_term(&[0, 1], Complex64::new(0.0, 1.0));
        let adj = op.adjoint();
        let mut expected = MajoranaOperator::zero();
        expected.add_term(&[1, 0], Complex64::new(0.0, 1.0));
        assert!(adj.equal(&expected));
    }

    #[test]
    fn involution_is_identity() {
        let mut op = MajoranaOperator::zero();
        op.add_term(&[2, 0], Complex64::new(1.0, -2.0));
        op.add_term(&[1], Complex64::new(0.5, 0.5));
        assert!(op.equiv(&op.adjoint().adjoint(), 1e-12));
    }

    #[test]
    fn is_even_checks_every_term() {
        let mut op1 = MajoranaOperator::zero();
        op1.add_term(&[0, 1], c(1.0));
        assert!(op1.is_even());

        let mut op2 = MajoranaOperator::zero();
        op2.add_term(&[0], c(1.0));
        assert!(!op2.is_even());
    }

    #[test]
    fn majorana_involution_after_normal_order_and_simplify() {
        // gamma_i gamma_i == 1
        let mut op = MajoranaOperator::zero();
        op.add_term(&[3, 3], c(1.0));
        let canon = op.normal_ordered(true);
        assert!(canon.equiv(&MajoranaOperator::one(), 1e-10));
    }

    #[test]
    fn majorana_anticommutation() {
        // gamma_i gamma_j + gamma_j gamma_i == 2 delta_ij
        let mut a = MajoranaOperator::zero();
        a.add_term(&[0, 1], c(1.0));
        let mut b = MajoranaOperator::zero();
        b.add_term(&[1, 0], c(1.0));
        let sum = a.add(&b).normal_ordered(true);
        assert!(sum.equiv(&MajoranaOperator::zero(), 1e-10));

        let mut same = MajoranaOperator::zero();
        same.add_term(&[2, 2], c(2.0));
        let canon = same.normal_ordered(true);
        let mut expected = MajoranaOperator::zero();
        expected.add_term(&[], c(2.0));
        assert!(canon.equiv(&expected, 1e-10));
    }

    #[test]
    fn double_commutator_nested_form_matches_plain_nesting() {
        let mut a = MajoranaOperator::zero();
        a.add_term(&[0], c(1.0));
        let mut b = MajoranaOperator::zero();
        b.add_term(&[1], c(1.0));
        let mut cc = MajoranaOperator::zero();
        cc.add_term(&[2], c(1.0));

        let nested = a.commutator(&b).commutator(&cc);
        let double = a.double_commutator(&b, &cc, false);
        assert!(nested.equiv(&double, 1e-10));
    }
}
