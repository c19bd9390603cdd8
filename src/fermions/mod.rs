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

//! Fermionic ladder operators `c†_i`, `c_j` represented as sparse polynomials over a flat
//! arena, with canonical-anticommutation semantics `{c_i, c†_j} = δ_ij`, `{c_i, c_j} = 0`.

pub mod normal_order;

use crate::arena::TermArena;
use crate::error::QfermionError;
use crate::Complex64;

/// Whether a fermionic [`Generator`] creates or annihilates a particle in an orbital.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    /// `c†_i`
    Create,
    /// `c_i`
    Annihilate,
}

/// A single fermionic ladder generator `(action, orbital index)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Generator {
    /// Whether this generator creates or annihilates a particle.
    pub action: Action,
    /// Orbital index the generator acts on.
    pub index: u32,
}

impl Generator {
    /// Shorthand for a creation generator `c†_index`.
    pub fn create(index: u32) -> Self {
        Generator {
            action: Action::Create,
            index,
        }
    }

    /// Shorthand for an annihilation generator `c_index`.
    pub fn annihilate(index: u32) -> Self {
        Generator {
            action: Action::Annihilate,
            index,
        }
    }

    fn daggered(self) -> Self {
        Generator {
            action: match self.action {
                Action::Create => Action::Annihilate,
                Action::Annihilate => Action::Create,
            },
            index: self.index,
        }
    }
}

/// A sparse polynomial of fermionic creation/annihilation generators.
///
/// See the crate-level documentation for the full contract. Values are
/// immutable except through [`FermionOperator::add_term`] and [`FermionOperator::ichop`];
/// every other operation returns a fresh owned operator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FermionOperator {
    arena: TermArena<Generator>,
}

impl Default for FermionOperator {
    fn default() -> Self {
        Self::zero()
    }
}

impl FermionOperator {
    /// The empty sum (`T = 0`).
    pub fn zero() -> Self {
        FermionOperator {
            arena: TermArena::zero(),
        }
    }

    /// The single-term identity operator (coefficient `1+0i`, empty payload).
    pub fn one() -> Self {
        FermionOperator {
            arena: TermArena::one(),
        }
    }

    /// Constructs a [`FermionOperator`] from raw columnar arrays.
    ///
    /// # Errors
    ///
    /// Returns [`QfermionError::InvalidArgument`] if `boundaries` is not monotone or the
    /// array lengths are inconsistent.
    pub fn new(
        num_terms: usize,
        total_payload_len: usize,
        coeffs: Vec<Complex64>,
        payload: Vec<Generator>,
        boundaries: Vec<u32>,
    ) -> Result<Self, QfermionError> {
        Ok(FermionOperator {
            arena: TermArena::new(num_terms, total_payload_len, coeffs, payload, boundaries)?,
        })
    }

    /// Appends one term of `actions.len()` generators to the operator in place.
    ///
    /// # Errors
    ///
    /// Returns [`QfermionError::InvalidArgument`] if `actions` and `indices` have different
    /// lengths.
    pub fn add_term(
        &mut self,
        actions: &[Action],
        indices: &[u32],
        coeff: Complex64,
    ) -> Result<(), QfermionError> {
        if actions.len() != indices.len() {
            return Err(QfermionError::InvalidArgument {
                msg: "actions and indices must have the same length".to_owned(),
            });
        }
        let generators: Vec<Generator> = actions
            .iter()
            .zip(indices.iter())
            .map(|(&action, &index)| Generator { action, index })
            .collect();
        self.arena.add_term(&generators, coeff);
        Ok(())
    }

    /// Concatenation of term lists; performs no simplification.
    pub fn add(&self, other: &Self) -> Self {
        FermionOperator {
            arena: self.arena.add(&other.arena),
        }
    }

    /// Scales every coefficient by `scalar`.
    pub fn mul(&self, scalar: Complex64) -> Self {
        FermionOperator {
            arena: self.arena.mul_scalar(scalar),
        }
    }

    /// Bilinear product; terms are emitted in row-major order, left operand varying slowest.
    pub fn compose(&self, other: &Self) -> Self {
        FermionOperator {
            arena: self.arena.compose(&other.arena),
        }
    }

    /// Conjugates every coefficient and reverses each term's payload, swapping
    /// `CREATE <-> ANNIHILATE` on every generator.
    pub fn adjoint(&self) -> Self {
        let mut arena = TermArena::zero();
        for (term, coeff) in self.arena.iter_terms() {
            let reversed: Vec<Generator> = term.iter().rev().map(|g| g.daggered()).collect();
            arena.add_term(&reversed, coeff.conj());
        }
        FermionOperator { arena }
    }

    /// Drops terms whose coefficient magnitude is `<= tol`, in place.
    pub fn ichop(&mut self, tol: f64) {
        self.arena.ichop(tol);
    }

    /// Rewrites every term into fermionic normal form.
    pub fn normal_ordered(&self) -> Self {
        let mut arena = TermArena::zero();
        for (term, coeff) in self.arena.iter_terms() {
            for (canon_term, canon_coeff) in normal_order::normal_order_term(term, coeff) {
                arena.add_term(&canon_term, canon_coeff);
            }
        }
        FermionOperator { arena }
    }

    /// Aggregates like (normal-ordered) terms and drops anything at or below `tol` in
    /// magnitude.
    pub fn simplify(&self, tol: f64) -> Self {
        let arena = crate::arena::simplify_with(&self.arena, tol, |term, coeff| {
            normal_order::normal_order_term(term, coeff)
        });
        FermionOperator { arena }
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
    /// double anti-commutator `1/2 ({[a,b],c} + {[a,c],b})` when `anti` is true
    /// (see DESIGN.md for the resolution of the `anti` convention).
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

    /// Maximum number of creation/annihilation *pairs* across terms (payload length divided by
    /// 2); `0` for the identity-only case. Counts electron excitations, not raw generators —
    /// unlike [`crate::majorana::MajoranaOperator::many_body_order`], which has no create/
    /// annihilate split to pair up and so counts raw modes directly (see DESIGN.md).
    pub fn many_body_order(&self) -> usize {
        (0..self.arena.len())
            .map(|t| self.arena.term(t).len())
            .max()
            .unwrap_or(0)
            / 2
    }

    /// True iff every term has equal counts of `CREATE` and `ANNIHILATE` generators.
    pub fn conserves_particle_number(&self) -> bool {
        (0..self.arena.len()).all(|t| {
            let term = self.arena.term(t);
            let creates = term.iter().filter(|g| g.action == Action::Create).count();
            creates * 2 == term.len()
        })
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Whether the operator holds no terms.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Structural equality: `coeffs`, `payload`, `boundaries` pairwise equal.
    pub fn equal(&self, other: &Self) -> bool {
        self.arena.equal(&other.arena)
    }

    /// Numerically equivalent within `tol`, after canonicalization.
    pub fn equiv(&self, other: &Self, tol: f64) -> bool {
        let diff = self.add(&other.mul(Complex64::new(-1.0, 0.0)));
        let canon = diff.simplify(0.0);
        canon.arena.coeffs().iter().all(|c| c.norm() <= tol)
    }

    pub(crate) fn arena(&self) -> &TermArena<Generator> {
        &self.arena
    }

    pub(crate) fn from_arena(arena: TermArena<Generator>) -> Self {
        FermionOperator { arena }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    #[test]
    fn new_matches_hand_built_terms() {
        let op = FermionOperator::new(
            3,
            4,
            vec![c(1.0), c(-1.0), Complex64::new(0.0, -1.0)],
            vec![
                Generator::create(0),
                Generator::annihilate(1),
                Generator::create(2),
                Generator::annihilate(3),
            ],
            vec![0, 0, 2, 4],
        )
        .unwrap();

        let mut expected = FermionOperator::zero();
        expected.add_term(&[], &[], c(1.0)).unwrap();
        expected
            .add_term(&[Action::Create, Action::Annihilate], &[0, 1], c(-1.0))
            .unwrap();
        expected
            .add_term(
                &[Action::Create, Action::Annihilate],
                &[2, 3],
                Complex64::new(0.0, -1.0),
            )
            .unwrap();

        assert!(op.equal(&expected));
    }

    #[test]
    fn new_rejects_non_monotone_boundaries() {
        let result = FermionOperator::new(1, 2, vec![c(1.0)], vec![Generator::create(0)], vec![0, 5]);
        assert!(matches!(result, Err(QfermionError::InvalidArgument { .. })));
    }

    #[test]
    fn add_is_concatenation() {
        let op = FermionOperator::zero().add(&FermionOperator::one());
        assert!(op.equal(&FermionOperator::one()));
    }

    #[test]
    fn equiv_respects_tolerance() {
        let mut op = FermionOperator::zero();
        op.add_term(&[], &[], c(1e-7)).unwrap();
        assert!(op.equiv(&FermionOperator::zero(), 1e-6));
        assert!(!op.equiv(&FermionOperator::zero(), 1e-8));
    }

    #[test]
    fn mul_scales_coefficients() {
        let op = FermionOperator::one().mul(c(2.0));
        let mut expected = FermionOperator::zero();
        expected.add_term(&[], &[], c(2.0)).unwrap();
        assert!(op.equal(&expected));
    }

    #[test]
    fn compose_emission_order_matches_row_major() {
        let op1 = FermionOperator::new(
            2,
            2,
            vec![c(2.0), c(3.0)],
            vec![Generator::create(0), Generator::annihilate(1)],
            vec![0, 0, 2],
        )
        .unwrap();
        let op2 = FermionOperator::new(
            2,
            2,
            vec![c(1.5), c(4.0)],
            vec![Generator::create(1), Generator::annihilate(0)],
            vec![0, 0, 2],
        )
        .unwrap();
        let result = op1.compose(&op2);
        assert_eq!(result.len(), 4);
        assert_eq!(result.arena.coeff(0), c(3.0));
        assert_eq!(result.arena.coeff(1), c(8.0));
        assert_eq!(result.arena.coeff(2), c(4.5));
        assert_eq!(result.arena.coeff(3), c(12.0));
        assert_eq!(result.arena.term(3).len(), 4);
    }

    #[test]
    fn ichop_drops_small_terms() {
        let mut op = FermionOperator::zero();
        op.add_term(&[], &[], c(1e-8)).unwrap();
        op.ichop(1e-6);
        assert!(op.equal(&FermionOperator::zero()));
    }

    #[test]
    fn adjoint_conjugates_and_reverses() {
        let mut op = FermionOperator::zero();
        op.add_term(&[], &[], Complex64::new(0.0, 1.0)).unwrap();
        let adj = op.adjoint();
        let mut expected = FermionOperator::zero();
        expected.add_term(&[], &[], Complex64::new(0.0, -1.0)).unwrap();
        assert!(adj.equal(&expected));
    }

    #[test]
    fn adjoint_swaps_action_and_reverses_order() {
        let mut op = FermionOperator::zero();
        op.add_term(
            &[Action::Create, Action::Annihilate],
            &[0, 1],
            c(1.0),
        )
        .unwrap();
        let adj = op.adjoint();
        assert_eq!(adj.arena.term(0)[0], Generator::create(1));
        assert_eq!(adj.arena.term(0)[1], Generator::annihilate(0));
    }

    #[test]
    fn adjoint_is_an_involution() {
        let mut op = FermionOperator::zero();
        op.add_term(&[Action::Create, Action::Annihilate], &[2, 0], Complex64::new(1.0, -2.0))
            .unwrap();
        op.add_term(&[Action::Annihilate], &[1], Complex64::new(0.5, 0.5))
            .unwrap();
        assert!(op.equiv(&op.adjoint().adjoint(), 1e-12));
    }

    #[test]
    fn is_hermitian_respects_tolerance() {
        let mut op = FermionOperator::zero();
        op.add_term(
            &[Action::Create, Action::Annihilate],
            &[0, 1],
            Complex64::new(0.0, 1.00001),
        )
        .unwrap();
        op.add_term(
            &[Action::Create, Action::Annihilate],
            &[1, 0],
            Complex64::new(0.0, -1.0),
        )
        .unwrap();
        assert!(op.is_hermitian(1e-4));
        assert!(!op.is_hermitian(1e-8));
    }

    #[test]
    fn many_body_order_counts_pairs() {
        let mut op = FermionOperator::zero();
        op.add_term(
            &[Action::Create, Action::Annihilate, Action::Create, Action::Annihilate],
            &[0, 1, 2, 3],
            c(1.0),
        )
        .unwrap();
        assert_eq!(op.many_body_order(), 2);
        assert_eq!(FermionOperator::one().many_body_order(), 0);
    }

    #[test]
    fn conserves_particle_number_checks_every_term() {
        let mut op1 = FermionOperator::zero();
        op1.add_term(&[Action::Create, Action::Annihilate], &[0, 1], c(1.0))
            .unwrap();
        assert!(op1.conserves_particle_number());

        let mut op2 = FermionOperator::zero();
        op2.add_term(&[Action::Create], &[0], c(1.0)).unwrap();
        assert!(!op2.conserves_particle_number());
    }

    #[test]
    fn len_counts_terms() {
        let mut op = FermionOperator::zero();
        op.add_term(
            &[Action::Create, Action::Annihilate, Action::Create, Action::Annihilate],
            &[0, 1, 2, 3],
            c(1.0),
        )
        .unwrap();
        assert_eq!(op.len(), 1);
    }

    #[test]
    fn commutator_is_antisymmetric() {
        let mut a = FermionOperator::zero();
        a.add_term(&[Action::Create], &[0], c(1.0)).unwrap();
        let mut b = FermionOperator::zero();
        b.add_term(&[Action::Annihilate], &[1], c(1.0)).unwrap();
        let comm = a.commutator(&b);
        let neg_comm_rev = b.commutator(&a).mul(c(-1.0));
        assert!(comm.equiv(&neg_comm_rev, 1e-12));
    }

    #[test]
    fn compose_with_one_is_identity() {
        let mut a = FermionOperator::zero();
        a.add_term(&[Action::Create, Action::Annihilate], &[1, 0], Complex64::new(0.3, -0.1))
            .unwrap();
        assert!(a.compose(&FermionOperator::one()).equal(&a));
        assert!(FermionOperator::one().compose(&a).equal(&a));
    }
}
