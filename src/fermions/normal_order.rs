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

//! Normal-ordering rewrite engine for a single fermionic term.
//!
//! Target form: all `CREATE` generators precede all `ANNIHILATE` generators; the `CREATE`
//! block is strictly decreasing in index, the `ANNIHILATE` block strictly increasing.
//! Repeated same-kind-same-index generators annihilate the term (`c_i c_i = c†_i c†_i = 0`).
//!
//! The rewrite works on one adjacent out-of-place pair at a time, using an explicit work
//! queue rather than recursion so that the Kronecker-contraction fan-out (bounded by
//! `min(#create, #annihilate)` per the original term) cannot blow the call stack.

use std::collections::VecDeque;

use super::{Action, Generator};
use crate::Complex64;

enum Violation {
    /// Adjacent same-kind pair out of sorted order; swap and negate.
    SwapAndNegate,
    /// Adjacent same-kind pair sharing an index; the whole term vanishes.
    Annihilates,
    /// `ANNIHILATE i` immediately followed by `CREATE j`.
    AnnihilateThenCreate { i: u32, j: u32 },
}

fn classify(left: Generator, right: Generator) -> Option<Violation> {
    match (left.action, right.action) {
        (Action::Create, Action::Create) => {
            if left.index == right.index {
                Some(Violation::Annihilates)
            } else if left.index < right.index {
                Some(Violation::SwapAndNegate)
            } else {
                None
            }
        }
        (Action::Annihilate, Action::Annihilate) => {
            if left.index == right.index {
                Some(Violation::Annihilates)
            } else if left.index > right.index {
                Some(Violation::SwapAndNegate)
            } else {
                None
            }
        }
        (Action::Annihilate, Action::Create) => Some(Violation::AnnihilateThenCreate {
            i: left.index,
            j: right.index,
        }),
        (Action::Create, Action::Annihilate) => None,
    }
}

/// Finds the leftmost adjacent out-of-place pair, if any.
fn find_violation(term: &[Generator]) -> Option<(usize, Violation)> {
    term.windows(2)
        .enumerate()
        .find_map(|(pos, pair)| classify(pair[0], pair[1]).map(|v| (pos, v)))
}

/// Normal-orders a single term, returning every produced `(payload, coefficient)` fragment.
/// Like terms are *not* merged here — that is simplification's job.
pub(crate) fn normal_order_term(term: &[Generator], coeff: Complex64) -> Vec<(Vec<Generator>, Complex64)> {
    let mut queue: VecDeque<(Vec<Generator>, Complex64)> = VecDeque::new();
    queue.push_back((term.to_vec(), coeff));
    let mut out = Vec::new();

    while let Some((mut current, current_coeff)) = queue.pop_front() {
        match find_violation(&current) {
            None => out.push((current, current_coeff)),
            Some((pos, Violation::SwapAndNegate)) => {
                current.swap(pos, pos + 1);
                queue.push_back((current, -current_coeff));
            }
            Some((_, Violation::Annihilates)) => {
                // Term is zero; drop it.
            }
            Some((pos, Violation::AnnihilateThenCreate { i, j })) => {
                let mut swapped = current.clone();
                swapped.swap(pos, pos + 1);
                queue.push_back((swapped, -current_coeff));

                if i == j {
                    let mut fragment = current;
                    fragment.remove(pos + 1);
                    fragment.remove(pos);
                    queue.push_back((fragment, current_coeff));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fermions::FermionOperator;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    #[test]
    fn already_normal_ordered_term_is_unchanged() {
        let term = [Generator::create(1), Generator::annihilate(0)];
        let result = normal_order_term(&term, c(1.0));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].0, term);
        assert_eq!(result[0].1, c(1.0));
    }

    #[test]
    fn same_index_adjacent_pair_vanishes() {
        let term = [Generator::create(0), Generator::create(0)];
        let result = normal_order_term(&term, c(1.0));
        assert!(result.is_empty());
    }

    #[test]
    fn anticommutation_law_holds_after_simplify() {
        // a_i a_j + a_j a_i == 0 for fermionic annihilation operators (i != j).
        let mut a = FermionOperator::zero();
        a.add_term(&[Action::Annihilate, Action::Annihilate], &[0, 1], c(1.0))
            .unwrap();
        let mut b = FermionOperator::zero();
        b.add_term(&[Action::Annihilate, Action::Annihilate], &[1, 0], c(1.0))
            .unwrap();
        let sum = a.add(&b).normal_ordered().simplify(1e-10);
        assert!(sum.equiv(&FermionOperator::zero(), 1e-10));
    }

    #[test]
    fn number_operator_contraction_yields_delta() {
        // a_0 a†_0 normal-orders to 1 - a†_0 a_0.
        let term = [Generator::annihilate(0), Generator::create(0)];
        let result = normal_order_term(&term, c(1.0));
        assert_eq!(result.len(), 2);
        let identity = result.iter().find(|(p, _)| p.is_empty()).unwrap();
        assert_eq!(identity.1, c(1.0));
        let number = result
            .iter()
            .find(|(p, _)| p.len() == 2)
            .expect("expected a two-generator fragment");
        assert_eq!(number.0, vec![Generator::create(0), Generator::annihilate(0)]);
        assert_eq!(number.1, c(-1.0));
    }
}
