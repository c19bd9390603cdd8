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

//! Normal-ordering rewrite engine for a single Majorana term.
//!
//! Target form: modes appear in strictly decreasing order. Adjacent rule for `γ_i γ_j`:
//! if `i < j`, swap and negate; if `i == j`, drop both modes (coefficient unchanged), a
//! consequence of `γ_i^2 = 1`.

use std::collections::VecDeque;

use super::Mode;
use crate::Complex64;

fn find_violation(term: &[Mode]) -> Option<(usize, bool)> {
    term.windows(2).enumerate().find_map(|(pos, pair)| {
        use std::cmp::Ordering;
        match pair[0].cmp(&pair[1]) {
            Ordering::Less => Some((pos, false)),
            Ordering::Equal => Some((pos, true)),
            Ordering::Greater => None,
        }
    })
}

/// Normal-orders a single term, returning every produced `(payload, coefficient)` fragment.
pub(crate) fn normal_order_term(term: &[Mode], coeff: Complex64) -> Vec<(Vec<Mode>, Complex64)> {
    let mut queue: VecDeque<(Vec<Mode>, Complex64)> = VecDeque::new();
    queue.push_back((term.to_vec(), coeff));
    let mut out = Vec::new();

    while let Some((mut current, current_coeff)) = queue.pop_front() {
        match find_violation(&current) {
            None => out.push((current, current_coeff)),
            Some((pos, same_index)) => {
                if same_index {
                    current.remove(pos + 1);
                    current.remove(pos);
                    queue.push_back((current, current_coeff));
                } else {
                    current.swap(pos, pos + 1);
                    queue.push_back((current, -current_coeff));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    #[test]
    fn already_decreasing_is_unchanged() {
        let term = [3u32, 2, 1, 0];
        let result = normal_order_term(&term, c(1.0));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].0, term);
        assert_eq!(result[0].1, c(1.0));
    }

    #[test]
    fn matching_parity_for_mixed_permutation() {
        // modes [0, 2, 1, 3] sorted to descending order takes 5 adjacent transpositions
        // (odd), so the coefficient picks up a factor of -1.
        let term = [0u32, 2, 1, 3];
        let result = normal_order_term(&term, c(1.0));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].0, vec![3, 2, 1, 0]);
        assert_eq!(result[0].1, c(-1.0));
    }

    #[test]
    fn repeated_mode_collapses_to_identity() {
        let term = [0u32, 0];
        let result = normal_order_term(&term, c(5.0));
        assert_eq!(result.len(), 1);
        assert!(result[0].0.is_empty());
        assert_eq!(result[0].1, c(5.0));
    }
}
