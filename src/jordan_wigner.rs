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

//! Jordan-Wigner transformation from fermionic ladder operators to Pauli strings:
//!
//! ```text
//! a†_j = 1/2 (X_j - i Y_j) · Z_{j-1} Z_{j-2} ... Z_0
//! a_j  = 1/2 (X_j + i Y_j) · Z_{j-1} Z_{j-2} ... Z_0
//! ```
//!
//! Each generator expands to two single-qubit-factor fragments; fragments compose across
//! generators within a term by ordinary Pauli-matrix multiplication (`XY = iZ`, `YZ = iX`,
//! `ZX = iY`, `PP = I`), so a term of `k` generators fans out to `2^k` spin terms. No
//! canonicalization is performed here; callers combine with [`crate::spin::SpinPolynomial::canonicalize`].

use std::collections::BTreeMap;

use crate::error::QfermionError;
use crate::fermions::{Action, FermionOperator, Generator};
use crate::spin::{PauliBit, PauliFactor, SpinPolynomial};
use crate::Complex64;

type SparsePauli = BTreeMap<u32, PauliBit>;

fn multiply_single(a: PauliBit, b: PauliBit) -> (Option<PauliBit>, Complex64) {
    use PauliBit::*;
    if a == b {
        return (None, Complex64::new(1.0, 0.0));
    }
    let i = Complex64::new(0.0, 1.0);
    match (a, b) {
        (X, Y) => (Some(Z), i),
        (Y, X) => (Some(Z), -i),
        (Y, Z) => (Some(X), i),
        (Z, Y) => (Some(X), -i),
        (Z, X) => (Some(Y), i),
        (X, Z) => (Some(Y), -i),
        _ => unreachable!(),
    }
}

fn multiply_maps(a: &SparsePauli, b: &SparsePauli) -> (SparsePauli, Complex64) {
    let mut result = a.clone();
    let mut phase = Complex64::new(1.0, 0.0);
    for (&qubit, &bit_b) in b {
        match result.get(&qubit).copied() {
            Some(bit_a) => {
                let (replacement, extra_phase) = multiply_single(bit_a, bit_b);
                phase *= extra_phase;
                match replacement {
                    Some(bit) => {
                        result.insert(qubit, bit);
                    }
                    None => {
                        result.remove(&qubit);
                    }
                }
            }
            None => {
                result.insert(qubit, bit_b);
            }
        }
    }
    (result, phase)
}

/// The two-term expansion of a single fermionic generator: a Z-string over qubits
/// `0..generator.index` combined with a local X or Y factor at `generator.index`.
fn generator_fragments(g: Generator) -> [(Complex64, SparsePauli); 2] {
    let mut z_string: SparsePauli = BTreeMap::new();
    for qubit in 0..g.index {
        z_string.insert(qubit, PauliBit::Z);
    }
    let mut with_x = z_string.clone();
    with_x.insert(g.index, PauliBit::X);
    let mut with_y = z_string;
    with_y.insert(g.index, PauliBit::Y);

    let half = Complex64::new(0.5, 0.0);
    let half_i = Complex64::new(0.0, 0.5);
    match g.action {
        Action::Create => [(half, with_x), (-half_i, with_y)],
        Action::Annihilate => [(half, with_x), (half_i, with_y)],
    }
}

fn map_to_factors(map: &SparsePauli) -> Vec<PauliFactor> {
    map.iter().map(|(&qubit, &bit)| PauliFactor { qubit, bit }).collect()
}

/// Maps `op` onto a spin polynomial over `num_qubits` qubits.
///
/// # Errors
///
/// Returns [`QfermionError::OutOfRange`] if any generator's orbital index is `>= num_qubits`.
pub fn jordan_wigner(op: &FermionOperator, num_qubits: usize) -> Result<SpinPolynomial, QfermionError> {
    let mut out = SpinPolynomial::zero();
    for (term, coeff) in op.arena().iter_terms() {
        for &g in term {
            if g.index as usize >= num_qubits {
                return Err(QfermionError::OutOfRange {
                    index: g.index as usize,
                    bound: num_qubits,
                });
            }
        }

        let mut paths: Vec<(Complex64, SparsePauli)> = vec![(coeff, BTreeMap::new())];
        for &g in term {
            let fragments = generator_fragments(g);
            let mut next = Vec::with_capacity(paths.len() * 2);
            for (path_coeff, path_map) in &paths {
                for (frag_coeff, frag_map) in &fragments {
                    let (merged, phase) = multiply_maps(path_map, frag_map);
                    next.push((*path_coeff * *frag_coeff * phase, merged));
                }
            }
            paths = next;
        }

        for (path_coeff, path_map) in paths {
            out.add_term(&map_to_factors(&path_map), path_coeff);
        }
    }
    Ok(out)
}
