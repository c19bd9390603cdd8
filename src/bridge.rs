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

//! Linear substitution between fermionic ladder operators and Majorana operators:
//!
//! ```text
//! c_j     = (γ_2j - i γ_2j+1) / 2
//! c†_j    = (γ_2j + i γ_2j+1) / 2
//! γ_2j    = c_j + c†_j
//! γ_2j+1  = i (c_j - c†_j)
//! ```

use crate::fermions::{Action, FermionOperator, Generator};
use crate::majorana::MajoranaOperator;
use crate::Complex64;

fn half() -> Complex64 {
    Complex64::new(0.5, 0.0)
}

fn half_i() -> Complex64 {
    Complex64::new(0.0, 0.5)
}

fn majorana_of_generator(g: Generator) -> MajoranaOperator {
    let mut out = MajoranaOperator::zero();
    let even = 2 * g.index;
    let odd = even + 1;
    match g.action {
        Action::Annihilate => {
            out.add_term(&[even], half());
            out.add_term(&[odd], -half_i());
        }
        Action::Create => {
            out.add_term(&[even], half());
            out.add_term(&[odd], half_i());
        }
    }
    out
}

/// Replaces each fermionic generator by its 2-term Majorana expansion, distributing through
/// `compose`. Does not canonicalize; callers choose whether to `normal_ordered`/`simplify`
/// afterwards.
pub fn fermion_to_majorana(op: &FermionOperator) -> MajoranaOperator {
    let mut total = MajoranaOperator::zero();
    for (term, coeff) in op.arena().iter_terms() {
        let mut acc = MajoranaOperator::one();
        for &g in term {
            acc = acc.compose(&majorana_of_generator(g));
        }
        total = total.add(&acc.mul(coeff));
    }
    total
}

fn fermion_of_mode(mode: u32) -> FermionOperator {
    let mut out = FermionOperator::zero();
    let j = mode / 2;
    if mode % 2 == 0 {
        out.add_term(&[Action::Annihilate], &[j], Complex64::new(1.0, 0.0))
            .unwrap();
        out.add_term(&[Action::Create], &[j], Complex64::new(1.0, 0.0))
            .unwrap();
    } else {
        out.add_term(&[Action::Annihilate], &[j], Complex64::new(0.0, 1.0))
            .unwrap();
        out.add_term(&[Action::Create], &[j], Complex64::new(0.0, -1.0))
            .unwrap();
    }
    out
}

/// Dual substitution of `fermion_to_majorana`: replaces each Majorana mode by its 2-term
/// fermionic expansion, distributing through `compose`. Does not canonicalize.
pub fn majorana_to_fermion(op: &MajoranaOperator) -> FermionOperator {
    let mut total = FermionOperator::zero();
    for (term, coeff) in op.arena().iter_terms() {
        let mut acc = FermionOperator::one();
        for &mode in term {
            acc = acc.compose(&fermion_of_mode(mode));
        }
        total = total.add(&acc.mul(coeff));
    }
    total
}
