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

//! Symbolic algebra for second-quantized many-body operators.
//!
//! Fermionic creation/annihilation operators ([`fermions::FermionOperator`]) and Majorana
//! operators ([`majorana::MajoranaOperator`]) are represented as sparse polynomials of
//! non-commuting generators over a shared flat-arena layout ([`arena`]). Both kinds support
//! addition, scalar multiplication, composition, adjoint, normal ordering, simplification, and
//! (anti-)commutators. [`bridge`] provides the linear substitution between the two generator
//! sets. [`jordan_wigner`] maps a [`fermions::FermionOperator`] onto a [`spin::SpinPolynomial`]
//! over a fixed qubit count. [`fcidump`] parses the FCIDUMP electronic-integral exchange format,
//! and [`integrals`] lifts triangularly-stored one- and two-body integrals into a
//! [`fermions::FermionOperator`].

pub mod arena;
pub mod bridge;
pub mod error;
pub mod fcidump;
pub mod fermions;
pub mod integrals;
pub mod jordan_wigner;
pub mod majorana;
pub mod spin;

/// Complex scalar used throughout the crate: a pair of `f64`s with the usual field operations.
pub use num_complex::Complex64;

pub use bridge::{fermion_to_majorana, majorana_to_fermion};
pub use error::QfermionError;
pub use fcidump::FciDump;
pub use fermions::{Action, FermionOperator, Generator};
pub use jordan_wigner::jordan_wigner;
pub use majorana::{MajoranaOperator, Mode};
pub use spin::{PauliBit, SpinPolynomial};
