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

use thiserror::Error;

/// Errors that can occur in qfermion.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum QfermionError {
    /// Malformed builder arrays: non-monotone boundaries, mismatched lengths, or an index
    /// that does not fit the declared bit width.
    #[error("Invalid argument: {msg}")]
    InvalidArgument {
        /// Description of which invariant was violated.
        msg: String,
    },
    /// An operand index exceeded the declared qubit or orbital count at mapping time.
    #[error("Index {index} is out of range for a count of {bound}")]
    OutOfRange {
        /// The index that was out of range.
        index: usize,
        /// The declared upper bound (exclusive) it should have fit under.
        bound: usize,
    },
    /// FCIDUMP parse failure.
    #[error("Failed to parse FCIDUMP input at byte offset {offset}: {msg}")]
    ParseError {
        /// Byte offset into the input at which parsing failed.
        offset: usize,
        /// Description of the failure.
        msg: String,
    },
    /// Memory exhaustion during arena growth.
    ///
    /// Never constructed by this crate: Rust's global allocator aborts the process on
    /// allocation failure rather than returning a recoverable error. The variant is kept for
    /// interface completeness with the external status-code contract.
    #[error("Allocation failed")]
    AllocationFailed,
    /// Reserved for the test harness; never raised by the core algebra.
    #[error("Equality check failed")]
    EqualityError,
}
