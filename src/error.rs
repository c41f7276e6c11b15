// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

// Difficulty validation happens before any group arithmetic and may carry a
// message. Once a proof is being checked, all failures collapse into the
// opaque `InvalidProof` so that rejections leak nothing about where the
// check failed.

#[derive(Error, Debug, PartialEq, Eq)]
pub enum VdfError {
    /// The difficulty violates the constraints of the chosen construction.
    #[error("Invalid number of iterations: {0}")]
    InvalidIterations(String),

    /// The proof was rejected. Deliberately carries no further detail.
    #[error("Invalid proof")]
    InvalidProof,

    /// Invalid value was given to an arithmetic routine.
    #[error("Invalid value was given to the function")]
    InvalidInput,

    /// A value does not fit the requested encoding width.
    #[error("Expected input of length at most {0}")]
    InputTooLong(usize),

    /// A byte buffer has the wrong length for the expected encoding.
    #[error("Input length wrong: {0}")]
    InputLengthWrong(usize),
}

pub type VdfResult<T> = Result<T, VdfError>;
