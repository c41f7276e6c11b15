// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This module contains implementations of two verifiable delay functions (VDFs) over imaginary
//! class groups: Pietrzak's halving protocol and Wesolowski's prime-quotient protocol. Both
//! operate on the same byte-level contract: a challenge selects the group, the difficulty is the
//! number of sequential squarings, and the proof is a concatenation of fixed-width serialized
//! forms.

use crate::class_group::Discriminant;
use crate::error::VdfResult;

pub mod pietrzak;
pub mod wesolowski;

/// This represents a Verifiable Delay Function (VDF) construction over a class group.
pub trait VDF {
    /// Check that the difficulty satisfies the constraints of this construction. This runs before
    /// any group arithmetic in both proving and verification.
    fn check_difficulty(&self, difficulty: u64) -> VdfResult<()>;

    /// The bit length of discriminants this instance derives from a challenge.
    fn discriminant_size_in_bits(&self) -> u64;

    /// Evaluate this VDF in the class group with the given discriminant, producing the serialized
    /// proof. The result is deterministic in the difficulty and the discriminant.
    fn solve_with_discriminant(
        &self,
        difficulty: u64,
        discriminant: &Discriminant,
    ) -> VdfResult<Vec<u8>>;

    /// Verify a proof produced by [`VDF::solve_with_discriminant`]. Fails with `InvalidProof`
    /// carrying no further detail.
    fn verify_with_discriminant(
        &self,
        difficulty: u64,
        proof: &[u8],
        discriminant: &Discriminant,
    ) -> VdfResult<()>;

    /// Evaluate this VDF with the discriminant derived from the challenge.
    fn solve(&self, challenge: &[u8], difficulty: u64) -> VdfResult<Vec<u8>> {
        self.check_difficulty(difficulty)?;
        let discriminant = Discriminant::from_seed(challenge, self.discriminant_size_in_bits())?;
        self.solve_with_discriminant(difficulty, &discriminant)
    }

    /// Verify a proof with the discriminant derived from the challenge.
    fn verify(&self, challenge: &[u8], difficulty: u64, proof: &[u8]) -> VdfResult<()> {
        self.check_difficulty(difficulty)?;
        let discriminant = Discriminant::from_seed(challenge, self.discriminant_size_in_bits())?;
        self.verify_with_discriminant(difficulty, proof, &discriminant)
    }
}

/// The byte width of one form coordinate on the wire for a given integer size. A form occupies
/// twice this length.
pub(crate) fn coordinate_byte_length(int_size_bits: u64) -> usize {
    ((int_size_bits + 16) >> 4) as usize
}
