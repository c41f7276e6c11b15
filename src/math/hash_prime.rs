// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! A hash-to-prime function used as the Fiat-Shamir challenge in Wesolowski's
//! construction. Candidates are drawn from a counter-mode SHA-256 stream over
//! the seed and the first probable prime is returned. The loop is unbounded,
//! but by the prime number theorem it terminates after about 128 ln 2 = 90
//! iterations in expectation.

use crate::math::bytes::u64_to_bytes;
use crate::math::prime::is_probable_prime;
use num_bigint::BigUint;
use sha2::{Digest, Sha256};

/// Number of Miller-Rabin witnesses used to screen candidates.
const PRIMALITY_ROUNDS: usize = 2;

/// This struct provides an iterator of 128-bit prime candidates derived from
/// a list of seed byte strings. Each candidate is the leading 16 bytes of
/// SHA-256("prime" || counter || seed...), with the counter encoded as 8
/// big-endian bytes. The counter must be a local accumulator so that every
/// iteration hashes a distinct input.
struct HashPrimeIterator {
    seed_parts: Vec<Vec<u8>>,
    counter: u64,
}

impl Iterator for HashPrimeIterator {
    type Item = BigUint;

    fn next(&mut self) -> Option<BigUint> {
        let mut hash = Sha256::new();
        hash.update(b"prime");
        hash.update(u64_to_bytes(self.counter));
        for part in &self.seed_parts {
            hash.update(part);
        }
        self.counter += 1;
        Some(BigUint::from_bytes_be(&hash.finalize()[..16]))
    }
}

/// Return the first probable prime in the candidate stream derived from the
/// given seed parts. Deterministic in the seed.
pub fn hash_prime(seed_parts: &[&[u8]]) -> BigUint {
    let mut iterator = HashPrimeIterator {
        seed_parts: seed_parts.iter().map(|part| part.to_vec()).collect(),
        counter: 0,
    };
    iterator
        .find(|candidate| is_probable_prime(candidate, PRIMALITY_ROUNDS))
        .expect("the iterator is infinite")
}
