// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Discriminants of imaginary class groups and their deterministic construction from a seed.
//!
//! The seed is expanded with SHA-256 in counter mode into a starting point of the requested bit
//! length, which is then moved into a residue class that avoids the smallest prime factors.
//! From there, windows of candidates are sieved against a table of small primes until one of the
//! survivors passes a Miller-Rabin check. The whole search is a pure function of the seed and the
//! bit length.

use crate::class_group::bigint_serde;
use crate::error::{VdfError, VdfResult};
use crate::math::extended_gcd::mod_inverse;
use crate::math::prime::is_probable_prime;
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive};
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};
use std::ops::Neg;

/// Number of Miller-Rabin witnesses used on sieve survivors.
const PRIMALITY_ROUNDS: usize = 2;

/// Modulus of the residue classes scanned by the prime search.
const RESIDUE_MODULUS: u64 = 11_095_045_730;

/// Number of candidates sieved per window.
const WINDOW_SIZE: usize = 1 << 16;

/// The 2^16 smallest residues r in [0, RESIDUE_MODULUS) with r = 7 mod 8 and coprime to the
/// modulus. The two trailing entropy bytes of the seed expansion index this table to pick the
/// residue class the search starts from.
static RESIDUES: Lazy<Vec<u64>> = Lazy::new(|| {
    (7..RESIDUE_MODULUS)
        .step_by(8)
        .filter(|r| r.gcd(&RESIDUE_MODULUS) == 1)
        .take(WINDOW_SIZE)
        .collect()
});

/// Odd primes below 2^16 which do not divide [RESIDUE_MODULUS], each paired with the inverse of
/// the modulus. The inverse turns "which candidates in the window does p divide" into a single
/// modular multiplication per window.
static SIEVE_PRIMES: Lazy<Vec<(u64, u64)>> = Lazy::new(|| {
    let mut is_composite = vec![false; WINDOW_SIZE];
    let mut primes = Vec::new();
    for p in (3..WINDOW_SIZE).step_by(2) {
        if is_composite[p] {
            continue;
        }
        let mut multiple = p * p;
        while multiple < WINDOW_SIZE {
            is_composite[multiple] = true;
            multiple += 2 * p;
        }
        let p = p as u64;
        if RESIDUE_MODULUS % p == 0 {
            continue;
        }
        let inverse = mod_inverse(&BigInt::from(RESIDUE_MODULUS % p), &BigInt::from(p))
            .expect("p does not divide the modulus")
            .to_u64()
            .expect("the inverse is smaller than p");
        primes.push((p, inverse));
    }
    primes
});

/// A discriminant for an imaginary class group. The discriminant is a negative integer congruent
/// to 1 mod 8.
#[derive(PartialEq, Eq, Debug, Clone, Serialize)]
pub struct Discriminant(#[serde(with = "bigint_serde")] BigInt);

impl TryFrom<BigInt> for Discriminant {
    type Error = VdfError;

    /// A valid discriminant should be a negative prime congruent to 1 mod 8. The primality is
    /// _not_ checked.
    fn try_from(value: BigInt) -> VdfResult<Self> {
        if !value.is_negative() || value.mod_floor(&BigInt::from(8)) != BigInt::one() {
            return Err(VdfError::InvalidInput);
        }
        Ok(Self(value))
    }
}

impl Discriminant {
    /// Return the number of bits needed to represent this discriminant, not including the sign bit.
    pub fn bits(&self) -> u64 {
        self.0.bits()
    }

    /// Borrow a reference to the underlying big integer.
    pub(crate) fn as_bigint(&self) -> &BigInt {
        &self.0
    }

    /// Compute a valid discriminant, i.e. a negative prime congruent to 1 mod 8, of the given bit
    /// length, deterministically from the seed.
    pub fn from_seed(seed: &[u8], length_in_bits: u64) -> VdfResult<Self> {
        if length_in_bits < 16 {
            return Err(VdfError::InvalidInput);
        }
        let length = length_in_bits as usize;
        let byte_length = (length + 7) / 8;
        let entropy = entropy_from_seed(seed, byte_length + 2);

        // Shift the entropy into exactly `length` bits and force the top bit.
        let mut n = BigUint::from_bytes_be(&entropy[..byte_length]);
        n >>= (8 - length % 8) % 8;
        n.set_bit(length_in_bits - 1, true);

        // The two trailing entropy bytes pick the residue class; move n up into it.
        let index = u16::from_be_bytes([entropy[byte_length], entropy[byte_length + 1]]);
        let residue = BigUint::from(RESIDUES[index as usize]);
        let modulus = BigUint::from(RESIDUE_MODULUS);
        n += (residue + &modulus - &n % &modulus) % &modulus;

        loop {
            if let Some(prime) = sieve_window(&n) {
                return Self::try_from(BigInt::from(prime).neg());
            }
            n += &modulus * BigUint::from(WINDOW_SIZE as u64);
        }
    }
}

impl<'de> Deserialize<'de> for Discriminant {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Self::try_from(bigint_serde::deserialize(deserializer)?).map_err(serde::de::Error::custom)
    }
}

/// SHA-256 counter-mode expansion of a seed: the concatenation of SHA-256(seed || counter) blocks
/// with a 2-byte big-endian counter, truncated to `byte_length` bytes.
fn entropy_from_seed(seed: &[u8], byte_length: usize) -> Vec<u8> {
    let mut blob = Vec::with_capacity(byte_length + 32);
    let mut counter: u16 = 0;
    while blob.len() < byte_length {
        let mut hash = Sha256::new();
        hash.update(seed);
        hash.update(counter.to_be_bytes());
        blob.extend_from_slice(&hash.finalize());
        counter += 1;
    }
    blob.truncate(byte_length);
    blob
}

/// Scan the window of candidates n, n + M, n + 2M, ..., with M = [RESIDUE_MODULUS], and return the
/// first prime congruent to 7 mod 8, if any. Candidates with a factor below 2^16 are marked by
/// sieving before any primality test runs.
fn sieve_window(n: &BigUint) -> Option<BigUint> {
    let mut is_composite = vec![false; WINDOW_SIZE];
    for &(p, inverse) in SIEVE_PRIMES.iter() {
        let remainder = (n % BigUint::from(p))
            .to_u64()
            .expect("the remainder is smaller than p");
        // Solve n + i * M = 0 (mod p) for the first index i divisible by p.
        let mut i = ((p - remainder) % p * inverse % p) as usize;
        while i < WINDOW_SIZE {
            is_composite[i] = true;
            i += p as usize;
        }
    }

    let modulus = BigUint::from(RESIDUE_MODULUS);
    let seven = BigUint::from(7u64);
    let eight = BigUint::from(8u64);
    for (i, marked) in is_composite.iter().enumerate() {
        if *marked {
            continue;
        }
        let candidate = n + &modulus * BigUint::from(i as u64);
        // The modulus is not divisible by 8, so only part of the window stays in the right class.
        if &candidate % &eight != seven {
            continue;
        }
        if is_probable_prime(&candidate, PRIMALITY_ROUNDS) {
            return Some(candidate);
        }
    }
    None
}
