// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This implements Wesolowski's VDF construction from https://eprint.iacr.org/2018/623 over
//! imaginary class groups. The proof is a single form pi = x^(2^t / B) for a Fiat-Shamir prime B,
//! and verification needs only two small exponentiations. The prover computes pi with a windowed
//! long division over a table of cached powers of x, so the table stays small even for large
//! difficulties.

use crate::class_group::{Discriminant, QuadraticForm};
use crate::error::{VdfError, VdfResult};
use crate::math::hash_prime::hash_prime;
use crate::vdf::{coordinate_byte_length, VDF};
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::collections::BTreeMap;

/// Wesolowski's VDF construction. The challenge determines a class group discriminant of
/// `int_size_bits` bits, and any positive difficulty is accepted.
pub struct WesolowskisVDF {
    int_size_bits: u64,
}

impl WesolowskisVDF {
    /// Create a new VDF over class groups with discriminants of `int_size_bits` bits.
    pub fn new(int_size_bits: u64) -> Self {
        Self { int_size_bits }
    }
}

impl VDF for WesolowskisVDF {
    fn check_difficulty(&self, difficulty: u64) -> VdfResult<()> {
        if difficulty == 0 {
            return Err(VdfError::InvalidIterations(
                "difficulty must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn discriminant_size_in_bits(&self) -> u64 {
        self.int_size_bits
    }

    fn solve_with_discriminant(
        &self,
        difficulty: u64,
        discriminant: &Discriminant,
    ) -> VdfResult<Vec<u8>> {
        self.check_difficulty(difficulty)?;
        let size = coordinate_byte_length(self.int_size_bits);

        let x = QuadraticForm::generator(discriminant);
        let (l, k, _w) = approximate_parameters(difficulty);
        let cluster_length = l * k as u64;

        let mut indices: Vec<u64> = (0..=difficulty.div_ceil(cluster_length))
            .map(|i| i * cluster_length)
            .collect();
        indices.push(difficulty);
        let powers = x.clone().iterate_doublings(&indices)?;

        let x_bytes = x.to_bytes_with_size(size)?;
        let y_bytes = powers[&difficulty].to_bytes_with_size(size)?;

        let challenge = BigInt::from(hash_prime(&[&x_bytes, &y_bytes]));
        let pi = eval_optimized(&challenge, difficulty, k, l, &powers, discriminant)?;

        let mut proof = y_bytes;
        proof.extend_from_slice(&pi.to_bytes_with_size(size)?);
        Ok(proof)
    }

    fn verify_with_discriminant(
        &self,
        difficulty: u64,
        proof: &[u8],
        discriminant: &Discriminant,
    ) -> VdfResult<()> {
        self.check_difficulty(difficulty)?;
        verify_proof(
            difficulty,
            proof,
            discriminant,
            coordinate_byte_length(self.int_size_bits),
        )
        .map_err(|_| VdfError::InvalidProof)
    }
}

/// Check the proof equation pi^B * x^(2^t mod B) = y. Internal failures are detailed here and
/// collapsed into the opaque `InvalidProof` by the caller.
fn verify_proof(
    difficulty: u64,
    proof: &[u8],
    discriminant: &Discriminant,
    size: usize,
) -> VdfResult<()> {
    if proof.len() != 4 * size {
        return Err(VdfError::InputLengthWrong(proof.len()));
    }
    let (y_bytes, pi_bytes) = proof.split_at(2 * size);
    let y = QuadraticForm::from_bytes(y_bytes, discriminant)?;
    let pi = QuadraticForm::from_bytes(pi_bytes, discriminant)?;

    let x = QuadraticForm::generator(discriminant);
    let challenge = BigInt::from(hash_prime(&[
        &x.to_bytes_with_size(size)?,
        &y.to_bytes_with_size(size)?,
    ]));

    let remainder = BigInt::from(2).modpow(&BigInt::from(difficulty), &challenge);
    if pi.mul(&challenge)?.compose(&x.mul(&remainder)?)? != y {
        return Err(VdfError::InvalidProof);
    }
    Ok(())
}

/// Choose the window length `l`, the digit width `k` and the witness count `w` for a difficulty.
/// The evaluator stores one power per `l * k` squarings, so `l` grows once the difficulty
/// outgrows a fixed memory budget; `w` is reported for callers that want to split proving work
/// but is not used by the single-threaded evaluator.
fn approximate_parameters(difficulty: u64) -> (u64, u32, i64) {
    let log_memory = (10_000_000.0f64).log2();
    let log_t = (difficulty as f64).log2();
    let l = if log_t - log_memory > 0.0 {
        2.0f64.powf(log_memory - 20.0).ceil() as u64
    } else {
        1
    };

    let intermediate = difficulty as f64 * std::f64::consts::LN_2 / (2.0 * l as f64);
    // max comes last so that a NaN from the nested logarithms at tiny difficulties falls back
    // to k = 1.
    let k = (intermediate.ln() - intermediate.ln().ln() + 0.25)
        .round()
        .max(1.0) as u32;

    let w = (difficulty as f64 / (difficulty as f64 / k as f64 + (l << (k + 1)) as f64)).floor()
        as i64
        - 2;

    (l, k, w)
}

/// Compute x^(2^t / B) for the challenge prime B by windowed long division: the quotient is
/// consumed in k-bit digits, l digit positions at a time, and equal digits are collected into
/// buckets which are folded with a low/high split of the digit. `powers` must contain x squared
/// i * k * l times for every cluster index i.
fn eval_optimized(
    challenge: &BigInt,
    difficulty: u64,
    k: u32,
    l: u64,
    powers: &BTreeMap<u64, QuadraticForm>,
    discriminant: &Discriminant,
) -> VdfResult<QuadraticForm> {
    let k1 = k / 2;
    let k0 = k - k1;
    let identity = QuadraticForm::zero(discriminant);

    let bucket_count = 1usize << k;
    let clusters = difficulty.div_ceil(k as u64 * l);

    let mut pi = identity.clone();
    for j in (0..l).rev() {
        pi = pi.repeated_doubling(k as u64)?;

        let mut buckets = vec![identity.clone(); bucket_count];
        for i in 0..clusters {
            let position = i * l + j;
            // Digits beyond the most significant end of the quotient contribute nothing.
            if (k as u128) * (position as u128 + 1) > difficulty as u128 {
                continue;
            }
            let digit = get_block(position, k, difficulty, challenge) as usize;
            buckets[digit] = buckets[digit].compose(&powers[&(i * k as u64 * l)])?;
        }

        for b1 in 0..1usize << k1 {
            let mut z = identity.clone();
            for b0 in 0..1usize << k0 {
                z = z.compose(&buckets[(b1 << k0) + b0])?;
            }
            pi = pi.compose(&z.mul(&BigInt::from((b1 as u64) << k0))?)?;
        }
        for b0 in 0..1usize << k0 {
            let mut z = identity.clone();
            for b1 in 0..1usize << k1 {
                z = z.compose(&buckets[(b1 << k0) + b0])?;
            }
            pi = pi.compose(&z.mul(&BigInt::from(b0 as u64))?)?;
        }
    }
    Ok(pi)
}

/// The k-bit digit of 2^t / b at position i, counted from the least significant digit.
fn get_block(i: u64, k: u32, t: u64, b: &BigInt) -> u64 {
    let exponent = BigInt::from(t - k as u64 * (i + 1));
    let remainder = BigInt::from(2).modpow(&exponent, b);
    ((remainder << k) / b)
        .to_u64()
        .expect("the quotient is smaller than 2^k")
}
