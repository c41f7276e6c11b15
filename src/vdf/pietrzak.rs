// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This implements Pietrzak's VDF construction from https://eprint.iacr.org/2018/627.pdf over
//! imaginary class groups. Proofs are larger and verification is slower than in Wesolowski's
//! construction, but proving is faster: each halving round publishes a midpoint mu, and the
//! final rounds are left to the verifier instead of being proved.

use crate::class_group::{Discriminant, QuadraticForm};
use crate::error::{VdfError, VdfResult};
use crate::vdf::{coordinate_byte_length, VDF};
use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_traits::One;
use sha2::{Digest, Sha256};

/// The smallest difficulty for which the proof tail can be trimmed by [DELTA] halvings.
const MIN_ITERATIONS: u64 = 66;

/// Number of positions the last proved round is stepped back from the tail [..., 2, 1] of the
/// halving chain.
const DELTA: usize = 8;

/// Pietrzak's VDF construction. The challenge determines a class group discriminant of
/// `int_size_bits` bits (one of 256, 512, 1024 or 2048), and the difficulty must be an even
/// number of at least 66 squarings.
pub struct PietrzaksVDF {
    int_size_bits: u64,
}

impl PietrzaksVDF {
    /// Create a new VDF over class groups with discriminants of `int_size_bits` bits.
    pub fn new(int_size_bits: u64) -> Self {
        Self { int_size_bits }
    }
}

impl VDF for PietrzaksVDF {
    fn check_difficulty(&self, difficulty: u64) -> VdfResult<()> {
        if difficulty.is_odd() || difficulty < MIN_ITERATIONS {
            return Err(VdfError::InvalidIterations(format!(
                "difficulty must be an even number of at least {}, got {}",
                MIN_ITERATIONS, difficulty
            )));
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
        let cached_rounds = approximate_i(difficulty);
        let powers = x
            .clone()
            .iterate_doublings(&cache_indices(difficulty, cached_rounds))?;

        let x_bytes = x.to_bytes_with_size(size)?;
        let y_bytes = powers[&difficulty].to_bytes_with_size(size)?;

        let final_t = calculate_final_t(difficulty);
        let mut proof = y_bytes.clone();
        let mut challenges: Vec<BigInt> = Vec::new();
        let mut halvings: Vec<u64> = Vec::new();
        let mut x_i = x;
        let mut t_i = difficulty;
        let mut round = 0usize;

        while t_i != final_t {
            let half_t = t_i >> 1;
            halvings.push(half_t);

            let mu = if round < cached_rounds {
                // mu is x_i squared half_t times. Unfolding the round updates
                // x_i = x^(prod of (r_j + 2^halvings[j])) turns it into a product of cached
                // powers of x, one per subset of the earlier rounds, raised to the product of
                // the challenges of the rounds outside the subset. The odd numerators below
                // 2^(round + 1) enumerate the subsets through their upper bits.
                let mut mu = QuadraticForm::zero(discriminant);
                for numerator in (1..(1u64 << (round + 1))).step_by(2) {
                    let mut challenge_product = BigInt::one();
                    let mut t_sum = half_t;
                    for earlier in 0..round {
                        if numerator & (1 << (round - earlier)) != 0 {
                            t_sum += halvings[earlier];
                        } else {
                            challenge_product *= &challenges[earlier];
                        }
                    }
                    mu = mu.compose(&powers[&t_sum].mul(&challenge_product)?)?;
                }
                mu
            } else {
                x_i.clone().repeated_doubling(half_t)?
            };

            let mu_bytes = mu.to_bytes_with_size(size)?;
            let r = compute_challenge(&x_bytes, &y_bytes, &mu_bytes);
            x_i = x_i.mul(&r)?.compose(&mu)?;

            proof.extend_from_slice(&mu_bytes);
            challenges.push(r);
            halve_and_round_up(&mut t_i);
            round += 1;
        }

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

/// Run the halving protocol against a proof. Internal failures are detailed here and collapsed
/// into the opaque `InvalidProof` by the caller.
fn verify_proof(
    difficulty: u64,
    proof: &[u8],
    discriminant: &Discriminant,
    size: usize,
) -> VdfResult<()> {
    let element_length = 2 * size;
    if proof.is_empty() || proof.len() % element_length != 0 {
        return Err(VdfError::InputLengthWrong(proof.len()));
    }
    let mut forms = proof
        .chunks(element_length)
        .map(|chunk| QuadraticForm::from_bytes(chunk, discriminant))
        .collect::<VdfResult<Vec<_>>>()?;
    let mus = forms.split_off(1);
    let y = forms.pop().expect("the proof contains at least one form");

    let x = QuadraticForm::generator(discriminant);
    let x_bytes = x.to_bytes_with_size(size)?;
    let y_bytes = y.to_bytes_with_size(size)?;

    let mut x_i = x;
    let mut y_i = y;
    let mut t_i = difficulty;
    for mu in &mus {
        let r = compute_challenge(&x_bytes, &y_bytes, &mu.to_bytes_with_size(size)?);
        x_i = x_i.mul(&r)?.compose(mu)?;
        y_i = y_i.compose(&mu.mul(&r)?)?;
        if halve_and_round_up(&mut t_i) {
            y_i = y_i.double()?;
        }
    }

    if x_i.repeated_doubling(t_i)? != y_i {
        return Err(VdfError::InvalidProof);
    }
    Ok(())
}

/// Derive the challenge for one halving round from the serializations of the input, the output
/// and the round's midpoint. Both the prover and the verifier hash the *initial* input and output
/// in every round; the evolving round state is never a hash input. Changing this changes every
/// proof, so it must be kept bit-for-bit stable.
fn compute_challenge(x_bytes: &[u8], y_bytes: &[u8], mu_bytes: &[u8]) -> BigInt {
    let mut hash = Sha256::new();
    hash.update(x_bytes);
    hash.update(y_bytes);
    hash.update(mu_bytes);
    BigInt::from_bytes_be(Sign::Plus, &hash.finalize()[..16])
}

/// Replace t by t / 2, rounded up to the next even number, and return true iff rounding was
/// needed.
fn halve_and_round_up(t: &mut u64) -> bool {
    *t >>= 1;
    let parity = t.is_odd();
    if parity {
        *t += 1;
    }
    parity
}

/// The difficulty at which the halving rounds stop: follow the chain t, t/2, ... (each rounded up
/// to even) down to 2, then step [DELTA] positions back from the tail [..., 2, 1].
fn calculate_final_t(difficulty: u64) -> u64 {
    let mut chain = Vec::new();
    let mut t = difficulty;
    while t != 2 {
        chain.push(t);
        t >>= 1;
        if t.is_odd() {
            t += 1;
        }
    }
    chain.push(2);
    chain.push(1);
    chain[chain.len() - DELTA]
}

/// Number of halving rounds whose mu is assembled from cached powers instead of by squaring the
/// round state, balancing the size of the power table against the prover's extra squarings.
fn approximate_i(difficulty: u64) -> usize {
    let x = (difficulty as f64 / 16.0) * std::f64::consts::LN_2;
    ((x.ln() - x.ln().ln() + 0.25) / (2.0 * std::f64::consts::LN_2))
        .round()
        .max(0.0) as usize
}

/// The iteration indices the prover needs cached: every subset sum of the first `cached_rounds`
/// halvings of the difficulty, plus the difficulty itself for the output.
fn cache_indices(difficulty: u64, cached_rounds: usize) -> Vec<u64> {
    let mut halvings = Vec::with_capacity(cached_rounds);
    let mut t = difficulty;
    for _ in 0..cached_rounds {
        let half = t >> 1;
        halvings.push(half);
        t = half;
        if t.is_odd() {
            t += 1;
        }
    }

    let mut indices = vec![0u64];
    for half in halvings {
        let shifted: Vec<u64> = indices.iter().map(|sum| sum + half).collect();
        indices.extend(shifted);
    }
    indices.push(difficulty);
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use std::str::FromStr;

    fn discriminant_256() -> Discriminant {
        Discriminant::try_from(
            BigInt::from_str(
                "-94244082954491557865740412536462075406760295174154720908408968004709609548271",
            )
            .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_check_difficulty() {
        let vdf = PietrzaksVDF::new(256);
        assert!(vdf.check_difficulty(66).is_ok());
        assert!(vdf.check_difficulty(1024).is_ok());
        assert!(matches!(
            vdf.check_difficulty(65),
            Err(VdfError::InvalidIterations(_))
        ));
        assert!(matches!(
            vdf.check_difficulty(64),
            Err(VdfError::InvalidIterations(_))
        ));
        assert!(matches!(
            vdf.check_difficulty(0),
            Err(VdfError::InvalidIterations(_))
        ));

        // The difficulty is rejected before any group arithmetic.
        let discriminant = discriminant_256();
        assert!(matches!(
            vdf.solve_with_discriminant(65, &discriminant),
            Err(VdfError::InvalidIterations(_))
        ));
        assert!(matches!(
            vdf.verify_with_discriminant(65, &[], &discriminant),
            Err(VdfError::InvalidIterations(_))
        ));
    }

    #[test]
    fn test_final_t() {
        // 258 halves to 130 and then to 66, where the chain [258, 130, 66, 34, 18, 10, 6, 4, 2, 1]
        // leaves exactly DELTA positions to the tail.
        assert_eq!(calculate_final_t(258), 66);
        assert_eq!(calculate_final_t(66), 66);
        assert_eq!(calculate_final_t(1024), 128);
    }

    #[test]
    fn test_solve_and_verify_minimal_difficulty() {
        let vdf = PietrzaksVDF::new(256);
        let discriminant = discriminant_256();

        let proof = vdf.solve_with_discriminant(66, &discriminant).unwrap();
        // No halving rounds are proved at the minimal difficulty, so the proof is just y.
        assert_eq!(proof.len(), 34);
        assert!(vdf.verify_with_discriminant(66, &proof, &discriminant).is_ok());
    }

    #[test]
    fn test_solve_and_verify() {
        let vdf = PietrzaksVDF::new(256);
        let discriminant = discriminant_256();

        let proof = vdf.solve_with_discriminant(258, &discriminant).unwrap();
        // y plus exactly two mu elements.
        assert_eq!(proof.len(), 3 * 34);
        assert!(vdf
            .verify_with_discriminant(258, &proof, &discriminant)
            .is_ok());

        // Solving is deterministic.
        assert_eq!(proof, vdf.solve_with_discriminant(258, &discriminant).unwrap());

        // The proof does not verify against another difficulty.
        assert!(vdf
            .verify_with_discriminant(260, &proof, &discriminant)
            .is_err());
    }

    #[test]
    fn test_regression() {
        let vdf = PietrzaksVDF::new(256);
        let proof = vdf.solve_with_discriminant(258, &discriminant_256()).unwrap();
        assert_eq!(
            proof,
            hex::decode(
                "004f930349bb1716745b84da355e43dc33ffd8dc89a1a8a1dd10b698bc42843f6ba5\
                 0021aea421ddab10e2a161df6960404839fff6ef98d01f5aeb09db86df8a6f50d179\
                 0051d91ddaccd5af37e53bed3f9c87f98cffef630e9f8a50ca18a5ce43d883b679bf"
            )
            .unwrap()
        );
    }

    #[test]
    fn test_solve_and_verify_multiple_cached_rounds() {
        let vdf = PietrzaksVDF::new(256);
        let discriminant = discriminant_256();

        // Three rounds of which the first two use the cached powers.
        let proof = vdf.solve_with_discriminant(1024, &discriminant).unwrap();
        assert_eq!(proof.len(), 4 * 34);
        assert!(vdf
            .verify_with_discriminant(1024, &proof, &discriminant)
            .is_ok());
    }

    #[test]
    fn test_verify_rejects_tampered_proof() {
        let vdf = PietrzaksVDF::new(256);
        let discriminant = discriminant_256();
        let proof = vdf.solve_with_discriminant(258, &discriminant).unwrap();

        for index in [0, 17, 33, 37, 68, 101] {
            let mut tampered = proof.clone();
            tampered[index] ^= 0x01;
            assert_eq!(
                vdf.verify_with_discriminant(258, &tampered, &discriminant),
                Err(VdfError::InvalidProof)
            );
        }

        // Dropping whole trailing mu elements leaves a valid proof that is just more expensive
        // to check: the remaining rounds land in the final repeated-squaring comparison.
        assert!(vdf
            .verify_with_discriminant(258, &proof[..68], &discriminant)
            .is_ok());
        assert!(vdf
            .verify_with_discriminant(258, &proof[..34], &discriminant)
            .is_ok());

        // Lengths that are not a multiple of the element size are rejected.
        assert_eq!(
            vdf.verify_with_discriminant(258, &proof[..35], &discriminant),
            Err(VdfError::InvalidProof)
        );
        assert_eq!(
            vdf.verify_with_discriminant(258, &[], &discriminant),
            Err(VdfError::InvalidProof)
        );
    }

    #[test]
    fn test_solve_and_verify_from_challenge() {
        let vdf = PietrzaksVDF::new(256);
        let challenge = [0xaa, 0xbb, 0xcc];

        let proof = vdf.solve(&challenge, 66).unwrap();
        assert!(vdf.verify(&challenge, 66, &proof).is_ok());
        assert!(vdf.verify(&[0xaa, 0xbb], 66, &proof).is_err());
    }
}
