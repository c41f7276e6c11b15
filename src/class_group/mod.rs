// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This module contains an implementation of imaginary class groups. Elements are represented by
//! binary quadratic forms (a, b, c) with a fixed discriminant b^2 - 4ac, which form a group under
//! composition. Squaring an element repeatedly is the sequential work underlying both proof
//! systems in this crate, and the group structure is what makes the protocols sound: the order of
//! the group is unknown, so repeated squaring cannot be shortcut.
//!
//! Forms are serialized as the fixed-width two's-complement encodings of a and b; c is recomputed
//! from the discriminant on deserialization.

use crate::error::{VdfError, VdfResult};
use crate::math::bytes::{bytes_to_int, int_to_bytes};
use crate::math::extended_gcd::extended_euclidean_algorithm;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod discriminant;
pub(crate) mod bigint_serde;
mod reduction;

pub use discriminant::Discriminant;

/// A binary quadratic form, (a, b, c) with b^2 - 4ac equal to the discriminant it was constructed
/// with. All constructors reduce their result, so a is positive and |b| <= a <= c for every form
/// handed out by this module. Two forms are equal only if all three coefficients and the
/// discriminant match.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct QuadraticForm {
    #[serde(with = "bigint_serde")]
    pub(crate) a: BigInt,
    #[serde(with = "bigint_serde")]
    pub(crate) b: BigInt,
    #[serde(with = "bigint_serde")]
    pub(crate) c: BigInt,
    pub(crate) discriminant: Discriminant,
}

impl QuadraticForm {
    /// Create a new quadratic form given only the a and b coefficients and the discriminant. The
    /// a coefficient must be positive and 4a must divide b^2 minus the discriminant exactly, so
    /// that c is determined.
    pub fn from_a_b_discriminant(
        a: BigInt,
        b: BigInt,
        discriminant: &Discriminant,
    ) -> VdfResult<Self> {
        if !a.is_positive() {
            return Err(VdfError::InvalidInput);
        }
        let numerator = &b * &b - discriminant.as_bigint();
        let (c, remainder) = numerator.div_rem(&(&a << 2));
        if !remainder.is_zero() {
            return Err(VdfError::InvalidInput);
        }
        Ok(Self {
            a,
            b,
            c,
            discriminant: discriminant.clone(),
        }
        .reduce())
    }

    /// Return the identity element, the principal form (1, 1, c), in the class group with the
    /// given discriminant.
    pub fn zero(discriminant: &Discriminant) -> Self {
        Self::from_a_b_discriminant(BigInt::one(), BigInt::one(), discriminant)
            .expect("(1, 1) is a valid form for any discriminant congruent to 1 mod 4")
    }

    /// Return a generator (or, more precisely, an element with a presumed large order) in the
    /// class group with the given discriminant. We use the element (2, 1, c) where c is determined
    /// from the discriminant.
    pub fn generator(discriminant: &Discriminant) -> Self {
        Self::from_a_b_discriminant(BigInt::from(2), BigInt::one(), discriminant)
            .expect("(2, 1) is a valid form for any discriminant congruent to 1 mod 8")
    }

    /// The discriminant this form was constructed with.
    pub fn discriminant(&self) -> &Discriminant {
        &self.discriminant
    }

    /// Compute the composition of this form with `rhs`, which must have the same discriminant.
    /// Every division in the algorithm is exact for valid forms; a non-zero remainder is
    /// surfaced as an error instead of being truncated away.
    pub fn compose(&self, rhs: &QuadraticForm) -> VdfResult<QuadraticForm> {
        // Composition by solving linear congruences, following section 7 of
        // https://github.com/Chia-Network/chiavdf/blob/main/classgroups.pdf.
        if self.discriminant != rhs.discriminant {
            return Err(VdfError::InvalidInput);
        }

        // b is always odd for an odd discriminant, so the sum and difference below are even.
        let g: BigInt = (&self.b + &rhs.b) >> 1;
        let h: BigInt = (&rhs.b - &self.b) >> 1;
        let w = self.a.gcd(&rhs.a.gcd(&g));

        let j = &w;
        let s = &self.a / &w;
        let t = &rhs.a / &w;
        let u = &g / &w;

        let st = &s * &t;
        let (mu, v) = solve_linear_congruence(&(&t * &u), &(&h * &u + &s * &self.c), &st)?;
        let (lambda, _) = solve_linear_congruence(&(&t * &v), &(&h - &t * &mu), &s)?;

        let k = &mu + &v * &lambda;
        let l = exact_div(&(&k * &t - &h), &s)?;
        let m = exact_div(&(&t * &u * &k - &h * &u - &self.c * &s), &st)?;

        let b = j * &u - (&k * &t + &l * &s);
        let c = &k * &l - j * &m;

        Ok(QuadraticForm {
            a: st,
            b,
            c,
            discriminant: self.discriminant.clone(),
        }
        .reduce())
    }

    /// Square this form, i.e. compose it with itself.
    pub fn double(&self) -> VdfResult<QuadraticForm> {
        self.compose(self)
    }

    /// Apply `iterations` successive squarings to this form.
    pub fn repeated_doubling(mut self, iterations: u64) -> VdfResult<QuadraticForm> {
        for _ in 0..iterations {
            self = self.double()?;
        }
        Ok(self)
    }

    /// Compute scale * self by left-to-right binary double-and-add. The scale must be
    /// non-negative; zero yields the identity and one is a no-op.
    pub fn mul(&self, scale: &BigInt) -> VdfResult<QuadraticForm> {
        if scale.is_negative() {
            return Err(VdfError::InvalidInput);
        }
        if scale.is_zero() {
            return Ok(Self::zero(&self.discriminant));
        }
        let mut result = self.clone();
        for i in (0..scale.bits() - 1).rev() {
            result = result.double()?;
            if scale.bit(i) {
                result = result.compose(self)?;
            }
        }
        Ok(result)
    }

    /// Walk the chain of repeated squarings of this form once, snapshotting the value at each of
    /// the requested indices: the returned map sends i to this form squared i times. Duplicate
    /// indices collapse, and an empty list yields an empty map.
    pub fn iterate_doublings(self, indices: &[u64]) -> VdfResult<BTreeMap<u64, QuadraticForm>> {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let mut powers = BTreeMap::new();
        let mut current = self;
        let mut reached = 0u64;
        for index in sorted {
            current = current.repeated_doubling(index - reached)?;
            reached = index;
            powers.insert(index, current.clone());
        }
        Ok(powers)
    }

    /// Serialize this form as the two's-complement big-endian encodings of a and b, each
    /// right-aligned in `size` bytes. c is not serialized since it is determined by the
    /// discriminant.
    pub fn to_bytes_with_size(&self, size: usize) -> VdfResult<Vec<u8>> {
        let mut output = int_to_bytes(&self.a, size)?;
        output.extend_from_slice(&int_to_bytes(&self.b, size)?);
        Ok(output)
    }

    /// Serialize this form with the default coordinate width for its discriminant. See
    /// [`QuadraticForm::to_bytes_with_size`].
    pub fn to_bytes(&self) -> VdfResult<Vec<u8>> {
        self.to_bytes_with_size(((self.discriminant.bits() + 16) >> 4) as usize)
    }

    /// Deserialize a form from the encoding produced by [`QuadraticForm::to_bytes_with_size`]:
    /// the buffer is split in half into a and b, and c is recomputed from the discriminant. The
    /// result is reduced.
    pub fn from_bytes(bytes: &[u8], discriminant: &Discriminant) -> VdfResult<Self> {
        if bytes.is_empty() || bytes.len() % 2 != 0 {
            return Err(VdfError::InputLengthWrong(bytes.len()));
        }
        let (a_bytes, b_bytes) = bytes.split_at(bytes.len() / 2);
        Self::from_a_b_discriminant(bytes_to_int(a_bytes), bytes_to_int(b_bytes), discriminant)
    }
}

/// Division that fails with `InvalidInput` if the remainder is non-zero.
fn exact_div(numerator: &BigInt, denominator: &BigInt) -> VdfResult<BigInt> {
    let (quotient, remainder) = numerator.div_rem(denominator);
    if !remainder.is_zero() {
        return Err(VdfError::InvalidInput);
    }
    Ok(quotient)
}

/// Solve `a * mu = b (mod m)` for mu, returning `(mu, v)` where `v = m / gcd(a, m)` is the period
/// of the solutions and mu is normalized to [0, v). Fails if `gcd(a, m)` does not divide `b`.
fn solve_linear_congruence(a: &BigInt, b: &BigInt, m: &BigInt) -> VdfResult<(BigInt, BigInt)> {
    let output = extended_euclidean_algorithm(a, m);
    let quotient = exact_div(b, &output.gcd)?;
    let v = output.b_divided_by_gcd;
    let mu = (quotient * &output.x).mod_floor(&v);
    Ok((mu, v))
}
