// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This module contains an implementation of the extended Euclidean algorithm for [BigInt]`s.
//! Besides the gcd and the Bezout coefficients, it also returns the quotients of the two inputs
//! divided by the GCD since these are often used, for example in the linear congruence solver of
//! the composition algorithm, and come out for free while computing the Bezout coefficients.

use crate::error::{VdfError, VdfResult};
use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use std::mem;
use std::ops::Neg;

/// The output of the extended Euclidean algorithm on inputs `a` and `b`: The Bezout coefficients `x`
/// and `y` such that `ax + by = gcd`. The quotients `a / gcd` and `b / gcd` are also returned.
pub struct EuclideanAlgorithmOutput {
    pub gcd: BigInt,
    pub x: BigInt,
    pub y: BigInt,
    pub a_divided_by_gcd: BigInt,
    pub b_divided_by_gcd: BigInt,
}

impl EuclideanAlgorithmOutput {
    fn flip(self) -> Self {
        Self {
            gcd: self.gcd,
            x: self.y,
            y: self.x,
            a_divided_by_gcd: self.b_divided_by_gcd,
            b_divided_by_gcd: self.a_divided_by_gcd,
        }
    }
}

/// Compute the greatest common divisor gcd of a and b. The output also returns the Bezout coefficients
/// x and y such that ax + by = gcd and also the quotients a / gcd and b / gcd.
pub fn extended_euclidean_algorithm(a: &BigInt, b: &BigInt) -> EuclideanAlgorithmOutput {
    if b < a {
        return extended_euclidean_algorithm(b, a).flip();
    }

    let mut s = (BigInt::zero(), BigInt::one());
    let mut t = (BigInt::one(), BigInt::zero());
    let mut r = (a.clone(), b.clone());

    while !r.0.is_zero() {
        let (q, r_prime) = r.1.div_rem(&r.0);
        r.1 = r.0;
        r.0 = r_prime;

        mem::swap(&mut s.0, &mut s.1);
        s.0 -= &q * &s.1;

        mem::swap(&mut t.0, &mut t.1);
        t.0 -= &q * &t.1;
    }

    // The last coefficients are equal to +/- a / gcd(a,b) and b / gcd(a,b) respectively.
    let a_divided_by_gcd = set_sign(s.0, a.sign());
    let b_divided_by_gcd = set_sign(t.0, b.sign());

    if !r.1.is_negative() {
        EuclideanAlgorithmOutput {
            gcd: r.1,
            x: t.1,
            y: s.1,
            a_divided_by_gcd,
            b_divided_by_gcd,
        }
    } else {
        EuclideanAlgorithmOutput {
            gcd: r.1.neg(),
            x: t.1.neg(),
            y: s.1.neg(),
            a_divided_by_gcd,
            b_divided_by_gcd,
        }
    }
}

/// Ensure that `value` has the given sign.
fn set_sign(value: BigInt, sign: Sign) -> BigInt {
    if value.is_zero() || value.sign() == sign {
        value
    } else {
        value.neg()
    }
}

/// Return the inverse of `a` modulo `m`, or `InvalidInput` if `a` is not invertible modulo `m`.
pub fn mod_inverse(a: &BigInt, m: &BigInt) -> VdfResult<BigInt> {
    if m <= &BigInt::one() || a.is_zero() {
        return Err(VdfError::InvalidInput);
    }
    let output = extended_euclidean_algorithm(a, m);
    if !output.gcd.is_one() {
        return Err(VdfError::InvalidInput);
    }
    Ok(output.x.mod_floor(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_xgcd_single(a: BigInt, b: BigInt) {
        let output = extended_euclidean_algorithm(&a, &b);
        assert_eq!(output.gcd, a.gcd(&b));
        assert_eq!(&output.x * &a + &output.y * &b, output.gcd);
        assert_eq!(output.a_divided_by_gcd, &a / &output.gcd);
        assert_eq!(output.b_divided_by_gcd, &b / &output.gcd);
    }

    #[test]
    fn test_xgcd() {
        test_xgcd_single(BigInt::from(240), BigInt::from(46));
        test_xgcd_single(BigInt::from(-240), BigInt::from(46));
        test_xgcd_single(BigInt::from(240), BigInt::from(-46));
        test_xgcd_single(BigInt::from(-240), BigInt::from(-46));
    }

    #[test]
    fn test_mod_inverse() {
        let a = BigInt::from(7);
        let m = BigInt::from(60);
        let inverse = mod_inverse(&a, &m).unwrap();
        assert_eq!((&a * &inverse).mod_floor(&m), BigInt::one());

        // 6 and 60 are not coprime.
        assert!(mod_inverse(&BigInt::from(6), &m).is_err());
        assert!(mod_inverse(&BigInt::zero(), &m).is_err());
        assert!(mod_inverse(&a, &BigInt::one()).is_err());
    }
}
