// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Deterministic Miller-Rabin primality testing.
//!
//! The witnesses are the first `rounds` primes rather than random bases, so
//! the predicate is a pure function of its inputs. Discriminant generation
//! and the Fiat-Shamir hash-to-prime both depend on this: the first candidate
//! accepted by this test is part of the protocol, so two implementations must
//! agree on every accept/reject decision.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

/// All primes below 256, used both for trial division and as Miller-Rabin
/// witnesses.
const SMALL_PRIMES: [u64; 54] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

/// Miller-Rabin primality test using the first `rounds` primes as witnesses.
/// Trial division against [SMALL_PRIMES] runs first, so the result is exact
/// for all inputs below 256^2. Returns false for inputs below 2.
pub fn is_probable_prime(n: &BigUint, rounds: usize) -> bool {
    if n < &BigUint::from(2u64) {
        return false;
    }

    for prime in SMALL_PRIMES {
        let prime = BigUint::from(prime);
        if n == &prime {
            return true;
        }
        if (n % prime).is_zero() {
            return false;
        }
    }

    // n is odd and coprime to all small primes here. Write n - 1 = d * 2^s
    // with d odd.
    let one = BigUint::one();
    let n_minus_one = n - &one;
    let s = n_minus_one
        .trailing_zeros()
        .expect("n is odd and >= 3, so n - 1 is positive");
    let d = &n_minus_one >> s;

    'witnesses: for witness in SMALL_PRIMES.iter().take(rounds.min(SMALL_PRIMES.len())) {
        let mut x = BigUint::from(*witness).modpow(&d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = (&x * &x) % n;
            if x == n_minus_one {
                continue 'witnesses;
            }
        }
        return false;
    }
    true
}
