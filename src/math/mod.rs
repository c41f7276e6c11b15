// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Integer encodings and number-theoretic primitives shared by the class
//! group and the two proof systems.

pub mod bytes;
pub mod extended_gcd;
pub mod hash_prime;
pub mod prime;
