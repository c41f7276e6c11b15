// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Fixed-width two's-complement encoding of signed big integers. This is the
//! wire format for the coordinates of a quadratic form: big-endian,
//! right-aligned, with the upper fill bytes taken from the sign.

use crate::error::{VdfError, VdfResult};
use num_bigint::BigInt;
use num_traits::Signed;

/// Interpret `bytes` as a two's-complement big-endian signed integer. The
/// high bit of the first byte carries the sign. An empty slice denotes zero.
pub fn bytes_to_int(bytes: &[u8]) -> BigInt {
    BigInt::from_signed_bytes_be(bytes)
}

/// Write `value` right-aligned into `width` bytes in two's-complement
/// big-endian, filling unused upper bytes with `0xff` for negative values and
/// `0x00` otherwise. Returns `InputTooLong` if the minimal encoding of
/// `value` does not fit in `width` bytes. Round-trips exactly with
/// [`bytes_to_int`] for any value representable in `width` bytes.
pub fn int_to_bytes(value: &BigInt, width: usize) -> VdfResult<Vec<u8>> {
    let bytes = value.to_signed_bytes_be();
    if bytes.len() > width {
        return Err(VdfError::InputTooLong(bytes.len()));
    }
    let fill = if value.is_negative() { 0xff } else { 0x00 };
    let mut output = vec![fill; width - bytes.len()];
    output.extend_from_slice(&bytes);
    Ok(output)
}

/// The 8-byte big-endian encoding of `value`, used as the counter encoding in
/// the Fiat-Shamir hash-to-prime iteration.
pub fn u64_to_bytes(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}
