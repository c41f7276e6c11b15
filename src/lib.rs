// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Verifiable delay functions (VDFs) over class groups of imaginary quadratic fields.
//!
//! A VDF takes a challenge and a difficulty `t` and produces a proof that can only be computed by
//! performing `t` sequential squarings in a group of unknown order, yet verifies in far less time
//! than `t` squarings. This crate provides two constructions over the class group of binary
//! quadratic forms of a negative prime discriminant:
//!
//! * [`vdf::pietrzak::PietrzaksVDF`] — Pietrzak's halving protocol with O(log t) proof elements,
//! * [`vdf::wesolowski::WesolowskisVDF`] — Wesolowski's protocol with a single proof element.
//!
//! Both implement the [`vdf::VDF`] trait. The discriminant is either supplied by the caller or
//! derived deterministically from the challenge, so the entire output is a pure function of the
//! inputs.
//!
//! ```
//! use classgroup_vdf::vdf::wesolowski::WesolowskisVDF;
//! use classgroup_vdf::vdf::VDF;
//!
//! let vdf = WesolowskisVDF::new(256);
//! let proof = vdf.solve(b"challenge", 100).unwrap();
//! vdf.verify(b"challenge", 100, &proof).unwrap();
//! ```

#![warn(
    future_incompatible,
    nonstandard_style,
    rust_2018_idioms,
    rust_2021_compatibility
)]

pub mod class_group;
pub mod error;
pub mod math;
pub mod vdf;
