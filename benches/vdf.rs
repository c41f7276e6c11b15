// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

#[macro_use]
extern crate criterion;

use classgroup_vdf::class_group::Discriminant;
use classgroup_vdf::vdf::pietrzak::PietrzaksVDF;
use classgroup_vdf::vdf::wesolowski::WesolowskisVDF;
use classgroup_vdf::vdf::VDF;
use criterion::{BenchmarkId, Criterion};
use num_bigint::BigInt;
use rand::{thread_rng, RngCore};
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

fn sample_discriminant(c: &mut Criterion) {
    let bit_lengths = [256u64, 512, 1024];

    let mut seed = [0u8; 32];
    let mut rng = thread_rng();

    for bit_length in bit_lengths {
        c.bench_with_input(
            BenchmarkId::new("Sample class group discriminant", bit_length),
            &bit_length,
            |b, n| {
                b.iter(|| {
                    rng.fill_bytes(&mut seed);
                    Discriminant::from_seed(&seed, *n).unwrap();
                })
            },
        );
    }
}

fn wesolowski(c: &mut Criterion) {
    let discriminant = discriminant_256();
    let iterations = 1000u64;
    let vdf = WesolowskisVDF::new(256);
    let proof = vdf
        .solve_with_discriminant(iterations, &discriminant)
        .unwrap();

    c.bench_function("Wesolowski solve", |b| {
        b.iter(|| vdf.solve_with_discriminant(iterations, &discriminant))
    });
    c.bench_function("Wesolowski verify", |b| {
        b.iter(|| vdf.verify_with_discriminant(iterations, &proof, &discriminant))
    });
}

fn pietrzak(c: &mut Criterion) {
    let discriminant = discriminant_256();
    let iterations = 1024u64;
    let vdf = PietrzaksVDF::new(256);
    let proof = vdf
        .solve_with_discriminant(iterations, &discriminant)
        .unwrap();

    c.bench_function("Pietrzak solve", |b| {
        b.iter(|| vdf.solve_with_discriminant(iterations, &discriminant))
    });
    c.bench_function("Pietrzak verify", |b| {
        b.iter(|| vdf.verify_with_discriminant(iterations, &proof, &discriminant))
    });
}

criterion_group! {
    name = vdf_benchmarks;
    config = Criterion::default().sample_size(10);
    targets = sample_discriminant, wesolowski, pietrzak
}

criterion_main!(vdf_benchmarks);
