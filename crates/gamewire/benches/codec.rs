// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec Throughput Benchmark
//!
//! Measures varint round trips and whole-packet decode/encode on the
//! builtin movement layout. Mutation sweeps push millions of packets
//! through these paths, so they dominate fuzzing throughput.

#![allow(clippy::uninlined_format_args)]

use criterion::{criterion_group, criterion_main, Criterion};
use gamewire::codec::{varint, Cursor, FieldValue};
use gamewire::fuzzing::{self, MutationKind};
use gamewire::packet::{self, field};
use gamewire::schema::Registry;
use std::hint::black_box as bb;

fn movement_values() -> Vec<(String, FieldValue)> {
    vec![
        field("playerID", FieldValue::Identifier16([0xAB; 16])),
        field("position", FieldValue::Vector3f([100.0, 64.0, 100.0])),
        field("velocity", FieldValue::Vector3f([0.0, 0.0, 0.0])),
        field("yaw", FieldValue::F32(180.0)),
        field("pitch", FieldValue::F32(0.0)),
        field("flags", FieldValue::U8(0x02)),
        field("tick", FieldValue::U32(1000)),
    ]
}

fn bench_varint(c: &mut Criterion) {
    let mut group = c.benchmark_group("varint");

    group.bench_function("encode_u32_max", |b| {
        b.iter(|| varint::encode(bb(0xFFFF_FFFFu64)));
    });

    let encoded = varint::encode(0xFFFF_FFFF);
    group.bench_function("decode_u32_max", |b| {
        b.iter(|| {
            let mut cursor = Cursor::new(bb(&encoded));
            varint::decode(&mut cursor)
        });
    });

    group.finish();
}

fn bench_packet(c: &mut Criterion) {
    let mut group = c.benchmark_group("packet");
    let registry = Registry::builtin();
    let values = movement_values();
    let raw = packet::encode(&registry, 0x01, &values).expect("encode movement");

    group.bench_function("encode_movement", |b| {
        b.iter(|| packet::encode(bb(&registry), 0x01, bb(&values)));
    });

    group.bench_function("decode_movement", |b| {
        b.iter(|| packet::decode(bb(&registry), bb(&raw)));
    });

    group.finish();
}

fn bench_mutation_sweep(c: &mut Criterion) {
    let registry = Registry::builtin();
    let base = movement_values();

    c.bench_function("fuzz_movement_all_kinds", |b| {
        b.iter(|| {
            fuzzing::fuzz(bb(&registry), 0x01, bb(&base), &MutationKind::ALL)
                .expect("known packet")
                .count()
        });
    });
}

criterion_group!(benches, bench_varint, bench_packet, bench_mutation_sweep);
criterion_main!(benches);
