//! Criterion benchmarks for the structured field codec.
//!
//! Run with:
//! ```bash
//! cargo bench --package ch9329-core --bench record_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ch9329_core::record::chip::{chip_parameter_layout, CHIP_PARAMETERS_SIZE};
use ch9329_core::{decode, encode};

fn factory_payload() -> Vec<u8> {
    let mut p = vec![
        0x80, 0x80, 0x00, 0x00, 0x00, 0x25, 0x80, 0x08, 0x00, 0x00, 0x03, 0x86, 0x1A, 0x29, 0xE1,
    ];
    p.resize(CHIP_PARAMETERS_SIZE, 0x00);
    p
}

/// Benchmarks decoding the 50-byte parameter record.
fn bench_decode(c: &mut Criterion) {
    let payload = factory_payload();
    let layout = chip_parameter_layout();
    c.bench_function("decode_chip_parameters", |b| {
        b.iter(|| decode(layout, black_box(&payload)).expect("decode must succeed"))
    });
}

/// Benchmarks encoding the 50-byte parameter record.
fn bench_encode(c: &mut Criterion) {
    let layout = chip_parameter_layout();
    let record = decode(layout, &factory_payload()).expect("decode must succeed for setup");
    c.bench_function("encode_chip_parameters", |b| {
        b.iter(|| encode(black_box(&record), layout).expect("encode must succeed"))
    });
}

criterion_group!(benches, bench_decode, bench_encode);
criterion_main!(benches);
