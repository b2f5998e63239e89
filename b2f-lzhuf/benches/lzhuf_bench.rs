//! Performance benchmarks for b2f-lzhuf
//!
//! This benchmark suite evaluates:
//! - Compression/decompression speed for the Winlink and classic windows
//! - Performance with various data patterns
//! - Throughput measurements (MB/s)

use b2f_lzhuf::{LzhufConfig, decode_lzhuf_with, encode_lzhuf_with};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

/// Type alias for pattern generator functions
type PatternGenerator = fn(usize) -> Vec<u8>;

/// Generate test data patterns for benchmarking
mod test_data {
    /// Uniform data - all bytes are the same (best compression)
    pub fn uniform(size: usize) -> Vec<u8> {
        vec![0xAA; size]
    }

    /// Random data - no patterns (worst compression)
    pub fn random(size: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(size);
        let mut seed: u64 = 0x123456789ABCDEF0;
        for _ in 0..size {
            // Linear congruential generator
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            data.push((seed >> 32) as u8);
        }
        data
    }

    /// Mail-like data - the typical B2F payload
    pub fn mail_like(size: usize) -> Vec<u8> {
        let text = b"Mid: 6Q7UVPAB1EXS\r\n\
                     Date: 2024/03/02 18:44\r\n\
                     Type: Private\r\n\
                     From: N0CALL\r\n\
                     To: W1AW\r\n\
                     Subject: Net check-in\r\n\
                     Mbo: N0CALL\r\n\
                     Body: 58\r\n\r\n\
                     Checking in from the field station, all stations nominal.\r\n";
        let mut data = Vec::with_capacity(size);
        while data.len() < size {
            let remaining = size - data.len();
            let chunk_size = remaining.min(text.len());
            data.extend_from_slice(&text[..chunk_size]);
        }
        data
    }
}

/// Standard data sizes for benchmarking
mod data_sizes {
    pub const SMALL: usize = 2 * 1024; // 2 KB
    pub const MEDIUM: usize = 16 * 1024; // 16 KB
    pub const LARGE: usize = 128 * 1024; // 128 KB
}

const CONFIGS: [(&str, LzhufConfig); 2] = [
    ("winlink_2kb", LzhufConfig::WINLINK),
    ("classic_4kb", LzhufConfig::CLASSIC),
];

/// Benchmark compression for both window sizes
fn bench_compression_windows(c: &mut Criterion) {
    let mut group = c.benchmark_group("compression_windows");
    let data = test_data::mail_like(data_sizes::MEDIUM);

    for (name, config) in CONFIGS {
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, data| {
            b.iter(|| black_box(encode_lzhuf_with(black_box(data), config)));
        });
    }

    group.finish();
}

/// Benchmark decompression for different data types
fn bench_decompression_data_types(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompression_data_types");

    let patterns: [(&str, PatternGenerator); 3] = [
        ("uniform", test_data::uniform),
        ("random", test_data::random),
        ("mail", test_data::mail_like),
    ];

    for (pattern_name, generator) in patterns {
        let original = generator(data_sizes::MEDIUM);
        let compressed = encode_lzhuf_with(&original, LzhufConfig::WINLINK);
        let size = original.len() as u32;

        group.throughput(Throughput::Bytes(original.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(pattern_name),
            &compressed,
            |b, compressed| {
                b.iter(|| {
                    let decompressed =
                        decode_lzhuf_with(black_box(compressed), size, LzhufConfig::WINLINK)
                            .unwrap();
                    black_box(decompressed);
                });
            },
        );
    }

    group.finish();
}

/// Benchmark roundtrip (compress + decompress) for different sizes
fn bench_roundtrip_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("roundtrip_sizes");

    let sizes = [
        ("2KB", data_sizes::SMALL),
        ("16KB", data_sizes::MEDIUM),
        ("128KB", data_sizes::LARGE),
    ];

    for (size_name, size) in sizes {
        let data = test_data::mail_like(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size_name), &data, |b, data| {
            b.iter(|| {
                let compressed = encode_lzhuf_with(black_box(data), LzhufConfig::WINLINK);
                let decompressed =
                    decode_lzhuf_with(&compressed, data.len() as u32, LzhufConfig::WINLINK)
                        .unwrap();
                black_box(decompressed);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_compression_windows,
    bench_decompression_data_types,
    bench_roundtrip_sizes
);
criterion_main!(benches);
