// SPDX-FileCopyrightText: 2026 Beacon Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Performance Benchmarks for Request Assembly and Retry Computation
//!
//! Run with: cargo bench -p beacon-core

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

// =============================================================================
// REQUEST ASSEMBLY BENCHMARKS
// =============================================================================

fn bench_request_assembly(c: &mut Criterion) {
    use beacon_core::{AuthSnapshot, Batch, RequestBuilder, RequestConfig};

    let config = RequestConfig {
        base_url: "https://in.example.com".to_string(),
        ..RequestConfig::default()
    };
    let builder = RequestBuilder::new(&config, "bench-install");
    let with_token = AuthSnapshot {
        app_secret: "bench-secret".to_string(),
        bearer_token: Some("bench-token".to_string()),
    };
    let without_token = AuthSnapshot {
        app_secret: "bench-secret".to_string(),
        bearer_token: None,
    };

    let mut group = c.benchmark_group("request_assembly");

    // Small batch (a handful of events)
    let small = Batch::new("bench-small", vec![b'x'; 1024]);
    group.throughput(Throughput::Bytes(1024));
    group.bench_function("build_small_1KB", |b| {
        b.iter(|| builder.build(black_box(&small), black_box(&without_token)))
    });

    // Medium batch (a full flush interval of events)
    let medium = Batch::new("bench-medium", vec![b'x'; 64 * 1024]);
    group.throughput(Throughput::Bytes(64 * 1024));
    group.bench_function("build_medium_64KB", |b| {
        b.iter(|| builder.build(black_box(&medium), black_box(&without_token)))
    });

    // Large batch (close to the payload ceiling)
    let large = Batch::new("bench-large", vec![b'x'; 1024 * 1024]);
    group.throughput(Throughput::Bytes(1024 * 1024));
    group.bench_function("build_large_1MB", |b| {
        b.iter(|| builder.build(black_box(&large), black_box(&without_token)))
    });

    // Token adds one formatted header
    group.throughput(Throughput::Bytes(1024));
    group.bench_function("build_small_1KB_with_token", |b| {
        b.iter(|| builder.build(black_box(&small), black_box(&with_token)))
    });

    group.finish();
}

// =============================================================================
// RETRY DELAY BENCHMARKS
// =============================================================================

fn bench_retry_delays(c: &mut Criterion) {
    use beacon_core::RetryPolicy;

    let jittered = RetryPolicy::default();
    let plain = RetryPolicy::new(10_000, 1_200_000, 5, 0);

    let mut group = c.benchmark_group("retry_delays");

    group.bench_function("delay_first_attempt", |b| {
        b.iter(|| jittered.delay_for_attempt(black_box(1)))
    });

    group.bench_function("delay_at_ceiling", |b| {
        b.iter(|| jittered.delay_for_attempt(black_box(30)))
    });

    group.bench_function("delay_without_jitter", |b| {
        b.iter(|| plain.delay_for_attempt(black_box(3)))
    });

    group.finish();
}

// =============================================================================
// BATCH ID BENCHMARKS
// =============================================================================

fn bench_batch_ids(c: &mut Criterion) {
    use beacon_core::{IdSupplier, UuidSupplier};

    let supplier = UuidSupplier;

    let mut group = c.benchmark_group("batch_ids");

    group.bench_function("generate_uuid", |b| b.iter(|| supplier.next_id()));

    group.finish();
}

// =============================================================================
// MAIN
// =============================================================================

criterion_group!(
    benches,
    bench_request_assembly,
    bench_retry_delays,
    bench_batch_ids,
);

criterion_main!(benches);
