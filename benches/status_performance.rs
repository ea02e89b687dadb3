// benches/status_performance.rs
//! Benchmarks for the labeler, the failure bridge and the failure log.
//!
//! The success path of the bridge sits on every native call, so it should
//! cost no more than the sign test. Failure-path costs are measured for
//! reference.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dx_status::{check, check_status, definitions, FailureLog, ResultExt, StatusCode};

// ============================================================================
// Labeler
// ============================================================================

fn bench_label(c: &mut Criterion) {
    let mut group = c.benchmark_group("label");

    group.bench_function("known", |b| {
        b.iter(|| black_box(definitions::label(black_box(definitions::DXGI_ERROR_DEVICE_REMOVED))))
    });

    group.bench_function("unknown", |b| {
        b.iter(|| black_box(definitions::label(black_box(StatusCode::from_bits(0x8BAD_F00D)))))
    });

    group.bench_function("lookup_by_name", |b| {
        b.iter(|| black_box(definitions::lookup(black_box("D3D12_ERROR_DRIVER_VERSION_MISMATCH"))))
    });

    group.finish();
}

// ============================================================================
// Failure Bridge
// ============================================================================

fn bench_check_success(c: &mut Criterion) {
    let mut group = c.benchmark_group("check_success");

    group.bench_function("function", |b| {
        b.iter(|| black_box(check(black_box(definitions::S_OK))).is_ok())
    });

    group.bench_function("macro", |b| {
        b.iter(|| black_box(check_status!(black_box(definitions::S_FALSE))).is_ok())
    });

    group.finish();
}

fn bench_check_failure(c: &mut Criterion) {
    let mut group = c.benchmark_group("check_failure");

    group.bench_function("raise_only", |b| {
        b.iter(|| black_box(check(black_box(definitions::E_INVALIDARG))))
    });

    group.bench_function("raise_with_context", |b| {
        b.iter(|| {
            black_box(
                check(black_box(definitions::E_OUTOFMEMORY))
                    .context("create_buffer")
                    .with_metadata("size", "4096"),
            )
        })
    });

    group.finish();
}

fn bench_message(c: &mut Criterion) {
    let mut group = c.benchmark_group("message");

    group.bench_function("first_format", |b| {
        b.iter(|| {
            let err = check(black_box(definitions::DXGI_ERROR_DEVICE_HUNG)).unwrap_err();
            black_box(err.message().len())
        })
    });

    let err = check(definitions::DXGI_ERROR_DEVICE_HUNG).unwrap_err();
    let _ = err.message();
    group.bench_function("memoized", |b| b.iter(|| black_box(err.message().len())));

    group.bench_function("structured_log", |b| {
        let mut out = String::with_capacity(256);
        b.iter(|| {
            out.clear();
            err.log().write_to(&mut out).unwrap();
            black_box(out.len())
        })
    });

    group.finish();
}

// ============================================================================
// Failure Log
// ============================================================================

fn bench_failure_log(c: &mut Criterion) {
    let mut group = c.benchmark_group("failure_log");

    for capacity in [16usize, 256, 4096] {
        group.bench_with_input(BenchmarkId::new("record", capacity), &capacity, |b, &capacity| {
            let log = FailureLog::new(capacity, 1024);
            let err = check(definitions::E_FAIL)
                .context("synchronize")
                .unwrap_err();
            b.iter(|| log.record(black_box(&err), "context"))
        });
    }

    let log = FailureLog::new(256, 1024);
    let err = check(definitions::E_FAIL).unwrap_err();
    for _ in 0..256 {
        log.record(&err, "device");
    }
    group.bench_function("get_recent_10", |b| b.iter(|| black_box(log.get_recent(10))));

    group.finish();
}

criterion_group!(
    benches,
    bench_label,
    bench_check_success,
    bench_check_failure,
    bench_message,
    bench_failure_log
);
criterion_main!(benches);
