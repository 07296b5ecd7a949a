//! Benchmarks for sidecar loading and positional lookup.
//!
//! Run with: cargo bench
//!
//! This benchmark suite measures:
//! - Load throughput for different sidecar sizes
//! - Effect of the capacity hint on load time
//! - Positional accessor latency

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sidecar_index::{LoadConfig, SidecarIndex};
use std::fs;
use std::path::PathBuf;

/// Write a sidecar with `count` realistic lines and return its path.
fn generate_sidecar(dir: &tempfile::TempDir, count: usize) -> PathBuf {
    let path = dir.path().join(format!("bench-{}.index", count));
    let mut contents = String::with_capacity(count * 32);
    let mut offset: u64 = 0;
    for i in 0..count {
        let length = 200 + (i % 1800) as u32;
        contents.push_str(&format!("AF-{:08}-F1\t{}\t{}\n", i, offset, length));
        offset += length as u64;
    }
    fs::write(&path, contents).unwrap();
    path
}

/// Benchmark load throughput across sidecar sizes.
fn bench_load(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let mut group = c.benchmark_group("load");
    group.sample_size(20);

    for count in [10_000usize, 100_000, 1_000_000] {
        let path = generate_sidecar(&dir, count);
        let bytes = fs::metadata(&path).unwrap().len();
        group.throughput(Throughput::Bytes(bytes));
        group.bench_with_input(BenchmarkId::from_parameter(count), &path, |b, path| {
            b.iter(|| {
                let index = SidecarIndex::load(black_box(path)).unwrap();
                black_box(index.len())
            });
        });
    }

    group.finish();
}

/// Compare the default capacity hint with a hint that always undershoots.
fn bench_capacity_hint(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let path = generate_sidecar(&dir, 500_000);
    let mut group = c.benchmark_group("capacity_hint");
    group.sample_size(20);

    let configs = [
        ("default", LoadConfig::default()),
        ("undershoot", LoadConfig::default().with_average_line_bytes(4096)),
    ];
    for (name, config) in configs {
        group.bench_function(name, |b| {
            b.iter(|| {
                let index = SidecarIndex::load_with_config(&path, config.clone()).unwrap();
                black_box(index.len())
            });
        });
    }

    group.finish();
}

/// Benchmark positional accessors on a loaded index.
fn bench_lookup(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let path = generate_sidecar(&dir, 100_000);
    let index = SidecarIndex::load(&path).unwrap();

    c.bench_function("record_at", |b| {
        let mut i = 0usize;
        b.iter(|| {
            i = (i + 7919) % index.len();
            black_box(index.record_at(black_box(i)).unwrap())
        });
    });
}

criterion_group!(benches, bench_load, bench_capacity_hint, bench_lookup);
criterion_main!(benches);
