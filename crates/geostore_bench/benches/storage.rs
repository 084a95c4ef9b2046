//! Memory backend benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use geostore_storage::{MemoryKind, DEFAULT_SEGMENT_SIZE};
use tempfile::TempDir;

const KINDS: [MemoryKind; 4] = [
    MemoryKind::OnHeap,
    MemoryKind::OffHeap,
    MemoryKind::MappedFile,
    MemoryKind::MappedDirectory,
];

/// Benchmark allocating fresh segments.
fn bench_allocate(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment_allocate");
    group.sample_size(20);
    group.throughput(Throughput::Bytes(16 * DEFAULT_SEGMENT_SIZE as u64));

    for kind in KINDS {
        group.bench_with_input(BenchmarkId::from_parameter(format!("{kind:?}")), &kind, |b, &kind| {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("bench");

            b.iter(|| {
                let memory = kind.open(&path, DEFAULT_SEGMENT_SIZE).unwrap();
                for index in 0..16 {
                    black_box(memory.segment(index).unwrap());
                }
                memory.clean().unwrap();
            });
        });
    }

    group.finish();
}

/// Benchmark writing through an allocated segment.
fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment_write");

    for size in [64, 1024, 4096].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        for kind in KINDS {
            let id = BenchmarkId::new(format!("{kind:?}"), size);
            group.bench_with_input(id, size, |b, &size| {
                let temp_dir = TempDir::new().unwrap();
                let memory = kind.open(&temp_dir.path().join("bench"), DEFAULT_SEGMENT_SIZE).unwrap();
                let segment = memory.segment(0).unwrap();
                let data: Vec<u8> = (0..size).map(|i| (i % 256) as u8).collect();

                b.iter(|| {
                    segment
                        .write(|buf| buf[..size].copy_from_slice(black_box(&data)))
                        .unwrap();
                });
            });
        }
    }

    group.finish();
}

/// Benchmark reading through an allocated segment.
fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment_read");

    for kind in KINDS {
        group.bench_with_input(BenchmarkId::from_parameter(format!("{kind:?}")), &kind, |b, &kind| {
            let temp_dir = TempDir::new().unwrap();
            let memory = kind.open(&temp_dir.path().join("bench"), DEFAULT_SEGMENT_SIZE).unwrap();
            let segment = memory.segment(0).unwrap();

            b.iter(|| {
                let sum = segment
                    .read(|buf| buf[..4096].iter().map(|b| u64::from(*b)).sum::<u64>())
                    .unwrap();
                black_box(sum);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_allocate, bench_write, bench_read);
criterion_main!(benches);
