//! Criterion benchmarks for sdrflow-core streaming primitives
//!
//! Run with: cargo bench -p sdrflow-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sdrflow_core::{SampleBuffer, SnapshotStore};

const CHUNK_SIZES: &[usize] = &[256, 1024, 4096, 16384];

fn bench_sample_ring(c: &mut Criterion) {
    let mut group = c.benchmark_group("SampleBuffer");

    for &chunk in CHUNK_SIZES {
        let input: Vec<i8> = (0..chunk).map(|i| (i % 256) as i8).collect();

        group.bench_with_input(
            BenchmarkId::new("write_read", chunk),
            &chunk,
            |b, &chunk| {
                let (mut writer, mut reader) = SampleBuffer::with_capacity(chunk * 2);
                let mut window = vec![0i8; chunk];
                b.iter(|| {
                    writer.try_write(black_box(&input)).unwrap();
                    black_box(reader.read_window(&mut window));
                });
            },
        );
    }

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("SnapshotStore");
    let (store, mut publisher) = SnapshotStore::new();

    group.bench_function("publish_2048", |b| {
        b.iter(|| black_box(publisher.publish(vec![0.0; 2048])));
    });

    group.bench_function("read", |b| {
        b.iter(|| black_box(store.read()));
    });

    group.finish();
}

criterion_group!(benches, bench_sample_ring, bench_snapshot);
criterion_main!(benches);
