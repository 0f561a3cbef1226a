//! Criterion benchmarks for the sdrflow ingress → scheduler → snapshot path
//!
//! Run with: cargo bench -p sdrflow-runtime
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sdrflow_analysis::signal::iq_tone;
use sdrflow_runtime::{Flowgraph, FlowgraphConfig};

const WINDOWS: usize = 16;

fn bench_pipeline(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let mut group = c.benchmark_group("pipeline");

    for &fft_size in &[256usize, 2048] {
        let chunk = iq_tone(4e6, 250e3, 0.7, fft_size);
        group.throughput(Throughput::Elements((fft_size * WINDOWS) as u64));
        group.bench_with_input(BenchmarkId::new("windows", fft_size), &chunk, |b, chunk| {
            b.iter(|| {
                rt.block_on(async {
                    let mut config = FlowgraphConfig::default();
                    config.transform.fft_size = fft_size;
                    config.buffer_capacity = chunk.len() * WINDOWS;
                    let (fg, mut gate, handle) = Flowgraph::new(config).unwrap();
                    let task = tokio::spawn(fg.run());
                    for _ in 0..WINDOWS {
                        assert!(gate.push(chunk).await.unwrap());
                    }
                    handle.wait_for_generation(WINDOWS as u64).await;
                    handle.stop();
                    task.await.unwrap()
                })
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
