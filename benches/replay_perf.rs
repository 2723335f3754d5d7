//! Criterion benchmarks for patch derivation and replay.

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use sf::engine::patch;

fn synthetic_file(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("line {i}: some representative source text\n"))
        .collect()
}

fn bench_replay_edit(c: &mut Criterion) {
    let base = synthetic_file(500);
    let post = format!("{base}appended by skill\n");
    let current = format!("prepended by earlier skill\n{base}");

    let mut group = c.benchmark_group("replay_edit");
    group.throughput(Throughput::Bytes(base.len() as u64));

    group.bench_function("clean_apply", |b| {
        b.iter(|| patch::replay_edit(black_box(&base), black_box(&base), black_box(&post)));
    });

    group.bench_function("three_way_fallback", |b| {
        b.iter(|| patch::replay_edit(black_box(&base), black_box(&current), black_box(&post)));
    });

    group.finish();
}

fn bench_derive(c: &mut Criterion) {
    let base = synthetic_file(500);
    let post = format!("{base}appended by skill\n");

    c.bench_function("derive_patch_500_lines", |b| {
        b.iter(|| patch::derive(black_box(&base), black_box(&post)));
    });
}

criterion_group!(benches, bench_replay_edit, bench_derive);
criterion_main!(benches);
