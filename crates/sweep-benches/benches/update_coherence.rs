// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! Benchmark: incremental update cost under temporal coherence.
//!
//! A square grid of boxes (one-unit gaps) is translated by (+1, +1) in one
//! tick, which makes every box touch and clear its neighbors — the worst
//! coherent case: maximal event traffic with minimal displacement. Setup
//! (grid construction) is excluded from timing via `iter_batched`.
//!
//! Throughput "elements" are proxy updates (`side²`).
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use std::time::Duration;
use sweep_core::{Aabb, CollisionFilter, ProxyId, SweepPrune};

const BOX_SIZE: i32 = 10;
const PITCH: i32 = 11;

fn build_grid(side: i32) -> (SweepPrune, Vec<(ProxyId, i32, i32)>) {
    let n = usize::try_from(side * side).expect("grid fits usize");
    let mut sap = SweepPrune::with_capacity(n, 8 * n);
    let mut ids = Vec::with_capacity(n);
    for row in 0..side {
        for col in 0..side {
            let x = col * PITCH;
            let y = row * PITCH;
            let id = sap
                .add(
                    Aabb::new(x, y, BOX_SIZE, BOX_SIZE),
                    CollisionFilter::default(),
                    true,
                )
                .expect("capacity sized for the grid")
                .expect("default filter is live");
            ids.push((id, x, y));
        }
    }
    (sap, ids)
}

fn bench_coherent_translate(c: &mut Criterion) {
    let mut group = c.benchmark_group("coherent_translate");
    group
        .warm_up_time(Duration::from_secs(2))
        .measurement_time(Duration::from_secs(8))
        .sample_size(60);
    for &side in &[8_i32, 16, 32, 64] {
        let n = u64::try_from(side * side).expect("grid fits u64");
        group.throughput(Throughput::Elements(n));
        group.bench_with_input(BenchmarkId::from_parameter(n), &side, |b, &side| {
            b.iter_batched(
                || build_grid(side),
                |(mut sap, ids)| {
                    for &(id, x, y) in &ids {
                        sap.update(id, Aabb::new(x + 1, y + 1, BOX_SIZE, BOX_SIZE))
                            .expect("registered");
                    }
                    sap
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_membership_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("membership_churn");
    group
        .warm_up_time(Duration::from_secs(2))
        .measurement_time(Duration::from_secs(8))
        .sample_size(60);
    for &side in &[8_i32, 16, 32] {
        let n = u64::try_from(side * side).expect("grid fits u64");
        group.throughput(Throughput::Elements(n));
        group.bench_with_input(BenchmarkId::from_parameter(n), &side, |b, &side| {
            b.iter_batched(
                || build_grid(side),
                |(mut sap, ids)| {
                    // Remove every box (highest id first, no swap path),
                    // then repopulate the same grid.
                    for &(id, _, _) in ids.iter().rev() {
                        sap.remove(id).expect("registered");
                    }
                    for &(_, x, y) in &ids {
                        let _ = sap
                            .add(
                                Aabb::new(x, y, BOX_SIZE, BOX_SIZE),
                                CollisionFilter::default(),
                                true,
                            )
                            .expect("capacity sized for the grid");
                    }
                    sap
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_coherent_translate, bench_membership_churn);
criterion_main!(benches);
