// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use kirchhoff_mig::{KirchhoffMigrator, MigrationInput, SearchStrategy};

struct Gather {
    tnum: usize,
    snum: usize,
    dist: Vec<f64>,
    zs: Vec<f64>,
    zs2: Vec<f64>,
    tt: Vec<f64>,
    grad: Vec<f64>,
}

impl Gather {
    /// Constant-velocity section, 1 m traces, 0.5 m samples.
    fn new(tnum: usize, snum: usize) -> Self {
        let vel = 1.0;
        let zs: Vec<f64> = (0..snum).map(|i| i as f64 * 0.5).collect();
        Gather {
            tnum,
            snum,
            dist: (0..tnum).map(|j| j as f64).collect(),
            zs2: zs.iter().map(|z| z * z).collect(),
            tt: zs.iter().map(|z| 2.0 * z / vel).collect(),
            zs,
            grad: (0..tnum * snum).map(|n| ((n % 17) as f64 - 8.0) * 0.1).collect(),
        }
    }

    fn input(&self) -> MigrationInput<'_> {
        MigrationInput::new(
            self.tnum, self.snum, &self.dist, &self.zs, &self.zs2, &self.tt, &self.grad,
        )
        .unwrap()
    }

    fn max_travel_time(&self) -> f64 {
        self.tt[self.snum - 1]
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Single-thread baseline: 256 traces x 256 samples.
fn bench_single_thread(c: &mut Criterion) {
    let g = Gather::new(256, 256);
    let input = g.input();
    let m = KirchhoffMigrator::new(1.0, g.max_travel_time()).unwrap();
    let mut out = vec![0.0; input.num_cells()];
    c.bench_function("256x256_1thread", |b| {
        b.iter(|| {
            m.migrate_into(&input, &mut out, None).unwrap();
            black_box(&out);
        });
    });
}

/// Seeded cursor against the exhaustive depth search.
fn bench_search_strategy(c: &mut Criterion) {
    let g = Gather::new(128, 512);
    let input = g.input();
    let mut group = c.benchmark_group("search_128x512");
    for search in [SearchStrategy::Cursor, SearchStrategy::FullScan] {
        let m = KirchhoffMigrator::new(1.0, g.max_travel_time())
            .unwrap()
            .with_search(search);
        let mut out = vec![0.0; input.num_cells()];
        group.bench_function(search.name(), |b| {
            b.iter(|| {
                m.migrate_into(&input, &mut out, None).unwrap();
                black_box(&out);
            });
        });
    }
    group.finish();
}

/// Thread scaling on 512 traces x 256 samples.
fn bench_thread_scaling(c: &mut Criterion) {
    let cpus = num_cpus();
    let g = Gather::new(512, 256);
    let input = g.input();
    let mut group = c.benchmark_group("thread_scaling_512x256");
    for &threads in &[1, 2, 4, 8] {
        if threads <= cpus {
            let m = KirchhoffMigrator::new(1.0, g.max_travel_time())
                .unwrap()
                .with_threads(threads)
                .unwrap();
            let mut out = vec![0.0; input.num_cells()];
            group.bench_function(format!("{}threads", threads), |b| {
                b.iter(|| {
                    m.migrate_into(&input, &mut out, None).unwrap();
                    black_box(&out);
                });
            });
        }
    }
    group.finish();
}

/// Aperture scaling: the cutoff bounds how far each pass walks.
fn bench_aperture(c: &mut Criterion) {
    let g = Gather::new(512, 128);
    let input = g.input();
    let mut group = c.benchmark_group("aperture_512x128");
    for &fraction in &[0.25, 0.5, 1.0] {
        let m = KirchhoffMigrator::new(1.0, fraction * g.max_travel_time()).unwrap();
        let mut out = vec![0.0; input.num_cells()];
        group.bench_function(format!("{}", fraction), |b| {
            b.iter(|| {
                m.migrate_into(&input, &mut out, None).unwrap();
                black_box(&out);
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_single_thread,
    bench_search_strategy,
    bench_thread_scaling,
    bench_aperture,
);
criterion_main!(benches);
