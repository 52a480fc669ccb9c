// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::f64::consts::PI;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use ndarray::Array2;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::{MigrationError, Result};
use crate::input::MigrationInput;
use crate::progress::{ProgressSink, Reporter};
use crate::search::{nearest_travel_time, SearchStrategy};

/// One contribution to an output cell: the input sample at
/// (`sample`, `trace`) enters the sum scaled by `weight`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tap {
    /// Input trace index.
    pub trace: usize,
    /// Matched depth sample index.
    pub sample: usize,
    /// Obliquity factor divided by velocity, `(z / r) / v`.
    pub weight: f64,
}

/// Kirchhoff diffraction-summation migration.
///
/// For every output cell (sample `i`, trace `j`) the migrator walks the
/// diffraction hyperbola through that point, first to the right of `j` and
/// then from `j` leftwards. Each pass stops at the first trace whose two-way
/// time `2 r / v` exceeds the maximum travel time; every trace before that
/// contributes its gradient sample at the depth whose reference travel time
/// best matches `2 r / v`, weighted by the obliquity `z / r` and `1 / v`.
/// The sum is normalised by `2 pi`.
///
/// The default run is single-threaded. With more than one thread, trace
/// columns are distributed over a rayon pool; each column is still computed
/// sequentially, so the image is identical to the serial one.
#[derive(Debug, Clone)]
pub struct KirchhoffMigrator {
    velocity: f64,
    max_travel_time: f64,
    search: SearchStrategy,
    num_threads: usize,
    nearfield: bool,
}

impl KirchhoffMigrator {
    /// Create a migrator for a constant propagation velocity.
    ///
    /// # Parameters
    /// - `velocity`: Propagation velocity (must be positive and finite)
    /// - `max_travel_time`: Aperture cutoff on the two-way time. Zero or
    ///   negative values are legal and produce an all-zero image.
    ///
    /// # Errors
    /// Returns an error if the velocity is invalid or the cutoff is NaN.
    pub fn new(velocity: f64, max_travel_time: f64) -> Result<Self> {
        if !velocity.is_finite() || velocity <= 0.0 {
            return Err(MigrationError::InvalidVelocity(velocity));
        }
        if max_travel_time.is_nan() {
            return Err(MigrationError::InvalidMaxTravelTime(max_travel_time));
        }
        Ok(KirchhoffMigrator {
            velocity,
            max_travel_time,
            search: SearchStrategy::default(),
            num_threads: 1,
            nearfield: false,
        })
    }

    /// Select the depth search strategy (builder method). Default is
    /// [`SearchStrategy::Cursor`].
    pub fn with_search(mut self, search: SearchStrategy) -> Self {
        self.search = search;
        self
    }

    /// Set the number of worker threads (builder method). Default is 1.
    ///
    /// # Errors
    /// Returns an error if `threads` is zero.
    pub fn with_threads(mut self, threads: usize) -> Result<Self> {
        if threads == 0 {
            return Err(MigrationError::InvalidThreadCount(threads));
        }
        self.num_threads = threads;
        Ok(self)
    }

    /// Near-field flag (builder method). Reserved for a near-field
    /// correction; it is recorded but does not change the result.
    pub fn with_nearfield(mut self, nearfield: bool) -> Self {
        self.nearfield = nearfield;
        self
    }

    /// Propagation velocity.
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Aperture cutoff on the two-way time.
    pub fn max_travel_time(&self) -> f64 {
        self.max_travel_time
    }

    /// Depth search strategy.
    pub fn search(&self) -> SearchStrategy {
        self.search
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.num_threads
    }

    /// Near-field flag.
    pub fn nearfield(&self) -> bool {
        self.nearfield
    }

    /// Migrate `input` into a caller-owned buffer.
    ///
    /// `out` must hold `snum * tnum` values; it is laid out like the gradient,
    /// depth-major and trace-minor, and every element is overwritten.
    ///
    /// # Errors
    /// Returns an error if `out` has the wrong length or the thread pool
    /// cannot be built. Nothing is written in that case.
    pub fn migrate_into(
        &self,
        input: &MigrationInput<'_>,
        out: &mut [f64],
        progress: Option<&mut dyn ProgressSink>,
    ) -> Result<()> {
        if out.len() != input.num_cells() {
            return Err(MigrationError::LengthMismatch {
                name: "migdata",
                expected: input.num_cells(),
                got: out.len(),
            });
        }

        info!(
            traces = input.tnum(),
            samples = input.snum(),
            velocity = self.velocity,
            max_travel_time = self.max_travel_time,
            search = %self.search,
            threads = self.num_threads,
            "starting Kirchhoff migration"
        );
        if self.nearfield {
            debug!("near-field flag set; no near-field correction is applied");
        }

        let elapsed = if self.num_threads > 1 {
            self.run_parallel(input, out, progress)?
        } else {
            let mut reporter = Reporter::start(progress, input.tnum(), input.snum());
            self.run_serial(input, out, &mut reporter);
            reporter.finish()
        };

        info!(
            elapsed_s = elapsed.as_secs_f64(),
            "Kirchhoff migration complete"
        );
        Ok(())
    }

    /// Migrate `input` into a newly allocated `snum x tnum` image.
    ///
    /// # Errors
    /// See [`migrate_into`](Self::migrate_into).
    pub fn migrate(
        &self,
        input: &MigrationInput<'_>,
        progress: Option<&mut dyn ProgressSink>,
    ) -> Result<Array2<f64>> {
        let mut buf = vec![0.0; input.num_cells()];
        self.migrate_into(input, &mut buf, progress)?;
        Array2::from_shape_vec((input.snum(), input.tnum()), buf)
            .map_err(|e| MigrationError::Other(format!("shape error: {}", e)))
    }

    /// Migrated amplitude of a single cell.
    ///
    /// # Panics
    /// Panics if `sample` or `trace` is out of range.
    pub fn migrate_point(&self, input: &MigrationInput<'_>, sample: usize, trace: usize) -> f64 {
        let mut integral = 0.0;
        self.walk_hyperbola(input, sample, trace, |k, l, costheta| {
            integral += input.grad_at(l, k) * costheta / self.velocity;
        });
        integral / (2.0 * PI)
    }

    /// Every contribution the cell (`sample`, `trace`) accumulates, right
    /// pass first, then the left pass from `trace` outwards.
    ///
    /// # Panics
    /// Panics if `sample` or `trace` is out of range.
    pub fn hyperbola_taps(&self, input: &MigrationInput<'_>, sample: usize, trace: usize) -> Vec<Tap> {
        let mut taps = Vec::new();
        self.walk_hyperbola(input, sample, trace, |k, l, costheta| {
            taps.push(Tap {
                trace: k,
                sample: l,
                weight: costheta / self.velocity,
            });
        });
        taps
    }

    fn run_serial(&self, input: &MigrationInput<'_>, out: &mut [f64], reporter: &mut Reporter<'_>) {
        let tnum = input.tnum();
        for j in 0..tnum {
            for i in 0..input.snum() {
                out[i * tnum + j] = self.migrate_point(input, i, j);
            }
            reporter.trace_done(j);
        }
    }

    fn run_parallel(
        &self,
        input: &MigrationInput<'_>,
        out: &mut [f64],
        progress: Option<&mut dyn ProgressSink>,
    ) -> Result<std::time::Duration> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.num_threads)
            .build()
            .map_err(|e| MigrationError::Other(e.to_string()))?;

        let tnum = input.tnum();
        let snum = input.snum();
        let reporter = Mutex::new(Reporter::start(progress, tnum, snum));
        let completed = AtomicUsize::new(0);

        // Trace-major scratch so each worker owns a contiguous column.
        let mut columns = vec![0.0; snum * tnum];
        pool.install(|| {
            columns
                .par_chunks_mut(snum)
                .enumerate()
                .for_each(|(j, column)| {
                    for (i, cell) in column.iter_mut().enumerate() {
                        *cell = self.migrate_point(input, i, j);
                    }
                    let ordinal = completed.fetch_add(1, Ordering::AcqRel);
                    if let Ok(mut reporter) = reporter.lock() {
                        reporter.trace_done(ordinal);
                    }
                });
        });

        for (j, column) in columns.chunks(snum).enumerate() {
            for (i, &value) in column.iter().enumerate() {
                out[i * tnum + j] = value;
            }
        }

        let reporter = reporter
            .into_inner()
            .map_err(|_| MigrationError::Other("progress reporter poisoned".to_string()))?;
        Ok(reporter.finish())
    }

    /// Visit every (trace, depth sample, obliquity) triple on the hyperbola
    /// through (`sample`, `trace`).
    #[inline]
    fn walk_hyperbola<F>(&self, input: &MigrationInput<'_>, sample: usize, trace: usize, mut visit: F)
    where
        F: FnMut(usize, usize, f64),
    {
        self.sweep(input, sample, trace, trace + 1..input.tnum(), &mut visit);
        self.sweep(input, sample, trace, (0..=trace).rev(), &mut visit);
    }

    /// One directional pass. Trace distance from `trace` must grow along
    /// `traces`, which holds for non-decreasing `dist`.
    #[inline]
    fn sweep<I, F>(&self, input: &MigrationInput<'_>, sample: usize, trace: usize, traces: I, visit: &mut F)
    where
        I: Iterator<Item = usize>,
        F: FnMut(usize, usize, f64),
    {
        let dist = input.dist();
        let tt_sec = input.tt_sec();
        let z = input.zs()[sample];
        let z2 = input.zs2()[sample];
        let x0 = dist[trace];

        let mut cursor = sample;
        for k in traces {
            let dx = dist[k] - x0;
            let r = (dx * dx + z2).sqrt();
            let two_way = 2.0 * r / self.velocity;
            if two_way > self.max_travel_time {
                break;
            }
            let start = self.search.scan_start(cursor);
            let l = nearest_travel_time(tt_sec, start, two_way);
            cursor = l;
            // Zero radius only occurs directly below a zero-depth point;
            // take the vertical-incidence limit.
            let costheta = if r > 0.0 { z / r } else { 1.0 };
            visit(k, l, costheta);
        }
    }
}
