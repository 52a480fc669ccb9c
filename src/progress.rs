// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::io::Write;
use std::time::{Duration, Instant};

/// Progress events emitted while a migration runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Emitted once before the first trace.
    Started {
        /// Number of traces to migrate.
        traces: usize,
        /// Number of depth samples per trace.
        samples: usize,
    },
    /// Every tenth trace that is not a checkpoint.
    Tick {
        /// Trace index (or completion ordinal in parallel runs).
        trace: usize,
    },
    /// Every hundredth trace after the first.
    Checkpoint {
        /// Trace index (or completion ordinal in parallel runs).
        trace: usize,
        /// Wall time since the run started.
        elapsed: Duration,
        /// Linear extrapolation of the time left.
        remaining: Duration,
    },
    /// Emitted once after the last trace.
    Finished {
        /// Total wall time.
        elapsed: Duration,
    },
}

/// Receiver for progress events.
///
/// Sinks are purely observational; they cannot influence the migration and
/// have no way to report failure back to it. Any `FnMut(&ProgressEvent)`
/// closure is a sink.
pub trait ProgressSink: Send {
    /// Handle one event.
    fn report(&mut self, event: &ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: FnMut(&ProgressEvent) + Send,
{
    fn report(&mut self, event: &ProgressEvent) {
        self(event)
    }
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn report(&mut self, _event: &ProgressEvent) {}
}

/// Sink that writes the classic terminal progress text: a start notice, a dot
/// every ten traces, a status line with a remaining-time estimate every hundred,
/// and a trailing newline.
///
/// Output is flushed after every event. Write errors are ignored.
pub struct TextProgress<W: Write + Send> {
    out: W,
}

impl TextProgress<std::io::Stdout> {
    /// Text progress on standard output.
    pub fn stdout() -> Self {
        TextProgress {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write + Send> TextProgress<W> {
    /// Text progress on an arbitrary writer.
    pub fn new(out: W) -> Self {
        TextProgress { out }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> ProgressSink for TextProgress<W> {
    fn report(&mut self, event: &ProgressEvent) {
        let _ = match event {
            ProgressEvent::Started { .. } => write!(self.out, "Beginning migration"),
            ProgressEvent::Tick { .. } => write!(self.out, "."),
            ProgressEvent::Checkpoint {
                trace,
                elapsed,
                remaining,
            } => write!(
                self.out,
                "trace {} ({:.2} sec elapsed)\nEst. time remaining: {:4.2} sec",
                trace,
                elapsed.as_secs_f64(),
                remaining.as_secs_f64()
            ),
            ProgressEvent::Finished { .. } => writeln!(self.out),
        };
        let _ = self.out.flush();
    }
}

/// Remaining-time estimate after `done` of `total` traces took `elapsed`:
/// `(total - done) * elapsed / done`. Zero when nothing is done yet.
pub fn estimate_remaining(total: usize, done: usize, elapsed: Duration) -> Duration {
    if done == 0 || done >= total {
        return Duration::ZERO;
    }
    elapsed.mul_f64((total - done) as f64 / done as f64)
}

/// Drives a sink through one migration run.
pub(crate) struct Reporter<'s> {
    sink: Option<&'s mut dyn ProgressSink>,
    traces: usize,
    start: Instant,
}

impl<'s> Reporter<'s> {
    /// Start the clock and emit `Started`.
    pub(crate) fn start(
        sink: Option<&'s mut dyn ProgressSink>,
        traces: usize,
        samples: usize,
    ) -> Self {
        let mut reporter = Reporter {
            sink,
            traces,
            start: Instant::now(),
        };
        reporter.emit(ProgressEvent::Started { traces, samples });
        reporter
    }

    /// Called once a trace column is complete.
    pub(crate) fn trace_done(&mut self, trace: usize) {
        if self.sink.is_none() {
            return;
        }
        if trace % 100 == 0 {
            if trace > 0 {
                let elapsed = self.start.elapsed();
                let remaining = estimate_remaining(self.traces, trace, elapsed);
                self.emit(ProgressEvent::Checkpoint {
                    trace,
                    elapsed,
                    remaining,
                });
            }
        } else if trace % 10 == 0 {
            self.emit(ProgressEvent::Tick { trace });
        }
    }

    /// Emit `Finished` and return the total elapsed time.
    pub(crate) fn finish(mut self) -> Duration {
        let elapsed = self.start.elapsed();
        self.emit(ProgressEvent::Finished { elapsed });
        elapsed
    }

    fn emit(&mut self, event: ProgressEvent) {
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.report(&event);
        }
    }
}
