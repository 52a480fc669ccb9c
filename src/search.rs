// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use crate::error::MigrationError;

/// How the depth-sample search is seeded for each trace along the hyperbola.
///
/// `Cursor` starts each search at the index matched for the previous trace of
/// the same pass (or at the output sample index for the first trace), so the
/// search never moves shallower than where it started. `FullScan` searches
/// the whole travel-time table every time and is the slower baseline.
///
/// The two differ whenever the best match lies above the seed; `Cursor`
/// reproduces the reference numerics and is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStrategy {
    /// Seeded, forward-only search.
    #[default]
    Cursor,
    /// Unseeded search over all depth samples.
    FullScan,
}

impl SearchStrategy {
    /// First depth index to examine given the current cursor.
    #[inline]
    pub fn scan_start(self, cursor: usize) -> usize {
        match self {
            SearchStrategy::Cursor => cursor,
            SearchStrategy::FullScan => 0,
        }
    }

    /// Short lower-case name, as accepted by `from_str`.
    pub fn name(self) -> &'static str {
        match self {
            SearchStrategy::Cursor => "cursor",
            SearchStrategy::FullScan => "full",
        }
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SearchStrategy {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cursor" | "seeded" => Ok(SearchStrategy::Cursor),
            "full" | "full-scan" | "fullscan" => Ok(SearchStrategy::FullScan),
            other => Err(MigrationError::Other(format!(
                "unknown search strategy '{}': expected 'cursor' or 'full'",
                other
            ))),
        }
    }
}

/// Find the depth index in `tt_sec[start..]` whose travel time is closest to
/// `target`. The first index reaching the minimum wins.
///
/// `start` must lie inside `tt_sec`, so there is always a candidate. The
/// table must be non-decreasing: the scan stops as soon as it has moved past
/// `target` by at least the best mismatch so far, since no later entry can
/// beat it.
#[inline]
pub fn nearest_travel_time(tt_sec: &[f64], start: usize, target: f64) -> usize {
    let mut best = f64::INFINITY;
    let mut found = start;
    for (l, &t) in tt_sec.iter().enumerate().skip(start) {
        let ahead = t - target;
        if ahead >= best {
            break;
        }
        let mismatch = ahead.abs();
        if mismatch < best {
            best = mismatch;
            found = l;
        }
    }
    found
}
