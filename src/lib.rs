// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! Kirchhoff diffraction-stack migration for 2D radar and seismic sections.
//!
//! Migration moves reflected energy recorded at the surface back to the
//! subsurface point it came from. For every output cell this library sums the
//! time derivative of the data along the two-way travel-time hyperbola through
//! that cell, weighting each contribution by the obliquity of its ray path.
//! The hyperbola walk stops at a maximum travel time (the aperture), and the
//! depth lookup for each trace is seeded from the previous one so the search
//! stays close to constant time per trace.

#![warn(missing_docs)]

/// Error types for the library.
pub mod error;
/// Validated kernel input arrays.
pub mod input;
/// File I/O for loading sections and saving migrated images.
pub mod io;
/// The migration kernel.
pub mod kernel;
/// Progress events and sinks.
pub mod progress;
/// Depth-sample search along the travel-time table.
pub mod search;
/// Preparation of raw radar sections into kernel input.
pub mod section;

pub use crate::error::{MigrationError, Result};
pub use crate::input::MigrationInput;
pub use crate::kernel::{KirchhoffMigrator, Tap};
pub use crate::progress::{ProgressEvent, ProgressSink, SilentProgress, TextProgress};
pub use crate::search::SearchStrategy;
pub use crate::section::{PreparedSection, RadarSection};
