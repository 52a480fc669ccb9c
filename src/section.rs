// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use ndarray::{Array2, Axis};

use crate::error::{MigrationError, Result};
use crate::input::MigrationInput;

/// Radio-wave velocity in glacier ice, m/s.
pub const ICE_VELOCITY: f64 = 1.69e8;

/// A raw radar section as it comes off disk.
///
/// `data` is `snum x tnum` (rows are samples in time, columns are traces).
/// `travel_time_us` gives the two-way time of each row in microseconds and
/// `dist_km` the along-track position of each trace in kilometres.
#[derive(Debug, Clone)]
pub struct RadarSection {
    data: Array2<f64>,
    travel_time_us: Vec<f64>,
    dist_km: Vec<f64>,
}

impl RadarSection {
    /// Assemble a section, checking that the axes match the data shape.
    ///
    /// # Errors
    /// Returns an error if either axis is empty or an axis vector has the
    /// wrong length.
    pub fn new(data: Array2<f64>, travel_time_us: Vec<f64>, dist_km: Vec<f64>) -> Result<Self> {
        let (snum, tnum) = data.dim();
        if tnum == 0 {
            return Err(MigrationError::EmptyAxis { axis: "traces" });
        }
        if snum == 0 {
            return Err(MigrationError::EmptyAxis { axis: "samples" });
        }
        if travel_time_us.len() != snum {
            return Err(MigrationError::LengthMismatch {
                name: "travel_time",
                expected: snum,
                got: travel_time_us.len(),
            });
        }
        if dist_km.len() != tnum {
            return Err(MigrationError::LengthMismatch {
                name: "dist",
                expected: tnum,
                got: dist_km.len(),
            });
        }
        Ok(RadarSection {
            data,
            travel_time_us,
            dist_km,
        })
    }

    /// Number of traces.
    pub fn tnum(&self) -> usize {
        self.data.ncols()
    }

    /// Number of samples per trace.
    pub fn snum(&self) -> usize {
        self.data.nrows()
    }

    /// Sample amplitudes, `snum x tnum`.
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Two-way time of each sample in microseconds.
    pub fn travel_time_us(&self) -> &[f64] {
        &self.travel_time_us
    }

    /// Trace positions in kilometres.
    pub fn dist_km(&self) -> &[f64] {
        &self.dist_km
    }
}

/// Kernel-ready arrays derived from a [`RadarSection`] for one velocity.
#[derive(Debug, Clone)]
pub struct PreparedSection {
    tnum: usize,
    snum: usize,
    dist: Vec<f64>,
    zs: Vec<f64>,
    zs2: Vec<f64>,
    tt_sec: Vec<f64>,
    grad: Vec<f64>,
    max_travel_time: f64,
}

impl PreparedSection {
    /// Convert units and build the depth axis and time derivative.
    ///
    /// Times go from microseconds to seconds, distances from kilometres to
    /// metres, depth is `vel * t / 2`, and the data is differentiated along
    /// each trace with respect to time. The default aperture is the longest
    /// recorded travel time.
    ///
    /// # Errors
    /// Returns an error if the velocity is not positive and finite.
    pub fn from_section(section: &RadarSection, vel: f64) -> Result<Self> {
        if !vel.is_finite() || vel <= 0.0 {
            return Err(MigrationError::InvalidVelocity(vel));
        }

        let tt_sec: Vec<f64> = section.travel_time_us.iter().map(|t| t / 1.0e6).collect();
        let zs: Vec<f64> = tt_sec.iter().map(|t| vel * t / 2.0).collect();
        let zs2: Vec<f64> = zs.iter().map(|z| z * z).collect();
        let dist: Vec<f64> = section.dist_km.iter().map(|d| d * 1.0e3).collect();
        let grad = time_gradient(&section.data, &tt_sec)?;
        let max_travel_time = tt_sec.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        Ok(PreparedSection {
            tnum: section.tnum(),
            snum: section.snum(),
            dist,
            zs,
            zs2,
            tt_sec,
            grad: grad.as_standard_layout().iter().cloned().collect(),
            max_travel_time,
        })
    }

    /// Longest travel time on the time axis, in seconds.
    pub fn max_travel_time(&self) -> f64 {
        self.max_travel_time
    }

    /// Sample depths in metres.
    pub fn zs(&self) -> &[f64] {
        &self.zs
    }

    /// Travel-time table in seconds.
    pub fn tt_sec(&self) -> &[f64] {
        &self.tt_sec
    }

    /// Trace positions in metres.
    pub fn dist(&self) -> &[f64] {
        &self.dist
    }

    /// Row-major time derivative of the data.
    pub fn grad(&self) -> &[f64] {
        &self.grad
    }

    /// Borrow the arrays as validated kernel input.
    ///
    /// # Errors
    /// Returns an error if the section violates a kernel precondition, such
    /// as trace positions or travel times that decrease.
    pub fn as_input(&self) -> Result<MigrationInput<'_>> {
        MigrationInput::new(
            self.tnum,
            self.snum,
            &self.dist,
            &self.zs,
            &self.zs2,
            &self.tt_sec,
            &self.grad,
        )
    }
}

/// Differentiate every column of `data` along the row (time) axis.
///
/// Interior samples use second-order central differences that account for
/// uneven spacing in `t`; the first and last samples use one-sided first
/// differences. A single-sample axis has zero derivative.
///
/// # Errors
/// Returns an error if `t` does not have one entry per row, or if it is not
/// strictly increasing (a repeated sample time has no finite derivative).
pub fn time_gradient(data: &Array2<f64>, t: &[f64]) -> Result<Array2<f64>> {
    let n = data.nrows();
    if t.len() != n {
        return Err(MigrationError::LengthMismatch {
            name: "travel_time",
            expected: n,
            got: t.len(),
        });
    }

    if let Some(index) = t.iter().position(|v| v.is_nan()) {
        return Err(MigrationError::NonMonotonic {
            name: "travel_time",
            index,
        });
    }
    if let Some(index) = t.windows(2).position(|pair| pair[1] <= pair[0]) {
        return Err(MigrationError::NonMonotonic {
            name: "travel_time",
            index: index + 1,
        });
    }

    let mut out = Array2::<f64>::zeros(data.raw_dim());
    if n < 2 {
        return Ok(out);
    }

    for (col_in, mut col_out) in data.axis_iter(Axis(1)).zip(out.axis_iter_mut(Axis(1))) {
        col_out[0] = (col_in[1] - col_in[0]) / (t[1] - t[0]);
        for i in 1..n - 1 {
            let hd = t[i] - t[i - 1];
            let hs = t[i + 1] - t[i];
            col_out[i] = (hd * hd * col_in[i + 1] + (hs * hs - hd * hd) * col_in[i]
                - hs * hs * col_in[i - 1])
                / (hs * hd * (hd + hs));
        }
        col_out[n - 1] = (col_in[n - 1] - col_in[n - 2]) / (t[n - 1] - t[n - 2]);
    }
    Ok(out)
}
