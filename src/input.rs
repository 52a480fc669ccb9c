// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{MigrationError, Result};

/// Validated, borrowed view of the flat arrays the migration kernel reads.
///
/// Depth-indexed arrays (`zs`, `zs2`, `tt_sec`) have `snum` entries, the
/// trace-indexed `dist` has `tnum` entries, and `grad` is an `snum x tnum`
/// row-major matrix (depth-major, trace-minor).
///
/// Construction checks every length once, so the kernel can index without
/// re-checking inside its hot loop.
#[derive(Debug, Clone, Copy)]
pub struct MigrationInput<'a> {
    tnum: usize,
    snum: usize,
    dist: &'a [f64],
    zs: &'a [f64],
    zs2: &'a [f64],
    tt_sec: &'a [f64],
    grad: &'a [f64],
}

impl<'a> MigrationInput<'a> {
    /// Build a kernel input from flat arrays.
    ///
    /// # Parameters
    /// - `tnum`: Number of traces (columns)
    /// - `snum`: Number of depth samples (rows)
    /// - `dist`: Along-track position of each trace, non-decreasing
    /// - `zs`: Depth of each sample
    /// - `zs2`: Squared depth term per sample (normally `zs[i]^2`; not re-derived)
    /// - `tt_sec`: Reference travel time per sample, non-decreasing
    /// - `grad`: Time derivative of the data, `snum * tnum` values in row-major order
    ///
    /// # Errors
    /// Returns an error if an axis is empty, an array has the wrong length,
    /// `dist` or `tt_sec` decreases, or a `zs2` entry is negative or non-finite.
    pub fn new(
        tnum: usize,
        snum: usize,
        dist: &'a [f64],
        zs: &'a [f64],
        zs2: &'a [f64],
        tt_sec: &'a [f64],
        grad: &'a [f64],
    ) -> Result<Self> {
        if tnum == 0 {
            return Err(MigrationError::EmptyAxis { axis: "traces" });
        }
        if snum == 0 {
            return Err(MigrationError::EmptyAxis { axis: "samples" });
        }

        check_len("dist", dist, tnum)?;
        check_len("zs", zs, snum)?;
        check_len("zs2", zs2, snum)?;
        check_len("tt_sec", tt_sec, snum)?;
        check_len("gradD", grad, snum * tnum)?;

        check_non_decreasing("dist", dist)?;
        check_non_decreasing("tt_sec", tt_sec)?;

        for (index, &value) in zs2.iter().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(MigrationError::InvalidDepthTerm { index, value });
            }
        }

        Ok(MigrationInput {
            tnum,
            snum,
            dist,
            zs,
            zs2,
            tt_sec,
            grad,
        })
    }

    /// Number of traces.
    pub fn tnum(&self) -> usize {
        self.tnum
    }

    /// Number of depth samples.
    pub fn snum(&self) -> usize {
        self.snum
    }

    /// Total number of cells in the output image.
    pub fn num_cells(&self) -> usize {
        self.snum * self.tnum
    }

    /// Trace positions.
    pub fn dist(&self) -> &'a [f64] {
        self.dist
    }

    /// Sample depths.
    pub fn zs(&self) -> &'a [f64] {
        self.zs
    }

    /// Squared depth terms.
    pub fn zs2(&self) -> &'a [f64] {
        self.zs2
    }

    /// Reference travel-time table.
    pub fn tt_sec(&self) -> &'a [f64] {
        self.tt_sec
    }

    /// Row-major gradient matrix.
    pub fn grad(&self) -> &'a [f64] {
        self.grad
    }

    #[inline]
    pub(crate) fn grad_at(&self, sample: usize, trace: usize) -> f64 {
        self.grad[sample * self.tnum + trace]
    }
}

fn check_len(name: &'static str, values: &[f64], expected: usize) -> Result<()> {
    if values.len() != expected {
        return Err(MigrationError::LengthMismatch {
            name,
            expected,
            got: values.len(),
        });
    }
    Ok(())
}

fn check_non_decreasing(name: &'static str, values: &[f64]) -> Result<()> {
    if let Some(index) = values.iter().position(|v| v.is_nan()) {
        return Err(MigrationError::NonMonotonic { name, index });
    }
    for (index, pair) in values.windows(2).enumerate() {
        if pair[1] < pair[0] {
            return Err(MigrationError::NonMonotonic {
                name,
                index: index + 1,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Arrays {
        dist: Vec<f64>,
        zs: Vec<f64>,
        zs2: Vec<f64>,
        tt: Vec<f64>,
        grad: Vec<f64>,
    }

    fn arrays(tnum: usize, snum: usize) -> Arrays {
        let zs: Vec<f64> = (0..snum).map(|i| i as f64).collect();
        Arrays {
            dist: (0..tnum).map(|j| j as f64 * 0.5).collect(),
            zs2: zs.iter().map(|z| z * z).collect(),
            tt: (0..snum).map(|i| i as f64 * 1e-3).collect(),
            zs,
            grad: vec![1.0; tnum * snum],
        }
    }

    #[test]
    fn accepts_consistent_arrays() {
        let a = arrays(5, 3);
        let input = MigrationInput::new(5, 3, &a.dist, &a.zs, &a.zs2, &a.tt, &a.grad).unwrap();
        assert_eq!(input.tnum(), 5);
        assert_eq!(input.snum(), 3);
        assert_eq!(input.num_cells(), 15);
        assert_eq!(input.grad_at(2, 4), 1.0);
    }

    #[test]
    fn rejects_empty_axes() {
        let a = arrays(0, 3);
        let result = MigrationInput::new(0, 3, &a.dist, &a.zs, &a.zs2, &a.tt, &a.grad);
        assert!(matches!(
            result,
            Err(MigrationError::EmptyAxis { axis: "traces" })
        ));

        let a = arrays(3, 0);
        let result = MigrationInput::new(3, 0, &a.dist, &a.zs, &a.zs2, &a.tt, &a.grad);
        assert!(matches!(
            result,
            Err(MigrationError::EmptyAxis { axis: "samples" })
        ));
    }

    #[test]
    fn rejects_short_gradient() {
        let mut a = arrays(4, 4);
        a.grad.pop();
        let result = MigrationInput::new(4, 4, &a.dist, &a.zs, &a.zs2, &a.tt, &a.grad);
        assert!(matches!(
            result,
            Err(MigrationError::LengthMismatch {
                name: "gradD",
                expected: 16,
                got: 15
            })
        ));
    }

    #[test]
    fn rejects_decreasing_distance() {
        let mut a = arrays(4, 2);
        a.dist[2] = 0.1;
        let result = MigrationInput::new(4, 2, &a.dist, &a.zs, &a.zs2, &a.tt, &a.grad);
        assert!(matches!(
            result,
            Err(MigrationError::NonMonotonic {
                name: "dist",
                index: 2
            })
        ));
    }

    #[test]
    fn rejects_nan_travel_time() {
        let mut a = arrays(2, 4);
        a.tt[3] = f64::NAN;
        let result = MigrationInput::new(2, 4, &a.dist, &a.zs, &a.zs2, &a.tt, &a.grad);
        assert!(matches!(
            result,
            Err(MigrationError::NonMonotonic {
                name: "tt_sec",
                index: 3
            })
        ));
    }

    #[test]
    fn rejects_negative_depth_term() {
        let mut a = arrays(2, 3);
        a.zs2[1] = -4.0;
        let result = MigrationInput::new(2, 3, &a.dist, &a.zs, &a.zs2, &a.tt, &a.grad);
        assert!(matches!(
            result,
            Err(MigrationError::InvalidDepthTerm { index: 1, .. })
        ));
    }

    #[test]
    fn equal_neighbours_are_monotonic() {
        let a = Arrays {
            dist: vec![0.0, 0.0, 1.0],
            zs: vec![1.0, 1.0],
            zs2: vec![1.0, 1.0],
            tt: vec![2.0, 2.0],
            grad: vec![0.0; 6],
        };
        assert!(MigrationInput::new(3, 2, &a.dist, &a.zs, &a.zs2, &a.tt, &a.grad).is_ok());
    }
}
