// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;

/// Errors raised while validating migration inputs, loading sections, or
/// saving results.
#[derive(Debug)]
pub enum MigrationError {
    /// An axis of the section has no samples.
    EmptyAxis {
        /// Name of the axis ("traces" or "samples").
        axis: &'static str,
    },
    /// A flat array does not have the length implied by the section shape.
    LengthMismatch {
        /// Name of the array.
        name: &'static str,
        /// The length the section shape requires.
        expected: usize,
        /// The length supplied.
        got: usize,
    },
    /// An ordered array decreases (or repeats a sample time) or holds NaN.
    NonMonotonic {
        /// Name of the array.
        name: &'static str,
        /// First index whose value breaks the ordering.
        index: usize,
    },
    /// A squared-depth term is negative or not finite.
    InvalidDepthTerm {
        /// The depth index.
        index: usize,
        /// The offending value.
        value: f64,
    },
    /// Propagation velocity is not positive and finite.
    InvalidVelocity(f64),
    /// Maximum travel time is NaN.
    InvalidMaxTravelTime(f64),
    /// Zero worker threads were requested.
    InvalidThreadCount(usize),
    /// Array shape read from a file does not match the expected shape.
    ShapeMismatch {
        /// The expected shape.
        expected: Vec<usize>,
        /// The shape encountered.
        got: Vec<usize>,
    },
    /// Unsupported data type in file.
    UnsupportedDtype(String),
    /// Unsupported file format (unrecognized extension).
    UnsupportedFileFormat(String),
    /// Expected MAT variable not found in file.
    MatVariableNotFound {
        /// The variable name that was requested.
        expected: String,
        /// The variable names that are available.
        available: Vec<String>,
    },
    /// I/O error occurred.
    IoError(std::io::Error),
    /// Other error with a descriptive message.
    Other(String),
}

impl fmt::Display for MigrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationError::EmptyAxis { axis } => {
                write!(f, "empty section: no {} (must be >= 1)", axis)
            }
            MigrationError::LengthMismatch {
                name,
                expected,
                got,
            } => {
                write!(
                    f,
                    "length mismatch for {}: expected {}, got {}",
                    name, expected, got
                )
            }
            MigrationError::NonMonotonic { name, index } => {
                write!(
                    f,
                    "{} is out of order: value at index {} does not follow its predecessor",
                    name, index
                )
            }
            MigrationError::InvalidDepthTerm { index, value } => {
                write!(
                    f,
                    "invalid squared depth at index {}: {} (must be non-negative and finite)",
                    index, value
                )
            }
            MigrationError::InvalidVelocity(v) => {
                write!(f, "invalid velocity: {} (must be positive and finite)", v)
            }
            MigrationError::InvalidMaxTravelTime(t) => {
                write!(f, "invalid max travel time: {} (must not be NaN)", t)
            }
            MigrationError::InvalidThreadCount(n) => {
                write!(f, "invalid thread count: {} (must be >= 1)", n)
            }
            MigrationError::ShapeMismatch { expected, got } => {
                write!(f, "shape mismatch: expected {:?}, got {:?}", expected, got)
            }
            MigrationError::UnsupportedDtype(dtype) => {
                write!(f, "unsupported dtype: {}", dtype)
            }
            MigrationError::UnsupportedFileFormat(ext) => {
                write!(f, "unsupported file format: {}", ext)
            }
            MigrationError::MatVariableNotFound {
                expected,
                available,
            } => {
                write!(
                    f,
                    "MAT variable '{}' not found; available variables: {:?}",
                    expected, available
                )
            }
            MigrationError::IoError(e) => write!(f, "I/O error: {}", e),
            MigrationError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for MigrationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MigrationError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MigrationError {
    fn from(e: std::io::Error) -> Self {
        MigrationError::IoError(e)
    }
}

/// Convenience type alias for Results with MigrationError.
pub type Result<T> = std::result::Result<T, MigrationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_empty_axis() {
        let e = MigrationError::EmptyAxis { axis: "traces" };
        assert_eq!(e.to_string(), "empty section: no traces (must be >= 1)");
    }

    #[test]
    fn display_length_mismatch() {
        let e = MigrationError::LengthMismatch {
            name: "dist",
            expected: 12,
            got: 11,
        };
        assert_eq!(e.to_string(), "length mismatch for dist: expected 12, got 11");
    }

    #[test]
    fn display_non_monotonic() {
        let e = MigrationError::NonMonotonic {
            name: "tt_sec",
            index: 4,
        };
        assert!(e.to_string().starts_with("tt_sec is out of order"));
        assert!(e.to_string().contains("index 4"));
    }

    #[test]
    fn display_invalid_velocity() {
        let e = MigrationError::InvalidVelocity(0.0);
        assert_eq!(
            e.to_string(),
            "invalid velocity: 0 (must be positive and finite)"
        );
    }

    #[test]
    fn display_invalid_depth_term() {
        let e = MigrationError::InvalidDepthTerm {
            index: 2,
            value: -1.5,
        };
        assert_eq!(
            e.to_string(),
            "invalid squared depth at index 2: -1.5 (must be non-negative and finite)"
        );
    }

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing section");
        let e: MigrationError = io_err.into();
        assert!(matches!(e, MigrationError::IoError(_)));
        assert!(e.to_string().contains("missing section"));
        assert!(std::error::Error::source(&e).is_some());
    }

    #[test]
    fn display_mat_variable_not_found() {
        let e = MigrationError::MatVariableNotFound {
            expected: "travel_time".to_string(),
            available: vec!["data".to_string(), "dist".to_string()],
        };
        assert!(e.to_string().contains("travel_time"));
        assert!(e.to_string().contains("dist"));
    }
}
