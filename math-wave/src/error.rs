//! Error types for wavepacket and membrane construction and evaluation.
//!
//! Configuration problems are reported when a value is set, never deferred
//! to evaluation. The only error that can surface from geometry is
//! [`WaveError::UnclassifiedPosition`], which flags a position the image
//! source classification cannot place.

use thiserror::Error;

/// Errors raised by the wave library.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WaveError {
    /// A scalar parameter is non-finite or out of its admissible range.
    #[error("invalid {name}: {value} ({reason})")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// The rejected value
        value: f64,
        /// What the value should satisfy
        reason: &'static str,
    },

    /// An interval is non-finite or reversed.
    #[error("invalid {name} interval: ({min}, {max}) (must be finite with min <= max)")]
    InvalidInterval {
        /// Interval name
        name: &'static str,
        /// Lower limit
        min: f64,
        /// Upper limit
        max: f64,
    },

    /// The membrane size is not a pair of positive lengths.
    #[error("invalid membrane size: ({lx}, {ly}) (both lengths must be > 0)")]
    InvalidDomain {
        /// Length along x
        lx: f64,
        /// Length along y
        ly: f64,
    },

    /// The membrane size is smaller than one spatial step.
    #[error("membrane size ({lx}, {ly}) is too small for spatial step {dx}")]
    DegenerateGrid {
        /// Length along x
        lx: f64,
        /// Length along y
        ly: f64,
        /// Spatial step
        dx: f64,
    },

    /// Unrecognised boundary condition.
    #[error("invalid boundary '{0}': expected 'transparent', 'free' or an integer >= 1")]
    InvalidBoundary(String),

    /// A source position is not a pair of finite numbers.
    #[error("invalid source position: ({x}, {y})")]
    InvalidPosition {
        /// x-coordinate
        x: f64,
        /// y-coordinate
        y: f64,
    },

    /// A wavepacket needs at least one dispersion relation.
    #[error("at least one dispersion relation is needed")]
    EmptyDispersion,

    /// A frequency in the spectrum is not a finite number.
    #[error("invalid spectrum entry at index {index}: {value}")]
    InvalidFrequency {
        /// Position in the spectrum
        index: usize,
        /// The rejected frequency
        value: f64,
    },

    /// A discretization parameter was never set before evaluation.
    #[error("wavepacket is missing its {0}")]
    Unconfigured(&'static str),

    /// A placement produced a field whose time axis disagrees with the membrane's.
    #[error("placement time axis has {found} samples, membrane expects {expected}")]
    ShapeMismatch {
        /// Samples expected by the membrane
        expected: usize,
        /// Samples produced by the placement
        found: usize,
    },

    /// A position fell outside every reflection region.
    ///
    /// This is a geometry invariant violation, not a user error.
    #[error("position ({x}, {y}) matches no reflection region for half extents ({dx}, {dy})")]
    UnclassifiedPosition {
        /// x-coordinate
        x: f64,
        /// y-coordinate
        y: f64,
        /// Half extent along x
        dx: f64,
        /// Half extent along y
        dy: f64,
    },
}

/// A specialized `Result` type for wave operations.
pub type Result<T> = std::result::Result<T, WaveError>;

impl WaveError {
    /// Returns `true` for errors raised while configuring an object.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            WaveError::InvalidParameter { .. }
                | WaveError::InvalidInterval { .. }
                | WaveError::InvalidDomain { .. }
                | WaveError::DegenerateGrid { .. }
                | WaveError::InvalidBoundary(_)
                | WaveError::InvalidPosition { .. }
                | WaveError::EmptyDispersion
                | WaveError::InvalidFrequency { .. }
        )
    }

    /// Returns `true` for internal invariant violations.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            WaveError::UnclassifiedPosition { .. } | WaveError::ShapeMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WaveError::InvalidParameter {
            name: "sampling frequency",
            value: -1.0,
            reason: "must be > 0",
        };
        assert_eq!(
            err.to_string(),
            "invalid sampling frequency: -1 (must be > 0)"
        );
    }

    #[test]
    fn test_boundary_error_display() {
        let err = WaveError::InvalidBoundary("rigid".to_string());
        assert!(err.to_string().contains("'rigid'"));
    }

    #[test]
    fn test_classification() {
        assert!(WaveError::EmptyDispersion.is_configuration_error());
        assert!(!WaveError::EmptyDispersion.is_internal());

        let internal = WaveError::UnclassifiedPosition {
            x: -1.0,
            y: 0.0,
            dx: 1.0,
            dy: 1.0,
        };
        assert!(internal.is_internal());
        assert!(!internal.is_configuration_error());
        assert!(!WaveError::Unconfigured("spatial step").is_configuration_error());
    }
}
