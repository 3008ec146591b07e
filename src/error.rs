//! Errors raised by the quaternion algebra and the filters built on it.

use thiserror::Error;

/// Errors that can occur while filtering an orientation signal.
///
/// Both variants indicate caller misuse rather than a precision artifact.
/// Small excursions of the derivative's scalar part outside of $[-1, 1]$ are
/// clamped instead, see [`crate::derivative::derivative_magnitude`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum FilterError {
    /// The quaternion has a (near) zero norm and cannot be inverted or
    /// normalized.
    #[error("degenerate quaternion with squared norm {norm_squared}")]
    DegenerateQuaternion {
        /// The squared norm of the offending quaternion.
        norm_squared: f32,
    },
    /// The elapsed time between two samples is zero, negative or not finite.
    #[error("invalid timestep {0}, expected a finite value greater than zero")]
    InvalidTimestep(f32),
}

/// Result type used throughout this crate.
pub type Result<T> = core::result::Result<T, FilterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_include_offending_values() {
        let err = FilterError::InvalidTimestep(-0.5);
        assert_eq!(
            err.to_string(),
            "invalid timestep -0.5, expected a finite value greater than zero"
        );

        let err = FilterError::DegenerateQuaternion { norm_squared: 0.0 };
        assert_eq!(err.to_string(), "degenerate quaternion with squared norm 0");
    }
}
