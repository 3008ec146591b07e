//! Quaternion algebra used to estimate the rate of change of an orientation
//! signal.

use nalgebra::{Quaternion, UnitQuaternion};

use crate::error::{FilterError, Result};

/// Checks that `dt` is a usable timestep, i.e. finite and strictly positive,
/// with a finite rate $1 / \Delta t$.
///
/// # Errors
///
/// Returns [`FilterError::InvalidTimestep`] otherwise.
#[inline]
pub fn validate_timestep(dt: f32) -> Result<f32> {
    if dt.is_finite() && dt > 0.0 && dt.recip().is_finite() {
        Ok(dt)
    } else {
        Err(FilterError::InvalidTimestep(dt))
    }
}

/// Returns the multiplicative inverse of `q`, its conjugate scaled by
/// $1 / \lVert q \rVert^2$.
///
/// # Errors
///
/// Returns [`FilterError::DegenerateQuaternion`] if `q` has a (near) zero
/// norm.
#[inline]
pub fn invert(q: &Quaternion<f32>) -> Result<Quaternion<f32>> {
    let norm_squared = q.norm_squared();
    if norm_squared.is_nan() || norm_squared <= f32::EPSILON {
        return Err(FilterError::DegenerateQuaternion { norm_squared });
    }

    Ok(q.conjugate() / norm_squared)
}

/// Returns the Hamilton product `a * b`.
#[inline]
#[must_use]
pub fn multiply(a: &Quaternion<f32>, b: &Quaternion<f32>) -> Quaternion<f32> {
    a * b
}

/// Estimates the derivative of an orientation signal that moved from `prev`
/// to `current` within `dt` seconds.
///
/// The relative rotation $q_{rel} = q_{current} \, q_{prev}^{-1}$ is scaled to
/// one second with a linearized extrapolation (nlerp) instead of the
/// logarithmic map: its vector part is multiplied by the rate $r = 1 /
/// \Delta t$, the scalar part becomes $w_{rel} r + (1 - r)$, and the result
/// is renormalized.
///
/// # Note
///
/// This is an approximation. It is accurate as long as the rotation per sample
/// is small, i.e. `dt` is short relative to the angular rate. For long
/// timesteps or single-step rotations approaching 180° the extrapolated scalar
/// part dominates the renormalization and the estimated rate degrades.
///
/// # Errors
///
/// Returns [`FilterError::InvalidTimestep`] if `dt` is not strictly positive
/// and [`FilterError::DegenerateQuaternion`] if the extrapolated derivative
/// collapses to a zero norm.
pub fn compute_derivative(
    prev: &UnitQuaternion<f32>,
    current: &UnitQuaternion<f32>,
    dt: f32,
) -> Result<UnitQuaternion<f32>> {
    let rate = 1.0 / validate_timestep(dt)?;

    let inverse_prev = invert(prev.quaternion())?;
    let relative = multiply(current.quaternion(), &inverse_prev);

    let extrapolated = Quaternion::new(
        relative.w * rate + (1.0 - rate),
        relative.i * rate,
        relative.j * rate,
        relative.k * rate,
    );

    UnitQuaternion::try_new(extrapolated, f32::EPSILON).ok_or_else(|| {
        FilterError::DegenerateQuaternion {
            norm_squared: extrapolated.norm_squared(),
        }
    })
}

/// Returns the rotation angle in radians of the derivative quaternion `dq`,
/// $2 \arccos(w)$.
///
/// The scalar part is clamped to $[-1, 1]$ first, so rounding errors never
/// produce `NaN`.
#[must_use]
pub fn derivative_magnitude(dq: &UnitQuaternion<f32>) -> f32 {
    let w = dq.w;
    if !(-1.0..=1.0).contains(&w) {
        log::trace!("clamping derivative scalar part {w} into the arccos domain");
    }

    2.0 * w.clamp(-1.0, 1.0).acos()
}
