//! A module implementing a first-order low-pass filter on the unit
//! quaternion sphere.
//!
//! This module provides [`SlerpLowPassFilter`], an exponential smoothing
//! filter that blends each new orientation sample into the previous output
//! using spherical linear interpolation, and [`smoothing_factor`], which
//! converts a cutoff frequency and a timestep into the blend factor the filter
//! expects.

use nalgebra::UnitQuaternion;
use std::f32::consts::PI;

/// A single-pole exponential smoothing filter for orientation signals.
///
/// Where a scalar low-pass filter computes $\hat{x}_i = \alpha x_i + (1 -
/// \alpha) \hat{x}_{i-1}$, this filter performs the same step on the rotation
/// manifold: the new output is the spherical interpolation from the previous
/// output towards the new sample, with interpolation parameter $\alpha$.
///
/// The filter has no notion of time, the caller decides on $\alpha$ for every
/// sample, usually through [`smoothing_factor`].
///
/// # Example
///
/// ```rust
/// use nalgebra::{UnitQuaternion, Vector3};
/// use quat_one_euro::low_pass_filter::SlerpLowPassFilter;
///
/// let mut filter = SlerpLowPassFilter::new();
///
/// // The first sample passes through unchanged.
/// let identity = UnitQuaternion::identity();
/// assert_eq!(filter.filter(identity, 0.5), identity);
///
/// // Subsequent samples are blended into the previous output.
/// let target = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 1.0);
/// let filtered = filter.filter(target, 0.5);
/// assert!((filtered.angle_to(&identity) - 0.5).abs() < 1e-5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlerpLowPassFilter {
    /// Whether this filter has received its first sample.
    initialized: bool,
    /// The last output of the filter.
    last_output: UnitQuaternion<f32>,
}

impl Default for SlerpLowPassFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl SlerpLowPassFilter {
    /// Creates a new, uninitialized [`SlerpLowPassFilter`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            initialized: false,
            last_output: UnitQuaternion::identity(),
        }
    }

    /// Filters the provided sample `x` and returns the filtered output.
    ///
    /// The first sample is returned as-is and becomes the filter state. Every
    /// following sample is blended into the previous output, `alpha = 0`
    /// keeps the previous output and `alpha = 1` jumps to `x`.
    ///
    /// # Note
    ///
    /// `alpha` is not clamped. Values outside of $[0, 1]$ extrapolate along
    /// the arc between the previous output and `x`.
    #[inline]
    #[must_use]
    pub fn filter(&mut self, x: UnitQuaternion<f32>, alpha: f32) -> UnitQuaternion<f32> {
        if !self.initialized {
            self.initialized = true;
            self.last_output = x;
            return x;
        }

        let blended = self
            .last_output
            .try_slerp(&x, alpha, f32::EPSILON)
            .unwrap_or_else(|| self.last_output.nlerp(&x, alpha));

        // keep single precision drift off the stored state
        self.last_output = UnitQuaternion::new_normalize(blended.into_inner());
        self.last_output
    }

    /// Returns the last output of the filter.
    ///
    /// Before the first call to [`Self::filter`] this is the identity
    /// rotation, which carries no information about the signal.
    #[inline]
    #[must_use]
    pub fn last(&self) -> UnitQuaternion<f32> {
        self.last_output
    }

    /// Returns `true` once the filter has received its first sample.
    #[inline]
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Resets the filter, the next sample passes through unchanged again.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Returns the smoothing factor $\alpha$ of a first-order low-pass filter with
/// cutoff frequency `cutoff` (in Hz), sampled `dt` seconds apart.
///
/// The time constant $\tau$ relates to the cutoff frequency $f_c$ as follows:
/// $$\tau = \frac{1}{2 \pi f_c}, \quad \alpha = \frac{1}{1 + \tau / \Delta t}$$
///
/// Larger cutoffs or timesteps move $\alpha$ towards 1 (less smoothing),
/// while $f_c \to 0$ or $\Delta t \to 0$ moves it towards 0.
///
/// # Note
///
/// `dt` is not validated here, see
/// [`crate::derivative::validate_timestep`].
///
/// # Example
///
/// ```
/// use quat_one_euro::low_pass_filter::smoothing_factor;
///
/// let alpha = smoothing_factor(1.0, 1.0 / 60.0);
/// assert!(alpha > 0.0 && alpha < 1.0);
/// ```
#[inline]
#[must_use]
pub fn smoothing_factor(cutoff: f32, dt: f32) -> f32 {
    let tau = 1.0 / (2.0 * PI * cutoff);
    1.0 / (1.0 + tau / dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use nalgebra::Vector3;
    use rstest::rstest;

    fn about_y(angle: f32) -> UnitQuaternion<f32> {
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), angle)
    }

    /// Rotation angle between `a` and `b`, accurate for small angles.
    fn angle_between(a: &UnitQuaternion<f32>, b: &UnitQuaternion<f32>) -> f32 {
        2.0 * (a.inverse() * b).imag().norm().min(1.0).asin()
    }

    #[test]
    fn first_sample_passes_through() {
        let mut filter = SlerpLowPassFilter::new();
        assert!(!filter.is_initialized());

        let x = about_y(0.7);
        assert_eq!(filter.filter(x, 0.0), x);
        assert!(filter.is_initialized());
        assert_eq!(filter.last(), x);
    }

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(0.25, 0.25)]
    #[case(0.5, 0.5)]
    #[case(1.0, 1.0)]
    fn blends_along_the_arc(#[case] alpha: f32, #[case] expected_fraction: f32) {
        let mut filter = SlerpLowPassFilter::new();
        let _ = filter.filter(UnitQuaternion::identity(), alpha);

        let out = filter.filter(about_y(1.2), alpha);
        let travelled = angle_between(&UnitQuaternion::identity(), &out);
        assert_abs_diff_eq!(travelled, 1.2 * expected_fraction, epsilon = 1e-5);
        assert_eq!(filter.last(), out);
    }

    #[test]
    fn takes_the_shorter_arc() {
        let mut filter = SlerpLowPassFilter::new();
        let start = about_y(0.4);
        let _ = filter.filter(start, 0.5);

        // same rotation as `about_y(0.8)`, expressed on the opposite hemisphere
        let target = UnitQuaternion::new_unchecked(-about_y(0.8).into_inner());
        let out = filter.filter(target, 0.5);

        assert_abs_diff_eq!(angle_between(&out, &about_y(0.6)), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn blending_identical_samples_is_a_no_op() {
        let mut filter = SlerpLowPassFilter::new();
        let x = about_y(0.3);
        let _ = filter.filter(x, 0.5);

        let out = filter.filter(x, 0.5);
        assert_abs_diff_eq!(angle_between(&out, &x), 0.0, epsilon = 1e-5);
        assert_relative_eq!(out.norm(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn reset_returns_to_pass_through() {
        let mut filter = SlerpLowPassFilter::new();
        let _ = filter.filter(about_y(0.2), 0.5);
        filter.reset();

        assert!(!filter.is_initialized());
        assert_eq!(filter.last(), UnitQuaternion::identity());

        let x = about_y(-1.0);
        assert_eq!(filter.filter(x, 0.1), x);
    }

    #[test]
    fn smoothing_factor_matches_time_constant() {
        let cutoff = 1.0;
        let dt = 1.0 / 60.0;
        let tau = 1.0 / (2.0 * PI * cutoff);
        assert_relative_eq!(smoothing_factor(cutoff, dt), dt / (dt + tau));
    }

    #[test]
    fn smoothing_factor_boundaries() {
        assert!(smoothing_factor(1.0e9, 0.01) > 0.999);
        assert!(smoothing_factor(1.0e-9, 0.01) < 1.0e-6);
        assert!(smoothing_factor(1.0, 1.0e-9) < 1.0e-6);
    }

    #[test]
    fn smoothing_factor_is_monotonic() {
        let dt = 0.01;
        let mut previous = 0.0;
        for cutoff in [0.1, 0.5, 1.0, 5.0, 20.0, 100.0] {
            let alpha = smoothing_factor(cutoff, dt);
            assert!(alpha > previous);
            previous = alpha;
        }

        let mut previous = 0.0;
        for dt in [0.001, 0.005, 0.01, 0.05, 0.1] {
            let alpha = smoothing_factor(1.0, dt);
            assert!(alpha > previous);
            previous = alpha;
        }
    }
}
