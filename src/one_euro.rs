//! The One Euro filter, generalized to unit quaternions.

use std::time::Duration;

use nalgebra::UnitQuaternion;

use crate::derivative::{compute_derivative, derivative_magnitude, validate_timestep};
use crate::error::Result;
use crate::low_pass_filter::{smoothing_factor, SlerpLowPassFilter};

/// Parameters for the [`OneEuroQuatFilter`].
///
/// None of the values are validated, sensible ranges depend on the signal.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OneEuroParameters {
    /// Minimum cutoff frequency $f_{c_{min}}$ in Hz.
    ///
    /// This is the cutoff used while the signal is at rest. Lowering it
    /// reduces jitter, at the cost of more lag.
    pub min_cutoff: f32,
    /// Speed coefficient $\beta$.
    ///
    /// The cutoff frequency grows with the estimated angular rate as
    /// $f_c = f_{c_{min}} + \beta \lvert \dot{q} \rvert$. Increasing it reduces
    /// lag during fast motion, `0.0` disables the adaptation entirely.
    pub beta: f32,
    /// Cutoff frequency in Hz of the low-pass filter applied to the derivative
    /// estimate.
    ///
    /// This cutoff is fixed, it rarely needs to be changed from its default of
    /// `1.0`.
    pub derivative_cutoff: f32,
}

impl Default for OneEuroParameters {
    fn default() -> Self {
        Self {
            min_cutoff: 1.0,
            beta: 0.0,
            derivative_cutoff: 1.0,
        }
    }
}

/// An adaptive low-pass filter for orientation signals.
///
/// The filter smooths noisy unit quaternions with a cutoff frequency that
/// follows the estimated angular rate: slow motion is smoothed heavily to
/// remove jitter, fast motion passes with little lag.
///
/// Every step the filter:
///
/// 1. estimates the derivative between the previous filtered output and the
///    new sample, see [`compute_derivative`],
/// 2. smooths that derivative with a fixed cutoff,
/// 3. raises the signal cutoff by $\beta$ times the derivative's magnitude,
/// 4. blends the sample into the previous output with the resulting smoothing
///    factor.
///
/// A filter instance tracks a single channel and must be fed every sample of
/// that channel in order. Samples should stay on a consistent hemisphere,
/// i.e. not flip between `q` and `-q`: the signal channel takes the shorter
/// arc, but the derivative estimate reads a flipped sample as a full turn.
///
/// # Example
///
/// ```rust
/// use nalgebra::{UnitQuaternion, Vector3};
/// use quat_one_euro::OneEuroQuatFilter;
///
/// let mut filter = OneEuroQuatFilter::new(1.0, 0.5);
/// let dt = 1.0 / 60.0;
///
/// let first = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.1);
/// assert_eq!(filter.filter(first, dt)?, first);
///
/// let noisy = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.12);
/// let smoothed = filter.filter(noisy, dt)?;
/// assert!(smoothed.angle_to(&first) < noisy.angle_to(&first));
/// # Ok::<(), quat_one_euro::FilterError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OneEuroQuatFilter {
    /// The parameters of the filter.
    parameters: OneEuroParameters,
    /// Whether the filter has received its first sample.
    initialized: bool,
    /// Low-pass filter state for the orientation signal.
    signal_low_pass: SlerpLowPassFilter,
    /// Low-pass filter state for the derivative estimate.
    derivative_low_pass: SlerpLowPassFilter,
    /// The adaptive cutoff used for the most recent sample.
    last_cutoff: Option<f32>,
}

impl Default for OneEuroQuatFilter {
    fn default() -> Self {
        Self::with_parameters(OneEuroParameters::default())
    }
}

impl OneEuroQuatFilter {
    /// Create a new filter with the given minimum cutoff frequency (Hz) and
    /// speed coefficient, and a derivative cutoff of `1.0` Hz.
    #[must_use]
    pub fn new(min_cutoff: f32, beta: f32) -> Self {
        Self::with_parameters(OneEuroParameters {
            min_cutoff,
            beta,
            ..OneEuroParameters::default()
        })
    }

    /// Create a new filter with the given parameters.
    #[must_use]
    pub fn with_parameters(parameters: OneEuroParameters) -> Self {
        Self {
            parameters,
            initialized: false,
            signal_low_pass: SlerpLowPassFilter::new(),
            derivative_low_pass: SlerpLowPassFilter::new(),
            last_cutoff: None,
        }
    }

    /// Filter the orientation sample `x`, taken `dt` seconds after the
    /// previous one, and return the smoothed orientation.
    ///
    /// The first sample is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FilterError::InvalidTimestep`] if `dt` is not a finite,
    /// strictly positive number with a finite reciprocal, or [`crate::FilterError::DegenerateQuaternion`]
    /// if the derivative estimate collapses. The filter state is left
    /// untouched in both cases.
    pub fn filter(&mut self, x: UnitQuaternion<f32>, dt: f32) -> Result<UnitQuaternion<f32>> {
        let dt = validate_timestep(dt)?;

        // the derivative is taken against the filtered output, so noise that
        // was already suppressed does not feed back into the cutoff
        let dx = if self.initialized {
            compute_derivative(&self.signal_low_pass.last(), &x, dt)?
        } else {
            log::debug!("initializing quaternion one euro filter");
            self.initialized = true;
            UnitQuaternion::identity()
        };

        let derivative_alpha = smoothing_factor(self.parameters.derivative_cutoff, dt);
        let edx = self.derivative_low_pass.filter(dx, derivative_alpha);
        let dx_magnitude = derivative_magnitude(&edx);

        let cutoff = self.parameters.min_cutoff + self.parameters.beta * dx_magnitude;
        let alpha = smoothing_factor(cutoff, dt);
        log::trace!("derivative magnitude: {dx_magnitude}, cutoff: {cutoff}, alpha: {alpha}");

        self.last_cutoff = Some(cutoff);
        Ok(self.signal_low_pass.filter(x, alpha))
    }

    /// Filter the orientation sample `x`, taken `dt` after the previous one.
    ///
    /// # Errors
    ///
    /// See [`Self::filter`], a zero `dt` is rejected.
    pub fn filter_with_duration(
        &mut self,
        x: UnitQuaternion<f32>,
        dt: Duration,
    ) -> Result<UnitQuaternion<f32>> {
        self.filter(x, dt.as_secs_f32())
    }

    /// Returns the parameters of this filter.
    #[must_use]
    pub fn parameters(&self) -> &OneEuroParameters {
        &self.parameters
    }

    /// Returns `true` once the filter has received its first sample.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Returns the most recent filtered orientation.
    ///
    /// This is the identity rotation until the first sample was filtered.
    #[must_use]
    pub fn last(&self) -> UnitQuaternion<f32> {
        self.signal_low_pass.last()
    }

    /// Returns the most recent smoothed derivative estimate.
    #[must_use]
    pub fn last_derivative(&self) -> UnitQuaternion<f32> {
        self.derivative_low_pass.last()
    }

    /// Returns the adaptive cutoff frequency (Hz) used for the most recent
    /// sample, or `None` if no sample was filtered yet.
    #[must_use]
    pub fn last_cutoff(&self) -> Option<f32> {
        self.last_cutoff
    }

    /// Reset the filter to its uninitialized state, keeping its parameters.
    pub fn reset(&mut self) {
        log::debug!("resetting quaternion one euro filter");
        *self = Self::with_parameters(self.parameters);
    }
}
