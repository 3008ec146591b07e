//! An implementation of the One Euro filter for orientation signals
//! represented as unit quaternions.
//!
//! The One Euro filter is a first-order low-pass filter whose cutoff frequency
//! adapts to the speed of the signal. At rest the cutoff is low, removing
//! jitter from noisy measurements, during fast motion it rises, trading some
//! smoothing for less lag.
//!
//! On the rotation group the usual building blocks are replaced by their
//! quaternion counterparts: exponential smoothing becomes spherical
//! interpolation ([`low_pass_filter`]), and the derivative is estimated from
//! the relative rotation between two samples ([`derivative`]).
//!
//! # Example
//!
//! ```rust
//! use nalgebra::{UnitQuaternion, Vector3};
//! use quat_one_euro::OneEuroQuatFilter;
//!
//! // one filter per tracked object
//! let mut filter = OneEuroQuatFilter::new(1.0, 0.1);
//!
//! let target = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.5);
//! let _ = filter.filter(UnitQuaternion::identity(), 1.0 / 60.0)?;
//!
//! let mut output = UnitQuaternion::identity();
//! for _ in 0..600 {
//!     output = filter.filter(target, 1.0 / 60.0)?;
//! }
//! assert!(output.angle_to(&target) < 1e-2);
//! # Ok::<(), quat_one_euro::FilterError>(())
//! ```

pub mod derivative;
mod error;
pub mod low_pass_filter;
mod one_euro;

pub use error::{FilterError, Result};
pub use one_euro::{OneEuroParameters, OneEuroQuatFilter};
