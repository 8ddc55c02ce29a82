//! # Value Mapper
//!
//! Pure conversions between a numeric parameter's native domain and a fixed
//! integer control coordinate, for slider-style interaction. The control of
//! the parameter can be nonlinear, for example logarithmic: when a value can
//! vary between 1 and 1000 one often needs fine-grain control near 1 but
//! only coarse-grain control near 1000.
//!
//! Available modes:
//! - `linear` — linear control between min and max
//! - `log` — logarithmic control between min (needs to be > 0) and max
//! - `left E` — finer grain near min, strength `E` controls the effect
//! - `right E` — finer grain near max
//! - `middle E` — finer grain near the interval center
//! - `ext E` — alias of `middle`
//! - `tan X` — tangent control when one or both sides are infinite; `X`
//!   controls the slope near zero if both sides are infinite, or near the
//!   finite side otherwise
//!
//! If no mode is authored it is inferred from the bounds; see
//! [`ModeSpec::infer`].

mod mode;

pub use mode::{ModeSpec, SliderMode};

use crate::error::{ParamBindError, Result};
use crate::schema::{Bounds, Descriptor, Kind};
use std::f64::consts::FRAC_PI_2;

/// Upper end of the control coordinate range `[0, CONTROL_MAX]`.
///
/// 6300 = 2² · 3² · 5² · 7 is divisible by a large number of small integers,
/// which minimizes rounding artifacts when mapping back to domain values
/// that are themselves rational with small denominators.
pub const CONTROL_MAX: i64 = 6300;

/// A resolved conversion between value domain and control coordinate
///
/// `to_control` and `from_control` are exact inverses of each other up to
/// floating point and target rounding; control coordinates `0` and
/// [`CONTROL_MAX`] map exactly onto finite bounds, bypassing the transform.
///
/// # Examples
///
/// ```
/// use parambind_rs::mapper::{Mapping, SliderMode, CONTROL_MAX};
/// use parambind_rs::schema::Bounds;
///
/// // [3, 1000] spans a factor of more than 50, so log is inferred
/// let mapping = Mapping::new(Bounds::new(3.0, 1000.0).unwrap(), None, false).unwrap();
/// assert_eq!(mapping.mode(), SliderMode::Log);
/// assert_eq!(mapping.to_control(3.0), 0);
/// assert_eq!(mapping.to_control(1000.0), CONTROL_MAX);
/// assert_eq!(mapping.from_control(0), 3.0);
/// ```
#[derive(Debug, Clone)]
pub struct Mapping {
    bounds: Bounds,
    mode: SliderMode,
    strength: f64,
    integral: bool,
    /// Interval the normalized coordinate `[0, 1]` is mapped onto before
    /// the nonlinear step.
    control_interval: (f64, f64),
    /// Final affine correction `(offset, scale)` onto the value domain.
    affine: Option<(f64, f64)>,
}

impl Mapping {
    /// Resolve a mapping for the given bounds
    ///
    /// # Arguments
    ///
    /// * `bounds` - value domain; sides may be infinite only in `tan` mode
    /// * `spec` - authored mode, or `None` to infer one from the bounds
    /// * `integral` - round mapped values to the nearest integer
    ///
    /// # Returns
    ///
    /// The mapping, or a configuration error for `log` with a non-positive
    /// lower bound, a non-`tan` mode with an infinite bound, or a
    /// degenerate interval.
    pub fn new(bounds: Bounds, spec: Option<ModeSpec>, integral: bool) -> Result<Self> {
        let spec = match spec {
            Some(spec) => {
                if bounds.has_infinite_side() && spec.mode != SliderMode::Tan {
                    return Err(ParamBindError::Configuration(format!(
                        "slider mode must be 'tan' when a bound is infinite, got '{}'",
                        spec.mode.as_str()
                    )));
                }
                spec
            }
            None => ModeSpec::infer(&bounds),
        };

        let (lo, hi) = (bounds.min, bounds.max);
        if spec.mode == SliderMode::Log && lo <= 0.0 {
            return Err(ParamBindError::Configuration(format!(
                "slider mode can't be 'log' if the lower bound isn't positive (got {})",
                lo
            )));
        }
        if lo == hi {
            return Err(ParamBindError::Configuration(format!(
                "slider needs a non-degenerate interval, got [{}, {}]",
                lo, hi
            )));
        }

        let (control_interval, affine) = match spec.mode {
            SliderMode::Linear => ((lo, hi), None),
            SliderMode::Log => ((lo.ln(), hi.ln()), None),
            SliderMode::Left => ((0.0, 1.0), Some((lo, hi - lo))),
            SliderMode::Right => ((1.0, 0.0), Some((hi, lo - hi))),
            SliderMode::Middle | SliderMode::Ext => {
                ((-1.0, 1.0), Some(((lo + hi) / 2.0, (hi - lo) / 2.0)))
            }
            SliderMode::Tan => {
                if !lo.is_finite() && !hi.is_finite() {
                    ((-1.0, 1.0), None)
                } else if !lo.is_finite() {
                    ((-1.0, 0.0), Some((hi, 1.0)))
                } else if !hi.is_finite() {
                    ((0.0, 1.0), Some((lo, 1.0)))
                } else {
                    ((lo.atan(), hi.atan()), None)
                }
            }
        };

        Ok(Self {
            bounds,
            mode: spec.mode,
            strength: spec.strength,
            integral,
            control_interval,
            affine,
        })
    }

    /// Resolve the mapping a slider bound to `descriptor` would use
    ///
    /// # Returns
    ///
    /// The mapping, or a configuration error when the parameter is not
    /// numeric, allows an absent value, has no bounds, or carries an invalid
    /// mode string.
    pub fn for_descriptor(descriptor: &Descriptor) -> Result<Self> {
        if !descriptor.kind().is_numeric() {
            return Err(ParamBindError::Configuration(format!(
                "slider control needs a numeric parameter, '{}' is a {}",
                descriptor.name(),
                descriptor.kind().display_name()
            )));
        }
        if descriptor.allow_none() {
            return Err(ParamBindError::Configuration(format!(
                "slider control not available for parameter '{}' allowing an absent value",
                descriptor.name()
            )));
        }
        let bounds = descriptor.bounds().copied().ok_or_else(|| {
            ParamBindError::Configuration(format!(
                "bounds need to be defined for slider control on '{}'",
                descriptor.name()
            ))
        })?;
        let spec = descriptor.slider_mode().map(ModeSpec::parse).transpose()?;
        Self::new(bounds, spec, descriptor.kind() == Kind::Integer)
    }

    pub fn mode(&self) -> SliderMode {
        self.mode
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn is_integral(&self) -> bool {
        self.integral
    }

    /// Map a control coordinate onto the value domain
    ///
    /// Coordinates `0` and [`CONTROL_MAX`] return finite bounds exactly; an
    /// infinite bound is instead sampled half a control step inside the
    /// extreme, keeping the result finite. Out-of-range coordinates are
    /// clamped first. For integral mappings the result is rounded to the
    /// nearest integer and clamped back into finite bounds.
    pub fn from_control(&self, x: i64) -> f64 {
        let (lo, hi) = (self.bounds.min, self.bounds.max);

        // Exact-endpoint short-circuit avoids floating-point drift
        if x <= 0 && lo.is_finite() {
            return lo;
        }
        if x >= CONTROL_MAX && hi.is_finite() {
            return hi;
        }

        let k = CONTROL_MAX as f64;
        let coordinate = if x <= 0 {
            0.5
        } else if x >= CONTROL_MAX {
            k - 0.5
        } else {
            x as f64
        };

        // Normalize, map onto the mode's working interval, then transform
        let u = coordinate / k;
        let (c0, c1) = self.control_interval;
        let mut value = c0 + (c1 - c0) * u;
        value = self.transform(value);
        if let Some((offset, scale)) = self.affine {
            value = offset + scale * value;
        }
        if self.integral {
            value = value.round();
        }
        if lo.is_finite() && value < lo {
            value = lo;
        }
        if hi.is_finite() && value > hi {
            value = hi;
        }
        value
    }

    /// Map a value onto the control coordinate range, rounding to the
    /// nearest coordinate.
    pub fn to_control(&self, value: f64) -> i64 {
        let mut x = value;
        if let Some((offset, scale)) = self.affine {
            x = (x - offset) / scale;
        }
        x = self.invert(x);
        let (c0, c1) = self.control_interval;
        let u = (x - c0) / (c1 - c0);
        ((CONTROL_MAX as f64 * u).round() as i64).clamp(0, CONTROL_MAX)
    }

    /// Nonlinear step, working interval -> value axis.
    fn transform(&self, x: f64) -> f64 {
        match self.mode {
            SliderMode::Linear => x,
            SliderMode::Log => x.exp(),
            SliderMode::Left | SliderMode::Right | SliderMode::Middle | SliderMode::Ext => {
                x.abs().powf(1.0 + self.strength).copysign(x)
            }
            SliderMode::Tan => (FRAC_PI_2 * x).tan() * self.strength,
        }
    }

    /// Inverse of [`Mapping::transform`].
    fn invert(&self, x: f64) -> f64 {
        match self.mode {
            SliderMode::Linear => x,
            SliderMode::Log => x.ln(),
            SliderMode::Left | SliderMode::Right | SliderMode::Middle | SliderMode::Ext => {
                x.abs().powf(1.0 / (1.0 + self.strength)).copysign(x)
            }
            SliderMode::Tan => (x / self.strength).atan() / FRAC_PI_2,
        }
    }
}
