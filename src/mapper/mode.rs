//! Slider mode parsing and inference
//!
//! A mapping mode is authored as a short string: a keyword optionally
//! followed by a strength, e.g. `"log"`, `"left 0.5"`, `"tan 2"`. When no
//! mode is authored it is inferred from the bounds.

use crate::error::{ParamBindError, Result};
use crate::schema::Bounds;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::multispace0,
    combinator::{opt, value},
    number::complete::double,
    sequence::preceded,
    IResult, Parser,
};

/// The seven mapping modes of the value mapper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderMode {
    /// Linear control between min and max.
    Linear,
    /// Logarithmic control; requires a positive lower bound.
    Log,
    /// Finer grain near min, coarser near max.
    Left,
    /// Finer grain near max.
    Right,
    /// Finer grain near the interval center.
    Middle,
    /// Alias of `Middle`.
    Ext,
    /// Tangent control; the only mode that accepts infinite bounds.
    Tan,
}

impl SliderMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SliderMode::Linear => "linear",
            SliderMode::Log => "log",
            SliderMode::Left => "left",
            SliderMode::Right => "right",
            SliderMode::Middle => "middle",
            SliderMode::Ext => "ext",
            SliderMode::Tan => "tan",
        }
    }
}

/// A fully resolved mode: keyword plus strength
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeSpec {
    pub mode: SliderMode,
    /// Effect strength; defaults to 1. For the power-law modes it steepens
    /// the curve, for `tan` it controls the slope near the finite side (or
    /// near zero if both sides are infinite).
    pub strength: f64,
}

impl ModeSpec {
    /// Parse a mode string like `"log"` or `"middle 2"`
    ///
    /// # Returns
    ///
    /// The parsed spec, or a configuration error for an unknown keyword,
    /// trailing garbage or a non-positive strength.
    ///
    /// # Examples
    ///
    /// ```
    /// use parambind_rs::mapper::{ModeSpec, SliderMode};
    ///
    /// let spec = ModeSpec::parse("left 0.5").unwrap();
    /// assert_eq!(spec.mode, SliderMode::Left);
    /// assert_eq!(spec.strength, 0.5);
    ///
    /// let spec = ModeSpec::parse("log").unwrap();
    /// assert_eq!(spec.strength, 1.0);
    ///
    /// assert!(ModeSpec::parse("cubic").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        match mode_spec(input) {
            Ok((rest, (mode, strength))) if rest.trim().is_empty() => {
                let strength = strength.unwrap_or(1.0);
                if strength <= 0.0 {
                    return Err(ParamBindError::Configuration(format!(
                        "slider mode strength must be positive, got {}",
                        strength
                    )));
                }
                Ok(ModeSpec { mode, strength })
            }
            Ok((rest, _)) => Err(ParamBindError::Configuration(format!(
                "unexpected trailing characters '{}' in slider mode '{}'",
                rest.trim(),
                input
            ))),
            Err(_) => Err(ParamBindError::Configuration(format!(
                "'{}' is not a valid slider mode",
                input
            ))),
        }
    }

    /// Infer a mode from the bounds when none is authored:
    /// an infinite side forces `tan`; an interval symmetric about 0 or about
    /// 1 gets `middle`; a positive interval spanning a factor of at least 50
    /// gets `log`; everything else is `linear`.
    pub fn infer(bounds: &Bounds) -> Self {
        let (lo, hi) = (bounds.min, bounds.max);
        let mode = if bounds.has_infinite_side() {
            SliderMode::Tan
        } else if lo == -hi || (lo >= 0.0 && lo + hi == 2.0) {
            SliderMode::Middle
        } else if lo > 0.0 && hi >= 50.0 * lo {
            SliderMode::Log
        } else {
            SliderMode::Linear
        };
        ModeSpec {
            mode,
            strength: 1.0,
        }
    }
}

fn mode_keyword(input: &str) -> IResult<&str, SliderMode> {
    alt((
        value(SliderMode::Linear, tag("linear")),
        value(SliderMode::Log, tag("log")),
        value(SliderMode::Left, tag("left")),
        value(SliderMode::Right, tag("right")),
        value(SliderMode::Middle, tag("middle")),
        value(SliderMode::Ext, tag("ext")),
        value(SliderMode::Tan, tag("tan")),
    ))
    .parse(input)
}

fn mode_spec(input: &str) -> IResult<&str, (SliderMode, Option<f64>)> {
    (
        preceded(multispace0, mode_keyword),
        opt(preceded(multispace0, double)),
    )
        .parse(input)
}
