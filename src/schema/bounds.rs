//! Parameter bounds implementation
//!
//! This module provides functionality for defining and checking numeric
//! parameter bounds. Either side may be infinite; infinite sides serialize
//! as `null` so authored schemas can simply omit them.

use serde::{Deserialize, Serialize};
use std::f64::{INFINITY, NEG_INFINITY};
use thiserror::Error;

/// Errors that can occur when working with parameter bounds
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundsError {
    #[error("Invalid bounds: min ({min}) must be less than max ({max})")]
    InvalidBounds { min: f64, max: f64 },

    #[error("value {value} is outside bounds [{min}, {max}]")]
    ValueOutsideBounds { value: f64, min: f64, max: f64 },
}

/// Represents the bounds constraints on a numeric parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum allowed value for the parameter
    pub min: f64,

    /// Maximum allowed value for the parameter
    pub max: f64,
}

impl Serialize for Bounds {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Bounds", 2)?;

        // Handle infinity values specially
        if self.min.is_infinite() && self.min.is_sign_negative() {
            state.serialize_field("min", &serde_json::Value::Null)?;
        } else {
            state.serialize_field("min", &self.min)?;
        }

        if self.max.is_infinite() && self.max.is_sign_positive() {
            state.serialize_field("max", &serde_json::Value::Null)?;
        } else {
            state.serialize_field("max", &self.max)?;
        }

        state.end()
    }
}

impl<'de> Deserialize<'de> for Bounds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct BoundsHelper {
            #[serde(default)]
            min: Option<f64>,

            #[serde(default)]
            max: Option<f64>,
        }

        let helper = BoundsHelper::deserialize(deserializer)?;

        let min = helper.min.unwrap_or(NEG_INFINITY);
        let max = helper.max.unwrap_or(INFINITY);

        Ok(Bounds { min, max })
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: NEG_INFINITY,
            max: INFINITY,
        }
    }
}

impl Bounds {
    /// Create a new bounds constraint with min and max values
    ///
    /// # Arguments
    ///
    /// * `min` - Minimum allowed value for the parameter
    /// * `max` - Maximum allowed value for the parameter
    ///
    /// # Returns
    ///
    /// A new `Bounds` object if min <= max, or an error otherwise
    ///
    /// # Examples
    ///
    /// ```
    /// use parambind_rs::schema::Bounds;
    ///
    /// let bounds = Bounds::new(0.0, 10.0).unwrap();
    /// assert_eq!(bounds.min, 0.0);
    /// assert_eq!(bounds.max, 10.0);
    /// ```
    pub fn new(min: f64, max: f64) -> Result<Self, BoundsError> {
        if min > max {
            return Err(BoundsError::InvalidBounds { min, max });
        }

        Ok(Self { min, max })
    }

    /// Create an unbounded constraint (negative infinity to positive infinity)
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Create a bounds constraint with only a minimum value
    pub fn min_only(min: f64) -> Self {
        Self { min, max: INFINITY }
    }

    /// Create a bounds constraint with only a maximum value
    pub fn max_only(max: f64) -> Self {
        Self {
            min: NEG_INFINITY,
            max,
        }
    }

    /// Check whether a value lies within the bounds (inclusive)
    pub fn is_within_bounds(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Validate a value against the bounds
    pub fn check(&self, value: f64) -> Result<(), BoundsError> {
        if self.is_within_bounds(value) {
            Ok(())
        } else {
            Err(BoundsError::ValueOutsideBounds {
                value,
                min: self.min,
                max: self.max,
            })
        }
    }

    /// Clamp a value into the bounds
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    /// Whether both sides are finite
    pub fn is_fully_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Whether at least one side is infinite
    pub fn has_infinite_side(&self) -> bool {
        !self.is_fully_finite()
    }
}
