//! Dynamic parameter values
//!
//! This module provides the Value enum, the dynamically typed payload every
//! parameter carries at runtime, together with the Kind enum describing the
//! static type a descriptor declares, and a small Rgb color type carried as
//! `#rrggbb` text at the API surface.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error raised when a color string cannot be parsed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColorParseError {
    #[error("'{input}' is not a '#rrggbb' color")]
    Malformed { input: String },
}

/// A 24-bit RGB color, written as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parse a `#rrggbb` string; the leading `#` is optional.
    ///
    /// # Examples
    ///
    /// ```
    /// use parambind_rs::schema::Rgb;
    ///
    /// let red = Rgb::from_hex("#ff0000").unwrap();
    /// assert_eq!(red, Rgb { r: 255, g: 0, b: 0 });
    /// assert!(Rgb::from_hex("not a color").is_err());
    /// ```
    pub fn from_hex(input: &str) -> Result<Self, ColorParseError> {
        let digits = input.strip_prefix('#').unwrap_or(input);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::Malformed {
                input: input.to_string(),
            });
        }
        let parse = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| ColorParseError::Malformed {
                input: input.to_string(),
            })
        };
        Ok(Self {
            r: parse(0..2)?,
            g: parse(2..4)?,
            b: parse(4..6)?,
        })
    }

    /// Format as a `#rrggbb` string.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Mean of the three channels, in `[0, 255]`.
    ///
    /// Hosts use this to pick a readable foreground on top of the color.
    pub fn luminance(self) -> f64 {
        (self.r as f64 + self.g as f64 + self.b as f64) / 3.0
    }

    /// Whether a light foreground should be used on top of this color.
    pub fn is_dark(self) -> bool {
        self.luminance() <= 128.0
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Rgb {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Rgb::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

/// The typed kinds a parameter descriptor can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Kind {
    Boolean,
    Integer,
    Number,
    String,
    Color,
    SingleSelect,
    MultiSelect,
    List,
}

impl Kind {
    /// Whether values of this kind live on a numeric axis.
    pub fn is_numeric(self) -> bool {
        matches!(self, Kind::Integer | Kind::Number)
    }

    /// Whether this kind draws its values from an allowed-value set.
    pub fn is_selection(self) -> bool {
        matches!(self, Kind::SingleSelect | Kind::MultiSelect)
    }

    /// Human-readable name, used in error messages.
    pub fn display_name(self) -> &'static str {
        match self {
            Kind::Boolean => "boolean",
            Kind::Integer => "integer",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Color => "color",
            Kind::SingleSelect => "selection",
            Kind::MultiSelect => "multi-selection",
            Kind::List => "list",
        }
    }
}

/// A dynamically typed parameter value
///
/// `Value::None` represents the absent value of a parameter that allows one.
/// Variant order matters for the untagged serde representation: `Color` must
/// come before `Str` so `#rrggbb` strings round-trip as colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Color(Rgb),
    Str(String),
    List(Vec<Value>),
}

impl Default for Value {
    fn default() -> Self {
        Value::None
    }
}

impl Value {
    /// Whether this is the absent value.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Truthiness as used by dependency specs without an accepted-value set:
    /// non-zero, non-empty, non-false, non-absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use parambind_rs::schema::Value;
    ///
    /// assert!(Value::Int(3).is_truthy());
    /// assert!(!Value::Str(String::new()).is_truthy());
    /// assert!(!Value::None.is_truthy());
    /// ```
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Color(_) => true,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
        }
    }

    /// Numeric view of the value, for `Int` and `Float` variants.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Rgb> {
        match self {
            Value::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Lowercase name of the runtime type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "number",
            Value::Color(_) => "color",
            Value::Str(_) => "string",
            Value::List(_) => "list",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "none"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Color(c) => write!(f, "{}", c),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => {
                let mut first = true;
                for item in items {
                    if !first {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                    first = false;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Rgb> for Value {
    fn from(c: Rgb) -> Self {
        Value::Color(c)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}
