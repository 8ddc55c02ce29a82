//! Value formatting and free-text parsing
//!
//! Conversions between parameter values and the text shown in (or typed
//! into) controls, plus the per-kind example-value policy used when a
//! presence toggle needs to materialize a concrete value.

use crate::error::{ParamBindError, Result};
use crate::schema::{Descriptor, Kind, Rgb, Value};

/// The 16 basic color names, used to prefix a recognizable name onto the
/// hex code in color displays.
const NAMED_COLORS: [(&str, Rgb); 16] = [
    ("black", Rgb { r: 0x00, g: 0x00, b: 0x00 }),
    ("white", Rgb { r: 0xff, g: 0xff, b: 0xff }),
    ("red", Rgb { r: 0xff, g: 0x00, b: 0x00 }),
    ("lime", Rgb { r: 0x00, g: 0xff, b: 0x00 }),
    ("blue", Rgb { r: 0x00, g: 0x00, b: 0xff }),
    ("yellow", Rgb { r: 0xff, g: 0xff, b: 0x00 }),
    ("cyan", Rgb { r: 0x00, g: 0xff, b: 0xff }),
    ("magenta", Rgb { r: 0xff, g: 0x00, b: 0xff }),
    ("silver", Rgb { r: 0xc0, g: 0xc0, b: 0xc0 }),
    ("gray", Rgb { r: 0x80, g: 0x80, b: 0x80 }),
    ("maroon", Rgb { r: 0x80, g: 0x00, b: 0x00 }),
    ("olive", Rgb { r: 0x80, g: 0x80, b: 0x00 }),
    ("green", Rgb { r: 0x00, g: 0x80, b: 0x00 }),
    ("purple", Rgb { r: 0x80, g: 0x00, b: 0x80 }),
    ("teal", Rgb { r: 0x00, g: 0x80, b: 0x80 }),
    ("navy", Rgb { r: 0x00, g: 0x00, b: 0x80 }),
];

/// Name of a color, when it is one of the basic named colors.
pub fn color_name(color: Rgb) -> Option<&'static str> {
    NAMED_COLORS
        .iter()
        .find(|(_, c)| *c == color)
        .map(|(name, _)| *name)
}

/// Format a value for display in a control or its label
///
/// Numbers get a magnitude-dependent significant-digit treatment so sliders
/// show a reasonable number of decimals; whole floats carry a trailing dot
/// to distinguish them from integers; colors show a recognizable name next
/// to the hex code when one exists.
pub fn display_text(value: &Value, descriptor: &Descriptor) -> String {
    if value.is_none() {
        return "(none)".to_string();
    }
    match descriptor.kind() {
        Kind::Number => match value {
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format_number(*f),
            other => other.to_string(),
        },
        Kind::Color => match value.as_color() {
            Some(color) => match color_name(color) {
                Some(name) => format!("{} ({})", name, color.to_hex()),
                None => color.to_hex(),
            },
            None => value.to_string(),
        },
        _ => value.to_string(),
    }
}

fn format_number(f: f64) -> String {
    let a = f.abs();
    if f.fract() == 0.0 && a.is_finite() {
        if a < 1e7 {
            format!("{:.0}.", f)
        } else {
            format_general(f, 3)
        }
    } else if a < 1.0 {
        format_general(f, 3)
    } else if a < 1e3 {
        format_general(f, 4)
    } else if a < 1e4 {
        format!("{}.", format_general(f, 4))
    } else {
        format_general(f, 3)
    }
}

/// Format with `sig` significant digits, switching to scientific notation
/// for very small or very large magnitudes, trailing zeros trimmed.
fn format_general(v: f64, sig: usize) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    if !v.is_finite() {
        return v.to_string();
    }
    let exponent = v.abs().log10().floor() as i32;
    if exponent < -4 || exponent >= sig as i32 {
        let text = format!("{:.*e}", sig.saturating_sub(1), v);
        // Trim trailing zeros in the mantissa: "1.200e7" -> "1.2e7"
        match text.split_once('e') {
            Some((mantissa, exp)) => {
                let mantissa = if mantissa.contains('.') {
                    mantissa.trim_end_matches('0').trim_end_matches('.')
                } else {
                    mantissa
                };
                format!("{}e{}", mantissa, exp)
            }
            None => text,
        }
    } else {
        let decimals = (sig as i32 - 1 - exponent).max(0) as usize;
        let text = format!("{:.*}", decimals, v);
        if text.contains('.') {
            text.trim_end_matches('0').trim_end_matches('.').to_string()
        } else {
            text
        }
    }
}

/// Parse free-text control content into the parameter's domain
///
/// # Returns
///
/// The parsed value, or a format error naming the expected kind. The text
/// `none` (any case) parses to the absent value when the parameter allows
/// one.
pub fn parse_text(text: &str, descriptor: &Descriptor) -> Result<Value> {
    let trimmed = text.trim();
    if descriptor.allow_none() && trimmed.eq_ignore_ascii_case("none") {
        return Ok(Value::None);
    }
    match descriptor.kind() {
        Kind::String => Ok(Value::Str(text.to_string())),
        Kind::Boolean | Kind::Integer | Kind::Number | Kind::Color => {
            parse_scalar(trimmed, descriptor.kind())
        }
        Kind::List => {
            let item_kind = descriptor.item_kind().unwrap_or(Kind::String);
            let items = trimmed
                .split_whitespace()
                .map(|item| parse_scalar(item, item_kind))
                .collect::<Result<Vec<Value>>>()?;
            Ok(Value::List(items))
        }
        Kind::SingleSelect => lookup_allowed(trimmed, descriptor),
        Kind::MultiSelect => {
            let items = trimmed
                .split_whitespace()
                .map(|item| lookup_allowed(item, descriptor))
                .collect::<Result<Vec<Value>>>()?;
            Ok(Value::List(items))
        }
    }
}

fn parse_scalar(text: &str, kind: Kind) -> Result<Value> {
    let format_error = || ParamBindError::Format {
        expected: kind.display_name().to_string(),
    };
    match kind {
        Kind::Boolean => match text.to_ascii_lowercase().as_str() {
            "true" | "on" | "1" => Ok(Value::Bool(true)),
            "false" | "off" | "0" => Ok(Value::Bool(false)),
            _ => Err(format_error()),
        },
        Kind::Integer => text
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| format_error()),
        Kind::Number => text
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| format_error()),
        Kind::Color => Rgb::from_hex(text)
            .map(Value::Color)
            .map_err(|_| format_error()),
        Kind::String => Ok(Value::Str(text.to_string())),
        Kind::SingleSelect | Kind::MultiSelect | Kind::List => Err(format_error()),
    }
}

fn lookup_allowed(text: &str, descriptor: &Descriptor) -> Result<Value> {
    descriptor
        .allowed_values()
        .iter()
        .find(|value| value.to_string() == text)
        .cloned()
        .ok_or_else(|| ParamBindError::Format {
            expected: "one of the allowed values".to_string(),
        })
}

/// Derive an example non-absent value for a parameter
///
/// Used when a presence toggle switches from absent to present and no
/// concrete value exists yet: the default when there is one, otherwise a
/// per-kind fallback.
///
/// # Returns
///
/// A value that passes the descriptor's own validation, or a configuration
/// error when none can be derived (e.g. a selection kind with an empty
/// allowed-value set).
pub fn example_value(descriptor: &Descriptor) -> Result<Value> {
    if !descriptor.default().is_none() {
        return Ok(descriptor.default().clone());
    }
    match descriptor.kind() {
        Kind::Boolean => Ok(Value::Bool(false)),
        Kind::Integer | Kind::Number => {
            let zero = if descriptor.kind() == Kind::Integer {
                Value::Int(0)
            } else {
                Value::Float(0.0)
            };
            if descriptor.validate_value(&zero).is_ok() {
                return Ok(zero);
            }
            let clamped = descriptor
                .bounds()
                .map(|bounds| bounds.clamp(0.0))
                .unwrap_or(0.0);
            if !clamped.is_finite() {
                return Err(ParamBindError::Configuration(format!(
                    "cannot derive an example value for parameter '{}'",
                    descriptor.name()
                )));
            }
            Ok(if descriptor.kind() == Kind::Integer {
                Value::Int(clamped as i64)
            } else {
                Value::Float(clamped)
            })
        }
        Kind::String => {
            let empty = Value::Str(String::new());
            descriptor
                .validate_value(&empty)
                .map_err(|_| {
                    ParamBindError::Configuration(format!(
                        "cannot derive an example string value for parameter '{}'",
                        descriptor.name()
                    ))
                })
                .map(|_| empty)
        }
        Kind::Color => Ok(Value::Color(Rgb { r: 0, g: 0, b: 0 })),
        Kind::SingleSelect => {
            descriptor.allowed_values().first().cloned().ok_or_else(|| {
                ParamBindError::Configuration(format!(
                    "cannot derive an example value for selection parameter '{}' \
                     with an empty allowed-value set",
                    descriptor.name()
                ))
            })
        }
        Kind::MultiSelect | Kind::List => Ok(Value::List(Vec::new())),
    }
}
