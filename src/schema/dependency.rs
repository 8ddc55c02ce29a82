//! Declarative visibility and enablement rules
//!
//! A descriptor's `visible` and `enabled` flags are either authored as
//! literal booleans or derived from a list of dependency specs referencing
//! other parameters of the same set. All specs in a list must be satisfied
//! (logical AND) for the flag to be true.

use crate::schema::value::Value;
use serde::{Deserialize, Serialize};

/// The two derived flags a dependency list can gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    Visible,
    Enabled,
}

impl FlagKind {
    /// Both flag kinds, in evaluation order.
    pub const ALL: [FlagKind; 2] = [FlagKind::Visible, FlagKind::Enabled];

    pub fn as_str(self) -> &'static str {
        match self {
            FlagKind::Visible => "visible",
            FlagKind::Enabled => "enabled",
        }
    }
}

/// One rule gating a flag on another parameter's current value
///
/// Without an accepted-value set the rule is satisfied by any truthy value;
/// with one, by membership.
///
/// # Examples
///
/// ```
/// use parambind_rs::schema::{DependencySpec, Value};
///
/// let spec = DependencySpec::truthy("use_marker");
/// assert!(spec.is_satisfied_by(&Value::Bool(true)));
/// assert!(!spec.is_satisfied_by(&Value::Bool(false)));
///
/// let spec = DependencySpec::value_in("shape", [Value::from("polygon"), Value::from("star")]);
/// assert!(spec.is_satisfied_by(&Value::from("star")));
/// assert!(!spec.is_satisfied_by(&Value::from("circle")));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencySpec {
    /// Name of the referenced parameter within the same set.
    pub param: String,

    /// Accepted values; `None` means "any truthy value".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted: Option<Vec<Value>>,
}

impl DependencySpec {
    /// Rule satisfied whenever the referenced parameter is truthy.
    pub fn truthy(param: &str) -> Self {
        Self {
            param: param.to_string(),
            accepted: None,
        }
    }

    /// Rule satisfied when the referenced parameter's value is a member of
    /// `accepted`.
    pub fn value_in(param: &str, accepted: impl IntoIterator<Item = Value>) -> Self {
        Self {
            param: param.to_string(),
            accepted: Some(accepted.into_iter().collect()),
        }
    }

    /// Whether `value` satisfies this spec.
    pub fn is_satisfied_by(&self, value: &Value) -> bool {
        match &self.accepted {
            None => value.is_truthy(),
            Some(accepted) => accepted.contains(value),
        }
    }
}

/// How a flag is authored: a literal boolean or derived from dependencies
///
/// The untagged serde shape lets authored schemas write `"visible": false`
/// and `"visible": [{"param": "shape", "accepted": ["star"]}]` with the same
/// key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagSpec {
    Literal(bool),
    DerivedFrom(Vec<DependencySpec>),
}

impl Default for FlagSpec {
    fn default() -> Self {
        FlagSpec::Literal(true)
    }
}

impl FlagSpec {
    /// Whether this flag is derived from a dependency list.
    ///
    /// An empty list still counts as derived; it evaluates to `true`.
    pub fn is_derived(&self) -> bool {
        matches!(self, FlagSpec::DerivedFrom(_))
    }

    /// The dependency specs, if derived.
    pub fn specs(&self) -> &[DependencySpec] {
        match self {
            FlagSpec::Literal(_) => &[],
            FlagSpec::DerivedFrom(specs) => specs,
        }
    }

    /// Names of the parameters this flag references.
    pub fn referenced_params(&self) -> impl Iterator<Item = &str> {
        self.specs().iter().map(|spec| spec.param.as_str())
    }

    /// The flag value before any evaluation has run: the literal itself, or
    /// `true` for derived flags (no constraint violated yet).
    pub fn initial_value(&self) -> bool {
        match self {
            FlagSpec::Literal(b) => *b,
            FlagSpec::DerivedFrom(_) => true,
        }
    }
}
