//! Parameter descriptor definition and validation
//!
//! This module provides the Descriptor struct, the typed metadata record for
//! one parameter: kind, default, constraints, style hints and the dependency
//! lists its `visible`/`enabled` flags are derived from. Descriptors carry
//! no behavior beyond storage and validation; dependency evaluation lives in
//! the engine and value storage in the parameter set.

use crate::schema::bounds::{Bounds, BoundsError};
use crate::schema::dependency::{DependencySpec, FlagKind, FlagSpec};
use crate::schema::value::{Kind, Rgb, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised by schema construction and value validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("expected a {expected} value, got {got}")]
    TypeMismatch {
        expected: &'static str,
        got: String,
    },

    #[error("{0}")]
    OutOfBounds(#[from] BoundsError),

    #[error("value '{value}' is not among the allowed values")]
    NotAllowed { value: String },

    #[error("absent value is not allowed")]
    NoneNotAllowed,

    #[error("parameter '{name}' of kind {kind} cannot carry bounds")]
    BoundsOnNonNumeric { name: String, kind: &'static str },

    #[error("parameter '{name}' of kind {kind} cannot carry allowed values")]
    AllowedValuesOnNonSelection { name: String, kind: &'static str },

    #[error("parameter '{name}' is not a list and cannot carry an item kind")]
    ItemKindOnNonList { name: String },

    #[error("invalid default for parameter '{name}': {reason}")]
    InvalidDefault { name: String, reason: String },
}

/// Typed metadata record for one parameter
///
/// Created once at schema-declaration time; the dependency lists are fixed
/// at creation while the derived `visible`/`enabled` flags mutate throughout
/// the owning set's lifetime.
///
/// # Examples
///
/// ```
/// use parambind_rs::schema::{DependencySpec, Descriptor, FlagKind, Kind, Value};
///
/// let shape = Descriptor::new("shape", Kind::SingleSelect, "circle")
///     .with_allowed_values(["circle", "polygon", "star"].map(Value::from));
///
/// let n_edge = Descriptor::new("n_edge", Kind::Integer, 5)
///     .with_bounds(3.0, 20.0)
///     .unwrap()
///     .with_dependencies(
///         FlagKind::Visible,
///         vec![DependencySpec::value_in(
///             "shape",
///             [Value::from("polygon"), Value::from("star")],
///         )],
///     );
///
/// assert!(n_edge.flag_spec(FlagKind::Visible).is_derived());
/// assert!(n_edge.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Descriptor {
    name: String,
    kind: Kind,
    default: Value,
    bounds: Option<Bounds>,
    allowed_values: Vec<Value>,
    allow_none: bool,
    constant: bool,
    label: Option<String>,
    doc: Option<String>,
    style: Option<String>,
    slider_mode: Option<String>,
    item_kind: Option<Kind>,
    user: BTreeMap<String, serde_json::Value>,
    visible_spec: FlagSpec,
    enabled_spec: FlagSpec,

    // Derived state, written by the dependency engine
    visible: bool,
    enabled: bool,
}

impl Descriptor {
    /// Create a new descriptor with the given name, kind and default value.
    pub fn new(name: &str, kind: Kind, default: impl Into<Value>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            default: default.into(),
            bounds: None,
            allowed_values: Vec::new(),
            allow_none: false,
            constant: false,
            label: None,
            doc: None,
            style: None,
            slider_mode: None,
            item_kind: None,
            user: BTreeMap::new(),
            visible_spec: FlagSpec::default(),
            enabled_spec: FlagSpec::default(),
            visible: true,
            enabled: true,
        }
    }

    /// Attach numeric bounds. Only meaningful on numeric kinds; `validate`
    /// rejects bounds elsewhere.
    pub fn with_bounds(mut self, min: f64, max: f64) -> Result<Self, SchemaError> {
        self.bounds = Some(Bounds::new(min, max)?);
        Ok(self)
    }

    /// Attach the ordered allowed-value set of a selection kind.
    pub fn with_allowed_values(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.allowed_values = values.into_iter().collect();
        self
    }

    /// Whether the parameter may hold an absent value.
    pub fn with_allow_none(mut self, allow: bool) -> Self {
        self.allow_none = allow;
        self
    }

    /// Mark the parameter read-only: bindings display but never write it.
    pub fn with_constant(mut self, constant: bool) -> Self {
        self.constant = constant;
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_doc(mut self, doc: &str) -> Self {
        self.doc = Some(doc.to_string());
        self
    }

    /// Opaque style hint consumed by control selection.
    pub fn with_style(mut self, style: &str) -> Self {
        self.style = Some(style.to_string());
        self
    }

    /// Slider mode string, e.g. `"log"` or `"left 0.5"`. Parsed and checked
    /// when a mapping is built for the parameter.
    pub fn with_slider_mode(mut self, mode: &str) -> Self {
        self.slider_mode = Some(mode.to_string());
        self
    }

    /// Element kind of a `List` parameter, used for free-text parsing.
    pub fn with_item_kind(mut self, kind: Kind) -> Self {
        self.item_kind = Some(kind);
        self
    }

    /// Author a flag directly, as a literal or a dependency list.
    pub fn with_flag(mut self, flag: FlagKind, spec: FlagSpec) -> Self {
        match flag {
            FlagKind::Visible => {
                self.visible = spec.initial_value();
                self.visible_spec = spec;
            }
            FlagKind::Enabled => {
                self.enabled = spec.initial_value();
                self.enabled_spec = spec;
            }
        }
        self
    }

    /// Derive a flag from a dependency list.
    pub fn with_dependencies(self, flag: FlagKind, specs: Vec<DependencySpec>) -> Self {
        self.with_flag(flag, FlagSpec::DerivedFrom(specs))
    }

    /// Attach one user-extension entry. Unrecognized authored keys land here
    /// rather than in new struct fields.
    pub fn with_user(mut self, key: &str, value: serde_json::Value) -> Self {
        self.user.insert(key.to_string(), value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn default(&self) -> &Value {
        &self.default
    }

    pub fn bounds(&self) -> Option<&Bounds> {
        self.bounds.as_ref()
    }

    pub fn allowed_values(&self) -> &[Value] {
        &self.allowed_values
    }

    pub fn allow_none(&self) -> bool {
        self.allow_none
    }

    pub fn is_constant(&self) -> bool {
        self.constant
    }

    /// Display label, falling back to the parameter name.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn slider_mode(&self) -> Option<&str> {
        self.slider_mode.as_deref()
    }

    pub fn item_kind(&self) -> Option<Kind> {
        self.item_kind
    }

    pub fn user(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.user
    }

    /// How a flag is authored.
    pub fn flag_spec(&self, flag: FlagKind) -> &FlagSpec {
        match flag {
            FlagKind::Visible => &self.visible_spec,
            FlagKind::Enabled => &self.enabled_spec,
        }
    }

    /// Current derived flag state.
    pub fn flag(&self, flag: FlagKind) -> bool {
        match flag {
            FlagKind::Visible => self.visible,
            FlagKind::Enabled => self.enabled,
        }
    }

    /// Write a derived flag. Returns whether the stored state changed.
    pub fn set_flag(&mut self, flag: FlagKind, value: bool) -> bool {
        let slot = match flag {
            FlagKind::Visible => &mut self.visible,
            FlagKind::Enabled => &mut self.enabled,
        };
        let changed = *slot != value;
        *slot = value;
        changed
    }

    /// Check the schema itself for coherence.
    ///
    /// # Returns
    ///
    /// `Ok(())` for a well-formed descriptor, or the first problem found.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.bounds.is_some() && !self.kind.is_numeric() {
            return Err(SchemaError::BoundsOnNonNumeric {
                name: self.name.clone(),
                kind: self.kind.display_name(),
            });
        }
        if !self.allowed_values.is_empty() && !self.kind.is_selection() {
            return Err(SchemaError::AllowedValuesOnNonSelection {
                name: self.name.clone(),
                kind: self.kind.display_name(),
            });
        }
        if self.item_kind.is_some() && self.kind != Kind::List {
            return Err(SchemaError::ItemKindOnNonList {
                name: self.name.clone(),
            });
        }

        let default = self.coerce(self.default.clone());
        self.validate_value(&default)
            .map_err(|err| SchemaError::InvalidDefault {
                name: self.name.clone(),
                reason: err.to_string(),
            })
    }

    /// Validate a value against this descriptor's constraints: type, bounds,
    /// allowed-value membership and `allow_none`.
    pub fn validate_value(&self, value: &Value) -> Result<(), SchemaError> {
        if value.is_none() {
            return if self.allow_none {
                Ok(())
            } else {
                Err(SchemaError::NoneNotAllowed)
            };
        }

        match self.kind {
            Kind::Boolean | Kind::Integer | Kind::Number | Kind::String | Kind::Color => {
                if !scalar_matches(self.kind, value) {
                    return Err(SchemaError::TypeMismatch {
                        expected: self.kind.display_name(),
                        got: value.type_name().to_string(),
                    });
                }
                if self.kind.is_numeric() {
                    if let (Some(bounds), Some(x)) = (self.bounds, value.as_f64()) {
                        bounds.check(x)?;
                    }
                }
                Ok(())
            }
            Kind::SingleSelect => {
                if self.allowed_values.contains(value) {
                    Ok(())
                } else {
                    Err(SchemaError::NotAllowed {
                        value: value.to_string(),
                    })
                }
            }
            Kind::MultiSelect => {
                let items = value.as_list().ok_or(SchemaError::TypeMismatch {
                    expected: "list",
                    got: value.type_name().to_string(),
                })?;
                for item in items {
                    if !self.allowed_values.contains(item) {
                        return Err(SchemaError::NotAllowed {
                            value: item.to_string(),
                        });
                    }
                }
                Ok(())
            }
            Kind::List => {
                let items = value.as_list().ok_or(SchemaError::TypeMismatch {
                    expected: "list",
                    got: value.type_name().to_string(),
                })?;
                if let Some(item_kind) = self.item_kind {
                    for item in items {
                        if !scalar_matches(item_kind, item) {
                            return Err(SchemaError::TypeMismatch {
                                expected: item_kind.display_name(),
                                got: item.type_name().to_string(),
                            });
                        }
                    }
                }
                Ok(())
            }
        }
    }

    /// Normalize a value into this descriptor's canonical representation:
    /// integers widen to floats on `Number` parameters, hex strings become
    /// colors on `Color` parameters.
    pub fn coerce(&self, value: Value) -> Value {
        match (self.kind, value) {
            (Kind::Number, Value::Int(i)) => Value::Float(i as f64),
            (Kind::Color, Value::Str(s)) => match Rgb::from_hex(&s) {
                Ok(color) => Value::Color(color),
                Err(_) => Value::Str(s),
            },
            (_, value) => value,
        }
    }

    /// Build a descriptor from an authored schema record.
    pub fn from_spec(spec: DescriptorSpec) -> Result<Self, SchemaError> {
        let mut descriptor = Self::new(&spec.name, spec.kind, spec.default);
        descriptor.bounds = spec.bounds;
        descriptor.allowed_values = spec.values;
        descriptor.allow_none = spec.allow_none;
        descriptor.constant = spec.constant;
        descriptor.label = spec.label;
        descriptor.doc = spec.doc;
        descriptor.style = spec.style;
        descriptor.slider_mode = spec.mode;
        descriptor.item_kind = spec.item_kind;
        descriptor.user = spec.user;
        if let Some(visible) = spec.visible {
            descriptor = descriptor.with_flag(FlagKind::Visible, visible);
        }
        if let Some(enabled) = spec.enabled {
            descriptor = descriptor.with_flag(FlagKind::Enabled, enabled);
        }
        descriptor.default = descriptor.coerce(descriptor.default.clone());
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// The authored record equivalent of this descriptor.
    pub fn to_spec(&self) -> DescriptorSpec {
        DescriptorSpec {
            name: self.name.clone(),
            kind: self.kind,
            default: self.default.clone(),
            bounds: self.bounds,
            values: self.allowed_values.clone(),
            allow_none: self.allow_none,
            constant: self.constant,
            label: self.label.clone(),
            doc: self.doc.clone(),
            style: self.style.clone(),
            mode: self.slider_mode.clone(),
            item_kind: self.item_kind,
            visible: Some(self.visible_spec.clone()),
            enabled: Some(self.enabled_spec.clone()),
            user: self.user.clone(),
        }
    }
}

fn scalar_matches(kind: Kind, value: &Value) -> bool {
    match kind {
        Kind::Boolean => matches!(value, Value::Bool(_)),
        Kind::Integer => matches!(value, Value::Int(_)),
        Kind::Number => matches!(value, Value::Int(_) | Value::Float(_)),
        Kind::String => matches!(value, Value::Str(_)),
        Kind::Color => match value {
            Value::Color(_) => true,
            Value::Str(s) => Rgb::from_hex(s).is_ok(),
            _ => false,
        },
        Kind::SingleSelect | Kind::MultiSelect | Kind::List => false,
    }
}

/// Declarative schema record for one parameter, as authored
///
/// Each kind's recognized options are exactly the named fields below; any
/// other authored key is routed into the `user` extension map by the
/// flattened catch-all rather than interpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptorSpec {
    pub name: String,

    pub kind: Kind,

    #[serde(default)]
    pub default: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,

    /// Allowed values of a selection kind, in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<Value>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub allow_none: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub constant: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    /// Slider mode string, e.g. `"log"` or `"middle 2"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_kind: Option<Kind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<FlagSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<FlagSpec>,

    /// User extensions: every authored key not recognized above.
    #[serde(flatten)]
    pub user: BTreeMap<String, serde_json::Value>,
}

fn is_false(b: &bool) -> bool {
    !*b
}
