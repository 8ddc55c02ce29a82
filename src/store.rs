//! Parameter set implementation
//!
//! This module provides the ParamSet struct, the owning object of a group of
//! parameters. It stores descriptors and current values, validates writes,
//! and feeds the watch bus. The two-step write surface (`set_pending` then
//! `flush_watchers`) is what the binding controller's transactional protocol
//! is built on: a value can be validated and stored without yet running any
//! side-effecting watcher.

use crate::error::{ParamBindError, Result};
use crate::schema::{Descriptor, DescriptorSpec, FlagKind, Value};
use crate::watch::{ChangeEvent, ChangeKind, WatchBus, WatchId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::rc::{Rc, Weak};

struct State {
    /// Declaration order of parameter names.
    order: Vec<String>,
    descriptors: HashMap<String, Descriptor>,
    values: HashMap<String, Value>,
}

struct Shared {
    state: RefCell<State>,
    bus: WatchBus,
}

/// A set of parameters with validated storage and change notification
///
/// `ParamSet` is a cheap handle (`Clone` shares the same underlying set).
/// All access is single-threaded; watchers run synchronously on the calling
/// stack.
///
/// # Examples
///
/// ```
/// use parambind_rs::schema::{Descriptor, Kind, Value};
/// use parambind_rs::store::ParamSet;
///
/// let set = ParamSet::new();
/// set.add(Descriptor::new("gain", Kind::Number, 1.0).with_bounds(0.0, 10.0).unwrap())
///     .unwrap();
///
/// set.set("gain", 2.5).unwrap();
/// assert_eq!(set.get("gain").unwrap(), Value::Float(2.5));
///
/// // Out-of-bounds writes are rejected and leave the value unchanged
/// assert!(set.set("gain", 99.0).is_err());
/// assert_eq!(set.get("gain").unwrap(), Value::Float(2.5));
/// ```
#[derive(Clone)]
pub struct ParamSet {
    shared: Rc<Shared>,
}

/// Non-owning handle to a [`ParamSet`], used by watcher callbacks to avoid
/// reference cycles through the bus.
#[derive(Clone, Debug)]
pub struct WeakParamSet(Weak<Shared>);

impl WeakParamSet {
    pub fn upgrade(&self) -> Option<ParamSet> {
        self.0.upgrade().map(|shared| ParamSet { shared })
    }
}

impl Default for ParamSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamSet {
    /// Create a new empty parameter set.
    pub fn new() -> Self {
        Self {
            shared: Rc::new(Shared {
                state: RefCell::new(State {
                    order: Vec::new(),
                    descriptors: HashMap::new(),
                    values: HashMap::new(),
                }),
                bus: WatchBus::new(),
            }),
        }
    }

    /// Downgrade to a non-owning handle.
    pub fn downgrade(&self) -> WeakParamSet {
        WeakParamSet(Rc::downgrade(&self.shared))
    }

    /// Add a parameter to the set
    ///
    /// The descriptor is validated, and its (coerced) default becomes the
    /// initial value.
    ///
    /// # Returns
    ///
    /// `Ok(())` on success, or a configuration error for a malformed
    /// descriptor or duplicate name.
    pub fn add(&self, descriptor: Descriptor) -> Result<()> {
        descriptor.validate()?;
        let name = descriptor.name().to_string();
        let initial = descriptor.coerce(descriptor.default().clone());

        let mut state = self.shared.state.borrow_mut();
        if state.descriptors.contains_key(&name) {
            return Err(ParamBindError::Configuration(format!(
                "parameter '{}' declared twice",
                name
            )));
        }
        state.order.push(name.clone());
        state.values.insert(name.clone(), initial);
        state.descriptors.insert(name, descriptor);
        Ok(())
    }

    /// Build a set from authored schema records, in order.
    pub fn from_specs(specs: impl IntoIterator<Item = DescriptorSpec>) -> Result<Self> {
        let set = Self::new();
        for spec in specs {
            set.add(Descriptor::from_spec(spec)?)?;
        }
        Ok(set)
    }

    /// Build a set from a JSON array of schema records.
    pub fn from_schema_json(json: &str) -> Result<Self> {
        let specs: Vec<DescriptorSpec> = serde_json::from_str(json)?;
        Self::from_specs(specs)
    }

    /// Serialize the schema (not the current values) as a JSON array.
    pub fn to_schema_json(&self) -> Result<String> {
        let state = self.shared.state.borrow();
        let specs: Vec<DescriptorSpec> = state
            .order
            .iter()
            .filter_map(|name| state.descriptors.get(name))
            .map(|d| d.to_spec())
            .collect();
        Ok(serde_json::to_string_pretty(&specs)?)
    }

    /// Load a schema from a JSON file.
    pub fn load_schema<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::from_schema_json(&contents)
    }

    /// Save the schema to a JSON file.
    pub fn save_schema<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = self.to_schema_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Parameter names in declaration order.
    pub fn names(&self) -> Vec<String> {
        self.shared.state.borrow().order.clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.shared.state.borrow().descriptors.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.shared.state.borrow().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A snapshot of the parameter's descriptor.
    pub fn descriptor(&self, name: &str) -> Result<Descriptor> {
        self.shared
            .state
            .borrow()
            .descriptors
            .get(name)
            .cloned()
            .ok_or_else(|| ParamBindError::ParameterNotFound(name.to_string()))
    }

    /// The parameter's current value.
    pub fn get(&self, name: &str) -> Result<Value> {
        self.shared
            .state
            .borrow()
            .values
            .get(name)
            .cloned()
            .ok_or_else(|| ParamBindError::ParameterNotFound(name.to_string()))
    }

    /// Check a value against the parameter's constraints without storing it.
    pub fn validate(&self, name: &str, value: &Value) -> Result<()> {
        let state = self.shared.state.borrow();
        let descriptor = state
            .descriptors
            .get(name)
            .ok_or_else(|| ParamBindError::ParameterNotFound(name.to_string()))?;
        let coerced = descriptor.coerce(value.clone());
        descriptor
            .validate_value(&coerced)
            .map_err(|err| ParamBindError::Validation {
                name: name.to_string(),
                message: err.to_string(),
            })
    }

    /// Validate and store a value, queueing the change notification without
    /// dispatching it
    ///
    /// Writing the current value back is a no-op: nothing is stored and no
    /// notification is queued.
    ///
    /// # Returns
    ///
    /// `Ok(())` once the value is stored (or unchanged), or a validation
    /// error leaving the stored value untouched.
    pub fn set_pending(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let changed = {
            let mut guard = self.shared.state.borrow_mut();
            let state = &mut *guard;
            let descriptor = state
                .descriptors
                .get(name)
                .ok_or_else(|| ParamBindError::ParameterNotFound(name.to_string()))?;
            let coerced = descriptor.coerce(value);
            descriptor
                .validate_value(&coerced)
                .map_err(|err| ParamBindError::Validation {
                    name: name.to_string(),
                    message: err.to_string(),
                })?;
            if state.values.get(name) == Some(&coerced) {
                false
            } else {
                state.values.insert(name.to_string(), coerced);
                true
            }
        };
        if changed {
            self.shared.bus.push(ChangeEvent {
                name: name.to_string(),
                kind: ChangeKind::Value,
            });
        }
        Ok(())
    }

    /// Dispatch queued change notifications. See [`WatchBus::flush`]
    /// semantics for reentrancy and failure behavior.
    pub fn flush_watchers(&self) -> Result<()> {
        self.shared.bus.flush()
    }

    /// Validate, store and notify in one step.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.set_pending(name, value)?;
        self.flush_watchers()
    }

    /// Restore the parameter's default value through the validated path.
    pub fn reset(&self, name: &str) -> Result<()> {
        let default = self.descriptor(name)?.default().clone();
        self.set(name, default)
    }

    /// Current state of a derived flag.
    pub fn flag(&self, name: &str, flag: FlagKind) -> Result<bool> {
        Ok(self.descriptor(name)?.flag(flag))
    }

    /// Write a derived flag, notifying watchers when the state changes.
    ///
    /// Called by the dependency engine; hosts normally never write flags
    /// directly on parameters whose flags are derived.
    pub fn set_flag(&self, name: &str, flag: FlagKind, value: bool) -> Result<()> {
        let changed = {
            let mut state = self.shared.state.borrow_mut();
            let descriptor = state
                .descriptors
                .get_mut(name)
                .ok_or_else(|| ParamBindError::ParameterNotFound(name.to_string()))?;
            descriptor.set_flag(flag, value)
        };
        if changed {
            tracing::debug!(parameter = name, flag = flag.as_str(), value, "flag changed");
            self.shared.bus.notify(ChangeEvent {
                name: name.to_string(),
                kind: ChangeKind::Flag(flag),
            })?;
        }
        Ok(())
    }

    /// Subscribe a watcher to changes of `kind` on parameter `name`.
    pub fn watch(
        &self,
        name: &str,
        kind: ChangeKind,
        callback: impl FnMut(&ChangeEvent) -> Result<()> + 'static,
    ) -> Result<WatchId> {
        if !self.contains(name) {
            return Err(ParamBindError::ParameterNotFound(name.to_string()));
        }
        Ok(self.shared.bus.watch(name, kind, callback))
    }

    /// Remove a watcher.
    pub fn unwatch(&self, id: WatchId) {
        self.shared.bus.unwatch(id);
    }
}
