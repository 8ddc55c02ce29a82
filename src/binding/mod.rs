//! # Binding Controller
//!
//! One [`Binding`] mediates between one parameter and one host control: it
//! pushes control edits into the store through a transactional protocol with
//! rollback, and keeps the control's displayed value, enablement and
//! visibility synchronized with the parameter's state via the watch bus.
//!
//! The host toolkit stays behind two small traits: [`Control`] for the
//! value-bearing widget and [`Indicator`] for the optional label element
//! (which doubles as the presence toggle of parameters allowing an absent
//! value). Translation and error-handling hooks are threaded in explicitly
//! through [`HostServices`] rather than held in process-wide state.

pub mod display;
pub mod select;

pub use display::{color_name, display_text, example_value, parse_text};
pub use select::{choose_control, choose_menu_control, ControlKind, MenuControlKind};

use crate::error::{MessageKind, ParamBindError, Result};
use crate::schema::{Descriptor, FlagKind, Value};
use crate::store::ParamSet;
use crate::watch::{ChangeKind, WatchId};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Host-toolkit side of one value-bearing control
///
/// All methods are side-effecting display updates except `read_value`, which
/// extracts the currently displayed value in the parameter's native domain
/// and may fail with a format error (e.g. free-text numeric entry).
pub trait Control {
    fn render_value(&mut self, value: &Value);
    fn set_enabled(&mut self, enabled: bool);
    fn set_visible(&mut self, visible: bool);
    fn read_value(&self) -> Result<Value>;
}

/// Host-toolkit side of the optional label/indicator element
///
/// For parameters allowing an absent value the indicator doubles as the
/// presence toggle; `set_present` reflects whether a concrete value exists.
pub trait Indicator {
    fn set_text(&mut self, text: &str);
    fn set_tooltip(&mut self, _tooltip: Option<&str>) {}
    fn set_present(&mut self, present: bool);
    fn set_enabled(&mut self, enabled: bool);
    fn set_visible(&mut self, visible: bool);
}

/// Explicit bundle of host hooks threaded into each binding
///
/// Defaults are permissive: identity translation, no tooltips, error
/// handlers that decline to handle anything, and a message sink that logs.
#[derive(Clone)]
pub struct HostServices {
    /// Translate user-facing text.
    pub translate: Rc<dyn Fn(&str) -> String>,
    /// Translate a label into a tooltip; `None` suppresses the tooltip.
    pub translate_tooltip: Rc<dyn Fn(&str) -> Option<String>>,
    /// First chance to handle a watcher failure during a set. Returning
    /// `true` marks the error handled and suppresses the rollback.
    pub on_set_error: Rc<dyn Fn(&ParamBindError) -> bool>,
    /// First chance to handle a failure of the rollback itself.
    pub on_reset_error: Rc<dyn Fn(&ParamBindError) -> bool>,
    /// Single message-display primitive all user-facing errors go through.
    pub show_message: Rc<dyn Fn(MessageKind, &str)>,
}

impl Default for HostServices {
    fn default() -> Self {
        Self {
            translate: Rc::new(|text| text.to_string()),
            translate_tooltip: Rc::new(|_| None),
            on_set_error: Rc::new(|_| false),
            on_reset_error: Rc::new(|_| false),
            show_message: Rc::new(|kind, text| {
                tracing::warn!(?kind, "{}", text);
            }),
        }
    }
}

impl HostServices {
    pub fn with_translate(mut self, translate: impl Fn(&str) -> String + 'static) -> Self {
        self.translate = Rc::new(translate);
        self
    }

    pub fn with_translate_tooltip(
        mut self,
        translate: impl Fn(&str) -> Option<String> + 'static,
    ) -> Self {
        self.translate_tooltip = Rc::new(translate);
        self
    }

    pub fn with_set_error_handler(
        mut self,
        handler: impl Fn(&ParamBindError) -> bool + 'static,
    ) -> Self {
        self.on_set_error = Rc::new(handler);
        self
    }

    pub fn with_reset_error_handler(
        mut self,
        handler: impl Fn(&ParamBindError) -> bool + 'static,
    ) -> Self {
        self.on_reset_error = Rc::new(handler);
        self
    }

    pub fn with_message_display(
        mut self,
        show: impl Fn(MessageKind, &str) + 'static,
    ) -> Self {
        self.show_message = Rc::new(show);
        self
    }
}

struct BindingInner {
    set: ParamSet,
    name: String,
    descriptor: Descriptor,
    control: RefCell<Box<dyn Control>>,
    indicator: RefCell<Option<Box<dyn Indicator>>>,
    services: HostServices,
    /// Last known-good value, recorded at the start of each set.
    previous_value: RefCell<Value>,
    /// Guards against the binding's own display updates re-entering the
    /// update protocol.
    refreshing: Cell<bool>,
    subscriptions: RefCell<Vec<WatchId>>,
    detached: Cell<bool>,
}

/// Mediator owning one control instance and its synchronization with one
/// parameter
///
/// Created per (set, parameter) pair; subscribes to value, `visible` and
/// `enabled` changes on construction and unsubscribes when dropped or
/// explicitly detached.
///
/// # Examples
///
/// ```
/// use parambind_rs::binding::{Binding, Control, HostServices};
/// use parambind_rs::error::Result;
/// use parambind_rs::schema::{Descriptor, Kind, Value};
/// use parambind_rs::store::ParamSet;
///
/// struct NullControl(Value);
///
/// impl Control for NullControl {
///     fn render_value(&mut self, value: &Value) {
///         self.0 = value.clone();
///     }
///     fn set_enabled(&mut self, _enabled: bool) {}
///     fn set_visible(&mut self, _visible: bool) {}
///     fn read_value(&self) -> Result<Value> {
///         Ok(self.0.clone())
///     }
/// }
///
/// let set = ParamSet::new();
/// set.add(Descriptor::new("gain", Kind::Number, 1.0).with_bounds(0.0, 10.0).unwrap())
///     .unwrap();
///
/// let binding = Binding::new(
///     &set,
///     "gain",
///     Box::new(NullControl(Value::None)),
///     None,
///     HostServices::default(),
/// )
/// .unwrap();
///
/// binding.set_value(2.5);
/// assert_eq!(set.get("gain").unwrap(), Value::Float(2.5));
/// ```
pub struct Binding {
    inner: Rc<BindingInner>,
}

impl Binding {
    /// Bind a control (and optionally its label/indicator) to a parameter
    ///
    /// Subscribes the display-synchronization watchers, applies the current
    /// value and flags to the control, and — when the parameter starts
    /// absent behind a presence toggle — seeds the control with an example
    /// value.
    ///
    /// # Returns
    ///
    /// The binding, or a configuration error (unknown parameter, or a
    /// presence toggle whose example value cannot be derived).
    pub fn new(
        set: &ParamSet,
        name: &str,
        control: Box<dyn Control>,
        indicator: Option<Box<dyn Indicator>>,
        services: HostServices,
    ) -> Result<Self> {
        let descriptor = set.descriptor(name)?;

        // A presence toggle must be able to materialize a value later;
        // surface an impossible configuration now
        if descriptor.allow_none() && indicator.is_some() {
            display::example_value(&descriptor)?;
        }

        let inner = Rc::new(BindingInner {
            set: set.clone(),
            name: name.to_string(),
            previous_value: RefCell::new(set.get(name)?),
            descriptor,
            control: RefCell::new(control),
            indicator: RefCell::new(indicator),
            services,
            refreshing: Cell::new(false),
            subscriptions: RefCell::new(Vec::new()),
            detached: Cell::new(false),
        });

        if !inner.descriptor.is_constant() {
            let value_sub = {
                let weak = Rc::downgrade(&inner);
                set.watch(name, ChangeKind::Value, move |_| {
                    if let Some(inner) = weak.upgrade() {
                        inner.update_value_display();
                    }
                    Ok(())
                })?
            };
            let enabled_sub = {
                let weak = Rc::downgrade(&inner);
                set.watch(name, ChangeKind::Flag(FlagKind::Enabled), move |_| {
                    if let Some(inner) = weak.upgrade() {
                        inner.apply_enabled(inner.flag(FlagKind::Enabled));
                    }
                    Ok(())
                })?
            };
            let visible_sub = {
                let weak = Rc::downgrade(&inner);
                set.watch(name, ChangeKind::Flag(FlagKind::Visible), move |_| {
                    if let Some(inner) = weak.upgrade() {
                        inner.apply_visible(inner.flag(FlagKind::Visible));
                    }
                    Ok(())
                })?
            };
            inner
                .subscriptions
                .borrow_mut()
                .extend([value_sub, enabled_sub, visible_sub]);
        }

        inner.init_display();
        Ok(Self { inner })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.inner.descriptor
    }

    /// Last known-good value recorded by the update protocol.
    pub fn previous_value(&self) -> Value {
        self.inner.previous_value.borrow().clone()
    }

    /// Whether the control itself represents the absent value (a parameter
    /// allowing one, bound without a label indicator).
    pub fn control_handles_none(&self) -> bool {
        self.inner.descriptor.allow_none() && self.inner.indicator.borrow().is_none()
    }

    /// Whether the label indicator acts as a presence toggle.
    pub fn has_presence_toggle(&self) -> bool {
        self.inner.has_presence_toggle()
    }

    /// Transactionally assign a new value to the parameter.
    ///
    /// Validation failures leave parameter and control unchanged; watcher
    /// failures roll back to the previous value. All user-facing errors go
    /// through the services' message display, never a panic.
    pub fn set_value(&self, value: impl Into<Value>) {
        self.inner.set_value(value.into());
    }

    /// Read the control's displayed value and assign it to the parameter.
    ///
    /// Unparsable control content surfaces a format error and re-renders
    /// the stored value.
    pub fn commit_from_control(&self) {
        self.inner.commit_from_control();
    }

    /// Flip the presence toggle of a parameter allowing an absent value.
    ///
    /// Toggling off stores the absent value; toggling on re-derives a
    /// concrete value from the control or the example-value policy.
    pub fn toggle_presence(&self, present: bool) {
        self.inner.toggle_presence(present);
    }

    /// Restore the descriptor's default through the transactional path.
    pub fn reset_to_default(&self) {
        let default = self.inner.descriptor.default().clone();
        self.inner.set_value(default);
    }

    /// Re-read the parameter and re-render the control.
    pub fn refresh(&self) {
        self.inner.update_value_display();
    }

    /// Unsubscribe this binding's watchers. Idempotent; also runs on drop.
    pub fn detach(&self) {
        self.inner.detach();
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        self.inner.detach();
    }
}

impl BindingInner {
    fn has_presence_toggle(&self) -> bool {
        self.descriptor.allow_none() && self.indicator.borrow().is_some()
    }

    fn current_value(&self) -> Value {
        // Parameters are never removed from a set, so the lookup only fails
        // if the whole set vanished under us
        self.set.get(&self.name).unwrap_or(Value::None)
    }

    fn flag(&self, flag: FlagKind) -> bool {
        self.set.flag(&self.name, flag).unwrap_or(true)
    }

    fn init_display(&self) {
        if let Some(indicator) = self.indicator.borrow_mut().as_mut() {
            let label = (self.services.translate)(self.descriptor.label());
            indicator.set_text(&label);
            let tooltip = match self.descriptor.doc() {
                Some(doc) => Some((self.services.translate)(doc)),
                None => (self.services.translate_tooltip)(self.descriptor.label()),
            };
            indicator.set_tooltip(tooltip.as_deref());
        }

        // Seed the control with an example value when the parameter starts
        // absent behind a presence toggle, so toggling on has something to
        // show
        let value = self.current_value();
        if value.is_none() && self.has_presence_toggle() {
            if let Ok(example) = display::example_value(&self.descriptor) {
                self.render(&example);
            }
        }

        self.update_value_display();
        self.apply_enabled(self.flag(FlagKind::Enabled));
        // At init an already-visible control is left alone so it first
        // appears inside its parent container rather than on its own
        if !self.flag(FlagKind::Visible) {
            self.apply_visible(false);
        }
    }

    fn update_value_display(&self) {
        let value = self.current_value();
        if self.has_presence_toggle() {
            if let Some(indicator) = self.indicator.borrow_mut().as_mut() {
                indicator.set_present(!value.is_none());
            }
            self.control
                .borrow_mut()
                .set_enabled(self.flag(FlagKind::Enabled) && !value.is_none());
            if value.is_none() {
                return;
            }
        }
        self.render(&value);
    }

    fn render(&self, value: &Value) {
        self.refreshing.set(true);
        self.control.borrow_mut().render_value(value);
        self.refreshing.set(false);
    }

    fn apply_enabled(&self, enabled: bool) {
        let mut indicator = self.indicator.borrow_mut();
        if let Some(indicator) = indicator.as_mut() {
            indicator.set_enabled(enabled);
            let present = !self.current_value().is_none();
            self.control.borrow_mut().set_enabled(enabled && present);
        } else {
            self.control.borrow_mut().set_enabled(enabled);
        }
    }

    fn apply_visible(&self, visible: bool) {
        if let Some(indicator) = self.indicator.borrow_mut().as_mut() {
            indicator.set_visible(visible);
        }
        self.control.borrow_mut().set_visible(visible);
    }

    fn set_value(&self, value: Value) {
        if self.refreshing.get() {
            // Self-originated control updates must not loop back
            return;
        }
        if self.descriptor.is_constant() {
            tracing::warn!(parameter = %self.name, "ignoring write to constant parameter");
            return;
        }

        let previous = self.current_value();
        *self.previous_value.borrow_mut() = previous.clone();

        // Assign with watchers deferred, so a failure here is known to be
        // the value's fault and the parameter is untouched
        if let Err(err) = self.set.set_pending(&self.name, value) {
            (self.services.show_message)(
                err.kind(),
                &(self.services.translate)(&err.to_string()),
            );
            self.update_value_display();
            return;
        }

        // Run the watchers; on failure fall back to the previous value
        if let Err(err) = self.set.flush_watchers() {
            if (self.services.on_set_error)(&err) {
                return;
            }
            tracing::warn!(
                parameter = %self.name,
                error = %err,
                "watcher failed, restoring previous value"
            );
            match self.set.set(&self.name, previous) {
                Ok(()) => {
                    let text = format!(
                        "{} {}\n{}",
                        (self.services.translate)(&format!(
                            "Setting parameter '{}' failed with error:",
                            self.name
                        )),
                        err,
                        (self.services.translate)("Previous value was restored."),
                    );
                    (self.services.show_message)(MessageKind::Watcher, &text);
                }
                Err(restore_err) => {
                    if (self.services.on_reset_error)(&restore_err) {
                        return;
                    }
                    let double = ParamBindError::Restore {
                        original: err.to_string(),
                        restore: restore_err.to_string(),
                    };
                    // Degraded state: the control may now disagree with the
                    // stored value, and we say so instead of hiding it
                    (self.services.show_message)(MessageKind::Restore, &double.to_string());
                }
            }
        }
    }

    fn commit_from_control(&self) {
        if self.refreshing.get() {
            return;
        }
        let read = self.control.borrow().read_value();
        let value = match read {
            Ok(value) => value,
            Err(err) => {
                (self.services.show_message)(
                    err.kind(),
                    &(self.services.translate)(&err.to_string()),
                );
                self.update_value_display();
                return;
            }
        };
        if value == self.current_value() {
            // Nothing changed; still snap the control back onto the stored
            // value (integer sliders land between markings)
            self.update_value_display();
            return;
        }
        self.set_value(value);
    }

    fn toggle_presence(&self, present: bool) {
        if !self.has_presence_toggle() {
            return;
        }
        if present {
            if self.current_value().is_none() {
                let read = self.control.borrow().read_value();
                let value = match read.ok().filter(|value| !value.is_none()) {
                    Some(value) => value,
                    None => match display::example_value(&self.descriptor) {
                        Ok(value) => value,
                        Err(err) => {
                            (self.services.show_message)(err.kind(), &err.to_string());
                            return;
                        }
                    },
                };
                self.set_value(value);
            }
            self.control.borrow_mut().set_enabled(true);
        } else {
            if !self.current_value().is_none() {
                self.set_value(Value::None);
            }
            self.control.borrow_mut().set_enabled(false);
        }
    }

    fn detach(&self) {
        if self.detached.replace(true) {
            return;
        }
        for id in self.subscriptions.borrow_mut().drain(..) {
            self.set.unwatch(id);
        }
    }
}
