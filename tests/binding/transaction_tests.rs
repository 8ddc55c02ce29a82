//! The transactional update protocol: validation, watcher rollback and
//! handler escalation

use crate::test_helpers::{recording_services, RecordingControl};
use parambind_rs::schema::{DependencySpec, Descriptor, FlagKind, Kind, Value};
use parambind_rs::store::ParamSet;
use parambind_rs::watch::ChangeKind;
use parambind_rs::{engine, Binding, HostServices, MessageKind, ParamBindError};
use std::cell::Cell;
use std::rc::Rc;

fn gain_set() -> ParamSet {
    let set = ParamSet::new();
    set.add(
        Descriptor::new("gain", Kind::Number, 1.0)
            .with_bounds(0.0, 10.0)
            .unwrap(),
    )
    .unwrap();
    set
}

#[test]
fn test_successful_set_round_trip() {
    let set = gain_set();
    let (control, state) = RecordingControl::new();
    let binding = Binding::new(
        &set,
        "gain",
        Box::new(control),
        None,
        HostServices::default(),
    )
    .unwrap();

    binding.set_value(4.0);
    assert_eq!(set.get("gain").unwrap(), Value::Float(4.0));
    // The watch bus drove the display update; no second write needed
    assert_eq!(state.last_rendered(), Some(Value::Float(4.0)));
}

#[test]
fn test_rollback_idempotence_on_validation_failure() {
    let set = gain_set();
    set.add(
        Descriptor::new("dependent", Kind::Number, 0.0)
            .with_dependencies(FlagKind::Enabled, vec![DependencySpec::truthy("gain")]),
    )
    .unwrap();
    let _deps = engine::attach(&set).unwrap();

    let (control, state) = RecordingControl::new();
    let (services, messages) = recording_services();
    let binding = Binding::new(&set, "gain", Box::new(control), None, services).unwrap();

    let stored_before = set.get("gain").unwrap();
    let flag_before = set.flag("dependent", FlagKind::Enabled).unwrap();

    binding.set_value(-5.0);

    // Stored value and every dependent flag are unchanged
    assert_eq!(set.get("gain").unwrap(), stored_before);
    assert_eq!(
        set.flag("dependent", FlagKind::Enabled).unwrap(),
        flag_before
    );
    // The control was re-rendered from the previous value
    assert_eq!(state.last_rendered(), Some(stored_before));
    // The user saw one validation message naming the parameter
    assert_eq!(messages.borrow().len(), 1);
    assert_eq!(messages.borrow()[0].0, MessageKind::Validation);
    assert!(messages.borrow()[0].1.contains("gain"));
}

#[test]
fn test_watcher_failure_restores_previous_value() {
    let set = gain_set();
    let (control, state) = RecordingControl::new();
    let (services, messages) = recording_services();
    let binding = Binding::new(&set, "gain", Box::new(control), None, services).unwrap();

    // A side-effecting watcher that always fails, registered after the
    // binding so the display updates before the failure hits
    set.watch("gain", ChangeKind::Value, |_| {
        Err(ParamBindError::Watcher("disk full".into()))
    })
    .unwrap();

    binding.set_value(7.0);

    // The parameter is back at its pre-call value and the display agrees
    assert_eq!(set.get("gain").unwrap(), Value::Float(1.0));
    assert_eq!(state.last_rendered(), Some(Value::Float(1.0)));
    // The always-failing watcher also fails during the restore, which
    // escalates to the double-failure report
    assert_eq!(messages.borrow().len(), 1);
    assert_eq!(messages.borrow()[0].0, MessageKind::Restore);
    assert!(messages.borrow()[0].1.contains("disk full"));
}

#[test]
fn test_transient_watcher_failure_reports_restore_success() {
    let set = gain_set();
    let (control, state) = RecordingControl::new();
    let (services, messages) = recording_services();
    let binding = Binding::new(&set, "gain", Box::new(control), None, services).unwrap();

    // Fails exactly once, so the rollback itself goes through
    let failed_once = Rc::new(Cell::new(false));
    let flag = Rc::clone(&failed_once);
    set.watch("gain", ChangeKind::Value, move |_| {
        if flag.replace(true) {
            Ok(())
        } else {
            Err(ParamBindError::Watcher("transient".into()))
        }
    })
    .unwrap();

    binding.set_value(7.0);

    assert_eq!(set.get("gain").unwrap(), Value::Float(1.0));
    assert_eq!(state.last_rendered(), Some(Value::Float(1.0)));
    assert_eq!(messages.borrow().len(), 1);
    assert_eq!(messages.borrow()[0].0, MessageKind::Watcher);
    assert!(messages.borrow()[0].1.contains("restored"));
}

#[test]
fn test_set_error_handler_suppresses_rollback() {
    let set = gain_set();
    let (control, _state) = RecordingControl::new();
    let handled = Rc::new(Cell::new(0));
    let count = Rc::clone(&handled);
    let (services, messages) = recording_services();
    let services = services.with_set_error_handler(move |_| {
        count.set(count.get() + 1);
        true
    });
    let binding = Binding::new(&set, "gain", Box::new(control), None, services).unwrap();

    set.watch("gain", ChangeKind::Value, |_| {
        Err(ParamBindError::Watcher("ignored by host".into()))
    })
    .unwrap();

    binding.set_value(7.0);

    // The host handled the error: no rollback, no message, value kept
    assert_eq!(handled.get(), 1);
    assert_eq!(set.get("gain").unwrap(), Value::Float(7.0));
    assert!(messages.borrow().is_empty());
}

#[test]
fn test_reset_error_handler_sees_the_second_failure() {
    let set = gain_set();
    let (control, _state) = RecordingControl::new();
    let reset_errors = Rc::new(Cell::new(0));
    let count = Rc::clone(&reset_errors);
    let (services, messages) = recording_services();
    let services = services.with_reset_error_handler(move |_| {
        count.set(count.get() + 1);
        true
    });
    let binding = Binding::new(&set, "gain", Box::new(control), None, services).unwrap();

    set.watch("gain", ChangeKind::Value, |_| {
        Err(ParamBindError::Watcher("always".into()))
    })
    .unwrap();

    binding.set_value(7.0);

    // Restore failed too, the reset handler took it, nothing was displayed
    assert_eq!(reset_errors.get(), 1);
    assert!(messages.borrow().is_empty());
    // Best-effort: the value itself was still rolled back before the
    // restore notification failed
    assert_eq!(set.get("gain").unwrap(), Value::Float(1.0));
}

#[test]
fn test_reentrant_watcher_updates_sibling_binding() {
    // A watcher on "gain" drives "offset"; the offset binding must see the
    // change within the same user action
    let set = gain_set();
    set.add(Descriptor::new("offset", Kind::Number, 0.0)).unwrap();

    let (gain_control, _gain_state) = RecordingControl::new();
    let gain_binding = Binding::new(
        &set,
        "gain",
        Box::new(gain_control),
        None,
        HostServices::default(),
    )
    .unwrap();

    let (offset_control, offset_state) = RecordingControl::new();
    let _offset_binding = Binding::new(
        &set,
        "offset",
        Box::new(offset_control),
        None,
        HostServices::default(),
    )
    .unwrap();

    let follower = set.clone();
    set.watch("gain", ChangeKind::Value, move |_| {
        let gain = follower.get("gain")?.as_f64().unwrap_or(0.0);
        follower.set("offset", gain / 2.0)
    })
    .unwrap();

    gain_binding.set_value(8.0);

    assert_eq!(set.get("offset").unwrap(), Value::Float(4.0));
    assert_eq!(offset_state.last_rendered(), Some(Value::Float(4.0)));
}

#[test]
fn test_double_click_reset_to_default() {
    let set = gain_set();
    let (control, state) = RecordingControl::new();
    let binding = Binding::new(
        &set,
        "gain",
        Box::new(control),
        None,
        HostServices::default(),
    )
    .unwrap();

    binding.set_value(9.0);
    binding.reset_to_default();
    assert_eq!(set.get("gain").unwrap(), Value::Float(1.0));
    assert_eq!(state.last_rendered(), Some(Value::Float(1.0)));
}
