//! Presence toggling for parameters allowing an absent value

use crate::test_helpers::{RecordingControl, RecordingIndicator};
use parambind_rs::schema::{Descriptor, Kind, Value};
use parambind_rs::store::ParamSet;
use parambind_rs::{Binding, HostServices};

#[test]
fn test_toggle_on_derives_first_allowed_value() {
    // Selection kind with allowed values ["a", "b"], no default: toggling
    // absent -> present yields "a"
    let set = ParamSet::new();
    set.add(
        Descriptor::new("channel", Kind::SingleSelect, Value::None)
            .with_allow_none(true)
            .with_allowed_values(["a", "b"].map(Value::from)),
    )
    .unwrap();

    let (control, control_state) = RecordingControl::new();
    let (indicator, indicator_state) = RecordingIndicator::new();
    let binding = Binding::new(
        &set,
        "channel",
        Box::new(control),
        Some(Box::new(indicator)),
        HostServices::default(),
    )
    .unwrap();

    assert!(binding.has_presence_toggle());
    // The control starts seeded with the example value, unchecked
    assert!(!indicator_state.present.get());
    assert_eq!(control_state.last_rendered(), Some(Value::from("a")));
    assert!(!control_state.enabled.get());

    binding.toggle_presence(true);
    assert_eq!(set.get("channel").unwrap(), Value::from("a"));
    assert!(indicator_state.present.get());
    assert!(control_state.enabled.get());
}

#[test]
fn test_toggle_off_stores_absent_value() {
    let set = ParamSet::new();
    set.add(
        Descriptor::new("limit", Kind::Number, 5.0)
            .with_allow_none(true)
            .with_bounds(0.0, 100.0)
            .unwrap(),
    )
    .unwrap();

    let (control, control_state) = RecordingControl::new();
    let (indicator, indicator_state) = RecordingIndicator::new();
    let binding = Binding::new(
        &set,
        "limit",
        Box::new(control),
        Some(Box::new(indicator)),
        HostServices::default(),
    )
    .unwrap();

    assert!(indicator_state.present.get());

    binding.toggle_presence(false);
    assert_eq!(set.get("limit").unwrap(), Value::None);
    assert!(!indicator_state.present.get());
    assert!(!control_state.enabled.get());

    // Toggling back re-derives a concrete value from the control, which
    // still displays the old one
    binding.toggle_presence(true);
    assert_eq!(set.get("limit").unwrap(), Value::Float(5.0));
    assert!(indicator_state.present.get());
}

#[test]
fn test_empty_allowed_set_fails_at_binding_construction() {
    let set = ParamSet::new();
    set.add(
        Descriptor::new("channel", Kind::SingleSelect, Value::None).with_allow_none(true),
    )
    .unwrap();

    let (control, _state) = RecordingControl::new();
    let (indicator, _indicator_state) = RecordingIndicator::new();
    let result = Binding::new(
        &set,
        "channel",
        Box::new(control),
        Some(Box::new(indicator)),
        HostServices::default(),
    );
    assert!(result.is_err());
}

#[test]
fn test_control_without_indicator_handles_none_itself() {
    let set = ParamSet::new();
    set.add(
        Descriptor::new("limit", Kind::Number, Value::None).with_allow_none(true),
    )
    .unwrap();

    let (control, _state) = RecordingControl::new();
    let binding = Binding::new(
        &set,
        "limit",
        Box::new(control),
        None,
        HostServices::default(),
    )
    .unwrap();

    assert!(binding.control_handles_none());
    assert!(!binding.has_presence_toggle());

    // Such a control can write the absent value directly
    binding.set_value(3.0);
    assert_eq!(set.get("limit").unwrap(), Value::Float(3.0));
    binding.set_value(Value::None);
    assert_eq!(set.get("limit").unwrap(), Value::None);
}

#[test]
fn test_indicator_carries_translated_label() {
    let set = ParamSet::new();
    set.add(
        Descriptor::new("limit", Kind::Number, 1.0)
            .with_allow_none(true)
            .with_label("Upper limit"),
    )
    .unwrap();

    let (control, _state) = RecordingControl::new();
    let (indicator, indicator_state) = RecordingIndicator::new();
    let services =
        HostServices::default().with_translate(|text| text.to_uppercase());
    let _binding = Binding::new(
        &set,
        "limit",
        Box::new(control),
        Some(Box::new(indicator)),
        services,
    )
    .unwrap();

    assert_eq!(*indicator_state.text.borrow(), "UPPER LIMIT");
}
