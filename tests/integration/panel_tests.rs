//! A small plotting-style panel driven end to end: authored JSON schema,
//! dependency propagation, and bindings reacting to each other.

use crate::test_helpers::{recording_services, RecordingControl};
use parambind_rs::binding::{choose_control, ControlKind};
use parambind_rs::mapper::{Mapping, SliderMode};
use parambind_rs::schema::{FlagKind, Kind, Value};
use parambind_rs::store::ParamSet;
use parambind_rs::{engine, Binding, HostServices, MessageKind};

const PANEL_SCHEMA: &str = r#"[
    {
        "name": "shape",
        "kind": "single-select",
        "default": "circle",
        "values": ["circle", "polygon", "star"]
    },
    {
        "name": "n_edge",
        "kind": "integer",
        "default": 5,
        "bounds": {"min": 3, "max": 20},
        "visible": [{"param": "shape", "accepted": ["polygon", "star"]}]
    },
    {
        "name": "use_marker",
        "kind": "boolean",
        "default": false
    },
    {
        "name": "marker_size",
        "kind": "number",
        "default": 10.0,
        "bounds": {"min": 3, "max": 1000},
        "enabled": [{"param": "use_marker"}]
    }
]"#;

#[test]
fn test_panel_schema_builds_and_selects_controls() {
    let set = ParamSet::from_schema_json(PANEL_SCHEMA).unwrap();
    assert_eq!(
        set.names(),
        vec!["shape", "n_edge", "use_marker", "marker_size"]
    );

    assert_eq!(
        choose_control(&set.descriptor("shape").unwrap(), None).unwrap(),
        ControlKind::PopupMenu
    );
    assert_eq!(
        choose_control(&set.descriptor("use_marker").unwrap(), None).unwrap(),
        ControlKind::CheckBox
    );
    // Fully bounded numbers default to sliders
    assert_eq!(
        choose_control(&set.descriptor("n_edge").unwrap(), None).unwrap(),
        ControlKind::Slider
    );

    // marker_size spans [3, 1000], so its slider is logarithmic
    let mapping = Mapping::for_descriptor(&set.descriptor("marker_size").unwrap()).unwrap();
    assert_eq!(mapping.mode(), SliderMode::Log);
}

#[test]
fn test_visibility_and_enablement_flow_into_controls() {
    let set = ParamSet::from_schema_json(PANEL_SCHEMA).unwrap();
    let _deps = engine::attach(&set).unwrap();

    let (shape_control, _shape_state) = RecordingControl::new();
    let shape_binding = Binding::new(
        &set,
        "shape",
        Box::new(shape_control),
        None,
        HostServices::default(),
    )
    .unwrap();

    let (edge_control, edge_state) = RecordingControl::new();
    let _edge_binding = Binding::new(
        &set,
        "n_edge",
        Box::new(edge_control),
        None,
        HostServices::default(),
    )
    .unwrap();

    let (size_control, size_state) = RecordingControl::new();
    let _size_binding = Binding::new(
        &set,
        "marker_size",
        Box::new(size_control),
        None,
        HostServices::default(),
    )
    .unwrap();

    // Initial state: circle has no edges to count, markers are off
    assert!(!edge_state.visible.get());
    assert!(!size_state.enabled.get());

    // One user action on the shape menu shows the edge-count slider
    shape_binding.set_value("star");
    assert!(edge_state.visible.get());

    shape_binding.set_value("circle");
    assert!(!edge_state.visible.get());

    // Toggling the marker checkbox enables the size slider
    set.set("use_marker", true).unwrap();
    assert!(size_state.enabled.get());
}

#[test]
fn test_slider_interaction_through_the_mapping() {
    let set = ParamSet::from_schema_json(PANEL_SCHEMA).unwrap();
    let _deps = engine::attach(&set).unwrap();

    let descriptor = set.descriptor("marker_size").unwrap();
    let mapping = Mapping::for_descriptor(&descriptor).unwrap();

    let (control, state) = RecordingControl::new();
    let binding = Binding::new(
        &set,
        "marker_size",
        Box::new(control),
        None,
        HostServices::default(),
    )
    .unwrap();

    // Simulate a slider drag: the host maps the coordinate to a value and
    // commits it through the binding
    let dragged = mapping.from_control(4200);
    binding.set_value(dragged);
    assert_eq!(set.get("marker_size").unwrap(), Value::Float(dragged));
    assert_eq!(state.last_rendered(), Some(Value::Float(dragged)));

    // The displayed value maps back onto the same slider position
    let shown = state.last_rendered().unwrap().as_f64().unwrap();
    assert_eq!(mapping.to_control(shown), 4200);
}

#[test]
fn test_invalid_edit_reports_and_recovers() {
    let set = ParamSet::from_schema_json(PANEL_SCHEMA).unwrap();
    let _deps = engine::attach(&set).unwrap();

    let (control, state) = RecordingControl::new();
    let (services, messages) = recording_services();
    let binding = Binding::new(&set, "n_edge", Box::new(control), None, services).unwrap();

    // Free-text entry of an out-of-bounds edge count
    state.queue_read(Ok(Value::Int(100)));
    binding.commit_from_control();

    assert_eq!(set.get("n_edge").unwrap(), Value::Int(5));
    assert_eq!(state.last_rendered(), Some(Value::Int(5)));
    assert_eq!(messages.borrow().len(), 1);
    assert_eq!(messages.borrow()[0].0, MessageKind::Validation);
}

#[test]
fn test_schema_survives_a_save_load_cycle() {
    let set = ParamSet::from_schema_json(PANEL_SCHEMA).unwrap();
    let json = set.to_schema_json().unwrap();
    let reloaded = ParamSet::from_schema_json(&json).unwrap();

    assert_eq!(reloaded.names(), set.names());
    for name in set.names() {
        let original = set.descriptor(&name).unwrap();
        let copy = reloaded.descriptor(&name).unwrap();
        assert_eq!(copy.kind(), original.kind());
        assert_eq!(copy.default(), original.default());
        assert_eq!(
            copy.flag_spec(FlagKind::Visible),
            original.flag_spec(FlagKind::Visible)
        );
    }

    // The reloaded schema is live, not just structurally equal
    let _deps = engine::attach(&reloaded).unwrap();
    reloaded.set("shape", "polygon").unwrap();
    assert!(reloaded.flag("n_edge", FlagKind::Visible).unwrap());
    assert_eq!(reloaded.descriptor("n_edge").unwrap().kind(), Kind::Integer);
}
