//! Integration tests for authored schema ingestion

use parambind_rs::schema::{Descriptor, DescriptorSpec, FlagKind, Kind, Value};
use parambind_rs::store::ParamSet;

#[test]
fn test_authored_record_with_every_recognized_option() {
    let json = r#"{
        "name": "marker_size",
        "kind": "integer",
        "default": 4,
        "bounds": {"min": 1, "max": 64},
        "label": "Marker size",
        "doc": "Size of the data markers, in pixels",
        "style": "slider",
        "mode": "log",
        "enabled": [{"param": "use_marker"}]
    }"#;
    let spec: DescriptorSpec = serde_json::from_str(json).unwrap();
    let descriptor = Descriptor::from_spec(spec).unwrap();

    assert_eq!(descriptor.kind(), Kind::Integer);
    assert_eq!(descriptor.default(), &Value::Int(4));
    assert_eq!(descriptor.label(), "Marker size");
    assert_eq!(descriptor.style(), Some("slider"));
    assert_eq!(descriptor.slider_mode(), Some("log"));
    assert!(descriptor.flag_spec(FlagKind::Enabled).is_derived());
    assert!(descriptor.user().is_empty());
}

#[test]
fn test_unrecognized_keys_route_into_user_extensions() {
    let json = r#"{
        "name": "palette",
        "kind": "single-select",
        "default": "viridis",
        "values": ["viridis", "magma"],
        "value_tooltips": ["Perceptually uniform", "High contrast"],
        "custom_group": "appearance"
    }"#;
    let spec: DescriptorSpec = serde_json::from_str(json).unwrap();
    assert_eq!(spec.user.len(), 2);
    assert!(spec.user.contains_key("value_tooltips"));
    assert!(spec.user.contains_key("custom_group"));

    let descriptor = Descriptor::from_spec(spec).unwrap();
    assert_eq!(
        descriptor.user()["custom_group"],
        serde_json::Value::String("appearance".into())
    );
}

#[test]
fn test_literal_and_derived_flags_share_one_key() {
    let json = r#"[
        {"name": "advanced", "kind": "boolean", "default": false},
        {"name": "a", "kind": "number", "default": 0.5, "visible": false},
        {"name": "b", "kind": "number", "default": 0.5, "visible": [{"param": "advanced"}]}
    ]"#;
    let set = ParamSet::from_schema_json(json).unwrap();

    let a = set.descriptor("a").unwrap();
    assert!(!a.flag_spec(FlagKind::Visible).is_derived());
    assert!(!a.flag(FlagKind::Visible));

    let b = set.descriptor("b").unwrap();
    assert!(b.flag_spec(FlagKind::Visible).is_derived());
}

#[test]
fn test_malformed_schema_is_rejected_at_construction() {
    // Bounds on a string parameter
    let json = r#"[{"name": "s", "kind": "string", "default": "x", "bounds": {"min": 0}}]"#;
    assert!(ParamSet::from_schema_json(json).is_err());

    // Default outside its own bounds
    let json = r#"[{"name": "n", "kind": "integer", "default": 99, "bounds": {"min": 0, "max": 10}}]"#;
    assert!(ParamSet::from_schema_json(json).is_err());

    // Absent default without allow_none
    let json = r#"[{"name": "n", "kind": "integer"}]"#;
    assert!(ParamSet::from_schema_json(json).is_err());
}
