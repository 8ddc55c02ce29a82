//! Integration tests for descriptors and value validation

use parambind_rs::schema::{Bounds, DependencySpec, Descriptor, FlagKind, Kind, Rgb, Value};

#[test]
fn test_descriptor_lifecycle() {
    let descriptor = Descriptor::new("opacity", Kind::Number, 1.0)
        .with_bounds(0.0, 1.0)
        .unwrap()
        .with_label("Opacity")
        .with_doc("Blending opacity of the layer")
        .with_style("slider");

    assert_eq!(descriptor.name(), "opacity");
    assert_eq!(descriptor.kind(), Kind::Number);
    assert_eq!(descriptor.default(), &Value::Float(1.0));
    assert_eq!(descriptor.bounds(), Some(&Bounds::new(0.0, 1.0).unwrap()));
    assert_eq!(descriptor.label(), "Opacity");
    assert_eq!(descriptor.doc(), Some("Blending opacity of the layer"));
    assert!(descriptor.validate().is_ok());

    // Flags start from their authored values and mutate freely afterwards
    let mut descriptor = descriptor;
    assert!(descriptor.flag(FlagKind::Visible));
    assert!(descriptor.set_flag(FlagKind::Visible, false));
    assert!(!descriptor.flag(FlagKind::Visible));
    // Unchanged writes report no change
    assert!(!descriptor.set_flag(FlagKind::Visible, false));
}

#[test]
fn test_dependencies_are_fixed_at_creation() {
    let descriptor = Descriptor::new("n_edge", Kind::Integer, 5)
        .with_bounds(3.0, 20.0)
        .unwrap()
        .with_dependencies(
            FlagKind::Visible,
            vec![DependencySpec::value_in(
                "shape",
                [Value::from("polygon"), Value::from("star")],
            )],
        );

    let spec = descriptor.flag_spec(FlagKind::Visible);
    assert!(spec.is_derived());
    assert_eq!(spec.specs().len(), 1);
    assert_eq!(
        spec.referenced_params().collect::<Vec<_>>(),
        vec!["shape"]
    );
    // The other flag stays a plain literal
    assert!(!descriptor.flag_spec(FlagKind::Enabled).is_derived());
}

#[test]
fn test_value_validation_per_kind() {
    let boolean = Descriptor::new("on", Kind::Boolean, false);
    assert!(boolean.validate_value(&Value::Bool(true)).is_ok());
    assert!(boolean.validate_value(&Value::Int(1)).is_err());

    let color = Descriptor::new("tint", Kind::Color, "#336699");
    assert!(color
        .validate_value(&Value::Color(Rgb { r: 1, g: 2, b: 3 }))
        .is_ok());
    // Hex strings pass as colors thanks to coercion-aware matching
    assert!(color.validate_value(&Value::Str("#abcdef".into())).is_ok());
    assert!(color.validate_value(&Value::Str("tomato".into())).is_err());

    let text = Descriptor::new("title", Kind::String, "untitled");
    assert!(text.validate_value(&Value::Str("anything".into())).is_ok());
    assert!(text.validate_value(&Value::Float(1.0)).is_err());
}

#[test]
fn test_allow_none_gates_absent_values() {
    let strict = Descriptor::new("x", Kind::Number, 0.0);
    assert!(strict.validate_value(&Value::None).is_err());

    let relaxed = Descriptor::new("x", Kind::Number, 0.0).with_allow_none(true);
    assert!(relaxed.validate_value(&Value::None).is_ok());
}

#[test]
fn test_selection_membership() {
    let descriptor = Descriptor::new("blend", Kind::SingleSelect, "normal")
        .with_allowed_values(["normal", "add", "multiply"].map(Value::from));

    for allowed in ["normal", "add", "multiply"] {
        assert!(descriptor.validate_value(&Value::from(allowed)).is_ok());
    }
    assert!(descriptor.validate_value(&Value::from("screen")).is_err());
    // Membership is exact, not textual: numbers are not strings
    assert!(descriptor.validate_value(&Value::Int(0)).is_err());
}
