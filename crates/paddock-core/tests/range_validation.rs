use paddock_core::config::PaddockConfig;
use paddock_core::error::SetupError;
use paddock_core::range::{RangePolicy, RangeRegistry, RangeSpec, RangeValidator, CORNERS};
use paddock_core::setup::SetupField;

#[test]
fn test_registry_max_clamp() {
    let validator = RangeValidator::default();
    assert_eq!(validator.clamp("front.fl.pressure", 5.0), 2.2);
}

#[test]
fn test_default_spec_for_unknown_path() {
    let validator = RangeValidator::default();
    assert_eq!(validator.clamp("unknown.key", 500.0), 100.0);

    let spec = validator.range_for("nonexistent.path");
    assert_eq!(spec.min, 0.0);
    assert_eq!(spec.max, 100.0);
    assert_eq!(spec.step, 1.0);
    assert_eq!(spec.unit, "");
}

#[test]
fn test_clamp_always_within_bounds() {
    let validator = RangeValidator::default();
    let inputs = [-1e300, -1e6, -5.0, -0.0, 0.0, 1.5, 42.0, 1e6, 1e300, f64::MAX, f64::MIN];

    let mut paths: Vec<&str> = validator.registry().paths();
    paths.push("not.registered");

    for path in paths {
        let spec = validator.range_for(path);
        for value in inputs {
            let clamped = validator.clamp(path, value);
            assert!(
                clamped >= spec.min && clamped <= spec.max,
                "{} clamped {} to {}",
                path,
                value,
                clamped
            );
        }
    }
}

#[test]
fn test_every_field_has_a_range() {
    let registry = RangeRegistry::builtin();
    for field in SetupField::ALL {
        assert!(registry.contains(&field.range_path()), "{}", field);
    }
    for corner in CORNERS {
        assert!(registry.contains(&format!("{}.pressure", corner)));
    }
}

#[test]
fn test_overrides_from_config() {
    let mut config = PaddockConfig::default();
    config.range_overrides.insert(
        "front.fl.pressure".into(),
        RangeSpec::new(1.0, 3.0, 0.1, "bar").unwrap(),
    );
    config.range_overrides.insert(
        "ballast.kg".into(),
        RangeSpec::new(0.0, 40.0, 1.0, "kg").unwrap(),
    );

    let validator = RangeValidator::from_config(&config).unwrap();
    assert_eq!(validator.clamp("front.fl.pressure", 5.0), 3.0);
    assert_eq!(validator.clamp("front.fr.pressure", 5.0), 2.2);
    assert_eq!(validator.clamp("ballast.kg", 55.0), 40.0);
}

#[test]
fn test_invalid_override_rejected() {
    let config: PaddockConfig = serde_json::from_str(
        r#"{"range_overrides": {"aero.rear_wing": {"min": 30, "max": 0, "step": 1}}}"#,
    )
    .unwrap();

    match RangeValidator::from_config(&config) {
        Err(SetupError::InvalidRange { path, .. }) => assert_eq!(path, "aero.rear_wing"),
        other => panic!("Expected InvalidRange, got {:?}", other.map(|v| v.policy())),
    }
}

#[test]
fn test_reject_policy_from_config() {
    let config: PaddockConfig = serde_json::from_str(r#"{"range_policy": "reject"}"#).unwrap();
    let validator = RangeValidator::from_config(&config).unwrap();
    assert_eq!(validator.policy(), RangePolicy::Reject);

    assert!(matches!(
        validator.apply("front.fl.pressure", 5.0),
        Err(SetupError::OutOfRange { .. })
    ));
    // Clamping stays available regardless of policy
    assert_eq!(validator.clamp("front.fl.pressure", 5.0), 2.2);
}
