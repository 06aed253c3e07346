use fieldval::{FieldArchetype, FieldConfig, FieldController, StoreSnapshot};
use pretty_assertions::assert_eq;
use std::sync::Arc;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn scalar(config: &str) -> Result<FieldController> {
    Ok(FieldController::new(
        "limit",
        FieldArchetype::Scalar,
        FieldConfig::from_json(config)?,
        Arc::new(StoreSnapshot::default()),
    ))
}

#[test]
fn default_is_written_exactly_once_for_an_unset_value() -> Result<()> {
    let mut field = scalar(r#"{"default": 7, "dataType": "integer"}"#)?;

    let resolution = field.resolve(None).expect("first evaluation");
    assert_eq!(resolution.value, "7");
    assert!(resolution.should_persist);

    // Re-renders with the same observed value do not re-emit.
    assert!(field.resolve(None).is_none());
    assert!(field.resolve(None).is_none());

    // Once the host has persisted it, resolution settles without a write.
    let resolution = field.resolve(Some("7")).expect("identity changed");
    assert!(!resolution.should_persist);
    Ok(())
}

#[test]
fn explicit_falsy_values_beat_the_default() -> Result<()> {
    for falsy in ["0", "", "false"] {
        let mut field = scalar(r#"{"default": "fallback"}"#)?;
        let resolution = field.resolve(Some(falsy)).expect("resolves");
        assert_eq!(resolution.value, falsy);
        assert!(!resolution.should_persist, "default overwrote {falsy:?}");
    }
    Ok(())
}

#[test]
fn string_defaults_pass_through_unchanged() -> Result<()> {
    let mut field = scalar(r#"{"default": "medium"}"#)?;
    let resolution = field.resolve(None).expect("resolves");
    assert_eq!(resolution.value, "medium");
    assert!(resolution.should_persist);
    Ok(())
}

#[test]
fn integer_edits_use_the_same_emission_channel_as_defaulting() -> Result<()> {
    let mut field = scalar(r#"{"default": 7, "dataType": "integer"}"#)?;
    field.resolve(None);

    let emit = field.set_scalar("12.8")?;
    assert_eq!(emit.name, "limit");
    assert_eq!(emit.value, "12");

    // The emitted value is the next observed identity: no echo write.
    assert!(field.resolve(Some("12")).is_none());
    Ok(())
}

#[test]
fn grouped_default_resolution_goes_through_the_guard() -> Result<()> {
    // A grouped default may itself be double-encoded; it still seeds slots.
    let mut field = FieldController::new(
        "gaps",
        FieldArchetype::Grouped,
        FieldConfig::from_json(
            r#"{"fields": ["x", "y"], "dataType": "integer", "default": "\"{\\\"x\\\":1}\""}"#,
        )?,
        Arc::new(StoreSnapshot::default()),
    );

    let resolution = field.resolve(None).expect("resolves");
    assert!(resolution.should_persist);
    assert_eq!(resolution.value, r#"{"x":1,"y":null}"#);
    Ok(())
}
