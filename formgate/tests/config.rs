//! Tests for configuration types.

use std::time::Duration;

use formgate::config::{DEFAULT_VALIDATION_DELAY, FieldOptions, FormOptions};

#[test]
fn test_form_options_defaults() {
    let options = FormOptions::default();

    assert!(!options.on_blur);
    assert_eq!(options.validation_delay, DEFAULT_VALIDATION_DELAY);
}

#[test]
fn test_form_options_builder() {
    let options = FormOptions::new()
        .on_blur(true)
        .validation_delay(Duration::from_millis(50));

    assert!(options.on_blur);
    assert_eq!(options.validation_delay, Duration::from_millis(50));
}

#[test]
fn test_form_options_from_json() {
    let options: FormOptions =
        serde_json::from_str(r#"{ "on_blur": true, "validation_delay_ms": 250 }"#).unwrap();

    assert!(options.on_blur);
    assert_eq!(options.validation_delay, Duration::from_millis(250));
}

#[test]
fn test_form_options_partial_json_keeps_defaults() {
    let options: FormOptions = serde_json::from_str(r#"{ "on_blur": true }"#).unwrap();

    assert_eq!(options.validation_delay, DEFAULT_VALIDATION_DELAY);
}

#[test]
fn test_form_options_serialize_in_millis() {
    let json = serde_json::to_value(FormOptions::default()).unwrap();

    assert_eq!(json["validation_delay_ms"], 300);
}

#[test]
fn test_field_options() {
    let defaults = FieldOptions::default();
    assert!(!defaults.override_on_blur);
    assert!(defaults.use_debounce);

    let custom = FieldOptions::new().override_on_blur().immediate();
    assert!(custom.override_on_blur);
    assert!(!custom.use_debounce);
}
