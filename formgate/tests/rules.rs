//! Tests for rule evaluation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use formgate::FormError;
use formgate::rules::{RuleKind, RuleSet, Rules, validate_required};
use formgate::value::{FieldValue, SelectItem};

#[test]
fn test_required_rejects_empty_values() {
    assert!(!validate_required(&FieldValue::Null));
    assert!(!validate_required(&"".into()));
    assert!(!validate_required(&"   \t".into()));
    assert!(!validate_required(&FieldValue::List(vec![])));
    assert!(!validate_required(&false.into()));
}

#[test]
fn test_required_accepts_filled_values() {
    assert!(validate_required(&"required".into()));
    assert!(validate_required(&vec!["item1"].into()));
    assert!(validate_required(&true.into()));
}

#[test]
fn test_required_rejects_other_types() {
    assert!(!validate_required(&1337.into()));
}

#[test]
fn test_min_max_chain() {
    let rules = Rules::new().required().min(3).max(5);

    assert_eq!(rules.first_failure(&"".into()), Some(RuleKind::Required));
    assert_eq!(rules.first_failure(&"ab".into()), Some(RuleKind::Min));
    assert_eq!(rules.first_failure(&"abcdef".into()), Some(RuleKind::Max));
    assert_eq!(rules.first_failure(&"abcd".into()), None);
    assert!(rules.check(&"abcd".into()));
}

#[test]
fn test_length_is_measured_after_trim() {
    let rules = Rules::new().min(3);

    assert!(!rules.check(&"  ab  ".into()));
    assert!(rules.check(&" abc ".into()));
}

#[test]
fn test_length_counts_utf16_units() {
    let rules = Rules::new().max(3);

    assert!(rules.check(&"äöü".into()));
    assert!(rules.check(&"a🦀".into()));
    assert_eq!(rules.first_failure(&"ab🦀".into()), Some(RuleKind::Max));
    assert!(Rules::new().min(2).check(&"🦀".into()));
}

#[test]
fn test_min_applies_to_numbers_via_string_form() {
    let rules = Rules::new().min(3);

    assert!(rules.check(&1337.into()));
    assert!(!rules.check(&42.into()));
}

#[test]
fn test_zero_length_limits_are_unset() {
    let rules = Rules::new().max(0);

    assert!(rules.check(&"anything".into()));
}

#[test]
fn test_email_is_shallow() {
    let rules = Rules::new().email();

    assert_eq!(rules.first_failure(&"foo".into()), Some(RuleKind::Email));
    assert!(rules.check(&"foo@bar.baz".into()));
    assert!(rules.check(&"@".into()));
}

#[test]
fn test_strict_email() {
    let rules = Rules::new().strict_email();

    assert!(!rules.check(&"@".into()));
    assert!(!rules.check(&"foo".into()));
    assert!(rules.check(&"foo@bar.baz".into()));
}

#[test]
fn test_integer() {
    let rules = Rules::new().integer();

    assert_eq!(rules.first_failure(&"foo".into()), Some(RuleKind::Integer));
    assert!(rules.check(&"1337".into()));
    assert!(rules.check(&"-42".into()));
    assert!(!rules.check(&"4.2".into()));
    assert!(!rules.check(&"--42".into()));
    assert!(!rules.check(&"".into()));
}

#[test]
fn test_integer_only_applies_to_text() {
    let rules = Rules::new().integer();

    assert!(rules.check(&1337.into()));
    assert!(rules.check(&4.2.into()));
    assert!(rules.check(&true.into()));
    assert!(rules.check(&FieldValue::Null));
}

#[test]
fn test_regex() {
    let rules = Rules::new().regex("^foo$").unwrap();

    assert_eq!(rules.first_failure(&"bar".into()), Some(RuleKind::Regex));
    assert!(rules.check(&"foo".into()));
    assert!(rules.check(&true.into()));
    assert!(rules.check(&vec!["bar"].into()));
}

#[test]
fn test_invalid_regex_is_an_error() {
    let result = Rules::new().regex("(unclosed");

    match result {
        Err(FormError::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "(unclosed"),
        other => panic!("expected InvalidPattern, got {:?}", other),
    }
}

#[test]
fn test_custom() {
    let rules = Rules::new().custom(|v| v.as_text() == Some("foo"));

    assert_eq!(rules.first_failure(&"bar".into()), Some(RuleKind::Custom));
    assert!(rules.check(&"foo".into()));
}

#[test]
fn test_failing_required_skips_later_rules() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let rules = Rules::new().required().custom(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        true
    });

    assert_eq!(rules.first_failure(&"".into()), Some(RuleKind::Required));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    assert!(rules.check(&"x".into()));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_first_failing_stage_wins() {
    let rules = Rules::new().min(3).email().integer();

    // Fails min, email and integer; only min is reported.
    assert_eq!(rules.first_failure(&"a".into()), Some(RuleKind::Min));
    // Passes min, fails email.
    assert_eq!(rules.first_failure(&"1234".into()), Some(RuleKind::Email));
}

#[test]
fn test_panicking_custom_rule_is_invalid() {
    let rules = Rules::new().custom(|_| panic!("predicate exploded"));

    assert_eq!(rules.first_failure(&"foo".into()), Some(RuleKind::Custom));
}

#[test]
fn test_select_item_is_sanitized() {
    let rules = Rules::new().required().custom(|v| v.as_text() == Some("item1"));
    let selected: FieldValue = SelectItem::new("item 1", "item1").into();
    let placeholder: FieldValue = SelectItem::new("", "").into();

    assert!(rules.check(&selected));
    assert_eq!(rules.first_failure(&placeholder), Some(RuleKind::Required));
}

#[test]
fn test_multi_select_list_is_not_unwrapped() {
    let rules = Rules::new().required();
    let items: FieldValue = vec![
        FieldValue::from(SelectItem::new("item 1", "item1")),
        FieldValue::from(SelectItem::new("item 2", "item2")),
    ]
    .into();

    assert!(rules.check(&items));
    assert!(!rules.check(&FieldValue::List(vec![])));
}

#[test]
fn test_empty_rules_accept_anything() {
    let rules = Rules::new();

    assert!(rules.check(&FieldValue::Null));
    assert!(rules.check(&"".into()));
    assert!(!rules.is_required());
}

#[test]
fn test_rule_set_from_json() {
    let set: RuleSet =
        serde_json::from_str(r#"{ "required": true, "min": 3, "max": 5, "regex": "^a" }"#).unwrap();
    let rules = set.compile().unwrap();

    assert!(rules.is_required());
    assert_eq!(rules.first_failure(&"bcd".into()), Some(RuleKind::Regex));
    assert!(rules.check(&"abcd".into()));
}

#[test]
fn test_rule_set_strict_email_overrides_email() {
    let set: RuleSet = serde_json::from_str(r#"{ "email": true, "strict_email": true }"#).unwrap();
    let rules = Rules::try_from(set).unwrap();

    assert!(!rules.check(&"@".into()));
}

#[test]
fn test_rule_set_rejects_unknown_keys() {
    let result = serde_json::from_str::<RuleSet>(r#"{ "requird": true }"#);

    assert!(result.is_err());
}

#[test]
fn test_rule_set_with_bad_pattern() {
    let set = RuleSet {
        regex: Some("[".to_string()),
        ..Default::default()
    };

    assert!(matches!(set.compile(), Err(FormError::InvalidPattern { .. })));
}

#[test]
fn test_rule_kind_display() {
    assert_eq!(RuleKind::MinMax.to_string(), "min-max");
    assert_eq!(RuleKind::Required.to_string(), "required");
}
