//! Tests for field values, value cells and signals.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use formgate::signal::Signal;
use formgate::source::{ValueCell, ValueSource};
use formgate::value::{FieldValue, SelectItem};

#[test]
fn test_string_form() {
    assert_eq!(FieldValue::Null.to_text(), "");
    assert_eq!(FieldValue::from(true).to_text(), "true");
    assert_eq!(FieldValue::from(1337).to_text(), "1337");
    assert_eq!(FieldValue::from(-4.5).to_text(), "-4.5");
    assert_eq!(FieldValue::from(vec!["a", "b"]).to_text(), "a,b");
    assert_eq!(FieldValue::from(SelectItem::new("Item", "item1")).to_text(), "item1");
}

#[test]
fn test_sanitize_unwraps_top_level_item_only() {
    let item = FieldValue::from(SelectItem::new("Item", "item1"));
    assert_eq!(item.sanitized(), &FieldValue::from("item1"));

    let list = FieldValue::from(vec![SelectItem::new("Item", "item1")]);
    assert_eq!(list.sanitized(), &list);
}

#[test]
fn test_option_conversion() {
    assert!(FieldValue::from(None::<String>).is_null());
    assert_eq!(FieldValue::from(Some("x")), FieldValue::from("x"));
}

#[test]
fn test_value_from_json() {
    let value: FieldValue =
        serde_json::from_str(r#"[{ "label": "item 1", "value": "item1" }, null, 3]"#).unwrap();

    assert_eq!(
        value,
        FieldValue::List(vec![
            SelectItem::new("item 1", "item1").into(),
            FieldValue::Null,
            FieldValue::Number(3.0),
        ])
    );
}

#[test]
fn test_value_cell_notifies_listeners() {
    let cell = ValueCell::new("a");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let subscription = cell.subscribe(move |v| sink.lock().unwrap().push(v.clone()));

    cell.set("b");
    cell.update(|v| *v = FieldValue::from("c"));
    subscription.unsubscribe();
    cell.set("d");

    assert_eq!(
        *seen.lock().unwrap(),
        vec![FieldValue::from("b"), FieldValue::from("c")]
    );
    assert_eq!(cell.get(), FieldValue::from("d"));
}

#[test]
fn test_value_cell_recovers_from_poisoned_lock() {
    let cell = ValueCell::new("a");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _subscription = cell.subscribe(move |v| sink.lock().unwrap().push(v.clone()));

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        cell.update(|_| panic!("update failed"));
    }));
    assert!(result.is_err());

    cell.set("b");
    cell.update(|v| *v = FieldValue::from("c"));

    assert_eq!(cell.get(), FieldValue::from("c"));
    assert_eq!(
        *seen.lock().unwrap(),
        vec![FieldValue::from("b"), FieldValue::from("c")]
    );
}

#[test]
fn test_value_source_trait() {
    let cell = ValueCell::new(true);
    let source: &dyn ValueSource = &cell;
    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);

    let _subscription = source.on_change(Box::new(move |v: &FieldValue| *sink.lock().unwrap() = Some(v.clone())));
    cell.set(false);

    assert_eq!(source.get(), FieldValue::Bool(false));
    assert_eq!(*seen.lock().unwrap(), Some(FieldValue::Bool(false)));
}

#[test]
fn test_dropping_subscription_detaches() {
    let signal: Signal<u32> = Signal::new();

    {
        let _subscription = signal.subscribe(|_| {});
        assert_eq!(signal.listener_count(), 1);
    }

    assert_eq!(signal.listener_count(), 0);
}

#[test]
fn test_forget_keeps_listener() {
    let signal: Signal<u32> = Signal::new();
    let total = Arc::new(Mutex::new(0));
    let sink = Arc::clone(&total);

    signal.subscribe(move |n| *sink.lock().unwrap() += n).forget();
    signal.emit(&2);
    signal.emit(&3);

    assert_eq!(*total.lock().unwrap(), 5);
}

#[test]
fn test_listener_may_unsubscribe_others_while_emitting() {
    let signal: Signal<()> = Signal::new();
    let slot = Arc::new(Mutex::new(None));
    let victim = signal.subscribe(|_| {});
    *slot.lock().unwrap() = Some(victim);

    let slot_for_listener = Arc::clone(&slot);
    let _remover = signal.subscribe(move |_| {
        if let Some(sub) = slot_for_listener.lock().unwrap().take() {
            sub.unsubscribe();
        }
    });

    signal.emit(&());

    assert_eq!(signal.listener_count(), 1);
}
