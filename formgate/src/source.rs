//! Value sources.
//!
//! The engine never owns field values. Each input exposes its value through a
//! [`ValueSource`]; the engine reads it once at registration and then follows
//! changes through `on_change`.

use std::sync::{Arc, RwLock};

use crate::signal::{Signal, Subscription};
use crate::value::FieldValue;

/// A readable value with change notifications.
pub trait ValueSource: Send + Sync {
    /// Current value.
    fn get(&self) -> FieldValue;

    /// Call `callback` with every new value.
    fn on_change(&self, callback: Box<dyn Fn(&FieldValue) + Send + Sync>) -> Subscription;
}

/// Reactive value cell with interior mutability.
///
/// `ValueCell` is cheap to clone; clones share the value and its listeners.
/// Every `set`/`update` notifies listeners after the write lock is released.
///
/// # Example
///
/// ```ignore
/// let name = ValueCell::new("");
/// let field = registry.register_field("name", &name, Rules::new().required(), FieldOptions::default())?;
///
/// name.set("Ada");
/// assert_eq!(field.value(), "Ada".into());
/// ```
#[derive(Debug, Clone)]
pub struct ValueCell {
    inner: Arc<RwLock<FieldValue>>,
    changed: Signal<FieldValue>,
}

impl ValueCell {
    /// Create a new cell with the given value
    pub fn new(value: impl Into<FieldValue>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value.into())),
            changed: Signal::new(),
        }
    }

    /// Get a clone of the current value
    pub fn get(&self) -> FieldValue {
        self.inner
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Set a new value and notify listeners
    pub fn set(&self, value: impl Into<FieldValue>) {
        let value = value.into();
        {
            let mut guard = self.inner.write().unwrap_or_else(|p| p.into_inner());
            *guard = value.clone();
        }
        self.changed.emit(&value);
    }

    /// Update the value using a closure and notify listeners
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut FieldValue),
    {
        let value = {
            let mut guard = self.inner.write().unwrap_or_else(|p| p.into_inner());
            f(&mut guard);
            guard.clone()
        };
        self.changed.emit(&value);
    }

    /// Subscribe to changes.
    pub fn subscribe<F>(&self, f: F) -> Subscription
    where
        F: Fn(&FieldValue) + Send + Sync + 'static,
    {
        self.changed.subscribe(f)
    }
}

impl Default for ValueCell {
    fn default() -> Self {
        Self::new(FieldValue::Null)
    }
}

impl ValueSource for ValueCell {
    fn get(&self) -> FieldValue {
        ValueCell::get(self)
    }

    fn on_change(&self, callback: Box<dyn Fn(&FieldValue) + Send + Sync>) -> Subscription {
        self.changed.subscribe(move |value| callback(value))
    }
}
