//! Lifecycle binding of interaction signals.
//!
//! Once a form is mounted, each field's id is resolved to an
//! [`InteractionSource`] supplied by the host UI layer. Focus and activate
//! mark the field touched. Blur validates the field's current value
//! immediately, whatever the on-blur mode.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::{debug, trace, warn};

use crate::dispatch::Dispatcher;
use crate::field::Field;
use crate::registry::FormRegistry;
use crate::signal::{Signal, Subscription};

/// Callback type for interaction listeners.
pub type InteractionCallback = Box<dyn Fn() + Send + Sync>;

/// Focus, activate and blur signals of one rendered input.
pub trait InteractionSource: Send + Sync {
    fn on_focus(&self, callback: InteractionCallback) -> Subscription;

    /// Click, tap or keyboard activation.
    fn on_activate(&self, callback: InteractionCallback) -> Subscription;

    fn on_blur(&self, callback: InteractionCallback) -> Subscription;
}

/// Resolves a field id to its interaction source.
pub trait InteractionLookup {
    fn lookup(&self, id: &str) -> Option<Arc<dyn InteractionSource>>;
}

impl<F> InteractionLookup for F
where
    F: Fn(&str) -> Option<Arc<dyn InteractionSource>>,
{
    fn lookup(&self, id: &str) -> Option<Arc<dyn InteractionSource>> {
        self(id)
    }
}

/// A ready-made interaction source the host fires by hand.
///
/// ```ignore
/// let signals = InteractionSignals::new();
/// map.insert("email", signals.clone());
///
/// // in the input's event handler
/// signals.blur();
/// ```
#[derive(Debug, Clone, Default)]
pub struct InteractionSignals {
    focus: Signal<()>,
    activate: Signal<()>,
    blur: Signal<()>,
}

impl InteractionSignals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self) {
        self.focus.emit(&());
    }

    pub fn activate(&self) {
        self.activate.emit(&());
    }

    pub fn blur(&self) {
        self.blur.emit(&());
    }

    /// Listeners across all three signals.
    pub fn listener_count(&self) -> usize {
        self.focus.listener_count() + self.activate.listener_count() + self.blur.listener_count()
    }
}

impl InteractionSource for InteractionSignals {
    fn on_focus(&self, callback: InteractionCallback) -> Subscription {
        self.focus.subscribe(move |_| callback())
    }

    fn on_activate(&self, callback: InteractionCallback) -> Subscription {
        self.activate.subscribe(move |_| callback())
    }

    fn on_blur(&self, callback: InteractionCallback) -> Subscription {
        self.blur.subscribe(move |_| callback())
    }
}

/// Id-keyed map of interaction sources.
#[derive(Default, Clone)]
pub struct InteractionMap {
    sources: HashMap<String, Arc<dyn InteractionSource>>,
}

impl InteractionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, source: impl InteractionSource + 'static) {
        self.sources.insert(id.into(), Arc::new(source));
    }
}

impl InteractionLookup for InteractionMap {
    fn lookup(&self, id: &str) -> Option<Arc<dyn InteractionSource>> {
        self.sources.get(id).cloned()
    }
}

impl fmt::Debug for InteractionMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionMap")
            .field("ids", &self.sources.keys().collect::<Vec<_>>())
            .finish()
    }
}

struct FieldBinding {
    id: String,
    subscriptions: [Subscription; 3],
}

/// Live interaction subscriptions of a mounted form.
#[derive(Default)]
pub struct LifecycleBinder {
    bindings: Vec<FieldBinding>,
}

impl LifecycleBinder {
    /// Subscribe to every registered field's interaction source.
    ///
    /// Fields whose id does not resolve are skipped.
    pub fn bind(registry: &FormRegistry, lookup: &dyn InteractionLookup) -> Self {
        let mut bindings = Vec::new();

        for field in registry.fields() {
            let Some(source) = lookup.lookup(field.id()) else {
                warn!("No interaction source for field '{}'", field.id());
                continue;
            };

            let subscriptions = [
                source.on_focus(touch_handler(&field)),
                source.on_activate(touch_handler(&field)),
                source.on_blur(blur_handler(&field, registry.dispatcher())),
            ];

            trace!("Bound interaction signals for field '{}'", field.id());
            bindings.push(FieldBinding {
                id: field.id().to_string(),
                subscriptions,
            });
        }

        debug!("Bound {} field(s)", bindings.len());
        Self { bindings }
    }

    /// Ids of fields with live subscriptions.
    pub fn bound_ids(&self) -> Vec<&str> {
        self.bindings.iter().map(|b| b.id.as_str()).collect()
    }

    /// Drop every subscription.
    ///
    /// Sources that no longer exist are skipped silently.
    pub fn unbind(self) {
        for binding in self.bindings {
            trace!("Unbinding field '{}'", binding.id);
            for subscription in binding.subscriptions {
                subscription.unsubscribe();
            }
        }
    }
}

impl fmt::Debug for LifecycleBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleBinder")
            .field("bound", &self.bound_ids())
            .finish()
    }
}

fn touch_handler(field: &Field) -> InteractionCallback {
    let field = field.clone();
    Box::new(move || field.touch())
}

fn blur_handler(field: &Field, dispatcher: &Dispatcher) -> InteractionCallback {
    let field = field.clone();
    let dispatcher = dispatcher.clone();
    Box::new(move || {
        dispatcher.validate(&field, &field.value());
    })
}
