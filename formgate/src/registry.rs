//! Field registry.
//!
//! The registry is the context object handed to every input at construction.
//! Inputs call [`FormRegistry::register_field`] with their id, value source
//! and rules; the registry keeps the fields in registration order and derives
//! `errors` and form validity from them on every read.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use log::{debug, trace};

use crate::config::{FieldOptions, FormOptions};
use crate::dispatch::Dispatcher;
use crate::error::FormError;
use crate::field::Field;
use crate::rules::{Rules, validate_required};
use crate::signal::Subscription;
use crate::source::ValueSource;
use crate::value::FieldValue;

struct RegistryInner {
    options: FormOptions,
    dispatcher: Dispatcher,
    fields: RwLock<Vec<Field>>,
    subscriptions: Mutex<Vec<Subscription>>,
    open: AtomicBool,
}

/// Ordered collection of a form's fields.
///
/// Cheap to clone; clones share the same fields.
#[derive(Clone)]
pub struct FormRegistry {
    inner: Arc<RegistryInner>,
}

impl FormRegistry {
    pub fn new(options: FormOptions, dispatcher: Dispatcher) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                options,
                dispatcher,
                fields: RwLock::new(Vec::new()),
                subscriptions: Mutex::new(Vec::new()),
                open: AtomicBool::new(true),
            }),
        }
    }

    /// Register a field and start following its value source.
    ///
    /// The field starts `Unknown` with the source's current value. Every
    /// change from `source` updates the field's value and then, unless the
    /// on-blur rule suppresses it, validates (debounced or immediately per
    /// `options`).
    ///
    /// Fails if the id is taken or the form is already mounted.
    pub fn register_field(
        &self,
        id: impl Into<String>,
        source: &dyn ValueSource,
        rules: Rules,
        options: FieldOptions,
    ) -> Result<Field, FormError> {
        let id = id.into();

        if !self.inner.open.load(Ordering::SeqCst) {
            return Err(FormError::RegistrationClosed(id));
        }
        if self.field(&id).is_some() {
            return Err(FormError::DuplicateField(id));
        }

        let field = Field::new(id, rules, source.get());

        let target = field.clone();
        let dispatcher = self.inner.dispatcher.clone();
        let on_blur = self.inner.options.on_blur;
        let subscription = source.on_change(Box::new(move |value: &FieldValue| {
            on_value_change(&target, &dispatcher, on_blur, options, value);
        }));

        debug!(
            "Registered field '{}' (required: {}, {:?})",
            field.id(),
            field.is_required(),
            options
        );

        self.lock_subscriptions().push(subscription);
        match self.inner.fields.write() {
            Ok(mut fields) => fields.push(field.clone()),
            Err(poisoned) => poisoned.into_inner().push(field.clone()),
        }

        Ok(field)
    }

    /// All fields in registration order.
    pub fn fields(&self) -> Vec<Field> {
        self.inner
            .fields
            .read()
            .map(|fields| fields.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Look a field up by id.
    pub fn field(&self, id: &str) -> Option<Field> {
        self.fields().into_iter().find(|f| f.id() == id)
    }

    pub fn len(&self) -> usize {
        self.fields().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fields whose last validation failed, in registration order.
    pub fn errors(&self) -> Vec<Field> {
        self.fields()
            .into_iter()
            .filter(|f| f.validity().is_invalid())
            .collect()
    }

    /// Whether the form may submit.
    ///
    /// Stricter than "no errors": every required field must also pass the
    /// required check on its current value, validated or not.
    pub fn is_valid(&self) -> bool {
        let fields = self.fields();
        let no_errors = fields.iter().all(|f| !f.validity().is_invalid());
        let required_filled = fields
            .iter()
            .filter(|f| f.is_required())
            .all(|f| validate_required(f.value().sanitized()));

        no_errors && required_filled
    }

    pub fn options(&self) -> FormOptions {
        self.inner.options
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    /// Stop accepting registrations. Called when the form mounts.
    pub(crate) fn close_registration(&self) {
        self.inner.open.store(false, Ordering::SeqCst);
    }

    pub fn is_open(&self) -> bool {
        self.inner.open.load(Ordering::SeqCst)
    }

    fn lock_subscriptions(&self) -> std::sync::MutexGuard<'_, Vec<Subscription>> {
        self.inner
            .subscriptions
            .lock()
            .unwrap_or_else(|p| p.into_inner())
    }
}

impl fmt::Debug for FormRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormRegistry")
            .field("options", &self.inner.options)
            .field("fields", &self.fields())
            .field("open", &self.is_open())
            .finish()
    }
}

fn on_value_change(
    field: &Field,
    dispatcher: &Dispatcher,
    on_blur: bool,
    options: FieldOptions,
    value: &FieldValue,
) {
    field.set_value(value.clone());

    // On-blur mode: no live feedback until the field has failed once.
    if on_blur && !options.override_on_blur && !field.validity().is_invalid() {
        trace!("Field '{}' changed; deferring validation to blur", field.id());
        return;
    }

    if options.use_debounce {
        dispatcher.validate_debounced(field, value.clone());
    } else {
        dispatcher.validate(field, value);
    }
}
