//! Form controller.
//!
//! `Form` ties the registry, the lifecycle binder and the host's event sink
//! together and exposes the submit/reset operations.
//!
//! # Example
//!
//! ```ignore
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let form = Form::with_tokio(FormOptions::new().on_blur(true), tx)?;
//!
//! let email = ValueCell::new("");
//! form.registry()
//!     .register_field("email", &email, Rules::new().required().email(), FieldOptions::default())?;
//!
//! form.mount(&interactions)?;
//!
//! email.set("ada@example.com");
//! form.submit();
//! assert_eq!(rx.recv().await, Some(FormEvent::Submit));
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info};

use crate::config::{FieldOptions, FormOptions};
use crate::dispatch::Dispatcher;
use crate::error::FormError;
use crate::events::{EventSink, FormEvent};
use crate::field::Field;
use crate::lifecycle::{InteractionLookup, LifecycleBinder};
use crate::registry::FormRegistry;
use crate::rules::Rules;
use crate::scheduler::{Scheduler, TokioScheduler};
use crate::source::ValueSource;

/// A form: its fields, their interaction bindings and the submit gate.
pub struct Form {
    registry: FormRegistry,
    sink: Arc<dyn EventSink>,
    binder: Mutex<Option<LifecycleBinder>>,
}

impl Form {
    /// Create a form using `scheduler` for debounced validation and `sink`
    /// for submit/reset events.
    pub fn new(
        options: FormOptions,
        scheduler: Arc<dyn Scheduler>,
        sink: impl EventSink + 'static,
    ) -> Self {
        let dispatcher = Dispatcher::new(scheduler, options.validation_delay);
        Self {
            registry: FormRegistry::new(options, dispatcher),
            sink: Arc::new(sink),
            binder: Mutex::new(None),
        }
    }

    /// Create a form whose debounce timers run on the current tokio runtime.
    pub fn with_tokio(options: FormOptions, sink: impl EventSink + 'static) -> Result<Self, FormError> {
        let scheduler = TokioScheduler::current()?;
        Ok(Self::new(options, Arc::new(scheduler), sink))
    }

    /// The registry to hand to input constructors.
    pub fn registry(&self) -> FormRegistry {
        self.registry.clone()
    }

    /// Shorthand for [`FormRegistry::register_field`].
    pub fn register_field(
        &self,
        id: impl Into<String>,
        source: &dyn ValueSource,
        rules: Rules,
        options: FieldOptions,
    ) -> Result<Field, FormError> {
        self.registry.register_field(id, source, rules, options)
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Bind every field to its interaction source and close registration.
    pub fn mount(&self, lookup: &dyn InteractionLookup) -> Result<(), FormError> {
        let mut binder = self.lock_binder();
        if binder.is_some() {
            return Err(FormError::AlreadyMounted);
        }

        self.registry.close_registration();
        *binder = Some(LifecycleBinder::bind(&self.registry, lookup));
        debug!("Form mounted with {} field(s)", self.registry.len());
        Ok(())
    }

    /// Tear down interaction bindings. No-op if not mounted.
    pub fn unmount(&self) {
        if let Some(binder) = self.lock_binder().take() {
            binder.unbind();
            debug!("Form unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.lock_binder().is_some()
    }

    // -------------------------------------------------------------------------
    // Submit / reset
    // -------------------------------------------------------------------------

    /// Validate every field now, in registration order, and emit
    /// [`FormEvent::Submit`] if the form is then valid.
    ///
    /// Emits nothing when invalid; inspect [`Form::errors`] to find out why.
    pub fn submit(&self) {
        let dispatcher = self.registry.dispatcher();
        for field in self.registry.fields() {
            dispatcher.validate(&field, &field.value());
        }

        if self.registry.is_valid() {
            info!("Form submitted");
            self.sink.emit(FormEvent::Submit);
        } else {
            debug!(
                "Submit blocked: {} field(s) with errors",
                self.registry.errors().len()
            );
        }
    }

    /// Reset every field and emit [`FormEvent::Reset`].
    pub fn reset(&self) {
        for field in self.registry.fields() {
            field.reset();
        }
        debug!("Form reset");
        self.sink.emit(FormEvent::Reset);
    }

    // -------------------------------------------------------------------------
    // Derived state
    // -------------------------------------------------------------------------

    /// Fields whose last validation failed.
    pub fn errors(&self) -> Vec<Field> {
        self.registry.errors()
    }

    /// Whether the form may submit.
    pub fn is_valid(&self) -> bool {
        self.registry.is_valid()
    }

    pub fn fields(&self) -> Vec<Field> {
        self.registry.fields()
    }

    pub fn field(&self, id: &str) -> Option<Field> {
        self.registry.field(id)
    }

    fn lock_binder(&self) -> MutexGuard<'_, Option<LifecycleBinder>> {
        self.binder.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Drop for Form {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("registry", &self.registry)
            .field("mounted", &self.is_mounted())
            .finish()
    }
}
