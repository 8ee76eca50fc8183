//! Error types.
//!
//! Validation failures are never errors; a field that fails its rules is
//! simply [`Validity::Invalid`](crate::field::Validity::Invalid). `FormError`
//! covers misuse of the engine itself.

use std::any::Any;

use thiserror::Error;

/// Errors raised while building or wiring a form.
#[derive(Debug, Error)]
pub enum FormError {
    /// A `regex` rule could not be compiled.
    #[error("Invalid regex pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The pattern as given.
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A field with the same id is already registered.
    #[error("Field '{0}' is already registered")]
    DuplicateField(String),

    /// Fields can only be registered before the form is mounted.
    #[error("Cannot register field '{0}': form is already mounted")]
    RegistrationClosed(String),

    /// `mount` was called twice without `unmount` in between.
    #[error("Form is already mounted")]
    AlreadyMounted,

    /// The tokio scheduler was requested outside of a runtime.
    #[error("No tokio runtime available for debounced validation")]
    NoRuntime,
}

/// Message carried by a panic payload, used when a custom rule panics.
///
/// Handles `&str` and `String` payloads; anything else becomes a generic
/// message.
pub fn extract_panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
