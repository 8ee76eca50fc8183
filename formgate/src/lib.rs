//! Reactive field validation for form composition.
//!
//! Inputs register themselves with a [`FormRegistry`](registry::FormRegistry),
//! handing over a value source and a rule set. The engine follows value
//! changes, validates live (debounced) or on blur, and gates submission on
//! the validity of every field.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod field;
pub mod form;
pub mod lifecycle;
pub mod registry;
pub mod rules;
pub mod scheduler;
pub mod signal;
pub mod source;
pub mod value;

pub use error::FormError;
pub use form::Form;

pub mod prelude {
    pub use crate::config::{FieldOptions, FormOptions};
    pub use crate::error::FormError;
    pub use crate::events::{EventSink, FormEvent};
    pub use crate::field::{Field, FieldState, Validity};
    pub use crate::form::Form;
    pub use crate::lifecycle::{InteractionLookup, InteractionMap, InteractionSignals, InteractionSource};
    pub use crate::registry::FormRegistry;
    pub use crate::rules::{EmailCheck, RuleKind, RuleSet, Rules};
    pub use crate::scheduler::{ManualScheduler, Scheduler, TokioScheduler};
    pub use crate::signal::Subscription;
    pub use crate::source::{ValueCell, ValueSource};
    pub use crate::value::{FieldValue, SelectItem};
}
