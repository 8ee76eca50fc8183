//! Validation dispatcher.
//!
//! Both entry points run the same routine: sanitize, check the rule chain,
//! record the outcome on the field. [`Dispatcher::validate`] does it now;
//! [`Dispatcher::validate_debounced`] does it after the quiet period, replacing
//! any run still pending for the same field.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, trace};

use crate::field::Field;
use crate::scheduler::Scheduler;
use crate::value::FieldValue;

/// Runs validation for fields, immediately or debounced.
#[derive(Clone)]
pub struct Dispatcher {
    scheduler: Arc<dyn Scheduler>,
    delay: Duration,
}

impl Dispatcher {
    pub fn new(scheduler: Arc<dyn Scheduler>, delay: Duration) -> Self {
        Self { scheduler, delay }
    }

    /// Validate `value` against `field`'s rules now and record the result.
    pub fn validate(&self, field: &Field, value: &FieldValue) -> bool {
        validate(field, value)
    }

    /// Validate after the quiet period.
    ///
    /// Cancels the run still pending for this field, if any. Other fields are
    /// unaffected.
    pub fn validate_debounced(&self, field: &Field, value: FieldValue) {
        trace!(
            "Scheduling validation of '{}' in {:?}",
            field.id(),
            self.delay
        );
        let target = field.clone();
        field.debounce_slot().debounce(
            self.scheduler.as_ref(),
            self.delay,
            Box::new(move || {
                validate(&target, &value);
            }),
        );
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

/// Core validation routine shared by every trigger.
///
/// Validity, `changed` and `validated` are updated whatever the outcome.
pub fn validate(field: &Field, value: &FieldValue) -> bool {
    let failure = field.rules().first_failure(value);
    let valid = failure.is_none();
    field.record(valid);

    match failure {
        Some(rule) => debug!("Field '{}' failed rule '{}'", field.id(), rule),
        None => trace!("Field '{}' is valid", field.id()),
    }

    valid
}
