//! Terminal form events and the sink they are emitted through.

use std::fmt;

use log::warn;
use tokio::sync::mpsc;

/// Event surfaced to the host when a form finishes submit or reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormEvent {
    /// Every field passed validation; the host may proceed with submission.
    Submit,
    /// All fields were reset.
    Reset,
}

impl FormEvent {
    /// Event name as hosts usually spell it.
    pub fn name(self) -> &'static str {
        match self {
            FormEvent::Submit => "submit",
            FormEvent::Reset => "reset",
        }
    }
}

impl fmt::Display for FormEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Host capability receiving form events.
///
/// Implemented for closures and for tokio channel senders:
///
/// ```ignore
/// let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
/// let form = Form::new(FormOptions::default(), scheduler, tx);
/// ```
pub trait EventSink: Send + Sync {
    fn emit(&self, event: FormEvent);
}

impl<F> EventSink for F
where
    F: Fn(FormEvent) + Send + Sync,
{
    fn emit(&self, event: FormEvent) {
        self(event)
    }
}

impl EventSink for mpsc::UnboundedSender<FormEvent> {
    fn emit(&self, event: FormEvent) {
        // Receiver dropped = host is gone; nothing left to notify.
        let _ = self.send(event);
    }
}

impl EventSink for mpsc::Sender<FormEvent> {
    fn emit(&self, event: FormEvent) {
        if let Err(e) = self.try_send(event) {
            warn!("Dropping form event '{}': {}", event, e);
        }
    }
}
