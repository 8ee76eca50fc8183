//! Subscribe/notify primitives.
//!
//! A [`Signal`] is a list of listeners. Emitting calls every listener with a
//! reference to the payload. Subscribing returns a [`Subscription`] that
//! detaches the listener when it is dropped or explicitly unsubscribed.

use std::fmt;
use std::sync::{Arc, Mutex, Weak};

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct SignalInner<T> {
    next_id: u64,
    listeners: Vec<(u64, Listener<T>)>,
}

/// A cloneable list of listeners for payloads of type `T`.
pub struct Signal<T> {
    inner: Arc<Mutex<SignalInner<T>>>,
}

impl<T: 'static> Signal<T> {
    /// Create a signal with no listeners.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SignalInner {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Register a listener.
    pub fn subscribe<F>(&self, f: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = {
            let mut guard = self.inner.lock().unwrap_or_else(|p| p.into_inner());
            let id = guard.next_id;
            guard.next_id += 1;
            guard.listeners.push((id, Arc::new(f)));
            id
        };

        let weak: Weak<Mutex<SignalInner<T>>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            // Signal already dropped: nothing left to detach from.
            if let Some(inner) = weak.upgrade() {
                let mut guard = inner.lock().unwrap_or_else(|p| p.into_inner());
                guard.listeners.retain(|(lid, _)| *lid != id);
            }
        })
    }

    /// Call every listener with `payload`.
    ///
    /// Listeners are called outside the lock, so they may subscribe, unsubscribe
    /// or emit again.
    pub fn emit(&self, payload: &T) {
        let listeners: Vec<Listener<T>> = {
            let guard = self.inner.lock().unwrap_or_else(|p| p.into_inner());
            guard.listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
        };
        for listener in listeners {
            listener(payload);
        }
    }

    /// Number of attached listeners.
    pub fn listener_count(&self) -> usize {
        self.inner
            .lock()
            .map(|guard| guard.listeners.len())
            .unwrap_or_default()
    }
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal").finish_non_exhaustive()
    }
}

/// Handle to an attached listener.
///
/// Dropping the handle detaches the listener. Use [`Subscription::forget`] to
/// keep a listener attached for the lifetime of its signal.
#[must_use = "dropping a Subscription detaches the listener"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Wrap a detach callback.
    pub fn new<F>(detach: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Detach the listener now.
    pub fn unsubscribe(mut self) {
        self.run_detach();
    }

    /// Keep the listener attached without holding the handle.
    pub fn forget(mut self) {
        self.detach = None;
    }

    fn run_detach(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_detach();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}
