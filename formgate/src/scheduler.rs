//! Cancellable timers for debounced validation.
//!
//! [`Scheduler::schedule`] runs a task once after a delay and returns a
//! [`TimerHandle`] that can cancel it. [`DebounceSlot`] keeps at most one
//! pending timer and replaces it wholesale on every call, which gives
//! trailing-debounce semantics.
//!
//! Two backends are provided:
//! - [`TokioScheduler`] spawns a sleeping task on a tokio runtime.
//! - [`ManualScheduler`] keeps a virtual clock that the host advances. Useful
//!   for hosts that drive their own frame loop, and for tests.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::trace;
use tokio::runtime::Handle;

use crate::error::FormError;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send>;

/// Something that can run a task after a delay.
pub trait Scheduler: Send + Sync {
    /// Run `task` once `delay` has elapsed, unless cancelled first.
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle;
}

/// Cancels a scheduled task.
///
/// Dropping the handle does not cancel the task.
pub struct TimerHandle {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl TimerHandle {
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Cancel the task. No-op if it already ran.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle").finish_non_exhaustive()
    }
}

/// Holds at most one pending timer.
#[derive(Debug, Default)]
pub struct DebounceSlot {
    pending: Mutex<Option<TimerHandle>>,
}

impl DebounceSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the pending timer (if any) and schedule `task` in its place.
    pub fn debounce(&self, scheduler: &dyn Scheduler, delay: Duration, task: Task) {
        let mut guard = self.pending.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(previous) = guard.take() {
            trace!("Debounce: replacing pending timer");
            previous.cancel();
        }
        *guard = Some(scheduler.schedule(delay, task));
    }

    /// Cancel the pending timer, if any.
    pub fn cancel(&self) {
        let previous = self
            .pending
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take();
        if let Some(previous) = previous {
            previous.cancel();
        }
    }
}

// =============================================================================
// Tokio
// =============================================================================

/// Timer backend running on a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Use the given runtime.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Use the runtime the caller is running on.
    pub fn current() -> Result<Self, FormError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| FormError::NoRuntime)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        let join = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
        let abort = join.abort_handle();
        TimerHandle::new(move || abort.abort())
    }
}

// =============================================================================
// Manual
// =============================================================================

struct PendingTask {
    due: Duration,
    seq: u64,
    task: Task,
    cancelled: Arc<AtomicBool>,
}

#[derive(Default)]
struct ManualInner {
    now: Duration,
    next_seq: u64,
    queue: Vec<PendingTask>,
}

/// Timer backend driven by a virtual clock.
///
/// Nothing runs until [`ManualScheduler::advance`] moves the clock past a
/// task's due time. Tasks due at the same instant run in scheduling order.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Arc<Mutex<ManualInner>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of tasks scheduled and not yet run or cancelled.
    pub fn pending(&self) -> usize {
        self.lock()
            .queue
            .iter()
            .filter(|p| !p.cancelled.load(Ordering::SeqCst))
            .count()
    }

    /// Move the clock forward by `by`, running every task that falls due.
    ///
    /// Returns the number of tasks that ran.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.lock().now + by;
        let mut ran = 0;

        loop {
            let next = {
                let mut guard = self.lock();
                guard.queue.retain(|p| !p.cancelled.load(Ordering::SeqCst));

                let next_idx = guard
                    .queue
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.due <= target)
                    .min_by_key(|(_, p)| (p.due, p.seq))
                    .map(|(i, _)| i);

                match next_idx {
                    Some(idx) => {
                        let pending = guard.queue.remove(idx);
                        guard.now = pending.due;
                        Some(pending.task)
                    }
                    None => {
                        guard.now = target;
                        None
                    }
                }
            };

            // Run outside the lock; tasks may schedule more work.
            match next {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => break,
            }
        }

        ran
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualInner> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        {
            let mut guard = self.lock();
            guard.queue.retain(|p| !p.cancelled.load(Ordering::SeqCst));
            let seq = guard.next_seq;
            guard.next_seq += 1;
            let due = guard.now + delay;
            guard.queue.push(PendingTask {
                due,
                seq,
                task,
                cancelled: Arc::clone(&cancelled),
            });
        }
        TimerHandle::new(move || cancelled.store(true, Ordering::SeqCst))
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("now", &self.now())
            .field("pending", &self.pending())
            .finish()
    }
}
