//! Bounded telemetry log with subscriber notification
//!
//! # Design
//!
//! - The log is a FIFO ring buffer: once `capacity` is exceeded the oldest
//!   event is evicted, regardless of access
//! - Append + evict happen under one lock, so no reader ever observes a log
//!   above capacity
//! - Subscribers run after the lock is released, in subscription order, and
//!   may call [`TelemetryRecorder::snapshot`]
//! - Registrations form a multiset: subscribing the same callback twice yields
//!   two independent registrations

use crate::event::TelemetryEvent;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use tracing::{trace, warn};

/// Default number of retained events
pub const DEFAULT_CAPACITY: usize = 200;

/// Subscriber callback
pub type Callback = Arc<dyn Fn() + Send + Sync>;

struct Registration {
    id: u64,
    callback: Callback,
}

struct State {
    log: VecDeque<TelemetryEvent>,
    subscribers: Vec<Registration>,
    next_id: u64,
}

struct Inner {
    capacity: usize,
    state: Mutex<State>,
}

/// In-memory telemetry recorder.
///
/// Cloning is cheap and clones share the same log.
#[derive(Clone)]
pub struct TelemetryRecorder {
    inner: Arc<Inner>,
}

impl TelemetryRecorder {
    /// Recorder retaining [`DEFAULT_CAPACITY`] events
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Recorder retaining at most `capacity` events (minimum 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Inner {
                capacity,
                state: Mutex::new(State {
                    log: VecDeque::with_capacity(capacity),
                    subscribers: Vec::new(),
                    next_id: 0,
                }),
            }),
        }
    }

    /// Append an event and notify subscribers
    pub fn record(&self, event: TelemetryEvent) {
        trace!(
            label = event.label(),
            status = %event.status(),
            duration_ms = event.duration_ms(),
            "telemetry event"
        );

        let callbacks: Vec<Callback> = {
            let mut state = self.inner.state.lock();
            state.log.push_back(event);
            while state.log.len() > self.inner.capacity {
                state.log.pop_front();
            }
            state.subscribers.iter().map(|r| Arc::clone(&r.callback)).collect()
        };

        for callback in callbacks {
            if catch_unwind(AssertUnwindSafe(|| callback())).is_err() {
                warn!("Telemetry subscriber panicked; ignoring");
            }
        }
    }

    /// Owned copy of the log, oldest first
    pub fn snapshot(&self) -> Vec<TelemetryEvent> {
        self.inner.state.lock().log.iter().cloned().collect()
    }

    /// Alias of [`snapshot`](Self::snapshot) for diagnostics views
    pub fn get_metrics(&self) -> Vec<TelemetryEvent> {
        self.snapshot()
    }

    /// Register a callback invoked after every `record`
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribe_arc(Arc::new(callback))
    }

    /// Register a shared callback; the same `Arc` may be registered repeatedly
    pub fn subscribe_arc(&self, callback: Callback) -> Subscription {
        let mut state = self.inner.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.subscribers.push(Registration { id, callback });

        Subscription {
            id,
            recorder: Arc::downgrade(&self.inner),
        }
    }

    /// Drop all events and subscribers
    pub fn reset(&self) {
        let mut state = self.inner.state.lock();
        state.log.clear();
        state.subscribers.clear();
    }

    /// Number of retained events
    pub fn len(&self) -> usize {
        self.inner.state.lock().log.len()
    }

    /// No events retained
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of retained events
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Number of live registrations
    pub fn subscriber_count(&self) -> usize {
        self.inner.state.lock().subscribers.len()
    }
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TelemetryRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("TelemetryRecorder")
            .field("capacity", &self.inner.capacity)
            .field("len", &state.log.len())
            .field("subscribers", &state.subscribers.len())
            .finish()
    }
}

/// Handle for one registration.
///
/// Dropping the handle leaves the callback registered.
#[must_use = "call unsubscribe() to remove the callback"]
pub struct Subscription {
    id: u64,
    recorder: Weak<Inner>,
}

impl Subscription {
    /// Remove exactly this registration. Returns false if it was already gone
    /// (recorder reset or dropped).
    pub fn unsubscribe(self) -> bool {
        let Some(inner) = self.recorder.upgrade() else {
            return false;
        };
        let mut state = inner.state.lock();
        let before = state.subscribers.len();
        state.subscribers.retain(|r| r.id != self.id);
        state.subscribers.len() != before
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
