//! In-process telemetry for data-access calls
//!
//! Provides:
//! - A bounded FIFO log of call events (latency, status, error)
//! - Synchronous publish/subscribe notification on every append
//! - A process-wide default recorder, plus explicit instances for injection
//!
//! Nothing is exported or persisted; the log is an observation window only.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, missing_debug_implementations)]

pub mod event;
pub mod recorder;

pub use event::{CallStatus, TelemetryEvent};
pub use recorder::{Callback, Subscription, TelemetryRecorder, DEFAULT_CAPACITY};

use lazy_static::lazy_static;

lazy_static! {
    /// Process-wide recorder, created on first use
    static ref GLOBAL: TelemetryRecorder = TelemetryRecorder::new();
}

/// Process-wide default recorder
pub fn global() -> &'static TelemetryRecorder {
    &GLOBAL
}

/// Record into the process-wide recorder
pub fn record(event: TelemetryEvent) {
    GLOBAL.record(event);
}

/// Snapshot of the process-wide log
pub fn get_metrics() -> Vec<TelemetryEvent> {
    GLOBAL.snapshot()
}

/// Subscribe to the process-wide recorder
pub fn subscribe<F>(callback: F) -> Subscription
where
    F: Fn() + Send + Sync + 'static,
{
    GLOBAL.subscribe(callback)
}
