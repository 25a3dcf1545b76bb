//! Telemetry event types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Outcome of an observed call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    /// Call succeeded
    Ok,
    /// Call failed
    Error,
    /// Call exceeded its deadline
    Timeout,
    /// Call was cancelled before it settled
    Aborted,
}

impl CallStatus {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Ok => "ok",
            CallStatus::Error => "error",
            CallStatus::Timeout => "timeout",
            CallStatus::Aborted => "aborted",
        }
    }

    /// Anything but `Ok`
    pub fn is_failure(&self) -> bool {
        !matches!(self, CallStatus::Ok)
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed data-access call.
///
/// Fields are read-only once built; the recorder hands out clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEvent {
    timestamp: DateTime<Utc>,
    label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    table: Option<String>,
    duration_ms: f64,
    status: CallStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl TelemetryEvent {
    /// Successful call, stamped now
    pub fn ok(label: impl Into<String>, duration: Duration) -> Self {
        Self::new(label, duration, CallStatus::Ok)
    }

    /// Call with the given outcome, stamped now
    pub fn new(label: impl Into<String>, duration: Duration, status: CallStatus) -> Self {
        Self {
            timestamp: Utc::now(),
            label: label.into(),
            table: None,
            duration_ms: duration.as_nanos() as f64 / 1_000_000.0,
            status,
            error: None,
        }
    }

    /// Attach the table / entity name
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Attach an error message
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Override the timestamp
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// When the call settled
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Logical operation name
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Table / entity name
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Call duration in milliseconds
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// Outcome
    pub fn status(&self) -> CallStatus {
        self.status
    }

    /// Error message, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
