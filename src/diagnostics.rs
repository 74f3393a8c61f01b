//! Diagnostics Module
//!
//! Fire-and-forget sink for errors and events raised inside the core.
//! Implementations must never block the caller or panic back into it.

use std::sync::Mutex;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::{ErrorKind, PlaceError};

// == Diagnostics Trait ==
/// Receives error reports and named events.
pub trait Diagnostics: Send + Sync {
    /// Reports an error together with the context it happened in.
    fn log_error(&self, error: &PlaceError, context: &str);

    /// Reports a named event with free-form parameters.
    fn log_event(&self, name: &str, params: Value);
}

// == Tracing Diagnostics ==
/// Forwards diagnostics to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn log_error(&self, error: &PlaceError, context: &str) {
        warn!(kind = %error.kind(), context, "{}", error);
    }

    fn log_event(&self, name: &str, params: Value) {
        info!(event = name, %params, "diagnostics event");
    }
}

// == Recording Diagnostics ==
/// Error report captured by [`RecordingDiagnostics`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedError {
    pub kind: ErrorKind,
    pub message: String,
    pub context: String,
}

/// Event captured by [`RecordingDiagnostics`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub name: String,
    pub params: Value,
}

/// Keeps every report in memory, for tests and embedders that surface
/// diagnostics themselves.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    errors: Mutex<Vec<RecordedError>>,
    events: Mutex<Vec<RecordedEvent>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded errors.
    pub fn errors(&self) -> Vec<RecordedError> {
        self.errors.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Snapshot of recorded events.
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Number of recorded events with the given name.
    pub fn event_count(&self, name: &str) -> usize {
        self.events().iter().filter(|e| e.name == name).count()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn log_error(&self, error: &PlaceError, context: &str) {
        // A poisoned lock drops the report rather than panicking
        if let Ok(mut errors) = self.errors.lock() {
            errors.push(RecordedError {
                kind: error.kind(),
                message: error.to_string(),
                context: context.to_string(),
            });
        }
    }

    fn log_event(&self, name: &str, params: Value) {
        if let Ok(mut events) = self.events.lock() {
            events.push(RecordedEvent {
                name: name.to_string(),
                params,
            });
        }
    }
}
