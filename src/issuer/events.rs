//! Diagnostic events recorded against issuer resources.

use crate::domain::ObjectRef;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use tracing::{info, warn};

/// Reason recorded when an issuer fails to initialise
pub const REASON_FAILED_INIT: &str = "FailedInit";

/// Severity of a recorded event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Normal,
    Warning,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "Normal"),
            Self::Warning => write!(f, "Warning"),
        }
    }
}

/// Fire-and-forget sink for diagnostic events.
///
/// Recording must not fail from the caller's point of view; sinks that can
/// fail internally log and drop the event.
pub trait EventSink: Send + Sync + fmt::Debug {
    fn record(&self, object: &ObjectRef, event_type: EventType, reason: &str, message: &str);
}

/// Emits events as structured log records.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn record(&self, object: &ObjectRef, event_type: EventType, reason: &str, message: &str) {
        match event_type {
            EventType::Warning => {
                warn!(object = %object, event_type = %event_type, reason = %reason, "{}", message)
            }
            EventType::Normal => {
                info!(object = %object, event_type = %event_type, reason = %reason, "{}", message)
            }
        }
    }
}

/// An event captured by [`RecordingEventSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub object: ObjectRef,
    pub event_type: EventType,
    pub reason: String,
    pub message: String,
}

/// Keeps every recorded event in memory, for assertions and dry runs.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<RecordedEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far, oldest first
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for RecordingEventSink {
    fn record(&self, object: &ObjectRef, event_type: EventType, reason: &str, message: &str) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(RecordedEvent {
            object: object.clone(),
            event_type,
            reason: reason.to_string(),
            message: message.to_string(),
        });
    }
}
