//! # Event Sinks
//!
//! A recording sink for tests and a tracing sink that forwards events to
//! structured logs.

use crate::events::DispatcherEvent;
use crate::ports::outbound::EventSink;
use std::sync::Mutex;
use tracing::info;

/// Sink that records every event in order, for assertions.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<DispatcherEvent>>,
}

impl RecordingEventSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copied snapshot of the recorded events.
    #[must_use]
    pub fn snapshot(&self) -> Vec<DispatcherEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Drains and returns the recorded events.
    pub fn take(&self) -> Vec<DispatcherEvent> {
        self.events
            .lock()
            .map(|mut e| std::mem::take(&mut *e))
            .unwrap_or_default()
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: &DispatcherEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Sink that emits each event as a structured log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl TracingEventSink {
    /// Creates the sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for TracingEventSink {
    fn emit(&self, event: &DispatcherEvent) {
        info!(event = event.name(), detail = ?event, "dispatcher event");
    }
}

// =============================================================================
// TESTS
// =============================================================================
