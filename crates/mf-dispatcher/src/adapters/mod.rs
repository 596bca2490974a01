//! # Adapters
//!
//! Concrete implementations of the outbound ports: an in-memory EVM client
//! for tests and local orchestration, event sinks, and time sources.

pub mod event_sink;
pub mod evm;
pub mod time;

pub use event_sink::{RecordingEventSink, TracingEventSink};
pub use evm::InMemoryEvm;
pub use time::{ManualTimeSource, SystemTimeSource};
