//! # Ports
//!
//! Hexagonal boundaries: the inbound control surface the dispatcher exposes,
//! and the outbound capability sets it depends on. Adapters implement these
//! traits; the core never names a concrete collaborator.

pub mod inbound;
pub mod outbound;

pub use inbound::DispatcherApi;
pub use outbound::{EventSink, EvmClient, EvmError, TimeSource};
