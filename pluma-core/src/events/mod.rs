//! Event system for pluma
//!
//! The registry announces lifecycle transitions on an [`EventChannel`].
//! Listeners registered for a topic run in order and may veto a transition;
//! every published event is also kept for replay and broadcast to live
//! subscribers.

pub mod channel;
pub mod memory;
pub mod types;

pub use channel::{EventChannel, EventListener, EventSeq};
pub use memory::MemoryEventChannel;
pub use types::{Event, EventPayload, topics};
