//! EventChannel trait definition
//!
//! The EventChannel abstraction lets the registry announce transitions
//! without knowing who listens, and lets listeners veto a transition.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::{Event, EventPayload};
use crate::error::EventError;

/// Sequence number for events (monotonically increasing)
pub type EventSeq = u64;

/// Reacts to events published on a topic
///
/// Returning an error from [`EventListener::on_event`] vetoes the event when
/// it was published with [`EventChannel::invoke`].
#[async_trait]
pub trait EventListener: Send + Sync {
    async fn on_event(&self, event: &Event) -> Result<(), EventError>;
}

#[async_trait]
impl<F> EventListener for F
where
    F: Fn(&Event) -> Result<(), EventError> + Send + Sync,
{
    async fn on_event(&self, event: &Event) -> Result<(), EventError> {
        self(event)
    }
}

/// Publish/subscribe channel for registry events
///
/// Implementations must support:
/// - Topic listeners that run in registration order and can veto
/// - Live subscriptions via broadcast channel
/// - Historical replay from a sequence number
#[async_trait]
pub trait EventChannel: Send + Sync {
    /// Publish `payload` on each topic in turn, running that topic's
    /// listeners. The first veto stops the remaining listeners and topics
    /// and is returned.
    async fn invoke(&self, topics: &[String], payload: EventPayload) -> Result<(), EventError>;

    /// Publish `payload` on a single topic. Listener errors are logged, not
    /// returned. Returns the event's sequence number.
    async fn emit(&self, topic: &str, payload: EventPayload) -> EventSeq;

    /// Register a listener for a topic
    async fn listen(&self, topic: &str, listener: Arc<dyn EventListener>);

    /// Subscribe to all events from now (live stream)
    fn subscribe(&self) -> broadcast::Receiver<(EventSeq, Event)>;

    /// Get all events starting from a sequence number (for replay)
    async fn events_from(&self, seq: EventSeq) -> Vec<(EventSeq, Event)>;

    /// Current sequence number (high water mark)
    fn current_seq(&self) -> EventSeq;
}
