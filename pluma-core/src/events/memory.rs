//! In-memory EventChannel implementation
//!
//! MemoryEventChannel stores events in a Vec for replay, keeps topic
//! listeners in a map and uses a broadcast channel for live subscribers.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};

use super::channel::{EventChannel, EventListener, EventSeq};
use super::{Event, EventPayload};
use crate::error::EventError;

/// In-memory implementation of EventChannel
pub struct MemoryEventChannel {
    /// Stored events with sequence numbers
    events: RwLock<Vec<(EventSeq, Event)>>,
    /// Listeners by topic, in registration order
    listeners: RwLock<HashMap<String, Vec<Arc<dyn EventListener>>>>,
    /// Next sequence number to assign
    next_seq: AtomicU64,
    /// Broadcast channel for live subscribers
    tx: broadcast::Sender<(EventSeq, Event)>,
}

impl MemoryEventChannel {
    /// Create a new MemoryEventChannel with the given broadcast channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            events: RwLock::new(Vec::new()),
            listeners: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
            tx,
        }
    }

    async fn record(&self, event: Event) -> EventSeq {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);

        // Store for replay
        self.events.write().await.push((seq, event.clone()));

        // Broadcast to live subscribers (ignore if no receivers)
        let _ = self.tx.send((seq, event));

        seq
    }

    async fn run_listeners(&self, event: &Event) -> Result<(), EventError> {
        // Clone the list so listeners may register further listeners
        let listeners = self
            .listeners
            .read()
            .await
            .get(&event.topic)
            .cloned()
            .unwrap_or_default();

        for listener in listeners {
            listener.on_event(event).await?;
        }
        Ok(())
    }
}

impl Default for MemoryEventChannel {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl EventChannel for MemoryEventChannel {
    async fn invoke(&self, topics: &[String], payload: EventPayload) -> Result<(), EventError> {
        for topic in topics {
            let event = Event::new(topic.as_str(), payload.clone());
            self.record(event.clone()).await;
            self.run_listeners(&event).await?;
        }
        Ok(())
    }

    async fn emit(&self, topic: &str, payload: EventPayload) -> EventSeq {
        let event = Event::new(topic, payload);
        let seq = self.record(event.clone()).await;
        if let Err(e) = self.run_listeners(&event).await {
            tracing::warn!(topic = %topic, error = %e, "Listener error ignored");
        }
        seq
    }

    async fn listen(&self, topic: &str, listener: Arc<dyn EventListener>) {
        self.listeners
            .write()
            .await
            .entry(topic.to_string())
            .or_default()
            .push(listener);
    }

    fn subscribe(&self) -> broadcast::Receiver<(EventSeq, Event)> {
        self.tx.subscribe()
    }

    async fn events_from(&self, seq: EventSeq) -> Vec<(EventSeq, Event)> {
        self.events
            .read()
            .await
            .iter()
            .filter(|(s, _)| *s >= seq)
            .cloned()
            .collect()
    }

    fn current_seq(&self) -> EventSeq {
        self.next_seq.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn topics(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    // ==================== Emit Tests ====================

    #[tokio::test]
    async fn emit_returns_sequence_number() {
        let channel = MemoryEventChannel::new(16);
        let seq = channel.emit("plugins.enabled", EventPayload::Batch).await;
        assert_eq!(seq, 0);
        assert_eq!(channel.current_seq(), 1);
    }

    #[tokio::test]
    async fn emit_ignores_listener_errors() {
        let channel = MemoryEventChannel::new(16);
        channel
            .listen(
                "plugins.enabled",
                Arc::new(|event: &Event| -> Result<(), EventError> {
                    Err(EventError::vetoed(event, "ignored"))
                }),
            )
            .await;

        let seq = channel.emit("plugins.enabled", EventPayload::Batch).await;
        assert_eq!(seq, 0);
    }

    // ==================== Invoke Tests ====================

    #[tokio::test]
    async fn invoke_publishes_each_topic_in_order() {
        let channel = MemoryEventChannel::new(16);
        channel
            .invoke(
                &topics(&["plugin[theme].enabled", "plugin.enabled"]),
                EventPayload::plugin("theme", "dark"),
            )
            .await
            .unwrap();

        let events = channel.events_from(0).await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].1.topic, "plugin[theme].enabled");
        assert_eq!(events[1].1.topic, "plugin.enabled");
        assert_eq!(events[1].1.payload.plugin_name(), Some("dark"));
    }

    #[tokio::test]
    async fn invoke_runs_listeners_for_matching_topic_only() {
        let channel = MemoryEventChannel::new(16);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        channel
            .listen(
                "plugin.enabled",
                Arc::new(move |event: &Event| -> Result<(), EventError> {
                    sink.lock().unwrap().push(event.topic.clone());
                    Ok(())
                }),
            )
            .await;

        channel
            .invoke(
                &topics(&["plugin[theme].enabled", "plugin.enabled"]),
                EventPayload::plugin("theme", "dark"),
            )
            .await
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["plugin.enabled".to_string()]);
    }

    #[tokio::test]
    async fn invoke_stops_at_first_veto() {
        let channel = MemoryEventChannel::new(16);
        channel
            .listen(
                "plugin[theme].enabled",
                Arc::new(|event: &Event| -> Result<(), EventError> {
                    Err(EventError::vetoed(event, "locked"))
                }),
            )
            .await;

        let result = channel
            .invoke(
                &topics(&["plugin[theme].enabled", "plugin.enabled"]),
                EventPayload::plugin("theme", "dark"),
            )
            .await;

        assert!(matches!(result, Err(EventError::Vetoed { ref topic, .. }) if topic == "plugin[theme].enabled"));
        // The vetoed event is recorded, the following topic is not
        assert_eq!(channel.current_seq(), 1);
    }

    // ==================== Subscribe Tests ====================

    #[tokio::test]
    async fn subscribe_receives_new_events() {
        let channel = MemoryEventChannel::new(16);
        let mut rx = channel.subscribe();

        channel
            .emit("plugin.disabled", EventPayload::plugin("theme", "dark"))
            .await;

        let (seq, event) = rx.recv().await.unwrap();
        assert_eq!(seq, 0);
        assert_eq!(event.topic, "plugin.disabled");
    }

    // ==================== Replay Tests ====================

    #[tokio::test]
    async fn events_from_returns_events_starting_at_seq() {
        let channel = MemoryEventChannel::new(16);
        channel.emit("a", EventPayload::Batch).await;
        channel.emit("b", EventPayload::Batch).await;
        channel.emit("c", EventPayload::Batch).await;

        let events = channel.events_from(1).await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, 1);
        assert_eq!(events[1].1.topic, "c");
    }

    #[tokio::test]
    async fn events_from_beyond_current_returns_empty() {
        let channel = MemoryEventChannel::new(16);
        channel.emit("a", EventPayload::Batch).await;

        assert!(channel.events_from(100).await.is_empty());
    }
}
