//! Error types for pluma-core

use thiserror::Error;

use crate::events::Event;

/// Errors raised by the event channel
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EventError {
    /// A listener rejected the event
    #[error("Listener vetoed '{topic}': {reason}")]
    Vetoed { topic: String, reason: String },
}

impl EventError {
    /// Build a veto for the given event, used by listeners
    pub fn vetoed(event: &Event, reason: impl Into<String>) -> Self {
        Self::Vetoed {
            topic: event.topic.clone(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventPayload;

    #[test]
    fn vetoed_displays_topic_and_reason() {
        let error = EventError::Vetoed {
            topic: "plugin.enabled".to_string(),
            reason: "maintenance window".to_string(),
        };
        assert!(error.to_string().contains("plugin.enabled"));
        assert!(error.to_string().contains("maintenance window"));
    }

    #[test]
    fn vetoed_takes_topic_from_event() {
        let event = Event::new("plugins.enabled", EventPayload::Batch);
        let error = EventError::vetoed(&event, "nope");
        assert_eq!(
            error,
            EventError::Vetoed {
                topic: "plugins.enabled".to_string(),
                reason: "nope".to_string(),
            }
        );
    }
}
