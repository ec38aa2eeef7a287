//! Visitor events and the EventBus that carries them
//!
//! Events are scoped to a visitor session and serialized for SSE delivery.
//! The bus is a broadcast channel; each SSE stream filters for its own
//! session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::catalog::{ArtworkId, RouteId};

/// MCN event types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum McnEvent {
    /// Artwork unlocked for the session (scan or manual entry)
    AccessGranted {
        session_id: Uuid,
        artwork_id: ArtworkId,
        timestamp: DateTime<Utc>,
    },

    /// Route reached 100% for the first time in the session
    ///
    /// Triggers the one-time congratulation in the UI.
    RouteCompleted {
        session_id: Uuid,
        route_id: RouteId,
        /// Localized acknowledgment in the session language at completion time
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Camera lease released; the client must stop its video stream
    CameraReleased {
        session_id: Uuid,
        scan_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// Session ended by the visitor or evicted for idleness; its event
    /// streams close after this
    SessionEnded {
        session_id: Uuid,
        timestamp: DateTime<Utc>,
    },
}

impl McnEvent {
    /// Session the event belongs to
    pub fn session_id(&self) -> Uuid {
        match self {
            McnEvent::AccessGranted { session_id, .. }
            | McnEvent::RouteCompleted { session_id, .. }
            | McnEvent::CameraReleased { session_id, .. }
            | McnEvent::SessionEnded { session_id, .. } => *session_id,
        }
    }

    /// SSE event name
    pub fn event_type(&self) -> &'static str {
        match self {
            McnEvent::AccessGranted { .. } => "AccessGranted",
            McnEvent::RouteCompleted { .. } => "RouteCompleted",
            McnEvent::CameraReleased { .. } => "CameraReleased",
            McnEvent::SessionEnded { .. } => "SessionEnded",
        }
    }
}

/// Broadcast bus for [`McnEvent`]s
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<McnEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// Slow subscribers lose the oldest events once `capacity` is exceeded.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<McnEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, returning the number of receivers
    #[allow(clippy::result_large_err)]
    pub fn emit(&self, event: McnEvent) -> Result<usize, broadcast::error::SendError<McnEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: McnEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let session_id = Uuid::new_v4();
        let event = McnEvent::AccessGranted {
            session_id,
            artwork_id: ArtworkId::new("2"),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "AccessGranted");
        assert_eq!(json["artwork_id"], "2");
        assert_eq!(event.session_id(), session_id);
    }

    #[test]
    fn test_emit_without_subscribers() {
        let bus = EventBus::new(10);
        let event = McnEvent::CameraReleased {
            session_id: Uuid::new_v4(),
            scan_id: Uuid::new_v4(),
            timestamp: Utc::now(),
        };
        assert!(bus.emit(event.clone()).is_err());
        bus.emit_lossy(event);
        assert_eq!(bus.capacity(), 10);
    }

    #[tokio::test]
    async fn test_subscriber_receives_event() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();
        let event = McnEvent::RouteCompleted {
            session_id: Uuid::new_v4(),
            route_id: RouteId::new("1"),
            message: "done".to_string(),
            timestamp: Utc::now(),
        };
        assert_eq!(bus.emit(event.clone()).unwrap(), 1);
        assert_eq!(rx.recv().await.unwrap(), event);
    }
}
