//! Event types for the dashboard event system
//!
//! The fetch coordinator and view models publish `DashboardEvent`s on an
//! `EventBus`; the HTTP layer forwards them to SSE clients.

use crate::resource::{Resource, ResourceStatus};
use crate::year::Year;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Dashboard event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DashboardEvent {
    /// Selected year changed (user action or data-driven default)
    YearChanged {
        year: Year,
        timestamp: DateTime<Utc>,
    },

    /// A resource moved through its fetch lifecycle
    ResourceStateChanged {
        resource: Resource,
        status: ResourceStatus,
        /// Year the request was issued for (None for year-independent resources)
        year: Option<Year>,
        epoch: u64,
        timestamp: DateTime<Utc>,
    },

    /// A view model published a new snapshot
    ViewUpdated {
        view: String,
        timestamp: DateTime<Utc>,
    },

    /// Startup data was missing; panels fall back to placeholders
    EmptyState {
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl DashboardEvent {
    /// Name used for the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            DashboardEvent::YearChanged { .. } => "YearChanged",
            DashboardEvent::ResourceStateChanged { .. } => "ResourceStateChanged",
            DashboardEvent::ViewUpdated { .. } => "ViewUpdated",
            DashboardEvent::EmptyState { .. } => "EmptyState",
        }
    }
}

/// Broadcast bus for dashboard events
///
/// Cloning shares the underlying channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DashboardEvent>,
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
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)`, or `Err` if nobody is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: DashboardEvent,
    ) -> Result<usize, broadcast::error::SendError<DashboardEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: DashboardEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers_fails() {
        let bus = EventBus::new(8);
        let result = bus.emit(DashboardEvent::ViewUpdated {
            view: "summary".to_string(),
            timestamp: Utc::now(),
        });
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_subscriber_receives_event() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        bus.emit_lossy(DashboardEvent::YearChanged {
            year: Year::new(2019).unwrap(),
            timestamp: Utc::now(),
        });

        match rx.recv().await.unwrap() {
            DashboardEvent::YearChanged { year, .. } => assert_eq!(year.get(), 2019),
            other => panic!("Unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = DashboardEvent::ResourceStateChanged {
            resource: Resource::CorrelationData,
            status: ResourceStatus::Loading,
            year: Some(Year::new(2021).unwrap()),
            epoch: 3,
            timestamp: Utc::now(),
        };

        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["type"], "ResourceStateChanged");
        assert_eq!(value["resource"], "correlation-data");
        assert_eq!(value["status"], "loading");
        assert_eq!(value["year"], 2021);
        assert_eq!(event.event_type(), "ResourceStateChanged");
    }
}
