//! Controller events and the bus that distributes them
//!
//! The renderer and any status indicator subscribe here. Every event carries
//! the UTC time it was emitted.

use crate::display::ChartView;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

/// Why a dataset was (re)published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishCause {
    /// New record set arrived for fetch `seq`
    Fetched { seq: u64 },
    /// Axis change over the current record set
    Reprojected,
}

/// Chart controller events
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ChartEvent {
    /// Fetch issued to the record source
    FetchStarted {
        seq: u64,
        query: String,
        timestamp: DateTime<Utc>,
    },

    /// New dataset ready for rendering
    DatasetPublished {
        view: ChartView,
        cause: PublishCause,
        /// Records dropped for lacking a plotted attribute
        skipped: usize,
        timestamp: DateTime<Utc>,
    },

    /// Fetch failed; the previous dataset stays on screen
    FetchFailed {
        seq: u64,
        error: String,
        timestamp: DateTime<Utc>,
    },

    /// Records arrived but none could be plotted on the current axes
    EmptyResult {
        dropped: usize,
        timestamp: DateTime<Utc>,
    },

    /// Filter input rejected; selection unchanged
    FilterRejected {
        error: String,
        timestamp: DateTime<Utc>,
    },
}

impl ChartEvent {
    /// Event type name, matching the serialized `type` tag
    pub fn event_type(&self) -> &'static str {
        match self {
            ChartEvent::FetchStarted { .. } => "FetchStarted",
            ChartEvent::DatasetPublished { .. } => "DatasetPublished",
            ChartEvent::FetchFailed { .. } => "FetchFailed",
            ChartEvent::EmptyResult { .. } => "EmptyResult",
            ChartEvent::FilterRejected { .. } => "FilterRejected",
        }
    }
}

/// Event distribution bus
///
/// Uses tokio::broadcast internally:
/// - Non-blocking publish (slow subscribers don't block the controller)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
#[derive(Clone)]
pub struct ChartEventBus {
    tx: broadcast::Sender<ChartEvent>,
    capacity: usize,
}

impl ChartEventBus {
    /// Creates a new bus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<ChartEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: ChartEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ChartEventBus {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected() -> ChartEvent {
        ChartEvent::FilterRejected {
            error: "Unknown field: goals".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_bus_new() {
        let bus = ChartEventBus::new(16);
        assert_eq!(bus.capacity(), 16);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_emit_without_subscribers_does_not_panic() {
        let bus = ChartEventBus::new(4);
        bus.emit_lossy(rejected());
    }

    #[test]
    fn test_all_subscribers_receive() {
        let bus = ChartEventBus::new(4);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.emit_lossy(rejected());

        assert_eq!(rx1.try_recv().unwrap().event_type(), "FilterRejected");
        assert_eq!(rx2.try_recv().unwrap().event_type(), "FilterRejected");
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let json = serde_json::to_value(ChartEvent::FetchStarted {
            seq: 3,
            query: "position=&ranking_criteria=averagePoints&top_number=10".to_string(),
            timestamp: Utc::now(),
        })
        .unwrap();

        assert_eq!(json["type"], "FetchStarted");
        assert_eq!(json["seq"], 3);
    }
}
