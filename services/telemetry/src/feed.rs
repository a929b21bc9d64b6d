use crate::metrics::{MetricValues, PredictionSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// One published tick outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FleetEvent {
    VehiclesMoved { touched: usize, skipped: usize },
    RosterUpdated { touched: usize, skipped: usize },
    MetricsCommitted { values: MetricValues },
    PredictionsCommitted { values: PredictionSet },
    AnimationFrame { emitted: usize },
    ClockTicked { at: DateTime<Utc> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencedEvent {
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub event: FleetEvent,
}

/// Broadcast fan-out of tick events. Slow subscribers lag and lose the
/// oldest events; publishers never block.
pub struct EventFeed {
    sender: broadcast::Sender<SequencedEvent>,
    sequence: AtomicU64,
}

impl EventFeed {
    pub fn new() -> Self {
        Self::with_capacity(EVENT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SequencedEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Returns how many subscribers received the event.
    pub fn publish(&self, event: FleetEvent) -> usize {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let message = SequencedEvent {
            sequence,
            timestamp: Utc::now(),
            event,
        };
        // No subscribers is the normal idle state.
        self.sender.send(message).unwrap_or(0)
    }

    pub fn published(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

impl Default for EventFeed {
    fn default() -> Self {
        Self::new()
    }
}
