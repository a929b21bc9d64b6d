pub mod aggregator;
pub mod animator;
pub mod feed;
pub mod fleet;
pub mod insights;
pub mod metrics;
pub mod random_walk;
pub mod registry;
pub mod roster;
pub mod scheduler;
pub mod updaters;

#[cfg(test)]
mod tests;

pub use aggregator::{summarize, FleetSummary};
pub use animator::ValueAnimator;
pub use feed::{EventFeed, FleetEvent, SequencedEvent};
pub use fleet::FleetCore;
pub use insights::InsightFeed;
pub use metrics::{DisplayedMetrics, MetricField, MetricValues, MetricsView, PredictionSet};
pub use random_walk::{Bounds, RandomWalk};
pub use registry::{DriverRegistry, Registry, VehicleRegistry};
pub use scheduler::{Scheduler, TaskHandle};
pub use updaters::TickReport;
