pub mod config;
pub mod error;
pub mod logger;
pub mod types;


pub use config::SimulationConfig;
pub use error::{FleetError, FleetResult};
pub use types::{Driver, DriverStatus, Entity, GeoPoint, Insight, InsightKind, Priority, Vehicle, VehicleStatus};
