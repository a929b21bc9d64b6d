use serde::{Deserialize, Serialize};
use shared::{Driver, DriverStatus, Vehicle};

/// Cross-entity statistics. Averages are `None` when there is nothing to
/// average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSummary {
    pub vehicle_count: usize,
    pub packages_in_transit: u64,
    pub avg_vehicle_efficiency: Option<f64>,
    pub driver_count: usize,
    pub active_drivers: usize,
    pub avg_driver_rating: Option<f64>,
    pub total_driver_packages: u64,
    pub avg_driver_efficiency: Option<f64>,
}

fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

pub fn summarize(vehicles: &[Vehicle], drivers: &[Driver]) -> FleetSummary {
    FleetSummary {
        vehicle_count: vehicles.len(),
        packages_in_transit: vehicles.iter().map(|v| u64::from(v.packages)).sum(),
        avg_vehicle_efficiency: mean(vehicles.iter().map(|v| f64::from(v.efficiency))),
        driver_count: drivers.len(),
        active_drivers: drivers
            .iter()
            .filter(|d| d.status == DriverStatus::Active)
            .count(),
        avg_driver_rating: mean(drivers.iter().map(|d| d.rating)),
        total_driver_packages: drivers.iter().map(|d| u64::from(d.packages)).sum(),
        avg_driver_efficiency: mean(drivers.iter().map(|d| f64::from(d.efficiency))),
    }
}
