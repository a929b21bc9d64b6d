//! Per-cadence mutation logic.
//!
//! Entity updaters are pure `current -> next` functions plus a driver loop
//! that applies them through a registry one entity at a time.

use crate::random_walk::{Bounds, RandomWalk};
use crate::registry::Registry;
use shared::{Driver, Entity, GeoPoint, Vehicle};
use tracing::warn;

/// Lat/lng jitter scale per movement tick, in degrees.
pub const POSITION_JITTER: f64 = 0.001;
/// Chance a driver completes one more delivery on a roster tick.
pub const COMPLETION_PROBABILITY: f64 = 0.2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub touched: usize,
    pub skipped: usize,
}

pub fn move_vehicle(vehicle: &Vehicle, walk: &mut RandomWalk) -> Vehicle {
    let position = GeoPoint::new(
        walk.step(vehicle.position.lat, POSITION_JITTER, Bounds::new(-90.0, 90.0)),
        walk.step(vehicle.position.lng, POSITION_JITTER, Bounds::new(-180.0, 180.0)),
    );
    let eta = walk.step_int(i64::from(vehicle.eta_minutes), 1, 1, i64::from(u32::MAX));
    Vehicle {
        position,
        eta_minutes: eta as u32,
        ..vehicle.clone()
    }
}

pub fn update_driver(driver: &Driver, walk: &mut RandomWalk) -> Driver {
    let packages = walk.step_int(i64::from(driver.packages), 1, 0, i64::from(u32::MAX));
    let completed_today = if walk.chance(COMPLETION_PROBABILITY) {
        driver.completed_today.saturating_add(1)
    } else {
        driver.completed_today
    };
    Driver {
        packages: packages as u32,
        completed_today,
        ..driver.clone()
    }
}

/// Apply `update` to every entity in seed order. A candidate that fails
/// validation is dropped and the entity keeps its current state.
pub fn apply_to_all<T, F>(registry: &Registry<T>, walk: &mut RandomWalk, mut update: F) -> TickReport
where
    T: Entity,
    F: FnMut(&T, &mut RandomWalk) -> T,
{
    let mut report = TickReport::default();
    for id in registry.ids() {
        let mut rejected = false;
        let applied = registry.apply_mutation(&id, |current| {
            let next = update(current, walk);
            match next.validate() {
                Ok(()) => next,
                Err(err) => {
                    warn!(kind = T::KIND, id = %id, error = %err, "Skipping invalid update");
                    rejected = true;
                    current.clone()
                }
            }
        });
        if applied && !rejected {
            report.touched += 1;
        } else {
            report.skipped += 1;
        }
    }
    report
}

pub fn advance_vehicles(registry: &Registry<Vehicle>, walk: &mut RandomWalk) -> TickReport {
    apply_to_all(registry, walk, move_vehicle)
}

pub fn advance_drivers(registry: &Registry<Driver>, walk: &mut RandomWalk) -> TickReport {
    apply_to_all(registry, walk, update_driver)
}
