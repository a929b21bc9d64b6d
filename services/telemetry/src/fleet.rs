//! Fleet core: the one object a presentation layer talks to.

use crate::aggregator::{summarize, FleetSummary};
use crate::feed::{EventFeed, FleetEvent, SequencedEvent};
use crate::insights::InsightFeed;
use crate::metrics::{MetricBoard, MetricValues, MetricsView, PredictionBoard, PredictionSet};
use crate::random_walk::RandomWalk;
use crate::registry::{DriverRegistry, VehicleRegistry};
use crate::roster;
use crate::scheduler::Scheduler;
use crate::updaters::{advance_drivers, advance_vehicles, TickReport};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use shared::logger::{log_commit, log_driver_seeded, log_tick};
use shared::{Driver, FleetError, FleetResult, Insight, SimulationConfig, Vehicle};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Idle,
    Running,
    Stopped,
}

/// One random source per updater, so cadences never contend for a lock.
struct RandomSources {
    vehicles: Mutex<RandomWalk>,
    drivers: Mutex<RandomWalk>,
    metrics: Mutex<RandomWalk>,
    predictions: Mutex<RandomWalk>,
}

impl RandomSources {
    fn new(seed: Option<u64>) -> Self {
        let source = |offset: u64| match seed {
            Some(seed) => Mutex::new(RandomWalk::seeded(seed.wrapping_add(offset))),
            None => Mutex::new(RandomWalk::from_entropy()),
        };
        Self {
            vehicles: source(0),
            drivers: source(1),
            metrics: source(2),
            predictions: source(3),
        }
    }
}

pub struct FleetCore {
    config: SimulationConfig,
    vehicles: VehicleRegistry,
    drivers: DriverRegistry,
    metrics: MetricBoard,
    predictions: PredictionBoard,
    insights: InsightFeed,
    clock: RwLock<DateTime<Utc>>,
    events: EventFeed,
    rng: RandomSources,
    scheduler: Scheduler,
    lifecycle: Mutex<Lifecycle>,
    seed_lock: Mutex<()>,
}

impl FleetCore {
    /// An empty core with the standard initial metrics and predictions.
    pub fn new(config: SimulationConfig) -> FleetResult<Self> {
        config.validate()?;
        Ok(Self {
            vehicles: VehicleRegistry::new(),
            drivers: DriverRegistry::new(),
            metrics: MetricBoard::new(
                roster::initial_metrics(),
                config.animation_duration,
                config.frame_interval,
            ),
            predictions: PredictionBoard::new(roster::initial_predictions()),
            insights: InsightFeed::new(),
            clock: RwLock::new(Utc::now()),
            events: EventFeed::new(),
            rng: RandomSources::new(config.seed),
            scheduler: Scheduler::new(),
            lifecycle: Mutex::new(Lifecycle::Idle),
            seed_lock: Mutex::new(()),
            config,
        })
    }

    /// A core loaded with the standard five-vehicle roster and insights.
    pub fn with_seed_roster(config: SimulationConfig) -> FleetResult<Self> {
        let core = Self::new(config)?;
        core.seed(roster::seed_vehicles(), roster::seed_drivers(), roster::seed_insights())?;
        Ok(core)
    }

    /// Load the roster. Every batch is checked before anything is committed,
    /// so a failure leaves the core empty and seedable again.
    pub fn seed(&self, vehicles: Vec<Vehicle>, drivers: Vec<Driver>, insights: Vec<Insight>) -> FleetResult<()> {
        let _guard = self.seed_lock.lock();
        self.vehicles.validate_batch(&vehicles)?;
        self.drivers.validate_batch(&drivers)?;
        self.insights.validate_batch(&insights)?;

        // Insights first: a concurrent append can still collide with the
        // batch, and that must fail before the registries are touched.
        self.insights.extend(insights)?;
        self.vehicles.seed(vehicles)?;
        self.drivers.seed(drivers)?;
        for driver in self.drivers.snapshot() {
            log_driver_seeded(&driver.id, &driver.name, &driver.phone);
        }
        Ok(())
    }

    pub fn is_seeded(&self) -> bool {
        self.vehicles.is_seeded() && self.drivers.is_seeded()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Schedule every updater. Needs a running tokio runtime.
    pub fn start(self: &Arc<Self>) -> FleetResult<()> {
        if !self.is_seeded() {
            return Err(FleetError::NotSeeded);
        }
        {
            let mut lifecycle = self.lifecycle.lock();
            match *lifecycle {
                Lifecycle::Running => return Err(FleetError::AlreadyRunning),
                Lifecycle::Stopped => return Err(FleetError::AlreadyStopped),
                Lifecycle::Idle => *lifecycle = Lifecycle::Running,
            }
        }

        let config = &self.config;
        self.schedule_tick("clock", config.clock_interval, |core| {
            core.tick_clock();
        });
        self.schedule_tick("metrics", config.metrics_interval, |core| {
            core.tick_metrics();
        });
        self.schedule_tick("movement", config.movement_interval, |core| {
            core.tick_vehicles();
        });
        self.schedule_tick("predictions", config.movement_interval, |core| {
            core.tick_predictions();
        });
        self.schedule_tick("roster", config.roster_interval, |core| {
            core.tick_drivers();
        });
        self.schedule_tick("animation", config.frame_interval, |core| {
            core.tick_frame();
        });

        tracing::info!(
            vehicles = self.vehicles.len(),
            drivers = self.drivers.len(),
            seed = ?config.seed,
            "Fleet core started"
        );
        Ok(())
    }

    /// Tasks hold a weak reference so a dropped core is never kept alive by
    /// its own timers.
    fn schedule_tick<F>(self: &Arc<Self>, name: &str, interval: Duration, tick: F)
    where
        F: Fn(&FleetCore) + Send + 'static,
    {
        let core: Weak<FleetCore> = Arc::downgrade(self);
        self.scheduler.schedule(name, interval, move || {
            if let Some(core) = core.upgrade() {
                tick(&core);
            }
        });
    }

    /// Cancel every task, then every in-flight animation. State stays
    /// queryable and frozen afterwards. Stopping twice is a no-op.
    pub async fn stop(&self) {
        {
            let mut lifecycle = self.lifecycle.lock();
            if *lifecycle == Lifecycle::Stopped {
                return;
            }
            *lifecycle = Lifecycle::Stopped;
        }
        self.scheduler.shutdown().await;
        self.metrics.cancel_animations();
        tracing::info!("Fleet core stopped");
    }

    pub fn is_running(&self) -> bool {
        *self.lifecycle.lock() == Lifecycle::Running
    }

    pub fn is_stopped(&self) -> bool {
        *self.lifecycle.lock() == Lifecycle::Stopped
    }

    // ------------------------------------------------------------------
    // Ticks. Scheduled by `start`, callable directly for stepping by hand.
    // All of them are no-ops once the core is stopped.
    // ------------------------------------------------------------------

    pub fn tick_vehicles(&self) -> TickReport {
        if self.is_stopped() {
            return TickReport::default();
        }
        let report = advance_vehicles(&self.vehicles, &mut self.rng.vehicles.lock());
        log_tick("movement", report.touched, report.skipped);
        self.events.publish(FleetEvent::VehiclesMoved {
            touched: report.touched,
            skipped: report.skipped,
        });
        report
    }

    pub fn tick_drivers(&self) -> TickReport {
        if self.is_stopped() {
            return TickReport::default();
        }
        let report = advance_drivers(&self.drivers, &mut self.rng.drivers.lock());
        log_tick("roster", report.touched, report.skipped);
        self.events.publish(FleetEvent::RosterUpdated {
            touched: report.touched,
            skipped: report.skipped,
        });
        report
    }

    pub fn tick_metrics(&self) -> Option<MetricValues> {
        if self.is_stopped() {
            return None;
        }
        let values = self.metrics.commit(&mut self.rng.metrics.lock());
        log_commit("metrics", &values);
        self.events.publish(FleetEvent::MetricsCommitted { values });
        Some(values)
    }

    pub fn tick_predictions(&self) -> Option<PredictionSet> {
        if self.is_stopped() {
            return None;
        }
        let values = self.predictions.commit(&mut self.rng.predictions.lock());
        log_commit("predictions", &values);
        self.events.publish(FleetEvent::PredictionsCommitted { values });
        Some(values)
    }

    /// Advance every metric animation one frame. Idle frames publish nothing.
    pub fn tick_frame(&self) -> usize {
        if self.is_stopped() {
            return 0;
        }
        let emitted = self.metrics.advance_frame();
        if emitted > 0 {
            self.events.publish(FleetEvent::AnimationFrame { emitted });
        }
        emitted
    }

    pub fn tick_clock(&self) -> Option<DateTime<Utc>> {
        if self.is_stopped() {
            return None;
        }
        let now = Utc::now();
        *self.clock.write() = now;
        self.events.publish(FleetEvent::ClockTicked { at: now });
        Some(now)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn vehicles(&self) -> Vec<Vehicle> {
        self.vehicles.snapshot()
    }

    pub fn drivers(&self) -> Vec<Driver> {
        self.drivers.snapshot()
    }

    pub fn vehicle(&self, id: &str) -> Option<Vehicle> {
        self.vehicles.get(id)
    }

    pub fn driver(&self, id: &str) -> Option<Driver> {
        self.drivers.get(id)
    }

    pub fn driver_for_vehicle(&self, vehicle_id: &str) -> Option<Driver> {
        self.vehicles
            .get(vehicle_id)
            .and_then(|vehicle| self.drivers.get(&vehicle.driver_id))
    }

    pub fn vehicle_for_driver(&self, driver_id: &str) -> Option<Vehicle> {
        self.drivers
            .get(driver_id)
            .and_then(|driver| self.vehicles.get(&driver.vehicle_id))
    }

    pub fn metrics(&self) -> MetricsView {
        self.metrics.view()
    }

    pub fn predictions(&self) -> PredictionSet {
        self.predictions.get()
    }

    pub fn insights(&self) -> Vec<Insight> {
        self.insights.list()
    }

    pub fn append_insight(&self, insight: Insight) -> FleetResult<()> {
        self.insights.append(insight)
    }

    pub fn fleet_summary(&self) -> FleetSummary {
        summarize(&self.vehicles.snapshot(), &self.drivers.snapshot())
    }

    pub fn clock(&self) -> DateTime<Utc> {
        *self.clock.read()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SequencedEvent> {
        self.events.subscribe()
    }

    pub fn active_tasks(&self) -> Vec<String> {
        self.scheduler
            .active_tasks()
            .into_iter()
            .map(|handle| handle.name().to_string())
            .collect()
    }
}
