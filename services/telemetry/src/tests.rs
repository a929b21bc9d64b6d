use crate::aggregator::summarize;
use crate::feed::FleetEvent;
use crate::fleet::FleetCore;
use crate::insights::InsightFeed;
use crate::metrics::MetricField;
use crate::roster;
use shared::{Driver, DriverStatus, FleetError, Insight, InsightKind, Priority, SimulationConfig};
use std::sync::Arc;
use std::time::Duration;

fn seeded_config() -> SimulationConfig {
    SimulationConfig {
        seed: Some(42),
        ..SimulationConfig::default()
    }
}

fn seeded_core() -> FleetCore {
    FleetCore::with_seed_roster(seeded_config()).unwrap()
}

fn insight(id: u32, priority: Priority) -> Insight {
    Insight {
        id,
        kind: InsightKind::Other("maintenance".to_string()),
        priority,
        title: format!("Insight {}", id),
        description: String::new(),
        impact: String::new(),
        confidence: 50,
    }
}

// ============================================================================
// SECTION 1: Aggregator
// ============================================================================

#[test]
fn test_empty_summary_has_no_averages() {
    let summary = summarize(&[], &[]);
    assert_eq!(summary.vehicle_count, 0);
    assert_eq!(summary.packages_in_transit, 0);
    assert_eq!(summary.avg_vehicle_efficiency, None);
    assert_eq!(summary.active_drivers, 0);
    assert_eq!(summary.avg_driver_rating, None);
    assert_eq!(summary.avg_driver_efficiency, None);

    let json = serde_json::to_value(&summary).unwrap();
    assert!(json["avg_driver_rating"].is_null());
}

#[test]
fn test_two_driver_rating_average() {
    let drivers: Vec<Driver> = roster::seed_drivers()
        .into_iter()
        .filter(|d| d.id == "D001" || d.id == "D002")
        .collect();
    assert_eq!(drivers.len(), 2);

    let summary = summarize(&[], &drivers);
    let avg = summary.avg_driver_rating.unwrap();
    assert!((avg - 4.8).abs() < 1e-9);
    assert_eq!(summary.active_drivers, 2);
    assert_eq!(summary.total_driver_packages, 20);
}

#[test]
fn test_seed_roster_summary() {
    let summary = summarize(&roster::seed_vehicles(), &roster::seed_drivers());
    assert_eq!(summary.vehicle_count, 5);
    assert_eq!(summary.packages_in_transit, 43);
    assert_eq!(summary.driver_count, 5);
    assert_eq!(summary.active_drivers, 3);
    let eff = summary.avg_vehicle_efficiency.unwrap();
    assert!((eff - 91.4).abs() < 1e-9);
}

#[test]
fn test_active_count_ignores_break_and_offline() {
    let mut drivers = roster::seed_drivers();
    for d in drivers.iter_mut() {
        d.status = DriverStatus::OnBreak;
    }
    assert_eq!(summarize(&[], &drivers).active_drivers, 0);
}

// ============================================================================
// SECTION 2: Insight feed
// ============================================================================

#[test]
fn test_insights_sorted_by_priority_then_insertion() {
    let feed = InsightFeed::new();
    feed.append(insight(1, Priority::Low)).unwrap();
    feed.append(insight(2, Priority::High)).unwrap();
    feed.append(insight(3, Priority::Medium)).unwrap();
    feed.append(insight(4, Priority::High)).unwrap();

    let ids: Vec<u32> = feed.list().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![2, 4, 3, 1]);
}

#[test]
fn test_seed_insights_listing() {
    let core = seeded_core();
    let ids: Vec<u32> = core.insights().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![1, 4, 2, 3]);
}

#[test]
fn test_insight_duplicate_id_rejected() {
    let feed = InsightFeed::new();
    feed.append(insight(7, Priority::High)).unwrap();
    let err = feed.append(insight(7, Priority::Low)).unwrap_err();
    assert!(matches!(err, FleetError::DuplicateId { .. }));
    assert_eq!(feed.len(), 1);
}

#[test]
fn test_insight_validation() {
    let feed = InsightFeed::new();
    let mut bad = insight(1, Priority::High);
    bad.confidence = 101;
    assert!(matches!(feed.append(bad), Err(FleetError::Validation { .. })));

    let mut untitled = insight(2, Priority::High);
    untitled.title = "  ".to_string();
    assert!(feed.append(untitled).is_err());
    assert!(feed.is_empty());
}

// ============================================================================
// SECTION 3: Fleet core queries
// ============================================================================

#[test]
fn test_weak_lookups_resolve_and_fail_soft() {
    let core = seeded_core();
    assert_eq!(core.driver_for_vehicle("V001").unwrap().name, "Sarah Chen");
    assert_eq!(core.vehicle_for_driver("D005").unwrap().route, "Belltown");
    assert!(core.vehicle("V404").is_none());
    assert!(core.driver_for_vehicle("V404").is_none());
    assert!(core.vehicle_for_driver("D404").is_none());
}

#[test]
fn test_dangling_reference_returns_none() {
    let core = FleetCore::new(seeded_config()).unwrap();
    let mut vehicles = roster::seed_vehicles();
    vehicles.truncate(1);
    vehicles[0].driver_id = "D999".to_string();
    core.seed(vehicles, Vec::new(), Vec::new()).unwrap();
    assert!(core.driver_for_vehicle("V001").is_none());
}

#[test]
fn test_snapshots_are_idempotent() {
    let core = seeded_core();
    assert_eq!(core.vehicles(), core.vehicles());
    assert_eq!(core.drivers(), core.drivers());
    assert_eq!(core.metrics(), core.metrics());
    assert_eq!(core.predictions(), core.predictions());
    assert_eq!(core.fleet_summary(), core.fleet_summary());
}

#[test]
fn test_initial_metrics_and_predictions() {
    let core = seeded_core();
    let view = core.metrics();
    assert_eq!(view.committed.delivery_success, 94.2);
    assert_eq!(view.committed.daily_savings, 47_120);
    assert_eq!(view.committed.active_drivers, 156);
    assert_eq!(view.displayed.delivery_success, 0.0);
    assert_eq!(core.predictions().eta_accuracy, 96.7);
}

#[test]
fn test_manual_ticks_keep_invariants() {
    let core = seeded_core();
    let mut previous = core.drivers();
    for _ in 0..500 {
        core.tick_vehicles();
        core.tick_drivers();
        let values = core.tick_metrics().unwrap();
        for field in MetricField::ALL {
            assert!(field.bounds().contains(values.get(field)));
        }
        core.tick_predictions();

        for vehicle in core.vehicles() {
            assert!(vehicle.eta_minutes >= 1);
        }
        let drivers = core.drivers();
        for (before, after) in previous.iter().zip(drivers.iter()) {
            assert!(after.completed_today >= before.completed_today);
        }
        previous = drivers;
    }
}

#[test]
fn test_same_seed_same_run() {
    let a = seeded_core();
    let b = seeded_core();
    for _ in 0..20 {
        a.tick_vehicles();
        b.tick_vehicles();
        a.tick_metrics();
        b.tick_metrics();
    }
    assert_eq!(a.vehicles(), b.vehicles());
    assert_eq!(a.metrics().committed, b.metrics().committed);
}

#[test]
fn test_append_insight_through_core() {
    let core = seeded_core();
    core.append_insight(insight(10, Priority::High)).unwrap();
    let ids: Vec<u32> = core.insights().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![1, 4, 10, 2, 3]);
    assert!(core.append_insight(insight(1, Priority::Low)).is_err());
}

#[test]
fn test_invalid_config_rejected() {
    let config = SimulationConfig {
        metrics_interval: Duration::ZERO,
        ..SimulationConfig::default()
    };
    assert!(matches!(FleetCore::new(config), Err(FleetError::Config { .. })));
}

// ============================================================================
// SECTION 4: Seeding
// ============================================================================

fn assert_empty(core: &FleetCore) {
    assert!(core.vehicles().is_empty());
    assert!(core.drivers().is_empty());
    assert!(core.insights().is_empty());
    assert!(!core.is_seeded());
}

#[tokio::test(start_paused = true)]
async fn test_invalid_driver_leaves_core_empty_and_reseedable() {
    let core = Arc::new(FleetCore::new(seeded_config()).unwrap());
    let mut drivers = roster::seed_drivers();
    drivers[4].rating = 9.0;

    let err = core
        .seed(roster::seed_vehicles(), drivers, roster::seed_insights())
        .unwrap_err();
    assert!(matches!(err, FleetError::Validation { entity: "driver", .. }));
    assert_empty(&core);
    assert_eq!(core.start(), Err(FleetError::NotSeeded));
    assert!(!core.is_running());

    core.seed(roster::seed_vehicles(), roster::seed_drivers(), roster::seed_insights())
        .unwrap();
    assert_eq!(core.vehicles().len(), 5);
    core.start().unwrap();
    core.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_insight_id_leaves_core_empty() {
    let core = Arc::new(FleetCore::new(seeded_config()).unwrap());
    let mut insights = roster::seed_insights();
    insights[3].id = insights[0].id;

    let err = core
        .seed(roster::seed_vehicles(), roster::seed_drivers(), insights)
        .unwrap_err();
    assert!(matches!(err, FleetError::DuplicateId { entity: "insight", .. }));
    assert_empty(&core);
    assert_eq!(core.start(), Err(FleetError::NotSeeded));

    core.seed(roster::seed_vehicles(), roster::seed_drivers(), roster::seed_insights())
        .unwrap();
    assert_eq!(core.insights().len(), 4);
    core.start().unwrap();
    core.stop().await;
}

#[test]
fn test_seed_colliding_with_appended_insight_commits_nothing() {
    let core = FleetCore::new(seeded_config()).unwrap();
    core.append_insight(insight(1, Priority::Low)).unwrap();

    let err = core
        .seed(roster::seed_vehicles(), roster::seed_drivers(), roster::seed_insights())
        .unwrap_err();
    assert!(matches!(err, FleetError::DuplicateId { .. }));
    assert!(core.vehicles().is_empty());
    assert!(core.drivers().is_empty());
    assert_eq!(core.insights().len(), 1);
}

#[test]
fn test_second_seed_rejected() {
    let core = seeded_core();
    let err = core
        .seed(roster::seed_vehicles(), roster::seed_drivers(), Vec::new())
        .unwrap_err();
    assert_eq!(err, FleetError::AlreadySeeded("vehicle"));
    assert_eq!(core.insights().len(), 4);
}

#[test]
fn test_unseeded_core_refuses_to_start() {
    let core = Arc::new(FleetCore::new(seeded_config()).unwrap());
    assert_eq!(core.start(), Err(FleetError::NotSeeded));
    assert!(!core.is_running());
}

// ============================================================================
// SECTION 5: Lifecycle
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_start_twice_rejected() {
    let core = Arc::new(seeded_core());
    core.start().unwrap();
    assert!(core.is_running());
    assert_eq!(core.start(), Err(FleetError::AlreadyRunning));
    assert_eq!(core.active_tasks().len(), 6);
    core.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_start_after_stop_rejected() {
    let core = Arc::new(seeded_core());
    core.start().unwrap();
    core.stop().await;
    assert_eq!(core.start(), Err(FleetError::AlreadyStopped));
    assert!(!core.is_running());
    assert!(core.active_tasks().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_scheduled_cadences() {
    let config = SimulationConfig {
        frame_interval: Duration::from_secs(1),
        ..seeded_config()
    };
    let core = Arc::new(FleetCore::with_seed_roster(config).unwrap());
    let mut rx = core.subscribe();
    core.start().unwrap();

    tokio::time::sleep(Duration::from_millis(10_500)).await;
    core.stop().await;

    let (mut clock, mut metrics, mut moved, mut predicted, mut roster) = (0, 0, 0, 0, 0);
    while let Ok(message) = rx.try_recv() {
        match message.event {
            FleetEvent::ClockTicked { .. } => clock += 1,
            FleetEvent::MetricsCommitted { .. } => metrics += 1,
            FleetEvent::VehiclesMoved { touched, .. } => {
                assert_eq!(touched, 5);
                moved += 1
            }
            FleetEvent::PredictionsCommitted { .. } => predicted += 1,
            FleetEvent::RosterUpdated { .. } => roster += 1,
            FleetEvent::AnimationFrame { .. } => {}
        }
    }
    assert_eq!(clock, 10);
    assert_eq!(metrics, 3);
    assert_eq!(moved, 2);
    assert_eq!(predicted, 2);
    assert_eq!(roster, 1);
}

#[tokio::test(start_paused = true)]
async fn test_stop_freezes_state() {
    let core = Arc::new(seeded_core());
    core.start().unwrap();
    tokio::time::sleep(Duration::from_millis(3_500)).await;
    core.stop().await;

    let vehicles = core.vehicles();
    let drivers = core.drivers();
    let metrics = core.metrics();
    let predictions = core.predictions();
    let clock = core.clock();
    assert!(!metrics.animating);

    tokio::time::sleep(Duration::from_secs(30)).await;
    core.tick_vehicles();
    core.tick_frame();
    assert!(core.tick_metrics().is_none());

    assert_eq!(core.vehicles(), vehicles);
    assert_eq!(core.drivers(), drivers);
    assert_eq!(core.metrics(), metrics);
    assert_eq!(core.predictions(), predictions);
    assert_eq!(core.clock(), clock);
}

#[tokio::test(start_paused = true)]
async fn test_stop_is_idempotent() {
    let core = Arc::new(seeded_core());
    core.start().unwrap();
    core.stop().await;
    core.stop().await;
    assert!(core.is_stopped());
}

#[tokio::test(start_paused = true)]
async fn test_animation_settles_on_committed_values() {
    let core = Arc::new(seeded_core());
    core.start().unwrap();
    // First commit lands at 3 s, its animation ends by 5 s, next commit at 6 s.
    tokio::time::sleep(Duration::from_millis(5_500)).await;
    let view = core.metrics();
    core.stop().await;

    assert!(!view.animating);
    for field in MetricField::ALL {
        assert_eq!(view.displayed.get(field), view.committed.get(field));
    }
}
