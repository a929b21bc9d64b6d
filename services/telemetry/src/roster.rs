//! The roster a fresh core starts from.

use crate::metrics::{MetricValues, PredictionSet};
use shared::{Driver, DriverStatus, GeoPoint, Insight, InsightKind, Priority, Vehicle, VehicleStatus};

pub fn initial_metrics() -> MetricValues {
    MetricValues {
        delivery_success: 94.2,
        daily_savings: 47_120,
        total_deliveries: 2_847,
        customer_satisfaction: 4.87,
        active_drivers: 156,
        avg_delivery_time: 23.4,
    }
}

pub fn initial_predictions() -> PredictionSet {
    PredictionSet {
        eta_accuracy: 96.7,
        risk_prediction: 92.8,
        cost_savings: 2.8,
        delivery_success: 94.2,
    }
}

struct Seat {
    number: u8,
    name: &'static str,
    lat: f64,
    lng: f64,
    area: &'static str,
    vehicle_status: VehicleStatus,
    driver_status: DriverStatus,
    packages: u32,
    eta_minutes: u32,
    completed_today: u32,
    rating: f64,
    phone: &'static str,
    efficiency: u8,
    on_time_rate: u8,
}

const SEATS: [Seat; 5] = [
    Seat {
        number: 1,
        name: "Sarah Chen",
        lat: 47.6062,
        lng: -122.3321,
        area: "Downtown Seattle",
        vehicle_status: VehicleStatus::Delivering,
        driver_status: DriverStatus::Active,
        packages: 12,
        eta_minutes: 14,
        completed_today: 28,
        rating: 4.9,
        phone: "+1 (555) 123-4567",
        efficiency: 94,
        on_time_rate: 98,
    },
    Seat {
        number: 2,
        name: "Mike Rodriguez",
        lat: 47.6205,
        lng: -122.3493,
        area: "Capitol Hill",
        vehicle_status: VehicleStatus::EnRoute,
        driver_status: DriverStatus::Active,
        packages: 8,
        eta_minutes: 22,
        completed_today: 22,
        rating: 4.7,
        phone: "+1 (555) 234-5678",
        efficiency: 87,
        on_time_rate: 95,
    },
    Seat {
        number: 3,
        name: "Emily Johnson",
        lat: 47.5952,
        lng: -122.3316,
        area: "SoDo District",
        vehicle_status: VehicleStatus::Loading,
        driver_status: DriverStatus::OnBreak,
        packages: 15,
        eta_minutes: 8,
        completed_today: 31,
        rating: 4.8,
        phone: "+1 (555) 345-6789",
        efficiency: 91,
        on_time_rate: 97,
    },
    Seat {
        number: 4,
        name: "David Kim",
        lat: 47.6097,
        lng: -122.3331,
        area: "Pioneer Square",
        vehicle_status: VehicleStatus::Delivering,
        driver_status: DriverStatus::Active,
        packages: 6,
        eta_minutes: 18,
        completed_today: 19,
        rating: 4.9,
        phone: "+1 (555) 456-7890",
        efficiency: 96,
        on_time_rate: 99,
    },
    Seat {
        number: 5,
        name: "Lisa Wang",
        lat: 47.6145,
        lng: -122.3418,
        area: "Belltown",
        vehicle_status: VehicleStatus::Returning,
        driver_status: DriverStatus::Offline,
        packages: 2,
        eta_minutes: 31,
        completed_today: 25,
        rating: 4.6,
        phone: "+1 (555) 567-8901",
        efficiency: 89,
        on_time_rate: 93,
    },
];

fn vehicle_id(number: u8) -> String {
    format!("V{:03}", number)
}

fn driver_id(number: u8) -> String {
    format!("D{:03}", number)
}

pub fn seed_vehicles() -> Vec<Vehicle> {
    SEATS
        .iter()
        .map(|seat| Vehicle {
            id: vehicle_id(seat.number),
            driver_id: driver_id(seat.number),
            position: GeoPoint::new(seat.lat, seat.lng),
            status: seat.vehicle_status,
            packages: seat.packages,
            eta_minutes: seat.eta_minutes,
            route: seat.area.to_string(),
            efficiency: seat.efficiency,
        })
        .collect()
}

pub fn seed_drivers() -> Vec<Driver> {
    SEATS
        .iter()
        .map(|seat| Driver {
            id: driver_id(seat.number),
            name: seat.name.to_string(),
            status: seat.driver_status,
            vehicle_id: vehicle_id(seat.number),
            packages: seat.packages,
            completed_today: seat.completed_today,
            rating: seat.rating,
            location: seat.area.to_string(),
            phone: seat.phone.to_string(),
            efficiency: seat.efficiency,
            on_time_rate: seat.on_time_rate,
        })
        .collect()
}

pub fn seed_insights() -> Vec<Insight> {
    vec![
        Insight {
            id: 1,
            kind: InsightKind::Optimization,
            priority: Priority::High,
            title: "Route Optimization Opportunity".to_string(),
            description: "AI detected 15% efficiency gain possible on Route 7 by adjusting delivery sequence."
                .to_string(),
            impact: "+$1,200 daily savings".to_string(),
            confidence: 94,
        },
        Insight {
            id: 2,
            kind: InsightKind::Risk,
            priority: Priority::Medium,
            title: "Weather Impact Alert".to_string(),
            description: "Predicted rain at 3 PM may delay 8 deliveries in Capitol Hill area.".to_string(),
            impact: "12 min avg delay".to_string(),
            confidence: 87,
        },
        Insight {
            id: 3,
            kind: InsightKind::Success,
            priority: Priority::Low,
            title: "Customer Availability Prediction".to_string(),
            description:
                "AI predicts 96% customer availability for afternoon deliveries based on historical data."
                    .to_string(),
            impact: "+3% success rate".to_string(),
            confidence: 91,
        },
        Insight {
            id: 4,
            kind: InsightKind::Efficiency,
            priority: Priority::High,
            title: "Driver Performance Insight".to_string(),
            description: "Sarah Chen consistently outperforms ETA predictions by 8%. Consider route expansion."
                .to_string(),
            impact: "+5 deliveries/day".to_string(),
            confidence: 98,
        },
    ]
}
