use crate::error::{FleetError, FleetResult};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type VehicleId = String;
pub type DriverId = String;

/// Anything a registry can own.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Human readable kind used in logs and errors.
    const KIND: &'static str;

    fn id(&self) -> &str;

    fn validate(&self) -> FleetResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    Delivering,
    EnRoute,
    Loading,
    Returning,
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VehicleStatus::Delivering => "Delivering",
            VehicleStatus::EnRoute => "En Route",
            VehicleStatus::Loading => "Loading",
            VehicleStatus::Returning => "Returning",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    Active,
    OnBreak,
    Offline,
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DriverStatus::Active => "Active",
            DriverStatus::OnBreak => "On Break",
            DriverStatus::Offline => "Offline",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    /// Weak reference, resolved through the driver registry.
    pub driver_id: DriverId,
    pub position: GeoPoint,
    pub status: VehicleStatus,
    pub packages: u32,
    pub eta_minutes: u32,
    pub route: String,
    pub efficiency: u8,
}

impl Entity for Vehicle {
    const KIND: &'static str = "vehicle";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> FleetResult<()> {
        if self.id.trim().is_empty() {
            return Err(FleetError::validation(Self::KIND, &self.id, "id is empty"));
        }
        if !self.position.is_finite() {
            return Err(FleetError::validation(Self::KIND, &self.id, "position is not finite"));
        }
        if self.eta_minutes < 1 {
            return Err(FleetError::validation(Self::KIND, &self.id, "eta must be at least one minute"));
        }
        if self.efficiency > 100 {
            return Err(FleetError::validation(
                Self::KIND,
                &self.id,
                format!("efficiency {} exceeds 100", self.efficiency),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: DriverId,
    pub name: String,
    pub status: DriverStatus,
    /// Weak reference, resolved through the vehicle registry.
    pub vehicle_id: VehicleId,
    pub packages: u32,
    pub completed_today: u32,
    pub rating: f64,
    pub location: String,
    pub phone: String,
    pub efficiency: u8,
    pub on_time_rate: u8,
}

impl Entity for Driver {
    const KIND: &'static str = "driver";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> FleetResult<()> {
        if self.id.trim().is_empty() {
            return Err(FleetError::validation(Self::KIND, &self.id, "id is empty"));
        }
        if self.name.trim().is_empty() {
            return Err(FleetError::validation(Self::KIND, &self.id, "name is empty"));
        }
        if !(1.0..=5.0).contains(&self.rating) {
            return Err(FleetError::validation(
                Self::KIND,
                &self.id,
                format!("rating {} outside 1.0..=5.0", self.rating),
            ));
        }
        if self.efficiency > 100 || self.on_time_rate > 100 {
            return Err(FleetError::validation(Self::KIND, &self.id, "percentage exceeds 100"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Optimization,
    Risk,
    Success,
    Efficiency,
    Other(String),
}

/// Declaration order is display order: `High` sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub id: u32,
    pub kind: InsightKind,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub impact: String,
    pub confidence: u8,
}

impl Insight {
    pub fn validate(&self) -> FleetResult<()> {
        if self.title.trim().is_empty() {
            return Err(FleetError::validation("insight", self.id.to_string(), "title is empty"));
        }
        if self.confidence > 100 {
            return Err(FleetError::validation(
                "insight",
                self.id.to_string(),
                format!("confidence {} exceeds 100", self.confidence),
            ));
        }
        Ok(())
    }
}
