use crate::error::{FleetError, FleetResult};
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const CLOCK_INTERVAL_MS: u64 = 1_000;
pub const METRICS_INTERVAL_MS: u64 = 3_000;
pub const MOVEMENT_INTERVAL_MS: u64 = 5_000;
pub const ROSTER_INTERVAL_MS: u64 = 10_000;
pub const FRAME_INTERVAL_MS: u64 = 16;
pub const ANIMATION_DURATION_MS: u64 = 2_000;

/// Cadences and knobs for one simulation instance.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub clock_interval: Duration,
    pub metrics_interval: Duration,
    pub movement_interval: Duration,
    pub roster_interval: Duration,
    pub frame_interval: Duration,
    pub animation_duration: Duration,
    /// Fixed RNG seed; `None` draws from entropy.
    pub seed: Option<u64>,
    pub port: u16,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            clock_interval: Duration::from_millis(CLOCK_INTERVAL_MS),
            metrics_interval: Duration::from_millis(METRICS_INTERVAL_MS),
            movement_interval: Duration::from_millis(MOVEMENT_INTERVAL_MS),
            roster_interval: Duration::from_millis(ROSTER_INTERVAL_MS),
            frame_interval: Duration::from_millis(FRAME_INTERVAL_MS),
            animation_duration: Duration::from_millis(ANIMATION_DURATION_MS),
            seed: None,
            port: DEFAULT_PORT,
        }
    }
}

impl SimulationConfig {
    pub fn from_env() -> FleetResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, falling back to defaults
    /// for absent keys.
    pub fn from_lookup<F>(lookup: F) -> FleetResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let millis = |key: &'static str, fallback: Duration| -> FleetResult<Duration> {
            Ok(parse_var::<u64, _>(&lookup, key)?
                .map(Duration::from_millis)
                .unwrap_or(fallback))
        };

        let config = Self {
            clock_interval: millis("FLEET_CLOCK_MS", defaults.clock_interval)?,
            metrics_interval: millis("FLEET_METRICS_MS", defaults.metrics_interval)?,
            movement_interval: millis("FLEET_MOVEMENT_MS", defaults.movement_interval)?,
            roster_interval: millis("FLEET_ROSTER_MS", defaults.roster_interval)?,
            frame_interval: millis("FLEET_FRAME_MS", defaults.frame_interval)?,
            animation_duration: millis("FLEET_ANIMATION_MS", defaults.animation_duration)?,
            seed: parse_var(&lookup, "FLEET_SEED")?,
            port: parse_var(&lookup, "PORT")?.unwrap_or(defaults.port),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> FleetResult<()> {
        let intervals = [
            ("FLEET_CLOCK_MS", self.clock_interval),
            ("FLEET_METRICS_MS", self.metrics_interval),
            ("FLEET_MOVEMENT_MS", self.movement_interval),
            ("FLEET_ROSTER_MS", self.roster_interval),
            ("FLEET_FRAME_MS", self.frame_interval),
        ];
        for (key, interval) in intervals {
            if interval.is_zero() {
                return Err(FleetError::Config {
                    key,
                    reason: "interval must be positive".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> FleetResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| FleetError::Config {
            key,
            reason: format!("'{}': {}", raw, e),
        }),
    }
}
