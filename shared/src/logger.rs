//! Logging utilities

use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Initialize the logger. Honors `RUST_LOG`, defaulting to `info`.
pub fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A second init (tests, embedded use) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .try_init();
}

/// Log one completed updater tick.
pub fn log_tick(task: &str, touched: usize, skipped: usize) {
    debug!(task = %task, touched, skipped, "Tick completed");
}

/// Log a committed snapshot (metrics, predictions) as a JSON field.
pub fn log_commit<T: Serialize>(kind: &str, snapshot: &T) {
    debug!(
        kind = %kind,
        snapshot = %serde_json::to_string(snapshot).unwrap_or_default(),
        "Values committed"
    );
}

/// Log a driver by id with the contact number redacted.
pub fn log_driver_seeded(driver_id: &str, name: &str, phone: &str) {
    info!(
        driver_id = %driver_id,
        name = %name,
        phone = %redact_contact(phone),
        "Driver seeded"
    );
}

/// Keep only the last four digits of a contact number.
pub fn redact_contact(value: &str) -> String {
    let digits: Vec<char> = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = digits[digits.len() - 4..].iter().collect();
    format!("****{}", tail)
}
