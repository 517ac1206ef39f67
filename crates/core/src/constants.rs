//! Shared constants for the panel core

use std::time::Duration;

/// Default host tick interval (10 Hz)
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Default annunciator flash rate in Hz (one full on/off cycle per second)
pub const DEFAULT_FLASH_RATE_HZ: f64 = 1.0;

/// Default alarm history capacity
pub const DEFAULT_MAX_LOG_ENTRIES: usize = 20;

/// Default refresh interval for gauges (~10 Hz)
pub const GAUGE_UPDATE_INTERVAL: Duration = Duration::from_millis(100);

/// Default refresh interval for system diagrams (~2 Hz)
pub const DIAGRAM_UPDATE_INTERVAL: Duration = Duration::from_millis(500);

/// Default smoothing factor for display values (weight of the newest sample)
pub const DEFAULT_SMOOTHING_ALPHA: f64 = 0.3;

/// Text shown in place of a value the plant model does not provide
pub const VALUE_PLACEHOLDER: &str = "---";

/// Condition id used for the distinct trip record
pub const TRIP_CONDITION_ID: &str = "reactor_trip";
