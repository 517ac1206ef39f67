//! Configuration errors.
//!
//! Runtime operations of the core never fail; only building an engine or
//! registry from invalid settings does.

use rcs_panel_types::ConditionKind;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("flash rate must be positive with a representable period, got {0} Hz")]
    InvalidFlashRate(f64),

    #[error("tick rate must be positive with a representable period, got {0} Hz")]
    InvalidTickRate(f64),

    #[error("alarm log capacity must be at least 1")]
    ZeroLogCapacity,

    #[error("smoothing factor must be in (0, 1], got {0}")]
    InvalidSmoothing(f64),

    #[error("display range for {kind} is empty or inverted: ({min}, {max})")]
    InvalidRange { kind: ConditionKind, min: f64, max: f64 },

    #[error("thresholds for {kind} are out of order: {detail}")]
    ThresholdOrder { kind: ConditionKind, detail: String },
}
