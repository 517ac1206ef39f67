//! Alarm log records and audible cue configuration

use crate::severity::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the audible alarm cue
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudibleCueConfig {
    /// Whether sound is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Custom sound file path (None = use system alert)
    #[serde(default)]
    pub custom_sound_path: Option<String>,

    /// Whether to loop the sound until acknowledged or silenced
    #[serde(default = "default_true")]
    pub loop_sound: bool,

    /// Volume level (0.0 to 1.0)
    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_true() -> bool {
    true
}

fn default_volume() -> f32 {
    0.8
}

impl Default for AudibleCueConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            custom_sound_path: None,
            loop_sound: true,
            volume: 0.8,
        }
    }
}

/// One entry of the alarm history.
///
/// Created only on a rising edge. Only `acknowledged` changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmRecord {
    /// Id of the condition that raised it (or the trip pseudo-condition)
    pub condition_id: String,
    pub message: String,
    pub severity: Severity,
    /// Panel clock time of the rising edge
    pub activated_at: Duration,
    /// Wall clock time of the rising edge
    pub wall_time: DateTime<Utc>,
    pub acknowledged: bool,
}

impl AlarmRecord {
    pub fn new(condition_id: &str, message: &str, severity: Severity, activated_at: Duration) -> Self {
        Self {
            condition_id: condition_id.to_string(),
            message: message.to_string(),
            severity,
            activated_at,
            wall_time: Utc::now(),
            acknowledged: false,
        }
    }

    /// One-line log text, e.g. `12:03:44 ALARM  PZR PRESS LOW`
    pub fn display_line(&self) -> String {
        format!(
            "{} {:<7} {}{}",
            self.wall_time.format("%H:%M:%S"),
            self.severity.label(),
            self.message,
            if self.acknowledged { "" } else { " *" }
        )
    }
}
