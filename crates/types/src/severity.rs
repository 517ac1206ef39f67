//! Ordered severity scale shared by thresholds, alarms and displays.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a condition reading.
///
/// Ordering is meaningful: `Normal < Warning < Alarm < Trip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Normal,
    Warning,
    Alarm,
    Trip,
}

impl Severity {
    /// Whether this severity makes a condition "active" for annunciation.
    pub fn is_alarm_class(self) -> bool {
        self >= Severity::Alarm
    }

    /// Short uppercase label used on tiles and in the alarm log
    pub fn label(self) -> &'static str {
        match self {
            Severity::Normal => "NORMAL",
            Severity::Warning => "WARNING",
            Severity::Alarm => "ALARM",
            Severity::Trip => "TRIP",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
