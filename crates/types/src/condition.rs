//! Condition kinds and their threshold rows.
//!
//! A `ThresholdEntry` is pure data: display range, label, unit, which side(s)
//! are compared, and the four threshold scalars. Unbounded sides are stored as
//! `±∞` and serialized as `null`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Instrument type read from the plant model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    Power,
    HotLegTemperature,
    ColdLegTemperature,
    AverageTemperature,
    PressurizerPressure,
    PressurizerLevel,
    CoolantFlow,
    SteamGeneratorLevel,
    ContainmentPressure,
    BoronConcentration,
    Period,
}

impl ConditionKind {
    pub const ALL: [ConditionKind; 11] = [
        ConditionKind::Power,
        ConditionKind::HotLegTemperature,
        ConditionKind::ColdLegTemperature,
        ConditionKind::AverageTemperature,
        ConditionKind::PressurizerPressure,
        ConditionKind::PressurizerLevel,
        ConditionKind::CoolantFlow,
        ConditionKind::SteamGeneratorLevel,
        ConditionKind::ContainmentPressure,
        ConditionKind::BoronConcentration,
        ConditionKind::Period,
    ];

    /// Stable key used by value sources and config files
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionKind::Power => "power",
            ConditionKind::HotLegTemperature => "hot_leg_temperature",
            ConditionKind::ColdLegTemperature => "cold_leg_temperature",
            ConditionKind::AverageTemperature => "average_temperature",
            ConditionKind::PressurizerPressure => "pressurizer_pressure",
            ConditionKind::PressurizerLevel => "pressurizer_level",
            ConditionKind::CoolantFlow => "coolant_flow",
            ConditionKind::SteamGeneratorLevel => "steam_generator_level",
            ConditionKind::ContainmentPressure => "containment_pressure",
            ConditionKind::BoronConcentration => "boron_concentration",
            ConditionKind::Period => "period",
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a kind key that is not in `ConditionKind::ALL`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownConditionKind(pub String);

impl fmt::Display for UnknownConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown condition kind: {}", self.0)
    }
}

impl std::error::Error for UnknownConditionKind {}

impl FromStr for ConditionKind {
    type Err = UnknownConditionKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConditionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownConditionKind(s.to_string()))
    }
}

/// Which side(s) of the scale a kind is compared on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Greater-than comparisons only
    High,
    /// Less-than comparisons only
    Low,
    /// Both sides
    Both,
    /// Informational, never warns or alarms
    #[default]
    None,
}

impl Direction {
    pub fn checks_high(self) -> bool {
        matches!(self, Direction::High | Direction::Both)
    }

    pub fn checks_low(self) -> bool {
        matches!(self, Direction::Low | Direction::Both)
    }
}

/// Four-way thresholds. `±∞` means "no limit on that side".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default = "neg_infinity", with = "low_bound")]
    pub warn_low: f64,
    #[serde(default = "infinity", with = "high_bound")]
    pub warn_high: f64,
    #[serde(default = "neg_infinity", with = "low_bound")]
    pub alarm_low: f64,
    #[serde(default = "infinity", with = "high_bound")]
    pub alarm_high: f64,
}

fn infinity() -> f64 {
    f64::INFINITY
}

fn neg_infinity() -> f64 {
    f64::NEG_INFINITY
}

impl Thresholds {
    /// No limits at all
    pub const fn none() -> Self {
        Self {
            warn_low: f64::NEG_INFINITY,
            warn_high: f64::INFINITY,
            alarm_low: f64::NEG_INFINITY,
            alarm_high: f64::INFINITY,
        }
    }

    /// Upper limits only
    pub const fn high(warn_high: f64, alarm_high: f64) -> Self {
        Self {
            warn_high,
            alarm_high,
            ..Self::none()
        }
    }

    /// Lower limits only
    pub const fn low(warn_low: f64, alarm_low: f64) -> Self {
        Self {
            warn_low,
            alarm_low,
            ..Self::none()
        }
    }

    /// Limits on both sides
    pub const fn both(warn_low: f64, alarm_low: f64, warn_high: f64, alarm_high: f64) -> Self {
        Self {
            warn_low,
            warn_high,
            alarm_low,
            alarm_high,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::none()
    }
}

/// One row of the threshold table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdEntry {
    pub kind: ConditionKind,
    /// Text shown on gauges and tiles
    pub label: String,
    #[serde(default)]
    pub unit: String,
    /// Display range (min, max) used for normalization
    pub range: (f64, f64),
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub thresholds: Thresholds,
}

impl ThresholdEntry {
    pub fn new(
        kind: ConditionKind,
        label: &str,
        unit: &str,
        range: (f64, f64),
        direction: Direction,
        thresholds: Thresholds,
    ) -> Self {
        Self {
            kind,
            label: label.to_string(),
            unit: unit.to_string(),
            range,
            direction,
            thresholds,
        }
    }
}

/// `-∞` <-> `null` for lower limits
mod low_bound {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NEG_INFINITY))
    }
}

/// `+∞` <-> `null` for upper limits
mod high_bound {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}
