//! Threshold table: `(kind, value) -> Severity`, display ranges and labels.
//!
//! The table is declarative. Each kind is one `ThresholdEntry` row whose
//! `direction` decides which comparisons apply, so adding a kind means adding
//! a row. High limits compare with strict `>`, low limits with strict `<`.

use crate::error::ConfigError;
use rcs_panel_types::{ConditionKind, Direction, Severity, ThresholdEntry, Thresholds};
use std::collections::HashMap;

type Row = (ConditionKind, &'static str, &'static str, (f64, f64), Direction, Thresholds);

/// Built-in instrument rows
const BUILTIN_ROWS: &[Row] = &[
    (ConditionKind::Power, "REACTOR POWER", "%", (0.0, 120.0), Direction::High, Thresholds::high(105.0, 109.0)),
    (ConditionKind::HotLegTemperature, "T-HOT", "°F", (100.0, 700.0), Direction::High, Thresholds::high(550.0, 620.0)),
    (ConditionKind::ColdLegTemperature, "T-COLD", "°F", (100.0, 700.0), Direction::High, Thresholds::high(560.0, 600.0)),
    (ConditionKind::AverageTemperature, "T-AVG", "°F", (100.0, 700.0), Direction::Both, Thresholds::both(540.0, 530.0, 590.0, 600.0)),
    (ConditionKind::PressurizerPressure, "PZR PRESS", "psia", (0.0, 2500.0), Direction::Both, Thresholds::both(2185.0, 2000.0, 2300.0, 2385.0)),
    (ConditionKind::PressurizerLevel, "PZR LVL", "%", (0.0, 100.0), Direction::Both, Thresholds::both(20.0, 15.0, 70.0, 85.0)),
    (ConditionKind::CoolantFlow, "RCS FLOW", "K gpm", (0.0, 120.0), Direction::Low, Thresholds::low(70.0, 60.0)),
    (ConditionKind::SteamGeneratorLevel, "SG LVL", "%", (0.0, 100.0), Direction::Both, Thresholds::both(30.0, 20.0, 75.0, 85.0)),
    (ConditionKind::ContainmentPressure, "CTMT PRESS", "psig", (-5.0, 60.0), Direction::High, Thresholds::high(3.0, 5.0)),
    (ConditionKind::BoronConcentration, "BORON", "ppm", (0.0, 2500.0), Direction::None, Thresholds::none()),
    (ConditionKind::Period, "STARTUP RATE", "dpm", (-1.0, 5.0), Direction::High, Thresholds::high(1.0, 2.0)),
];

/// Lookup table keyed by condition kind
#[derive(Debug, Clone, Default)]
pub struct ThresholdTable {
    entries: HashMap<ConditionKind, ThresholdEntry>,
}

impl ThresholdTable {
    /// Empty table; every kind classifies as `Normal`
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding the built-in instrument rows
    pub fn builtin() -> Self {
        let entries = BUILTIN_ROWS
            .iter()
            .map(|(kind, label, unit, range, direction, thresholds)| {
                (
                    *kind,
                    ThresholdEntry::new(*kind, label, unit, *range, *direction, *thresholds),
                )
            })
            .collect();
        Self { entries }
    }

    /// Build a table from rows, validating each one
    pub fn from_entries(entries: impl IntoIterator<Item = ThresholdEntry>) -> Result<Self, ConfigError> {
        let mut table = Self::new();
        for entry in entries {
            table.insert(entry)?;
        }
        Ok(table)
    }

    /// Replace whole rows by kind
    pub fn with_overrides(
        mut self,
        overrides: impl IntoIterator<Item = ThresholdEntry>,
    ) -> Result<Self, ConfigError> {
        for entry in overrides {
            self.insert(entry)?;
        }
        Ok(self)
    }

    /// Insert or replace a row, returning the previous one
    pub fn insert(&mut self, entry: ThresholdEntry) -> Result<Option<ThresholdEntry>, ConfigError> {
        validate_entry(&entry)?;
        Ok(self.entries.insert(entry.kind, entry))
    }

    pub fn get(&self, kind: ConditionKind) -> Option<&ThresholdEntry> {
        self.entries.get(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = ConditionKind> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Severity of a reading.
    ///
    /// Unknown kinds and non-finite values (unmodeled instruments) are
    /// `Normal`. The trip override is not applied here.
    pub fn classify(&self, kind: ConditionKind, value: f64) -> Severity {
        if !value.is_finite() {
            return Severity::Normal;
        }
        let Some(entry) = self.entries.get(&kind) else {
            return Severity::Normal;
        };

        let t = &entry.thresholds;
        let high = entry.direction.checks_high();
        let low = entry.direction.checks_low();

        if (high && value > t.alarm_high) || (low && value < t.alarm_low) {
            Severity::Alarm
        } else if (high && value > t.warn_high) || (low && value < t.warn_low) {
            Severity::Warning
        } else {
            Severity::Normal
        }
    }

    /// Display range `(min, max)`
    pub fn range(&self, kind: ConditionKind) -> Option<(f64, f64)> {
        self.entries.get(&kind).map(|e| e.range)
    }

    /// Display label, falling back to the kind key
    pub fn label(&self, kind: ConditionKind) -> &str {
        self.entries
            .get(&kind)
            .map(|e| e.label.as_str())
            .unwrap_or_else(|| kind.as_str())
    }

    pub fn unit(&self, kind: ConditionKind) -> &str {
        self.entries.get(&kind).map(|e| e.unit.as_str()).unwrap_or("")
    }

    /// Value mapped into 0.0..=1.0 over the display range.
    ///
    /// `None` for unknown kinds and non-finite values.
    pub fn normalize(&self, kind: ConditionKind, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        let (min, max) = self.range(kind)?;
        Some(((value - min) / (max - min)).clamp(0.0, 1.0))
    }
}

fn validate_entry(entry: &ThresholdEntry) -> Result<(), ConfigError> {
    let (min, max) = entry.range;
    if !(min.is_finite() && max.is_finite() && min < max) {
        return Err(ConfigError::InvalidRange {
            kind: entry.kind,
            min,
            max,
        });
    }

    let t = &entry.thresholds;
    let order_error = |detail: String| ConfigError::ThresholdOrder {
        kind: entry.kind,
        detail,
    };

    if entry.direction.checks_high() {
        if t.warn_high.is_nan() || t.alarm_high.is_nan() {
            return Err(order_error("high limits must not be NaN".to_string()));
        }
        if t.warn_high > t.alarm_high {
            return Err(order_error(format!(
                "warn_high {} above alarm_high {}",
                t.warn_high, t.alarm_high
            )));
        }
    }
    if entry.direction.checks_low() {
        if t.warn_low.is_nan() || t.alarm_low.is_nan() {
            return Err(order_error("low limits must not be NaN".to_string()));
        }
        if t.alarm_low > t.warn_low {
            return Err(order_error(format!(
                "alarm_low {} above warn_low {}",
                t.alarm_low, t.warn_low
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_sequence() {
        let table = ThresholdTable::builtin();
        let severities: Vec<Severity> = [100.0, 106.0, 110.0, 106.0, 95.0]
            .into_iter()
            .map(|v| table.classify(ConditionKind::Power, v))
            .collect();
        assert_eq!(
            severities,
            vec![
                Severity::Normal,
                Severity::Warning,
                Severity::Alarm,
                Severity::Warning,
                Severity::Normal
            ]
        );
    }

    #[test]
    fn test_limits_are_strict() {
        let table = ThresholdTable::builtin();
        assert_eq!(table.classify(ConditionKind::Power, 105.0), Severity::Normal);
        assert_eq!(table.classify(ConditionKind::Power, 109.0), Severity::Warning);
        assert_eq!(table.classify(ConditionKind::CoolantFlow, 60.0), Severity::Warning);
        assert_eq!(table.classify(ConditionKind::CoolantFlow, 59.9), Severity::Alarm);
    }

    #[test]
    fn test_low_only_ignores_high_side() {
        let table = ThresholdTable::builtin();
        assert_eq!(table.classify(ConditionKind::CoolantFlow, 119.0), Severity::Normal);
        assert_eq!(table.classify(ConditionKind::CoolantFlow, 65.0), Severity::Warning);
    }

    #[test]
    fn test_both_directions() {
        let table = ThresholdTable::builtin();
        let kind = ConditionKind::PressurizerLevel;
        assert_eq!(table.classify(kind, 10.0), Severity::Alarm);
        assert_eq!(table.classify(kind, 18.0), Severity::Warning);
        assert_eq!(table.classify(kind, 50.0), Severity::Normal);
        assert_eq!(table.classify(kind, 80.0), Severity::Warning);
        assert_eq!(table.classify(kind, 90.0), Severity::Alarm);
    }

    #[test]
    fn test_informational_never_alarms() {
        let table = ThresholdTable::builtin();
        for value in [-1e9, 0.0, 1e9] {
            assert_eq!(table.classify(ConditionKind::BoronConcentration, value), Severity::Normal);
        }
    }

    #[test]
    fn test_nan_is_normal() {
        let table = ThresholdTable::builtin();
        assert_eq!(table.classify(ConditionKind::Power, f64::NAN), Severity::Normal);
        assert_eq!(table.classify(ConditionKind::Power, f64::INFINITY), Severity::Normal);
        assert_eq!(table.normalize(ConditionKind::Power, f64::NAN), None);
    }

    #[test]
    fn test_unknown_kind_in_empty_table() {
        let table = ThresholdTable::new();
        assert_eq!(table.classify(ConditionKind::Power, 1000.0), Severity::Normal);
        assert_eq!(table.label(ConditionKind::Power), "power");
        assert_eq!(table.range(ConditionKind::Power), None);
    }

    #[test]
    fn test_normalize_clamps() {
        let table = ThresholdTable::builtin();
        assert_eq!(table.normalize(ConditionKind::Power, 60.0), Some(0.5));
        assert_eq!(table.normalize(ConditionKind::Power, 500.0), Some(1.0));
        assert_eq!(table.normalize(ConditionKind::Power, -3.0), Some(0.0));
    }

    #[test]
    fn test_every_kind_has_builtin_row() {
        let table = ThresholdTable::builtin();
        for kind in ConditionKind::ALL {
            assert!(table.get(kind).is_some(), "missing row for {}", kind);
        }
        // Built-in rows must pass the same validation as overrides
        assert!(ThresholdTable::from_entries(table.entries.values().cloned()).is_ok());
    }

    #[test]
    fn test_override_replaces_row() {
        let table = ThresholdTable::builtin()
            .with_overrides([ThresholdEntry::new(
                ConditionKind::Power,
                "NI POWER",
                "%",
                (0.0, 150.0),
                Direction::High,
                Thresholds::high(110.0, 118.0),
            )])
            .unwrap();
        assert_eq!(table.label(ConditionKind::Power), "NI POWER");
        assert_eq!(table.classify(ConditionKind::Power, 112.0), Severity::Warning);
    }

    #[test]
    fn test_invalid_rows_rejected() {
        let inverted = ThresholdEntry::new(
            ConditionKind::Power,
            "P",
            "%",
            (120.0, 0.0),
            Direction::High,
            Thresholds::high(105.0, 109.0),
        );
        assert!(matches!(
            ThresholdTable::new().insert(inverted),
            Err(ConfigError::InvalidRange { .. })
        ));

        let out_of_order = ThresholdEntry::new(
            ConditionKind::CoolantFlow,
            "F",
            "K gpm",
            (0.0, 120.0),
            Direction::Low,
            Thresholds::low(60.0, 70.0),
        );
        assert!(matches!(
            ThresholdTable::new().insert(out_of_order),
            Err(ConfigError::ThresholdOrder { .. })
        ));
    }
}
