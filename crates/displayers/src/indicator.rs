//! Indicator component
//!
//! A status light whose color follows a value through a gradient over the
//! instrument's display range. Used for mimic-diagram elements, so it updates
//! on the slower diagram cadence by default.

use anyhow::Result;
use rcs_panel_core::constants::{DIAGRAM_UPDATE_INTERVAL, VALUE_PLACEHOLDER};
use rcs_panel_core::{ConditionKind, PanelContext, ViewComponent, ViewId};
use rcs_panel_types::{Color, ColorStop};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const NO_READING: Color = Color::new(0.5, 0.5, 0.5, 1.0);

/// Configuration for the indicator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndicatorConfig {
    pub kind: ConditionKind,

    #[serde(default)]
    pub screen: Option<ViewId>,

    /// Gradient stops defining the color mapping
    /// Position 0.0 = range minimum, position 1.0 = range maximum
    #[serde(default = "default_gradient")]
    pub gradient_stops: Vec<ColorStop>,

    #[serde(default = "default_interval_ms")]
    pub update_interval_ms: u64,
}

fn default_interval_ms() -> u64 {
    DIAGRAM_UPDATE_INTERVAL.as_millis() as u64
}

fn default_gradient() -> Vec<ColorStop> {
    vec![
        ColorStop::new(0.0, Color::new(0.0, 0.5, 1.0, 1.0)),   // Blue at 0%
        ColorStop::new(0.4, Color::new(0.0, 1.0, 0.0, 1.0)),   // Green at 40%
        ColorStop::new(0.7, Color::new(1.0, 1.0, 0.0, 1.0)),   // Yellow at 70%
        ColorStop::new(1.0, Color::new(1.0, 0.0, 0.0, 1.0)),   // Red at 100%
    ]
}

impl IndicatorConfig {
    pub fn new(kind: ConditionKind) -> Self {
        Self {
            kind,
            screen: None,
            gradient_stops: default_gradient(),
            update_interval_ms: default_interval_ms(),
        }
    }

    pub fn on_screen(mut self, screen: ViewId) -> Self {
        self.screen = Some(screen);
        self
    }
}

/// Interpolate a color from gradient stops based on a value
pub fn interpolate_gradient(stops: &[ColorStop], value: f64, min: f64, max: f64) -> Color {
    if stops.is_empty() || !value.is_finite() {
        return NO_READING;
    }

    if stops.len() == 1 {
        return stops[0].color;
    }

    // Normalize value to 0.0-1.0 range
    let range = max - min;
    let normalized = if range > 0.0 {
        ((value - min) / range).clamp(0.0, 1.0)
    } else {
        0.5
    };

    let mut sorted_stops: Vec<&ColorStop> = stops.iter().collect();
    // NaN positions sort as equal
    sorted_stops.sort_by(|a, b| {
        a.position.partial_cmp(&b.position).unwrap_or(std::cmp::Ordering::Equal)
    });

    let first = sorted_stops[0];
    let last = sorted_stops[sorted_stops.len() - 1];
    if normalized <= first.position {
        return first.color;
    }
    if normalized >= last.position {
        return last.color;
    }

    for pair in sorted_stops.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        if normalized >= start.position && normalized <= end.position {
            let segment_range = end.position - start.position;
            let t = if segment_range > 0.0 {
                (normalized - start.position) / segment_range
            } else {
                0.0
            };

            return Color::new(
                start.color.r + (end.color.r - start.color.r) * t,
                start.color.g + (end.color.g - start.color.g) * t,
                start.color.b + (end.color.b - start.color.b) * t,
                start.color.a + (end.color.a - start.color.a) * t,
            );
        }
    }

    // Fallback
    first.color
}

pub struct Indicator {
    id: String,
    name: String,
    config: IndicatorConfig,
    value: f64,
    color: Color,
}

impl Indicator {
    pub fn new(id: &str, config: IndicatorConfig) -> Self {
        Self {
            id: id.to_string(),
            name: format!("Indicator {}", config.kind),
            config,
            value: f64::NAN,
            color: NO_READING,
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn value(&self) -> Option<f64> {
        self.value.is_finite().then_some(self.value)
    }
}

impl ViewComponent for Indicator {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn update_data(&mut self, ctx: &PanelContext<'_>) -> Result<()> {
        let kind = self.config.kind;
        self.value = ctx.source.value(kind);
        self.color = match ctx.engine.table().range(kind) {
            Some((min, max)) => interpolate_gradient(&self.config.gradient_stops, self.value, min, max),
            None => NO_READING,
        };
        Ok(())
    }

    fn update_interval(&self) -> Duration {
        Duration::from_millis(self.config.update_interval_ms)
    }

    fn screen(&self) -> Option<ViewId> {
        self.config.screen
    }

    fn text(&self) -> Vec<String> {
        let value = match self.value() {
            Some(v) => format!("{:.0}", v),
            None => VALUE_PLACEHOLDER.to_string(),
        };
        vec![format!("({}) {} {}", self.color.to_hex(), self.config.kind, value)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;

    #[test]
    fn test_gradient_endpoints_and_midpoint() {
        let stops = vec![
            ColorStop::new(0.0, Color::new(0.0, 0.0, 0.0, 1.0)),
            ColorStop::new(1.0, Color::new(1.0, 1.0, 1.0, 1.0)),
        ];
        assert_eq!(interpolate_gradient(&stops, -5.0, 0.0, 10.0), stops[0].color);
        assert_eq!(interpolate_gradient(&stops, 50.0, 0.0, 10.0), stops[1].color);
        let mid = interpolate_gradient(&stops, 5.0, 0.0, 10.0);
        assert!((mid.r - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_gradient_unsorted_stops() {
        let stops = vec![
            ColorStop::new(1.0, Color::new(1.0, 0.0, 0.0, 1.0)),
            ColorStop::new(0.0, Color::new(0.0, 0.0, 1.0, 1.0)),
        ];
        let low = interpolate_gradient(&stops, 0.0, 0.0, 1.0);
        assert_eq!(low, Color::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn test_gradient_nan_is_gray() {
        assert_eq!(interpolate_gradient(&default_gradient(), f64::NAN, 0.0, 1.0), NO_READING);
        assert_eq!(interpolate_gradient(&[], 0.5, 0.0, 1.0), NO_READING);
    }

    #[test]
    fn test_indicator_follows_value() {
        let mut fixture = Fixture::new(Vec::new());
        fixture.source.set(ConditionKind::PressurizerLevel, 100.0);
        let tick = fixture.evaluate();

        let mut indicator = Indicator::new("i1", IndicatorConfig::new(ConditionKind::PressurizerLevel));
        indicator.update_data(&fixture.context(tick)).unwrap();
        assert_eq!(indicator.color(), Color::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(indicator.value(), Some(100.0));
        assert_eq!(indicator.update_interval(), DIAGRAM_UPDATE_INTERVAL);
    }

    #[test]
    fn test_indicator_without_reading() {
        let mut fixture = Fixture::new(Vec::new());
        let tick = fixture.evaluate();
        let mut indicator = Indicator::new("i1", IndicatorConfig::new(ConditionKind::Period));
        indicator.update_data(&fixture.context(tick)).unwrap();
        assert_eq!(indicator.color(), NO_READING);
        assert!(indicator.text()[0].ends_with(VALUE_PLACEHOLDER));
    }
}
