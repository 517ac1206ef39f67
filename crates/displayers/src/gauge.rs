//! Gauge component
//!
//! Shows one instrument value, smoothed, with its normalized position in the
//! display range and a zone color from the threshold table.

use anyhow::Result;
use log::trace;
use rcs_panel_core::constants::{DEFAULT_SMOOTHING_ALPHA, GAUGE_UPDATE_INTERVAL, VALUE_PLACEHOLDER};
use rcs_panel_core::{ConditionKind, PanelContext, Severity, Smoother, ViewComponent, ViewId};
use rcs_panel_types::Color;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a gauge
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GaugeConfig {
    /// Instrument shown
    pub kind: ConditionKind,

    /// Screen the gauge lives on
    #[serde(default)]
    pub screen: Option<ViewId>,

    /// EMA factor for the displayed value
    #[serde(default = "default_alpha")]
    pub smoothing_alpha: f64,

    #[serde(default = "default_interval_ms")]
    pub update_interval_ms: u64,

    /// Digits after the decimal point
    #[serde(default = "default_decimals")]
    pub decimals: usize,
}

fn default_alpha() -> f64 {
    DEFAULT_SMOOTHING_ALPHA
}

fn default_interval_ms() -> u64 {
    GAUGE_UPDATE_INTERVAL.as_millis() as u64
}

fn default_decimals() -> usize {
    1
}

impl GaugeConfig {
    pub fn new(kind: ConditionKind) -> Self {
        Self {
            kind,
            screen: None,
            smoothing_alpha: default_alpha(),
            update_interval_ms: default_interval_ms(),
            decimals: default_decimals(),
        }
    }

    pub fn on_screen(mut self, screen: ViewId) -> Self {
        self.screen = Some(screen);
        self
    }
}

/// What the gauge currently shows
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeReading {
    /// Smoothed value, `None` when the source has no reading
    pub value: Option<f64>,
    /// Needle position in 0..=1
    pub normalized: Option<f64>,
    pub severity: Severity,
    pub color: Color,
    pub text: String,
}

impl Default for GaugeReading {
    fn default() -> Self {
        Self {
            value: None,
            normalized: None,
            severity: Severity::Normal,
            color: Color::for_severity(Severity::Normal),
            text: VALUE_PLACEHOLDER.to_string(),
        }
    }
}

pub struct Gauge {
    id: String,
    name: String,
    config: GaugeConfig,
    smoother: Smoother,
    reading: GaugeReading,
    label: String,
    unit: String,
}

impl Gauge {
    pub fn new(id: &str, config: GaugeConfig) -> Result<Self> {
        let smoother = Smoother::new(config.smoothing_alpha)?;
        Ok(Self {
            id: id.to_string(),
            name: format!("Gauge {}", config.kind),
            label: config.kind.as_str().to_string(),
            unit: String::new(),
            config,
            smoother,
            reading: GaugeReading::default(),
        })
    }

    pub fn reading(&self) -> &GaugeReading {
        &self.reading
    }

    pub fn kind(&self) -> ConditionKind {
        self.config.kind
    }
}

impl ViewComponent for Gauge {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self, ctx: &PanelContext<'_>) -> Result<()> {
        let table = ctx.engine.table();
        self.label = table.label(self.config.kind).to_string();
        self.unit = table.unit(self.config.kind).to_string();
        Ok(())
    }

    fn update_data(&mut self, ctx: &PanelContext<'_>) -> Result<()> {
        let kind = self.config.kind;
        let raw = ctx.source.value(kind);

        if !raw.is_finite() {
            // Keep the smoothed history so the needle does not jump when the value returns
            self.reading = GaugeReading::default();
            trace!("{}: no reading for {}", self.id, kind);
            return Ok(());
        }

        let table = ctx.engine.table();
        let value = self.smoother.smooth(kind.as_str(), raw);
        let severity = if ctx.engine.is_tripped() {
            Severity::Trip
        } else {
            table.classify(kind, value)
        };

        self.reading = GaugeReading {
            value: Some(value),
            normalized: table.normalize(kind, value),
            severity,
            color: Color::for_severity(severity),
            text: format!("{:.*}", self.config.decimals, value),
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
        let bar = match self.reading.normalized {
            Some(position) => {
                let filled = (position * 20.0).round() as usize;
                format!("[{}{}]", "#".repeat(filled), ".".repeat(20 - filled.min(20)))
            }
            None => format!("[{}]", " ".repeat(20)),
        };
        vec![format!(
            "{:<14} {:>8} {:<5} {} {}",
            self.label, self.reading.text, self.unit, bar, self.reading.severity
        )]
    }
}
