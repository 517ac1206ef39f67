//! Alarm list with trip banner

use anyhow::Result;
use rcs_panel_core::{FlashReceiver, PanelContext, Severity, ViewComponent, ViewId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlarmListConfig {
    /// Rows shown, newest first
    #[serde(default = "default_rows")]
    pub rows: usize,

    #[serde(default)]
    pub screen: Option<ViewId>,
}

fn default_rows() -> usize {
    8
}

impl Default for AlarmListConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            screen: None,
        }
    }
}

pub struct AlarmList {
    id: String,
    config: AlarmListConfig,
    lines: Vec<String>,
    tripped: bool,
    unacknowledged: usize,
    highest: Severity,
    phase_on: bool,
}

impl AlarmList {
    pub fn new(id: &str, config: AlarmListConfig) -> Self {
        Self {
            id: id.to_string(),
            config,
            lines: Vec::new(),
            tripped: false,
            unacknowledged: 0,
            highest: Severity::Normal,
            phase_on: false,
        }
    }

    /// Banner line, if one should be drawn for the current phase
    pub fn banner(&self) -> Option<String> {
        if self.tripped {
            // Trip banner blinks until every alarm is acknowledged
            if self.unacknowledged == 0 || self.phase_on {
                return Some("*** REACTOR TRIP ***".to_string());
            }
            return Some(String::new());
        }
        if self.unacknowledged > 0 {
            return Some(format!("{} UNACKNOWLEDGED ALARM(S)", self.unacknowledged));
        }
        None
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn highest_severity(&self) -> Severity {
        self.highest
    }
}

impl ViewComponent for AlarmList {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "Alarm List"
    }

    fn update_data(&mut self, ctx: &PanelContext<'_>) -> Result<()> {
        let engine = ctx.engine;
        self.lines = engine
            .log()
            .newest_first()
            .take(self.config.rows)
            .map(|record| record.display_line())
            .collect();
        self.tripped = engine.is_tripped();
        self.unacknowledged = engine.unacknowledged_count();
        self.highest = engine.highest_severity();
        self.phase_on = engine.flash_phase();
        Ok(())
    }

    fn screen(&self) -> Option<ViewId> {
        self.config.screen
    }

    fn as_flash_receiver(&mut self) -> Option<&mut dyn FlashReceiver> {
        Some(self)
    }

    fn text(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.lines.len() + 1);
        if let Some(banner) = self.banner() {
            out.push(banner);
        }
        if self.lines.is_empty() {
            out.push("NO ALARMS".to_string());
        } else {
            out.extend(self.lines.iter().cloned());
        }
        out
    }
}

impl FlashReceiver for AlarmList {
    fn on_flash(&mut self, phase_on: bool) {
        self.phase_on = phase_on;
    }
}
