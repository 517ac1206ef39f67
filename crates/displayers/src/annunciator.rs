//! Annunciator tile
//!
//! A window on the alarm board bound to one engine condition. An active,
//! unacknowledged alarm blinks with the shared flash phase; once acknowledged
//! it stays lit until the condition clears.

use anyhow::Result;
use log::warn;
use rcs_panel_core::{FlashReceiver, PanelContext, Severity, ViewComponent, ViewId};
use rcs_panel_types::Color;
use std::time::Duration;

const DARK_TILE: Color = Color::new(0.15, 0.15, 0.15, 1.0);

/// Condition state as last read by the tile
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TileState {
    pub active: bool,
    pub acknowledged: bool,
    pub severity: Severity,
    /// Alarm-class tiles blink; status tiles are lit steadily
    pub blinks: bool,
}

impl TileState {
    /// Whether the window is lit for a flash phase
    pub fn lit(&self, phase_on: bool) -> bool {
        self.active && (!self.blinks || self.acknowledged || phase_on)
    }
}

pub struct AnnunciatorTile {
    id: String,
    condition_id: String,
    screen: Option<ViewId>,
    message: String,
    state: TileState,
    phase_on: bool,
    missing_reported: bool,
}

impl AnnunciatorTile {
    pub fn new(id: &str, condition_id: &str) -> Self {
        Self {
            id: id.to_string(),
            condition_id: condition_id.to_string(),
            screen: None,
            message: condition_id.to_uppercase(),
            state: TileState::default(),
            phase_on: false,
            missing_reported: false,
        }
    }

    pub fn on_screen(mut self, screen: ViewId) -> Self {
        self.screen = Some(screen);
        self
    }

    pub fn state(&self) -> TileState {
        self.state
    }

    pub fn is_lit(&self) -> bool {
        self.state.lit(self.phase_on)
    }

    pub fn color(&self) -> Color {
        if self.is_lit() {
            Color::for_severity(self.state.severity)
        } else if self.state.active {
            Color::for_severity(self.state.severity).dimmed(0.3)
        } else {
            DARK_TILE
        }
    }
}

impl ViewComponent for AnnunciatorTile {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.message
    }

    fn update_data(&mut self, ctx: &PanelContext<'_>) -> Result<()> {
        let Some(condition) = ctx.engine.condition(&self.condition_id) else {
            if !self.missing_reported {
                warn!("Tile '{}' bound to unknown condition '{}'", self.id, self.condition_id);
                self.missing_reported = true;
            }
            self.state = TileState::default();
            return Ok(());
        };

        self.message = condition.spec.message.clone();
        self.state = TileState {
            active: condition.active,
            acknowledged: condition.acknowledged,
            severity: condition.severity,
            blinks: condition.is_alarm_class(),
        };
        self.phase_on = ctx.engine.flash_phase();
        Ok(())
    }

    // Tiles read engine state that only changes on evaluate
    fn update_interval(&self) -> Duration {
        Duration::ZERO
    }

    fn screen(&self) -> Option<ViewId> {
        self.screen
    }

    fn as_flash_receiver(&mut self) -> Option<&mut dyn FlashReceiver> {
        Some(self)
    }

    fn text(&self) -> Vec<String> {
        let lamp = if self.is_lit() {
            "##"
        } else if self.state.active {
            "::"
        } else {
            "  "
        };
        vec![format!("[{}] {}", lamp, self.message)]
    }
}

impl FlashReceiver for AnnunciatorTile {
    fn on_flash(&mut self, phase_on: bool) {
        self.phase_on = phase_on;
    }
}
