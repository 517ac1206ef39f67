//! ViewComponent trait and the context components read from

use crate::alarm_engine::AlarmEngine;
use crate::clock::Tick;
use crate::constants::GAUGE_UPDATE_INTERVAL;
use crate::screen_registry::ScreenRegistry;
use crate::value_source::ValueSource;
use anyhow::Result;
use rcs_panel_types::ViewId;
use std::time::Duration;

/// Read-only view of the panel handed to components.
///
/// Components only get shared references, so `update_data` cannot mutate
/// engine or registry state. Operator actions go through the owning hubs.
pub struct PanelContext<'a> {
    pub engine: &'a AlarmEngine,
    pub screens: &'a ScreenRegistry,
    pub source: &'a dyn ValueSource,
    pub tick: Tick,
}

impl<'a> PanelContext<'a> {
    pub fn new(
        engine: &'a AlarmEngine,
        screens: &'a ScreenRegistry,
        source: &'a dyn ValueSource,
        tick: Tick,
    ) -> Self {
        Self {
            engine,
            screens,
            source,
            tick,
        }
    }

    /// Current time
    pub fn now(&self) -> Duration {
        self.tick.now
    }
}

/// Capability: reacts to the shared flash phase
pub trait FlashReceiver {
    fn on_flash(&mut self, phase_on: bool);
}

/// Trait for all display units
///
/// Components pull values every time they are due and recompute their local
/// label, severity and color. A failing component is logged and skipped by
/// the driver; the rest of the tick carries on.
pub trait ViewComponent {
    /// Unique identifier for this component instance
    fn id(&self) -> &str;

    /// Human-readable name
    fn name(&self) -> &str;

    /// One-time setup once the panel is composed
    fn initialize(&mut self, _ctx: &PanelContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Pull current values and recompute local display state
    fn update_data(&mut self, ctx: &PanelContext<'_>) -> Result<()>;

    /// Minimum time between `update_data` calls
    fn update_interval(&self) -> Duration {
        GAUGE_UPDATE_INTERVAL
    }

    /// Screen this component lives on; `None` means always updated
    fn screen(&self) -> Option<ViewId> {
        None
    }

    /// Flash capability, if the component blinks
    fn as_flash_receiver(&mut self) -> Option<&mut dyn FlashReceiver> {
        None
    }

    /// Text rendition of the current display state
    fn text(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Type-erased component for dynamic dispatch
pub type BoxedComponent = Box<dyn ViewComponent>;
