//! Control panel driver
//!
//! Owns the alarm engine, the screen registry and every view component, and
//! runs one pass per tick: evaluate alarms, fan the flash phase out to
//! components that blink, then update each due component on a visible screen.
//! A component that errors or panics is logged and skipped; the pass goes on.

use crate::config::PanelConfig;
use crate::layout;
use anyhow::Result;
use log::{error, info, trace};
use rcs_panel_core::{
    ActivationTrigger, AlarmEngine, BoxedComponent, Composition, EvaluationReport, PanelContext,
    PanelScreen, ScreenRegistry, Throttle, Tick, ValueSource, ViewComponent, ViewId,
};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

/// Tracks update timing for a component
struct ComponentSlot {
    component: BoxedComponent,
    throttle: Throttle,
    failures: u64,
}

/// What one tick did
#[derive(Debug, Clone)]
pub struct TickSummary {
    pub tick: Tick,
    pub report: EvaluationReport,
    /// Components whose `update_data` ran and succeeded
    pub updated: usize,
    /// Components whose `update_data` failed or panicked
    pub failed: usize,
    /// Components on hidden screens or not due yet
    pub skipped: usize,
}

pub struct ControlPanel {
    engine: AlarmEngine,
    screens: ScreenRegistry,
    composition: Composition,
    slots: Vec<ComponentSlot>,
    tick_index: u64,
    last_tick: Option<Duration>,
}

impl ControlPanel {
    pub fn new(engine: AlarmEngine, screens: ScreenRegistry, composition: Composition) -> Self {
        Self {
            engine,
            screens,
            composition,
            slots: Vec::new(),
            tick_index: 0,
            last_tick: None,
        }
    }

    /// Build the whole panel: engine, screens (both registration phases) and
    /// the default component layout
    pub fn from_config(config: &PanelConfig) -> Result<Self> {
        config.validate()?;

        let engine = AlarmEngine::new(config.engine_config(), config.threshold_table()?)?
            .with_conditions(config.conditions.iter().cloned());

        let mut composition = Composition::new();
        for descriptor in &config.screens {
            composition.add(PanelScreen::shared(descriptor.clone()));
        }

        let mut screens = ScreenRegistry::new(config.registry_config());
        screens.activate(&composition);
        screens.discover_late_registrations(&composition);

        let mut panel = Self::new(engine, screens, composition);
        for component in layout::default_components(config)? {
            panel.add_component(component);
        }
        info!(
            "Panel ready: {} screen(s), {} condition(s), {} component(s)",
            panel.screens.len(),
            panel.engine.conditions().len(),
            panel.slots.len()
        );
        Ok(panel)
    }

    pub fn add_component(&mut self, component: BoxedComponent) {
        let throttle = Throttle::new(component.update_interval());
        self.slots.push(ComponentSlot {
            component,
            throttle,
            failures: 0,
        });
    }

    /// Run every component's `initialize`; returns how many failed
    pub fn initialize(&mut self, source: &dyn ValueSource, now: Duration) -> usize {
        let ctx = PanelContext::new(
            &self.engine,
            &self.screens,
            source,
            Tick::at(self.tick_index, now, self.last_tick),
        );
        let mut failed = 0;
        for slot in &mut self.slots {
            let id = slot.component.id().to_string();
            let outcome = catch_unwind(AssertUnwindSafe(|| slot.component.initialize(&ctx)));
            if !record_outcome(&id, "initializing", outcome) {
                slot.failures += 1;
                failed += 1;
            }
        }
        failed
    }

    /// One pass of the panel at time `now`
    pub fn tick(&mut self, source: &dyn ValueSource, now: Duration) -> TickSummary {
        let start = Instant::now();
        let tick = Tick::at(self.tick_index, now, self.last_tick);
        self.tick_index += 1;
        self.last_tick = Some(now);

        let report = self.engine.evaluate(&tick, source);

        if let Some(phase) = report.flash {
            for slot in &mut self.slots {
                let id = slot.component.id().to_string();
                let outcome = catch_unwind(AssertUnwindSafe(|| {
                    if let Some(receiver) = slot.component.as_flash_receiver() {
                        receiver.on_flash(phase);
                    }
                    Ok(())
                }));
                if !record_outcome(&id, "flashing", outcome) {
                    slot.failures += 1;
                }
            }
        }

        let mut summary = TickSummary {
            tick,
            report,
            updated: 0,
            failed: 0,
            skipped: 0,
        };

        let ctx = PanelContext::new(&self.engine, &self.screens, source, tick);
        for slot in &mut self.slots {
            let on_visible_screen = slot
                .component
                .screen()
                .map_or(true, |screen| self.screens.is_visible(screen));
            if !on_visible_screen {
                summary.skipped += 1;
                continue;
            }
            if !slot.throttle.ready(now) {
                trace!("Component {} not due yet", slot.component.id());
                summary.skipped += 1;
                continue;
            }

            let id = slot.component.id().to_string();
            let outcome = catch_unwind(AssertUnwindSafe(|| slot.component.update_data(&ctx)));
            if record_outcome(&id, "updating", outcome) {
                summary.updated += 1;
            } else {
                slot.failures += 1;
                summary.failed += 1;
            }
        }

        trace!(
            "Tick {} took {:?} ({} updated, {} skipped, {} failed)",
            tick.index,
            start.elapsed(),
            summary.updated,
            summary.skipped,
            summary.failed
        );
        summary
    }

    /// Operator acknowledge; returns how many alarms were acknowledged
    pub fn acknowledge(&mut self) -> usize {
        self.engine.acknowledge()
    }

    pub fn acknowledge_condition(&mut self, id: &str) -> bool {
        self.engine.acknowledge_condition(id)
    }

    pub fn silence(&mut self) {
        self.engine.silence();
    }

    /// Deliver an activation trigger to the screen registry
    pub fn activate(&mut self, trigger: &ActivationTrigger) -> bool {
        self.screens.route(trigger)
    }

    pub fn show(&mut self, id: ViewId) -> bool {
        self.screens.show(id)
    }

    pub fn clear_log(&mut self) {
        self.engine.clear();
    }

    pub fn engine(&self) -> &AlarmEngine {
        &self.engine
    }

    /// Mutable engine access for wiring observers and the audible cue
    pub fn engine_mut(&mut self) -> &mut AlarmEngine {
        &mut self.engine
    }

    pub fn screens(&self) -> &ScreenRegistry {
        &self.screens
    }

    pub fn screens_mut(&mut self) -> &mut ScreenRegistry {
        &mut self.screens
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    pub fn component(&self, id: &str) -> Option<&dyn ViewComponent> {
        self.slots
            .iter()
            .find(|slot| slot.component.id() == id)
            .map(|slot| slot.component.as_ref())
    }

    pub fn component_count(&self) -> usize {
        self.slots.len()
    }

    /// Failures recorded for a component since startup
    pub fn failure_count(&self, id: &str) -> u64 {
        self.slots
            .iter()
            .find(|slot| slot.component.id() == id)
            .map_or(0, |slot| slot.failures)
    }

    /// Text of every component that is currently on screen
    pub fn render_active(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(name) = self.screens.active_name() {
            lines.push(format!("== {} ==", name));
        }
        for slot in &self.slots {
            let on_screen = slot
                .component
                .screen()
                .map_or(true, |screen| self.screens.is_visible(screen));
            if on_screen {
                lines.extend(slot.component.text());
            }
        }
        lines
    }
}

/// Log a component failure; returns true on success
fn record_outcome(
    id: &str,
    action: &str,
    outcome: std::thread::Result<Result<()>>,
) -> bool {
    match outcome {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            error!("Error {} component {}: {:#}", action, id, e);
            false
        }
        Err(payload) => {
            error!("Component {} panicked while {}: {}", id, action, panic_message(&*payload));
            false
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
