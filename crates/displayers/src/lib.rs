//! Reference view components for rcs-panel.
//!
//! Each component pulls what it needs from a `PanelContext` when the driver
//! calls `update_data`, keeps its own display state, and exposes it as a
//! color plus text lines for whatever host renders the panel.

pub mod alarm_list;
pub mod annunciator;
pub mod gauge;
pub mod indicator;
pub mod screen_tabs;

pub use alarm_list::{AlarmList, AlarmListConfig};
pub use annunciator::{AnnunciatorTile, TileState};
pub use gauge::{Gauge, GaugeConfig, GaugeReading};
pub use indicator::{interpolate_gradient, Indicator, IndicatorConfig};
pub use screen_tabs::ScreenTabs;

#[cfg(test)]
pub(crate) mod test_support {
    use rcs_panel_core::{
        AlarmEngine, AlarmEngineConfig, ConditionSpec, PanelContext, ScreenRegistry,
        StaticValueSource, ThresholdTable, Tick,
    };
    use std::time::Duration;

    /// Engine, registry and source wired together for component tests
    pub struct Fixture {
        pub engine: AlarmEngine,
        pub screens: ScreenRegistry,
        pub source: StaticValueSource,
        pub index: u64,
        pub now: Duration,
    }

    impl Fixture {
        pub fn new(conditions: Vec<ConditionSpec>) -> Self {
            let engine = AlarmEngine::new(AlarmEngineConfig::default(), ThresholdTable::builtin())
                .unwrap()
                .with_conditions(conditions);
            Self {
                engine,
                screens: ScreenRegistry::default(),
                source: StaticValueSource::new(),
                index: 0,
                now: Duration::ZERO,
            }
        }

        /// Evaluate the engine at the next 100ms tick
        pub fn evaluate(&mut self) -> Tick {
            let previous = self.index.checked_sub(1).map(|_| self.now - Duration::from_millis(100));
            let tick = Tick::at(self.index, self.now, previous);
            self.engine.evaluate(&tick, &self.source);
            self.index += 1;
            self.now += Duration::from_millis(100);
            tick
        }

        pub fn context(&self, tick: Tick) -> PanelContext<'_> {
            PanelContext::new(&self.engine, &self.screens, &self.source, tick)
        }
    }
}
