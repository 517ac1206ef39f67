//! rcs-panel-core: Alarm annunciation and screen exclusivity for rcs-panel.
//!
//! This crate contains the two stateful hubs of the panel, the `AlarmEngine`
//! and the `ScreenRegistry`, together with the pieces they are built from
//! (clock, threshold table, smoother, alarm log) and the `ViewComponent`
//! contract every display unit implements. Everything here is
//! single-threaded and synchronous; the host drives it one tick at a time.

pub mod alarm_engine;
pub mod alarm_log;
pub mod clock;
pub mod constants;
pub mod error;
pub mod screen_registry;
pub mod smoother;
pub mod thresholds;
pub mod value_source;
pub mod view_component;

pub use alarm_engine::{
    AlarmEngine, AlarmEngineConfig, AlarmObserver, AudibleCue, ConditionClass, ConditionSource,
    ConditionSpec, ConditionState, EvaluationReport, TripPolicy,
};
pub use alarm_log::AlarmLog;
pub use clock::{Clock, ManualClock, SystemClock, Throttle, Tick, Ticker};
pub use error::ConfigError;
pub use screen_registry::{
    ChangeCallback, Composition, PanelScreen, RegistryConfig, Screen, ScreenRegistry, SharedScreen,
};
pub use smoother::Smoother;
pub use thresholds::ThresholdTable;
pub use value_source::{SourceMetadata, StaticValueSource, ValueSource};
pub use view_component::{BoxedComponent, FlashReceiver, PanelContext, ViewComponent};

// Re-export types used in trait signatures for convenience
pub use rcs_panel_types::{
    ActivationTrigger, AlarmRecord, AudibleCueConfig, ConditionKind, Severity, ViewDescriptor,
    ViewId,
};
