//! rcs-panel: reactor coolant system control panel simulator
//!
//! This library wires the alarm engine and screen registry from
//! `rcs-panel-core` to the reference components in `rcs-panel-displayers`:
//! - Panel configuration (JSON, per-user config directory)
//! - The `ControlPanel` tick driver and its default layout
//! - A simulated plant standing in for live instrumentation
//! - Operator console commands

pub mod commands;
pub mod config;
pub mod layout;
pub mod panel;
pub mod sources;

// Re-export commonly used types
pub use commands::{CommandError, OperatorCommand};
pub use config::PanelConfig;
pub use panel::{ControlPanel, TickSummary};
pub use sources::SimulatedPlant;
