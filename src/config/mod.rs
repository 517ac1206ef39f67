//! Configuration management

mod settings;

pub use settings::PanelConfig;
