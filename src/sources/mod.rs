//! Value sources for the panel binary
//!
//! There is no plant model here; `SimulatedPlant` stands in for one
//! with waveform channels so the panel can be exercised end to end.

mod simulated;

pub use simulated::{ChannelConfig, SimulatedPlant, WaveMode};
