//! Simulated plant for demonstration and tests
//!
//! Each instrument is a channel with a manual value or an oscillation, plus a
//! little seeded noise. Values are recomputed once per `update` so reads
//! within a tick are consistent.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rcs_panel_core::{ConditionKind, SourceMetadata, ValueSource};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Channel value generation mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WaveMode {
    /// Manual static value
    #[default]
    Manual,
    /// Sine wave oscillation
    SineWave,
    /// Sawtooth wave (linear ramp)
    Sawtooth,
    /// Triangle wave
    Triangle,
    /// Square wave
    Square,
}

/// Configuration for one simulated instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    #[serde(default)]
    pub mode: WaveMode,
    /// Value used in Manual mode
    pub manual_value: f64,
    pub min_value: f64,
    pub max_value: f64,
    /// Wave period in seconds (for oscillation modes)
    #[serde(default = "default_period")]
    pub period: f64,
    /// Peak amplitude of uniform noise added to every sample
    #[serde(default)]
    pub noise: f64,
}

fn default_period() -> f64 {
    5.0
}

impl ChannelConfig {
    pub fn manual(value: f64) -> Self {
        Self {
            mode: WaveMode::Manual,
            manual_value: value,
            min_value: value,
            max_value: value,
            period: default_period(),
            noise: 0.0,
        }
    }

    pub fn wave(mode: WaveMode, min_value: f64, max_value: f64, period: f64) -> Self {
        Self {
            mode,
            manual_value: min_value,
            min_value,
            max_value,
            period,
            noise: 0.0,
        }
    }

    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise.abs();
        self
    }

    /// Noise-free value at `elapsed` seconds
    fn calculate_value(&self, elapsed: f64) -> f64 {
        let range = self.max_value - self.min_value;
        let period = if self.period > 0.0 { self.period } else { default_period() };

        match self.mode {
            WaveMode::Manual => self.manual_value,
            WaveMode::SineWave => {
                let phase = (elapsed / period) * std::f64::consts::TAU;
                let normalized = (phase.sin() + 1.0) / 2.0; // 0.0 to 1.0
                self.min_value + normalized * range
            }
            WaveMode::Sawtooth => {
                let normalized = (elapsed / period).fract(); // 0.0 to 1.0
                self.min_value + normalized * range
            }
            WaveMode::Triangle => {
                let phase = (elapsed / period).fract() * 2.0; // 0.0 to 2.0
                let normalized = if phase <= 1.0 { phase } else { 2.0 - phase };
                self.min_value + normalized * range
            }
            WaveMode::Square => {
                let phase = (elapsed / period).fract();
                if phase < 0.5 {
                    self.min_value
                } else {
                    self.max_value
                }
            }
        }
    }
}

/// `ValueSource` backed by waveform channels
pub struct SimulatedPlant {
    metadata: SourceMetadata,
    channels: HashMap<ConditionKind, ChannelConfig>,
    values: HashMap<ConditionKind, f64>,
    tripped: bool,
    running_pumps: Option<u32>,
    rng: StdRng,
}

impl SimulatedPlant {
    /// Plant with no channels; every kind reads NaN until one is added
    pub fn new(seed: u64) -> Self {
        Self {
            metadata: SourceMetadata {
                id: "simulated".to_string(),
                name: "Simulated Plant".to_string(),
                description: "Waveform channels standing in for the plant model".to_string(),
                available_kinds: Vec::new(),
            },
            channels: HashMap::new(),
            values: HashMap::new(),
            tripped: false,
            running_pumps: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Plant at full power with every reading inside its normal band
    pub fn nominal(seed: u64) -> Self {
        use ConditionKind::*;
        let mut plant = Self::new(seed)
            .with_channel(Power, ChannelConfig::manual(100.0).with_noise(0.3))
            .with_channel(HotLegTemperature, ChannelConfig::manual(545.0).with_noise(0.5))
            .with_channel(ColdLegTemperature, ChannelConfig::manual(520.0).with_noise(0.5))
            .with_channel(AverageTemperature, ChannelConfig::manual(565.0).with_noise(0.5))
            .with_channel(
                PressurizerPressure,
                ChannelConfig::wave(WaveMode::SineWave, 2215.0, 2255.0, 30.0).with_noise(2.0),
            )
            .with_channel(
                PressurizerLevel,
                ChannelConfig::wave(WaveMode::Triangle, 45.0, 55.0, 60.0),
            )
            .with_channel(CoolantFlow, ChannelConfig::manual(100.0).with_noise(0.5))
            .with_channel(SteamGeneratorLevel, ChannelConfig::manual(50.0).with_noise(0.5))
            .with_channel(ContainmentPressure, ChannelConfig::manual(0.3).with_noise(0.05))
            .with_channel(BoronConcentration, ChannelConfig::manual(1200.0))
            .with_channel(Period, ChannelConfig::manual(0.0).with_noise(0.02));
        plant.running_pumps = Some(4);
        plant.update(Duration::ZERO);
        plant
    }

    pub fn with_channel(mut self, kind: ConditionKind, config: ChannelConfig) -> Self {
        self.set_channel(kind, config);
        self
    }

    pub fn set_channel(&mut self, kind: ConditionKind, config: ChannelConfig) {
        self.channels.insert(kind, config);
        if !self.metadata.available_kinds.contains(&kind) {
            self.metadata.available_kinds.push(kind);
            self.metadata.available_kinds.sort();
        }
    }

    /// Pin a channel to a manual value, effective immediately
    pub fn set_manual(&mut self, kind: ConditionKind, value: f64) {
        let channel = self
            .channels
            .entry(kind)
            .or_insert_with(|| ChannelConfig::manual(value));
        channel.mode = WaveMode::Manual;
        channel.manual_value = value;
        channel.noise = 0.0;
        if !self.metadata.available_kinds.contains(&kind) {
            self.metadata.available_kinds.push(kind);
            self.metadata.available_kinds.sort();
        }
        self.values.insert(kind, value);
    }

    /// Current readings, one per configured channel
    pub fn values(&self) -> impl Iterator<Item = (ConditionKind, f64)> + '_ {
        self.values.iter().map(|(kind, value)| (*kind, *value))
    }

    pub fn channel(&self, kind: ConditionKind) -> Option<&ChannelConfig> {
        self.channels.get(&kind)
    }

    pub fn set_tripped(&mut self, tripped: bool) {
        self.tripped = tripped;
    }

    /// Flip the trip signal; returns the new state
    pub fn toggle_trip(&mut self) -> bool {
        self.tripped = !self.tripped;
        self.tripped
    }

    pub fn set_running_pumps(&mut self, count: Option<u32>) {
        self.running_pumps = count;
    }

    /// Recompute every channel for time `now`
    pub fn update(&mut self, now: Duration) {
        let elapsed = now.as_secs_f64();
        for (kind, channel) in &self.channels {
            let mut value = channel.calculate_value(elapsed);
            if channel.noise > 0.0 {
                value += self.rng.gen_range(-channel.noise..=channel.noise);
            }
            self.values.insert(*kind, value);
        }
    }
}

impl ValueSource for SimulatedPlant {
    fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }

    fn value(&self, kind: ConditionKind) -> f64 {
        self.values.get(&kind).copied().unwrap_or(f64::NAN)
    }

    fn is_tripped(&self) -> bool {
        self.tripped
    }

    fn running_rcp_count(&self) -> Option<u32> {
        self.running_pumps
    }
}
