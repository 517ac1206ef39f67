//! Panel configuration (JSON on disk)

use anyhow::{Context, Result};
use rcs_panel_core::clock::period_of;
use rcs_panel_core::constants::{
    DEFAULT_FLASH_RATE_HZ, DEFAULT_MAX_LOG_ENTRIES, DEFAULT_SMOOTHING_ALPHA,
    DEFAULT_TICK_INTERVAL, DIAGRAM_UPDATE_INTERVAL, GAUGE_UPDATE_INTERVAL,
};
use rcs_panel_core::{
    ActivationTrigger, AlarmEngineConfig, AudibleCueConfig, ConditionKind, ConditionSpec,
    ConfigError, RegistryConfig, Smoother, ThresholdTable, TripPolicy, ViewDescriptor,
};
use rcs_panel_types::ThresholdEntry;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Everything the panel reads at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Version of the config format
    #[serde(default = "default_version")]
    pub version: u32,

    /// Evaluation ticks per second
    #[serde(default = "default_tick_rate")]
    pub tick_rate_hz: f64,

    /// Annunciator blink rate
    #[serde(default = "default_flash_rate")]
    pub flash_rate_hz: f64,

    #[serde(default = "default_max_log_entries")]
    pub max_log_entries: usize,

    /// At most one screen visible
    #[serde(default = "default_true")]
    pub exclusive: bool,

    /// Whether the active screen may be toggled away, leaving none
    #[serde(default)]
    pub allow_none: bool,

    /// EMA factor for gauges
    #[serde(default = "default_smoothing_alpha")]
    pub smoothing_alpha: f64,

    #[serde(default = "default_gauge_interval_ms")]
    pub gauge_interval_ms: u64,

    #[serde(default = "default_diagram_interval_ms")]
    pub diagram_interval_ms: u64,

    #[serde(default)]
    pub trip_policy: TripPolicy,

    #[serde(default)]
    pub audible: AudibleCueConfig,

    /// Rows replacing built-in threshold rows of the same kind
    #[serde(default)]
    pub threshold_overrides: Vec<ThresholdEntry>,

    #[serde(default = "default_screens")]
    pub screens: Vec<ViewDescriptor>,

    /// Conditions tracked by the alarm engine
    #[serde(default = "default_conditions")]
    pub conditions: Vec<ConditionSpec>,
}

fn default_version() -> u32 {
    1
}

fn default_tick_rate() -> f64 {
    10.0
}

fn default_flash_rate() -> f64 {
    DEFAULT_FLASH_RATE_HZ
}

fn default_max_log_entries() -> usize {
    DEFAULT_MAX_LOG_ENTRIES
}

fn default_true() -> bool {
    true
}

fn default_smoothing_alpha() -> f64 {
    DEFAULT_SMOOTHING_ALPHA
}

fn default_gauge_interval_ms() -> u64 {
    GAUGE_UPDATE_INTERVAL.as_millis() as u64
}

fn default_diagram_interval_ms() -> u64 {
    DIAGRAM_UPDATE_INTERVAL.as_millis() as u64
}

fn default_screens() -> Vec<ViewDescriptor> {
    let key = |k: &str| ActivationTrigger::Key(k.to_string());
    vec![
        ViewDescriptor::new(1, "Overview", key("1")).visible_at_start(),
        ViewDescriptor::new(2, "RCS Primary Loop", key("2")),
        ViewDescriptor::new(3, "Pressurizer", key("3")),
        ViewDescriptor::new(4, "Steam Generators", key("4")),
        ViewDescriptor::new(5, "Alarm Summary", key("5")),
    ]
}

fn default_conditions() -> Vec<ConditionSpec> {
    use ConditionKind::*;
    vec![
        ConditionSpec::analog("power_high", "REACTOR POWER HIGH", Power),
        ConditionSpec::analog("startup_rate_high", "STARTUP RATE HIGH", Period),
        ConditionSpec::analog("thot_high", "T-HOT HIGH", HotLegTemperature),
        ConditionSpec::analog("tcold_high", "T-COLD HIGH", ColdLegTemperature),
        ConditionSpec::analog("tavg_deviation", "T-AVG DEVIATION", AverageTemperature),
        ConditionSpec::analog("pzr_pressure", "PZR PRESSURE", PressurizerPressure),
        ConditionSpec::analog("pzr_level", "PZR LEVEL", PressurizerLevel),
        ConditionSpec::analog("rcs_flow_low", "RCS FLOW LOW", CoolantFlow),
        ConditionSpec::analog("sg_level", "SG LEVEL", SteamGeneratorLevel),
        ConditionSpec::analog("ctmt_pressure_high", "CTMT PRESSURE HIGH", ContainmentPressure),
        ConditionSpec::running_pumps("rcp_trip", "RCP TRIP", 4),
        ConditionSpec::trip_status("reactor_tripped", "REACTOR TRIPPED"),
    ]
}

impl PanelConfig {
    /// Load from an explicit path, else the user config file, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }

        let config_path = Self::config_path()?;
        if !config_path.exists() {
            log::info!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    /// Save configuration to the user config file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to_path(&config_path)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("org", "rcs-panel", "rcs-panel")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.json"))
    }

    /// Load configuration from a specific file path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to a specific file path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Reject values the core cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if period_of(self.tick_rate_hz).is_none() {
            return Err(ConfigError::InvalidTickRate(self.tick_rate_hz));
        }
        Smoother::new(self.smoothing_alpha)?;
        self.engine_config().validate()?;
        self.threshold_table()?;
        Ok(())
    }

    pub fn engine_config(&self) -> AlarmEngineConfig {
        AlarmEngineConfig {
            flash_rate_hz: self.flash_rate_hz,
            max_log_entries: self.max_log_entries,
            trip_policy: self.trip_policy,
            audible: self.audible.clone(),
        }
    }

    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            exclusive: self.exclusive,
            allow_none: self.allow_none,
        }
    }

    /// Built-in table with the configured overrides applied
    pub fn threshold_table(&self) -> Result<ThresholdTable, ConfigError> {
        ThresholdTable::builtin().with_overrides(self.threshold_overrides.iter().cloned())
    }

    /// Tick period; an unusable rate falls back to 10 Hz
    pub fn tick_interval(&self) -> Duration {
        period_of(self.tick_rate_hz).unwrap_or(DEFAULT_TICK_INTERVAL)
    }

    pub fn gauge_interval(&self) -> Duration {
        Duration::from_millis(self.gauge_interval_ms)
    }

    pub fn diagram_interval(&self) -> Duration {
        Duration::from_millis(self.diagram_interval_ms)
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            tick_rate_hz: default_tick_rate(),
            flash_rate_hz: default_flash_rate(),
            max_log_entries: default_max_log_entries(),
            exclusive: true,
            allow_none: false,
            smoothing_alpha: default_smoothing_alpha(),
            gauge_interval_ms: default_gauge_interval_ms(),
            diagram_interval_ms: default_diagram_interval_ms(),
            trip_policy: TripPolicy::default(),
            audible: AudibleCueConfig::default(),
            threshold_overrides: Vec::new(),
            screens: default_screens(),
            conditions: default_conditions(),
        }
    }
}
