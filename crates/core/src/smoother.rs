//! Per-key exponential moving average for display values

use crate::error::ConfigError;
use std::collections::HashMap;

/// Exponential moving average cache keyed by an arbitrary string.
///
/// `alpha` is the weight of the newest sample. The first sample for a key
/// seeds the average. Non-finite samples pass through unchanged and leave the
/// cached average alone, so a dropout does not poison the display afterwards.
#[derive(Debug, Clone)]
pub struct Smoother {
    alpha: f64,
    values: HashMap<String, f64>,
}

impl Smoother {
    pub fn new(alpha: f64) -> Result<Self, ConfigError> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(ConfigError::InvalidSmoothing(alpha));
        }
        Ok(Self {
            alpha,
            values: HashMap::new(),
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Feed a raw sample and get the smoothed value back
    pub fn smooth(&mut self, key: &str, raw: f64) -> f64 {
        if !raw.is_finite() {
            return raw;
        }
        let smoothed = match self.values.get(key) {
            Some(previous) => previous + self.alpha * (raw - previous),
            None => raw,
        };
        self.values.insert(key.to_string(), smoothed);
        smoothed
    }

    /// Last smoothed value for a key
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn reset(&mut self, key: &str) {
        self.values.remove(key);
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
