//! Color types used by the panel's view components.
//!
//! Components never draw; they hand a `Color` to the host renderer together
//! with their text, so the palette lives here next to `Severity`.

use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// RGBA color with alpha channel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: a as f64 / 255.0,
        }
    }

    pub fn to_rgba8(&self) -> (u8, u8, u8, u8) {
        (
            (self.r.clamp(0.0, 1.0) * 255.0) as u8,
            (self.g.clamp(0.0, 1.0) * 255.0) as u8,
            (self.b.clamp(0.0, 1.0) * 255.0) as u8,
            (self.a.clamp(0.0, 1.0) * 255.0) as u8,
        )
    }

    /// Zone color for a severity (green, yellow, red, magenta)
    pub fn for_severity(severity: Severity) -> Self {
        match severity {
            Severity::Normal => Color::new(0.2, 0.7, 0.3, 1.0),
            Severity::Warning => Color::new(0.9, 0.8, 0.2, 1.0),
            Severity::Alarm => Color::new(0.9, 0.2, 0.2, 1.0),
            Severity::Trip => Color::new(0.9, 0.2, 0.9, 1.0),
        }
    }

    /// Same hue scaled toward black, used for unlit annunciator tiles
    pub fn dimmed(&self, factor: f64) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        Self::new(self.r * factor, self.g * factor, self.b * factor, self.a)
    }

    /// Hex string (`#rrggbb`) for text hosts
    pub fn to_hex(&self) -> String {
        let (r, g, b, _) = self.to_rgba8();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }
}

/// Color stop for gradients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColorStop {
    pub position: f64, // 0.0 to 1.0
    pub color: Color,
}

impl ColorStop {
    pub fn new(position: f64, color: Color) -> Self {
        Self { position, color }
    }
}
