//! Pixel ↔ centimeter conversion at a given DPI.
//!
//! One inch is 2.54 cm, so `px = cm * dpi / 2.54`. Both directions are total:
//! non-finite and negative inputs collapse to the smallest representable
//! size instead of producing NaN or zero-sized images.
//!
//! | Function | Rounding | Floor |
//! |---|---|---|
//! | [`cm_to_px`] | nearest integer | 1 px |
//! | [`px_to_cm`] | 2 decimals | 0.01 cm |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const CM_PER_INCH: f64 = 2.54;

/// DPI used whenever the user-supplied value is missing or unusable.
pub const DEFAULT_DPI: f64 = 96.0;

/// Display unit for the width/height fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Px,
    Cm,
}

impl Unit {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Px => "px",
            Self::Cm => "cm",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "px" => Ok(Self::Px),
            "cm" => Ok(Self::Cm),
            other => Err(format!("unknown unit '{other}' (expected px or cm)")),
        }
    }
}

/// Dots per inch, always finite and positive.
///
/// Construction substitutes [`DEFAULT_DPI`] for zero, negative or non-finite
/// values, so converters never divide by zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Dpi(f64);

impl Dpi {
    pub fn new(value: f64) -> Self {
        if value.is_finite() && value > 0.0 {
            Self(value)
        } else {
            tracing::warn!(value, "unusable DPI, falling back to {DEFAULT_DPI}");
            Self(DEFAULT_DPI)
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Dpi {
    fn default() -> Self {
        Self(DEFAULT_DPI)
    }
}

impl From<f64> for Dpi {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Dpi> for f64 {
    fn from(dpi: Dpi) -> Self {
        dpi.0
    }
}

impl fmt::Display for Dpi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Map NaN, infinities and non-positive values to 0.
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Convert centimeters to whole pixels, never less than 1.
pub fn cm_to_px(value_cm: f64, dpi: Dpi) -> u32 {
    let px = (sanitize(value_cm) * dpi.value() / CM_PER_INCH).round();
    if px >= u32::MAX as f64 {
        u32::MAX
    } else {
        (px as u32).max(1)
    }
}

/// Convert pixels to centimeters, rounded to 2 decimals, never less than 0.01.
pub fn px_to_cm(value_px: f64, dpi: Dpi) -> f64 {
    let cm = round2(sanitize(value_px) * CM_PER_INCH / dpi.value());
    cm.max(0.01)
}

/// Pixels covered by one centimeter at this DPI.
pub fn px_per_cm(dpi: Dpi) -> u32 {
    cm_to_px(1.0, dpi)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
