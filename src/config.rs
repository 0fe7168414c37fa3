//! Tool configuration.
//!
//! Handles loading, validating, and merging `simple-resize.toml`. Stock
//! defaults are overridden by the user's file, and command-line flags
//! override both.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [defaults]
//! unit = "px"               # Display unit for width/height: "px" or "cm"
//! dpi = 96                  # Dots per inch used for cm <-> px
//! keep_ratio = true         # Aspect lock on by default
//! max_default_width = 1600  # Width cap for the initial target size
//! max_output_pixels = 100000000  # Largest width*height an export may have
//!
//! [export]
//! format = "png"            # "png", "jpeg" or "webp"
//! quality = 0.92            # Lossy quality in (0, 1]; ignored for PNG
//! filter = "lanczos3"       # nearest, triangle, catmullrom, gaussian, lanczos3
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [defaults]
//! unit = "cm"
//! dpi = 300
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Filter, OutputFormat, Quality};
use crate::export::DEFAULT_MAX_OUTPUT_PIXELS;
use crate::session::{DEFAULT_MAX_WIDTH, SessionDefaults};
use crate::units::{DEFAULT_DPI, Dpi, Unit};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "simple-resize.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `simple-resize.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    /// Initial state of the size controls.
    pub defaults: DefaultsConfig,
    /// Output encoding settings.
    pub export: ExportSettings,
}

impl ResizeConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.defaults.dpi.is_finite() && self.defaults.dpi > 0.0) {
            return Err(ConfigError::Validation(
                "defaults.dpi must be greater than 0".into(),
            ));
        }
        if self.defaults.max_default_width == 0 {
            return Err(ConfigError::Validation(
                "defaults.max_default_width must be at least 1".into(),
            ));
        }
        if self.defaults.max_output_pixels == 0 {
            return Err(ConfigError::Validation(
                "defaults.max_output_pixels must be at least 1".into(),
            ));
        }
        if !(self.export.quality > 0.0 && self.export.quality <= 1.0) {
            return Err(ConfigError::Validation(
                "export.quality must be in (0, 1]".into(),
            ));
        }
        Ok(())
    }

    /// Session preferences derived from `[defaults]`.
    pub fn session_defaults(&self) -> SessionDefaults {
        SessionDefaults {
            unit: self.defaults.unit,
            dpi: Dpi::new(self.defaults.dpi),
            keep_ratio: self.defaults.keep_ratio,
            max_default_width: self.defaults.max_default_width,
            max_output_pixels: self.defaults.max_output_pixels,
        }
    }
}

/// Initial state of the size controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    /// Display unit for the width/height fields.
    pub unit: Unit,
    /// Dots per inch used to convert centimeters to pixels.
    pub dpi: f64,
    /// Whether the aspect lock starts enabled.
    pub keep_ratio: bool,
    /// Width cap applied to the target size when an image is loaded.
    pub max_default_width: u32,
    /// Exports larger than this many pixels in total are refused.
    pub max_output_pixels: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            unit: Unit::Px,
            dpi: DEFAULT_DPI,
            keep_ratio: true,
            max_default_width: DEFAULT_MAX_WIDTH,
            max_output_pixels: DEFAULT_MAX_OUTPUT_PIXELS,
        }
    }
}

/// Output encoding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportSettings {
    pub format: OutputFormat,
    /// Lossy quality in (0, 1]. PNG ignores it.
    pub quality: f32,
    /// Resampling kernel.
    pub filter: Filter,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Png,
            quality: Quality::DEFAULT,
            filter: Filter::Lanczos3,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ResizeConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ResizeConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ResizeConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result. A missing file yields the stock defaults.
pub fn load_config(path: &Path) -> Result<ResizeConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    if overlay.is_some() {
        tracing::debug!(path = %path.display(), "loaded config file");
    }
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `simple-resize.toml` with all keys and
/// explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# simple-resize configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Command-line flags override anything set here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Size controls
# ---------------------------------------------------------------------------
[defaults]
# Display unit for width/height: "px" or "cm".
unit = "px"

# Dots per inch used to convert centimeters to pixels.
# 96 matches most screens; use 300 for print.
dpi = 96.0

# Keep the source aspect ratio when only one side is given.
keep_ratio = true

# When an image is loaded, its width is capped at this many pixels for the
# initial target size. Height follows the aspect ratio.
max_default_width = 1600

# Largest total pixel count (width * height) an export may have. Larger
# targets are refused before any memory is allocated for them.
max_output_pixels = 100000000

# ---------------------------------------------------------------------------
# Export
# ---------------------------------------------------------------------------
[export]
# Output format: "png" (lossless), "jpeg" or "webp" (lossy).
format = "png"

# Lossy quality in (0, 1]. Ignored for PNG.
quality = 0.92

# Resampling filter: "nearest", "triangle", "catmullrom", "gaussian", "lanczos3".
filter = "lanczos3"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = ResizeConfig::default();
        assert_eq!(config.defaults.unit, Unit::Px);
        assert_eq!(config.defaults.dpi, 96.0);
        assert!(config.defaults.keep_ratio);
        assert_eq!(config.defaults.max_default_width, 1600);
        assert_eq!(config.defaults.max_output_pixels, 100_000_000);
        assert_eq!(config.export.format, OutputFormat::Png);
        assert_eq!(config.export.quality, 0.92);
        assert_eq!(config.export.filter, Filter::Lanczos3);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[defaults]
unit = "cm"
dpi = 300
"#;
        let config: ResizeConfig = toml::from_str(toml).unwrap();
        // Overridden values
        assert_eq!(config.defaults.unit, Unit::Cm);
        assert_eq!(config.defaults.dpi, 300.0);
        // Defaults preserved
        assert!(config.defaults.keep_ratio);
        assert_eq!(config.export.format, OutputFormat::Png);
    }

    #[test]
    fn parse_export_settings() {
        let toml = r#"
[export]
format = "webp"
quality = 0.7
filter = "triangle"
"#;
        let config: ResizeConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.export.format, OutputFormat::Webp);
        assert_eq!(config.export.quality, 0.7);
        assert_eq!(config.export.filter, Filter::Triangle);
    }

    #[test]
    fn session_defaults_follow_config() {
        let mut config = ResizeConfig::default();
        config.defaults.unit = Unit::Cm;
        config.defaults.dpi = 300.0;
        config.defaults.keep_ratio = false;
        config.defaults.max_default_width = 800;
        config.defaults.max_output_pixels = 4_000_000;

        let defaults = config.session_defaults();
        assert_eq!(defaults.unit, Unit::Cm);
        assert_eq!(defaults.dpi.value(), 300.0);
        assert!(!defaults.keep_ratio);
        assert_eq!(defaults.max_default_width, 800);
        assert_eq!(defaults.max_output_pixels, 4_000_000);
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert_eq!(config, ResizeConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(
            &path,
            r#"
[export]
format = "jpeg"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.export.format, OutputFormat::Jpeg);
        // Unspecified values should be defaults
        assert_eq!(config.export.quality, 0.92);
        assert_eq!(config.defaults.dpi, 96.0);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "this is not valid toml [[[").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"dpi = 96.0"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"dpi = 300.0"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("dpi").unwrap().as_float(), Some(300.0));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[export]
format = "png"
quality = 0.92
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[export]
quality = 0.5
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let export = merged.get("export").unwrap();
        assert_eq!(export.get("quality").unwrap().as_float(), Some(0.5));
        // format preserved from base
        assert_eq!(export.get("format").unwrap().as_str(), Some("png"));
    }

    #[test]
    fn merge_toml_preserves_base_keys() {
        let base: toml::Value = toml::from_str(
            r#"
a = 1
b = 2
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(r#"a = 10"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("a").unwrap().as_integer(), Some(10));
        assert_eq!(merged.get("b").unwrap().as_integer(), Some(2));
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[export]
qualty = 0.8
"#;
        let result: Result<ResizeConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let toml_str = r#"
[exports]
format = "png"
"#;
        let result: Result<ResizeConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_unit_rejected() {
        let toml_str = r#"
[defaults]
unit = "in"
"#;
        let result: Result<ResizeConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_key_rejected_via_load_config() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(
            &path,
            r#"
[defaults]
dip = 300
"#,
        )
        .unwrap();

        assert!(load_config(&path).is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(ResizeConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_dpi_must_be_positive() {
        let mut config = ResizeConfig::default();
        config.defaults.dpi = 0.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("dpi"));

        config.defaults.dpi = -72.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_quality_boundaries() {
        let mut config = ResizeConfig::default();
        config.export.quality = 1.0;
        assert!(config.validate().is_ok());

        config.export.quality = 0.0;
        assert!(config.validate().is_err());

        config.export.quality = 1.01;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_max_default_width_nonzero() {
        let mut config = ResizeConfig::default();
        config.defaults.max_default_width = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_max_output_pixels_nonzero() {
        let mut config = ResizeConfig::default();
        config.defaults.max_output_pixels = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_output_pixels"));
    }

    #[test]
    fn load_config_reads_output_limit() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(
            &path,
            r#"
[defaults]
max_output_pixels = 2000000
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.session_defaults().max_output_pixels, 2_000_000);
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(
            &path,
            r#"
[export]
quality = 5.0
"#,
        )
        .unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // resolve_config tests
    // =========================================================================

    #[test]
    fn resolve_config_with_no_overlay() {
        let config = resolve_config(stock_defaults_value(), None).unwrap();
        assert_eq!(config, ResizeConfig::default());
    }

    #[test]
    fn resolve_config_with_overlay() {
        let overlay: toml::Value = toml::from_str(
            r#"
[defaults]
max_default_width = 1024
"#,
        )
        .unwrap();
        let config = resolve_config(stock_defaults_value(), Some(overlay)).unwrap();
        assert_eq!(config.defaults.max_default_width, 1024);
        // Other fields preserved from defaults
        assert_eq!(config.defaults.dpi, 96.0);
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: ResizeConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, ResizeConfig::default());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        assert!(content.contains("[defaults]"));
        assert!(content.contains("[export]"));
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        assert!(val.is_table());
        assert!(val.get("defaults").is_some());
        assert!(val.get("export").is_some());
    }
}
