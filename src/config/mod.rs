//! Configuration file support for touchboard.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/touchboard/config.toml`. Settings cover canvas geometry and
//! zoom limits, gesture classification tuning, stroke filtering and diagnostics.
//!
//! If no config file exists, the tuned defaults are used automatically.

pub mod types;

// Re-export commonly used types at module level
pub use types::{DiagnosticsConfig, DrawingConfig, GestureConfig, ViewportConfig};

use crate::draw::annotation::is_valid_format;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure containing all user settings.
///
/// This is the root configuration type that gets deserialized from the TOML file.
/// Every field has a default, so an empty file (or no file) is a valid configuration.
///
/// # Example TOML
/// ```toml
/// [viewport]
/// canvas_width = 3000.0
/// canvas_height = 2000.0
/// min_scale = 0.6
/// max_scale = 3.0
///
/// [gesture]
/// pinch_ratio_deadzone = 0.04
/// grace_period_ms = 150
///
/// [drawing]
/// default_tool = "pen"
/// draw_delay_ms = 60
/// suspicious_distance = 100.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Canvas size, zoom limits and zoom step factors
    #[serde(default)]
    pub viewport: ViewportConfig,

    /// Multi-touch pan/pinch classification tuning
    #[serde(default)]
    pub gesture: GestureConfig,

    /// Stroke debounce and filtering
    #[serde(default)]
    pub drawing: DrawingConfig,

    /// Input history kept for debugging
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

/// Clamps `value` into `[min, max]`, logging when it was out of range.
fn clamp_logged(name: &str, value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        warn!("Invalid {name} (NaN), using {min}");
        return min;
    }
    if !(min..=max).contains(&value) {
        warn!("Invalid {name} {value:.3}, clamping to {min}-{max} range");
        return value.clamp(min, max);
    }
    value
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Out-of-range values are clamped to the nearest valid value and a warning is
    /// logged, so a typo in the config file never produces a view that cannot be
    /// panned or zoomed.
    pub fn validate_and_clamp(&mut self) {
        let viewport = &mut self.viewport;
        viewport.canvas_width = clamp_logged("canvas_width", viewport.canvas_width, 1.0, 100_000.0);
        viewport.canvas_height =
            clamp_logged("canvas_height", viewport.canvas_height, 1.0, 100_000.0);
        viewport.min_scale = clamp_logged("min_scale", viewport.min_scale, 0.05, 10.0);
        if viewport.max_scale.is_nan() || viewport.max_scale < viewport.min_scale {
            warn!(
                "max_scale {:.3} is below min_scale {:.3}, using min_scale",
                viewport.max_scale, viewport.min_scale
            );
            viewport.max_scale = viewport.min_scale;
        }
        viewport.initial_scale = clamp_logged(
            "initial_scale",
            viewport.initial_scale,
            viewport.min_scale,
            viewport.max_scale,
        );
        viewport.zoom_in_factor = clamp_logged("zoom_in_factor", viewport.zoom_in_factor, 1.01, 2.0);
        viewport.zoom_out_factor =
            clamp_logged("zoom_out_factor", viewport.zoom_out_factor, 0.5, 0.99);
        viewport.zoom_epsilon = clamp_logged("zoom_epsilon", viewport.zoom_epsilon, 0.0, 0.1);

        let gesture = &mut self.gesture;
        gesture.pinch_ratio_deadzone =
            clamp_logged("pinch_ratio_deadzone", gesture.pinch_ratio_deadzone, 0.0, 0.5);
        gesture.pan_threshold_px = clamp_logged("pan_threshold_px", gesture.pan_threshold_px, 0.0, 50.0);
        gesture.single_touch_pan_threshold_px = clamp_logged(
            "single_touch_pan_threshold_px",
            gesture.single_touch_pan_threshold_px,
            0.0,
            50.0,
        );
        if gesture.grace_period_ms > 1000 {
            warn!(
                "Invalid grace_period_ms {}, clamping to 0-1000 range",
                gesture.grace_period_ms
            );
            gesture.grace_period_ms = 1000;
        }
        gesture.pinch_pan_damping =
            clamp_logged("pinch_pan_damping", gesture.pinch_pan_damping, 0.0, 1.0);
        if gesture.pinch_pan_min_frames > 30 {
            warn!(
                "Invalid pinch_pan_min_frames {}, clamping to 0-30 range",
                gesture.pinch_pan_min_frames
            );
            gesture.pinch_pan_min_frames = 30;
        }

        let drawing = &mut self.drawing;
        if drawing.draw_delay_ms > 1000 {
            warn!(
                "Invalid draw_delay_ms {}, clamping to 0-1000 range",
                drawing.draw_delay_ms
            );
            drawing.draw_delay_ms = 1000;
        }
        drawing.suspicious_distance =
            clamp_logged("suspicious_distance", drawing.suspicious_distance, 1.0, 10_000.0);
        drawing.min_valid_extent =
            clamp_logged("min_valid_extent", drawing.min_valid_extent, 0.0, 100.0);
        drawing.annotation_margin =
            clamp_logged("annotation_margin", drawing.annotation_margin, 0.0, 500.0);
        if drawing.annotation_format.trim().is_empty()
            || !is_valid_format(&drawing.annotation_format)
        {
            warn!(
                "Invalid annotation_format '{}', falling back to the default",
                drawing.annotation_format
            );
            drawing.annotation_format = DrawingConfig::default().annotation_format;
        }

        let diagnostics = &mut self.diagnostics;
        if !(1..=1000).contains(&diagnostics.event_history) {
            warn!(
                "Invalid event_history {}, clamping to 1-1000 range",
                diagnostics.event_history
            );
            diagnostics.event_history = diagnostics.event_history.clamp(1, 1000);
        }
        if !(1..=1000).contains(&diagnostics.stroke_history) {
            warn!(
                "Invalid stroke_history {}, clamping to 1-1000 range",
                diagnostics.stroke_history
            );
            diagnostics.stroke_history = diagnostics.stroke_history.clamp(1, 1000);
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/touchboard/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("touchboard");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default location, or returns defaults if not found.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Loads configuration from `path`, or returns defaults if the file does not exist.
    ///
    /// All loaded values are validated and clamped to acceptable ranges.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or is not valid TOML.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config = Self::from_toml(&config_str)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        info!("Loaded config from {}", path.display());
        debug!("Config: {:?}", config);

        config.validate_and_clamp();
        Ok(config)
    }

    /// Parses a TOML document without validation.
    pub fn from_toml(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Serializes the configuration as pretty TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Writes the documented example config to `path`.
    ///
    /// # Errors
    /// Returns an error if a file already exists at `path` or it cannot be written.
    pub fn create_default_file(path: &Path) -> Result<()> {
        if path.exists() {
            return Err(anyhow::anyhow!(
                "Config file already exists at {}",
                path.display()
            ));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let default_config = include_str!("../../config.example.toml");
        fs::write(path, default_config)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        info!("Created default config at {}", path.display());
        Ok(())
    }

    /// JSON schema describing the configuration file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }
}
