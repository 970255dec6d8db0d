//! Tunables for bounds, projection, grid, markers and zoom.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading a view configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse view config: {0}")]
    Parse(#[from] ron::de::SpannedError),
    #[error("invalid view config: {0}")]
    Invalid(String),
}

/// Canvas rendering and interaction settings.
///
/// Every field has a default, so a config file only needs to list the
/// values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Half width/height of the box shown when a map has no coordinates
    pub default_half_extent: f64,
    /// Padding as a fraction of the larger coordinate range
    pub padding_ratio: f64,
    /// Lower clamp for the padding, in blocks
    pub padding_min: f64,
    /// Upper clamp for the padding, in blocks
    pub padding_max: f64,
    /// Fraction of the canvas the padded bounds occupy at zoom 1.0
    pub fit_fraction: f64,
    /// Minor grid spacing, in blocks
    pub grid_size: f64,
    /// Major grid lines every `grid_size * major_grid_multiple` blocks
    pub major_grid_multiple: u32,
    /// Minimum on-screen distance between axis labels, in pixels
    pub min_label_spacing: f64,
    /// Multiplier applied by one zoom step
    pub zoom_step: f64,
    pub zoom_min: f64,
    pub zoom_max: f64,
    /// Hit radius floor, in blocks
    pub hit_radius_min: f64,
    /// Hit radius in pixels, converted to blocks through the current scale
    pub hit_radius_base: f64,
    /// Marker size floor, in blocks
    pub marker_min: f64,
    /// Marker size in pixels, converted to blocks through the current scale
    pub marker_base: f64,
    /// Size multiplier for the selected marker
    pub selected_marker_factor: f64,
    /// Pointer travel (pixels) before a press turns into a pan
    pub drag_threshold: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            default_half_extent: 100.0,
            padding_ratio: 0.2,
            padding_min: 200.0,
            padding_max: 1000.0,
            fit_fraction: 0.9,
            grid_size: 64.0,
            major_grid_multiple: 4,
            min_label_spacing: 80.0,
            zoom_step: 1.2,
            zoom_min: 0.1,
            zoom_max: 5.0,
            hit_radius_min: 30.0,
            hit_radius_base: 40.0,
            marker_min: 20.0,
            marker_base: 30.0,
            selected_marker_factor: 1.4,
            drag_threshold: 3.0,
        }
    }
}

impl ViewConfig {
    /// Reads and validates a RON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron(&text)?;
        log::info!("Loaded view config from {}", path.display());
        Ok(config)
    }

    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("default_half_extent", self.default_half_extent),
            ("padding_min", self.padding_min),
            ("padding_max", self.padding_max),
            ("fit_fraction", self.fit_fraction),
            ("grid_size", self.grid_size),
            ("min_label_spacing", self.min_label_spacing),
            ("zoom_step", self.zoom_step),
            ("zoom_min", self.zoom_min),
            ("zoom_max", self.zoom_max),
            ("hit_radius_min", self.hit_radius_min),
            ("hit_radius_base", self.hit_radius_base),
            ("marker_min", self.marker_min),
            ("marker_base", self.marker_base),
            ("selected_marker_factor", self.selected_marker_factor),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        if !(self.padding_ratio >= 0.0 && self.padding_ratio.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "padding_ratio must be a non-negative number, got {}",
                self.padding_ratio
            )));
        }
        if !(self.drag_threshold >= 0.0 && self.drag_threshold.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "drag_threshold must be a non-negative number, got {}",
                self.drag_threshold
            )));
        }
        if self.padding_min > self.padding_max {
            return Err(ConfigError::Invalid(format!(
                "padding_min ({}) exceeds padding_max ({})",
                self.padding_min, self.padding_max
            )));
        }
        if self.zoom_min > self.zoom_max {
            return Err(ConfigError::Invalid(format!(
                "zoom_min ({}) exceeds zoom_max ({})",
                self.zoom_min, self.zoom_max
            )));
        }
        if self.zoom_step <= 1.0 {
            return Err(ConfigError::Invalid(format!(
                "zoom_step must be greater than 1, got {}",
                self.zoom_step
            )));
        }
        if self.major_grid_multiple == 0 {
            return Err(ConfigError::Invalid(
                "major_grid_multiple must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn major_grid_size(&self) -> f64 {
        self.grid_size * f64::from(self.major_grid_multiple)
    }
}
