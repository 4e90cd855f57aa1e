// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Settings come from a YAML file (`--config`, else `annotator.yaml` in the
//! working directory when present); every field has a default so partial
//! files are fine.

use crate::canvas::{viewport, CanvasSettings, DEFAULT_MIN_SHAPE_SIZE};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "annotator.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding persisted store state
    pub storage_dir: PathBuf,
    /// Persist the store between runs
    pub persist: bool,
    /// Label given to new annotations
    pub default_label: String,
    /// Colour given to new annotations
    pub default_color: String,
    /// Shapes must exceed this extent (media pixels) to be kept
    pub min_shape_size: f64,
    pub zoom_min: f64,
    pub zoom_max: f64,
    pub zoom_step: f64,
    /// Maximum number of undo snapshots (unbounded if absent)
    pub history_limit: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(".annotator"),
            persist: true,
            default_label: "object".to_string(),
            default_color: "#7c3aed".to_string(),
            min_shape_size: DEFAULT_MIN_SHAPE_SIZE,
            zoom_min: viewport::DEFAULT_MIN_ZOOM,
            zoom_max: viewport::DEFAULT_MAX_ZOOM,
            zoom_step: viewport::DEFAULT_ZOOM_STEP,
            history_limit: None,
        }
    }
}

impl AppConfig {
    /// Load from `path`, or from [`DEFAULT_CONFIG_FILE`] if it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&yaml)
            .with_context(|| format!("invalid config {}", path.display()))?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(self.zoom_min > 0.0 && self.zoom_min <= self.zoom_max) {
            anyhow::bail!(
                "zoom range [{}, {}] is invalid",
                self.zoom_min,
                self.zoom_max
            );
        }
        if !(self.zoom_step > 0.0) {
            anyhow::bail!("zoom_step must be positive, got {}", self.zoom_step);
        }
        if !(self.min_shape_size >= 0.0) {
            anyhow::bail!("min_shape_size must not be negative, got {}", self.min_shape_size);
        }
        Ok(())
    }

    /// Settings handed to the canvas controller.
    pub fn canvas_settings(&self) -> CanvasSettings {
        CanvasSettings {
            min_shape_size: self.min_shape_size,
            min_zoom: self.zoom_min,
            max_zoom: self.zoom_max,
            zoom_step: self.zoom_step,
            default_label: self.default_label.clone(),
            default_color: self.default_color.clone(),
        }
    }
}
