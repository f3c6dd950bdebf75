//! World settings. Loaded from world.ron at startup.

use procgen::{CurveAsset, NoiseConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything that shapes the generated world. Changing any field triggers a regeneration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Grid samples along X.
    #[serde(default = "default_extent")]
    pub width: u32,
    /// Grid samples along Z.
    #[serde(default = "default_extent")]
    pub length: u32,
    #[serde(default)]
    pub noise: NoiseConfig,
    /// World-space height of a normalized sample of 1.
    #[serde(default = "default_height_scale")]
    pub height_scale: f32,
    /// Remap applied to samples before scaling. `None` scales raw samples.
    #[serde(default)]
    pub height_curve: Option<CurveAsset>,
    /// Fraction of the terrain's height range that sits below the water.
    #[serde(default = "default_water_level")]
    pub water_level: f32,
    /// Width of the reflection/refraction targets in pixels.
    #[serde(default = "default_reflection_resolution")]
    pub reflection_resolution: u32,
}

fn default_extent() -> u32 {
    10
}
fn default_height_scale() -> f32 {
    10.0
}
fn default_water_level() -> f32 {
    0.15
}
fn default_reflection_resolution() -> u32 {
    256
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: default_extent(),
            length: default_extent(),
            noise: NoiseConfig::default(),
            height_scale: default_height_scale(),
            height_curve: None,
            water_level: default_water_level(),
            reflection_resolution: default_reflection_resolution(),
        }
    }
}

impl WorldConfig {
    /// Load config from `world.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if let Ok(data) = std::fs::read_to_string(path) {
            match ron::from_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }

    /// Save current config to `world.ron`. Logs on error.
    pub fn save(&self) {
        self.save_to(&config_path());
    }

    pub fn save_to(&self, path: &Path) {
        match ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            Ok(s) => {
                if let Err(e) = std::fs::write(path, s) {
                    log::warn!("Could not write config to {:?}: {}", path, e);
                }
            }
            Err(e) => log::warn!("Could not serialize config: {}", e),
        }
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("world.ron")
}
