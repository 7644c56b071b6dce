// src/config.rs
//! Scene configuration loaded from TOML. Every field defaults to the value the
//! SnowMan scene was tuned with, so an absent file is a valid setup.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV_VAR: &str = "SNOWSCAPE_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "snowscape.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub shadow: ShadowConfig,
    pub timing: TimingConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "SnowMan".to_string(),
            width: 1280,
            height: 960,
        }
    }
}

impl WindowConfig {
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    pub start_position: [f32; 3],
    pub start_pitch: f32,
    pub start_yaw: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_deg: 45.0,
            near: 0.1,
            far: 1000.0,
            start_position: [12.0, 10.0, -12.0],
            start_pitch: -std::f32::consts::FRAC_PI_4,
            start_yaw: -std::f32::consts::FRAC_PI_4,
        }
    }
}

impl CameraConfig {
    pub fn start_position(&self) -> Vec3 {
        Vec3::from_array(self.start_position)
    }
}

/// Per-step input magnitudes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlsConfig {
    pub walk_step: f32,
    pub strafe_step: f32,
    pub turn_step: f32,
    pub mouse_sensitivity: f32,
    pub scroll_sensitivity: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            walk_step: 0.05,
            strafe_step: 0.05,
            turn_step: 0.02,
            mouse_sensitivity: 0.01,
            scroll_sensitivity: 0.001,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShadowConfig {
    pub map_width: u32,
    pub map_height: u32,
    /// Width and height of the light's orthographic volume.
    pub extent: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_width: 1280,
            map_height: 960,
            extent: 30.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    /// Seconds per simulation step. `0` (or any non-positive value) runs one
    /// variable step per frame.
    pub fixed_timestep: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0,
        }
    }
}

impl TimingConfig {
    pub fn fixed_step(&self) -> Option<f64> {
        Some(self.fixed_timestep).filter(|step| *step > 0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MediaConfig {
    pub search_dirs: Vec<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            search_dirs: vec!["Media".into(), "media".into(), "assets".into()],
        }
    }
}

impl SceneConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| SceneError::Config(e.to_string()))
    }

    /// Reads `path`; a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                log::info!("Loading scene config from {}", path.display());
                Self::from_toml_str(&contents)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(SceneError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Loads from `$SNOWSCAPE_CONFIG` or `snowscape.toml`.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV_VAR)
            .map(std::path::PathBuf::from)
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.into());
        Self::load_or_default(&path)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SceneError::Config(e.to_string()))
    }
}
