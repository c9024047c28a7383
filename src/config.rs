/// Application configuration
///
/// Tunables for the crop engine and the export step. Stored as JSON;
/// every field is optional in the file and falls back to its default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CropError, Result};

/// Config file looked up in the working directory first
const LOCAL_CONFIG: &str = "photo-cropper.json";

/// Largest accepted supersample factor
pub const MAX_SUPERSAMPLE: u32 = 8;

/// Loaded configuration plus where it came from
#[derive(Debug, Clone)]
pub struct ConfigHandle {
    pub config: CropperConfig,
    pub source: Option<PathBuf>,
    pub warnings: Vec<String>,
}

/// All tunables of the cropper
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CropperConfig {
    /// Output raster is target size times this factor
    pub supersample: u32,

    /// Upper zoom bound relative to native pixels
    pub max_scale: f64,

    /// Two taps closer than this (ms) count as a double tap
    pub double_tap_ms: u64,

    /// Wheel factor when scrolling towards the user's screen
    pub wheel_zoom_in: f64,

    /// Wheel factor when scrolling away
    pub wheel_zoom_out: f64,

    /// Reorder selection expires after this many seconds
    pub reorder_timeout_secs: u64,

    /// Edge length of strip thumbnails
    pub thumbnail_size: u32,

    /// Where archives are written. `None` means the download folder.
    pub output_dir: Option<PathBuf>,
}

impl Default for CropperConfig {
    fn default() -> Self {
        Self {
            supersample: 2,
            max_scale: 5.0,
            double_tap_ms: 300,
            wheel_zoom_in: 1.1,
            wheel_zoom_out: 0.9,
            reorder_timeout_secs: 10,
            thumbnail_size: 160,
            output_dir: None,
        }
    }
}

impl CropperConfig {
    /// Parse from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CropError::Config(e.to_string()))
    }

    /// Replace out-of-range values with defaults, returning one warning per fix.
    pub fn sanitize(&mut self) -> Vec<String> {
        let defaults = Self::default();
        let mut warnings = Vec::new();

        if !(1..=MAX_SUPERSAMPLE).contains(&self.supersample) {
            warnings.push(format!("supersample {} must be in 1..={}", self.supersample, MAX_SUPERSAMPLE));
            self.supersample = defaults.supersample;
        }
        if !(self.max_scale.is_finite() && self.max_scale >= 1.0) {
            warnings.push(format!("max_scale {} is not >= 1", self.max_scale));
            self.max_scale = defaults.max_scale;
        }
        if !(self.wheel_zoom_in.is_finite() && self.wheel_zoom_in > 1.0) {
            warnings.push(format!("wheel_zoom_in {} must be > 1", self.wheel_zoom_in));
            self.wheel_zoom_in = defaults.wheel_zoom_in;
        }
        if !(self.wheel_zoom_out.is_finite() && self.wheel_zoom_out > 0.0 && self.wheel_zoom_out < 1.0) {
            warnings.push(format!("wheel_zoom_out {} must be in (0, 1)", self.wheel_zoom_out));
            self.wheel_zoom_out = defaults.wheel_zoom_out;
        }
        if self.thumbnail_size == 0 {
            warnings.push("thumbnail_size must be at least 1".to_string());
            self.thumbnail_size = defaults.thumbnail_size;
        }

        warnings
    }

    /// Directory the finished archive goes to
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .or_else(dirs::download_dir)
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Candidate config files, most specific first
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
    if let Some(mut dir) = dirs::config_dir() {
        dir.push("photo-cropper");
        dir.push("config.json");
        paths.push(dir);
    }
    paths
}

/// Load the first config file that exists. Never fails: problems become warnings.
pub fn load() -> ConfigHandle {
    load_from(&candidate_paths())
}

fn load_from(paths: &[PathBuf]) -> ConfigHandle {
    for path in paths {
        if path.is_file() {
            return load_file(path);
        }
    }

    ConfigHandle {
        config: CropperConfig::default(),
        source: None,
        warnings: Vec::new(),
    }
}

fn load_file(path: &Path) -> ConfigHandle {
    let parsed = fs::read_to_string(path)
        .map_err(CropError::from)
        .and_then(|text| CropperConfig::from_json(&text));

    match parsed {
        Ok(mut config) => {
            let warnings = config.sanitize();
            ConfigHandle {
                config,
                source: Some(path.to_path_buf()),
                warnings,
            }
        }
        Err(e) => ConfigHandle {
            config: CropperConfig::default(),
            source: Some(path.to_path_buf()),
            warnings: vec![format!("{}: {}, using defaults", path.display(), e)],
        },
    }
}
