//! Game settings and preferences
//!
//! Stored as JSON next to the binary. Loading never fails: a missing or
//! malformed file falls back to defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Host key names bound to each logical action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub jump: Vec<String>,
    pub down: Vec<String>,
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            left: keys(&["ArrowLeft", "a", "A"]),
            right: keys(&["ArrowRight", "d", "D"]),
            jump: keys(&["ArrowUp", "w", "W", " "]),
            down: keys(&["ArrowDown", "s", "S"]),
        }
    }
}

/// Camera follow tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Distance from the viewport's left edge the followed entity may reach
    /// before the camera scrolls
    pub left_offset: f32,
    /// Vertical drift ignored before the camera starts following
    pub vertical_deadzone: f32,
    pub horizontal_smoothing: f32,
    pub vertical_smoothing: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            left_offset: 160.0,
            vertical_deadzone: 50.0,
            horizontal_smoothing: 0.1,
            vertical_smoothing: 0.05,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub keys: KeyBindings,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Debug ===
    /// Outline every entity's bounding box
    pub show_hitboxes: bool,

    pub camera: CameraConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            keys: KeyBindings::default(),
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            show_hitboxes: false,
            camera: CameraConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings could not be encoded: {0}")]
    Json(#[from] serde_json::Error),
}

impl Settings {
    /// Parse settings JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load settings from `path`, or defaults if it is missing or unreadable
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) => {
                log::info!("Using default settings ({}: {err})", path.display());
                return Self::default();
            }
        };
        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                log::warn!("Ignoring malformed settings in {}: {err}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "muted": true, "camera": { "left_offset": 200.0 } }"#).unwrap();
        assert!(settings.muted);
        assert_eq!(settings.camera.left_offset, 200.0);
        assert_eq!(settings.camera.vertical_deadzone, 50.0);
        assert_eq!(settings.keys, KeyBindings::default());
        assert_eq!(settings.master_volume, 0.8);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let settings = Settings::load("/nonexistent/block-hopper/settings.json");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("block-hopper-settings-{}.json", std::process::id()));
        let mut settings = Settings::default();
        settings.show_hitboxes = true;
        settings.keys.jump = vec!["k".to_string()];
        settings.save(&path).unwrap();
        let loaded = Settings::load(&path);
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_jump_accepts_space_by_default() {
        assert!(KeyBindings::default().jump.iter().any(|k| k == " "));
    }
}
