//! Game settings and preferences
//!
//! Loaded once at startup from an optional JSON file. Nothing is written back.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Held time-scale presets for debugging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DebugSpeed {
    #[default]
    Normal,
    Fast,
    Faster,
    Fastest,
}

impl DebugSpeed {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebugSpeed::Normal => "Normal",
            DebugSpeed::Fast => "Fast",
            DebugSpeed::Faster => "Faster",
            DebugSpeed::Fastest => "Fastest",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normal" | "1x" => Some(DebugSpeed::Normal),
            "fast" | "5x" => Some(DebugSpeed::Fast),
            "faster" | "10x" => Some(DebugSpeed::Faster),
            "fastest" | "25x" => Some(DebugSpeed::Fastest),
            _ => None,
        }
    }

    /// Multiplier applied to the frame delta
    pub fn factor(&self) -> f32 {
        match self {
            DebugSpeed::Normal => 1.0,
            DebugSpeed::Fast => 5.0,
            DebugSpeed::Faster => 10.0,
            DebugSpeed::Fastest => 25.0,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RNG seed (None = derive from the clock at startup)
    pub seed: Option<u64>,

    /// JSON level table replacing the built-in one
    pub levels_path: Option<PathBuf>,

    // === Debug ===
    /// Enables cheat commands and held time scaling
    pub debug_commands: bool,

    // === HUD ===
    /// Blink a weapon's slot when it regains ammo
    pub weapon_ready_alert: bool,

    // === Input ===
    /// Fire key for each weapon, in weapon order
    pub fire_keys: [char; 4],

    /// Upper bound on a single frame delta before time scaling (seconds)
    pub max_frame_dt: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            levels_path: None,

            debug_commands: false,

            weapon_ready_alert: true,

            fire_keys: ['1', '2', '3', '4'],

            max_frame_dt: 0.1,
        }
    }
}

impl Settings {
    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) => {
                log::warn!("Could not read settings {}: {err}; using defaults", path.display());
                return Self::default();
            }
        };

        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                log::warn!("Invalid settings {}: {err}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Effective frame delta: clamped, then scaled by the held debug speed
    /// (ignored unless debug commands are enabled)
    pub fn effective_dt(&self, raw_dt: f32, speed: DebugSpeed) -> f32 {
        let dt = raw_dt.clamp(0.0, self.max_frame_dt);
        if self.debug_commands {
            dt * speed.factor()
        } else {
            dt
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_speed_round_trip_names() {
        for speed in [
            DebugSpeed::Normal,
            DebugSpeed::Fast,
            DebugSpeed::Faster,
            DebugSpeed::Fastest,
        ] {
            assert_eq!(DebugSpeed::from_str(speed.as_str()), Some(speed));
        }
        assert_eq!(DebugSpeed::from_str("25x"), Some(DebugSpeed::Fastest));
        assert_eq!(DebugSpeed::from_str("warp"), None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{ "seed": 7, "debug_commands": true }"#).unwrap();
        assert_eq!(settings.seed, Some(7));
        assert!(settings.debug_commands);
        assert_eq!(settings.fire_keys, ['1', '2', '3', '4']);
        assert!(settings.weapon_ready_alert);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(Settings::from_json("{ seed: ").is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let settings = Settings::load("/nonexistent/planet-defense/settings.json");
        assert_eq!(settings.seed, None);
        assert!(!settings.debug_commands);
    }

    #[test]
    fn test_effective_dt_scaling_requires_debug() {
        let mut settings = Settings::default();
        assert_eq!(settings.effective_dt(0.02, DebugSpeed::Fastest), 0.02);
        settings.debug_commands = true;
        assert!((settings.effective_dt(0.02, DebugSpeed::Fastest) - 0.5).abs() < 1e-6);
        // Clamped before scaling
        assert!((settings.effective_dt(1.0, DebugSpeed::Fast) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_levels_path_from_json() {
        let settings = Settings::from_json(r#"{ "levels_path": "levels.json" }"#).unwrap();
        assert_eq!(settings.levels_path, Some(PathBuf::from("levels.json")));
        assert_eq!(Settings::default().levels_path, None);
    }
}
