//! Level balance data
//!
//! Thirty rows of spawn-director tuning. The built-in table is used unless a
//! JSON override is supplied at startup; either way it is read-only once the
//! game is running.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sim::entities::ENEMY_KIND_COUNT;

/// Number of levels in a campaign
pub const LEVEL_COUNT: usize = 30;

/// Tuning for one level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDef {
    /// Spawn credits earned per second
    pub build_rate: f32,
    /// Total credits after which the level stops spawning and waits to clear
    pub credit_target: f32,
    /// Bounds on the delay between waves (seconds)
    pub wave_interval_min: f32,
    pub wave_interval_max: f32,
    /// Base pick weight per enemy kind, in `EnemyKind::ALL` order
    pub spawn_chances: [f32; ENEMY_KIND_COUNT],
    /// Multiplier applied to a kind's weight each time it is picked
    pub chance_decay: [f32; ENEMY_KIND_COUNT],
}

impl LevelDef {
    const fn new(
        build_rate: f32,
        credit_target: f32,
        spawn_chances: [f32; ENEMY_KIND_COUNT],
        chance_decay: [f32; ENEMY_KIND_COUNT],
    ) -> Self {
        Self {
            build_rate,
            credit_target,
            wave_interval_min: 10.0,
            wave_interval_max: 10.0,
            spawn_chances,
            chance_decay,
        }
    }
}

/// Error returned when a level table override is rejected
#[derive(Debug)]
pub enum LevelTableError {
    /// Input was not valid JSON for a list of levels
    Parse(serde_json::Error),
    /// Table did not contain exactly `LEVEL_COUNT` rows
    WrongLength(usize),
    /// A row had a negative rate, target, interval or weight, or inverted bounds
    InvalidLevel(usize),
}

impl fmt::Display for LevelTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelTableError::Parse(err) => write!(f, "invalid level table: {err}"),
            LevelTableError::WrongLength(n) => {
                write!(f, "level table has {n} rows, expected {LEVEL_COUNT}")
            }
            LevelTableError::InvalidLevel(i) => write!(f, "level {} has invalid tuning", i + 1),
        }
    }
}

impl std::error::Error for LevelTableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelTableError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for LevelTableError {
    fn from(err: serde_json::Error) -> Self {
        LevelTableError::Parse(err)
    }
}

/// The full campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelTable {
    levels: Vec<LevelDef>,
}

impl Default for LevelTable {
    fn default() -> Self {
        const THIRD: f32 = 1.0 / 3.0;

        let mut levels = Vec::with_capacity(LEVEL_COUNT);
        levels.push(LevelDef::new(3.0, 150.0, [1.0, 0.0, 0.0, 0.0], [1.0, 0.0, 0.0, 0.0]));
        levels.push(LevelDef::new(
            3.0,
            250.0,
            [2.0 * THIRD, THIRD, 0.0, 0.0],
            [0.5, 0.5, 0.0, 0.0],
        ));
        levels.push(LevelDef::new(
            3.5,
            300.0,
            [2.0 * THIRD, THIRD, 0.0, 0.0],
            [0.5, 0.5, 0.0, 0.0],
        ));
        levels.push(LevelDef::new(
            4.0,
            320.0,
            [THIRD, 2.0 * THIRD, 0.0, 0.0],
            [0.5, 0.5, 0.0, 0.0],
        ));
        levels.push(LevelDef::new(
            4.5,
            360.0,
            [0.25, 0.5, 0.25, 0.0],
            [0.75, 0.75, 0.05, 0.0],
        ));
        levels.push(LevelDef::new(
            4.5,
            300.0,
            [0.2, 0.2, 0.2, 0.4],
            [0.25, 0.25, 0.25, 0.5],
        ));
        // Filler levels until the finale
        while levels.len() < LEVEL_COUNT - 1 {
            levels.push(LevelDef::new(2.0, 80.0, [0.8, 0.2, 0.0, 0.0], [0.75, 0.25, 0.0, 0.0]));
        }
        levels.push(LevelDef::new(15.0, 400.0, [0.25; 4], [1.0; 4]));

        Self { levels }
    }
}

impl LevelTable {
    /// Parse a table override from a JSON array of levels
    pub fn from_json(json: &str) -> Result<Self, LevelTableError> {
        let levels: Vec<LevelDef> = serde_json::from_str(json)?;
        Self::from_levels(levels)
    }

    /// Load a table override from a JSON file, falling back to the built-in
    /// table
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) => {
                log::warn!("Could not read levels {}: {err}; using built-in table", path.display());
                return Self::default();
            }
        };

        match Self::from_json(&json) {
            Ok(table) => {
                log::info!("Loaded {} levels from {}", table.len(), path.display());
                table
            }
            Err(err) => {
                log::warn!("Rejected levels {}: {err}; using built-in table", path.display());
                Self::default()
            }
        }
    }

    /// Validate and wrap a list of levels
    pub fn from_levels(levels: Vec<LevelDef>) -> Result<Self, LevelTableError> {
        if levels.len() != LEVEL_COUNT {
            return Err(LevelTableError::WrongLength(levels.len()));
        }

        let non_negative = |v: f32| v.is_finite() && v >= 0.0;

        for (i, level) in levels.iter().enumerate() {
            let weights_ok = level
                .spawn_chances
                .iter()
                .chain(level.chance_decay.iter())
                .all(|&w| non_negative(w));
            if !weights_ok
                || !non_negative(level.build_rate)
                || !non_negative(level.credit_target)
                || !non_negative(level.wave_interval_min)
                || !non_negative(level.wave_interval_max)
                || level.wave_interval_max < level.wave_interval_min
            {
                return Err(LevelTableError::InvalidLevel(i));
            }
        }

        Ok(Self { levels })
    }

    /// Row for a level index, clamped to the last level
    pub fn get(&self, index: usize) -> &LevelDef {
        &self.levels[index.min(self.max_index())]
    }

    /// Index of the final level
    pub fn max_index(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LevelDef> {
        self.levels.iter()
    }
}
