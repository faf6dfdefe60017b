//! World Configuration
//!
//! Tunables that may differ between runs without breaking determinism for a
//! given config. Physics constants stay compile-time in `core::fixed`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::fixed::{from_pixels, Fixed, MAX_RINGS};

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid JSON for this schema.
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// World must have a positive extent that fits the fixed-point range.
    #[error("world size must be in 1..={max} pixels per side, got {width}x{height}")]
    InvalidWorldSize {
        /// Configured width in pixels.
        width: i32,
        /// Configured height in pixels.
        height: i32,
        /// Largest accepted side.
        max: i32,
    },

    /// Ring limit out of range.
    #[error("max_rings must be in 1..={max}, got {got}")]
    InvalidMaxRings {
        /// Configured value.
        got: usize,
        /// Ring capacity.
        max: usize,
    },

    /// A game needs at least one life.
    #[error("initial_lives must be positive, got {0}")]
    InvalidLives(i32),
}

/// Largest accepted world side in pixels. Keeps positions plus a tick of
/// velocity well inside `i32` at x1024.
pub const MAX_WORLD_PX: i32 = 65_535;

/// Points awarded for the player's hits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Per ring-segment energy point removed.
    pub per_segment_hit: u32,
    /// Per missile that hits the cannon.
    pub per_cannon_hit: u32,
    /// Flat bonus for clearing a level.
    pub level_clear_bonus: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            per_segment_hit: 10,
            per_cannon_hit: 25,
            level_clear_bonus: 1000,
        }
    }
}

/// World configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World width in pixels.
    pub width_px: i32,
    /// World height in pixels.
    pub height_px: i32,
    /// Lives at the start of a game.
    pub initial_lives: i32,
    /// Ticks a progression message stays up before play resumes by itself.
    pub message_ticks: u32,
    /// Upper bound on rings at any level.
    pub max_rings: usize,
    /// Seed for spawn headings and stars.
    pub rng_seed: u64,
    /// Scoring table.
    pub scoring: ScoringConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width_px: 800,
            height_px: 600,
            initial_lives: 3,
            message_ticks: 125, // 5 seconds at 25 Hz
            max_rings: MAX_RINGS,
            rng_seed: 0x5EED_CA57,
            scoring: ScoringConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let side = 1..=MAX_WORLD_PX;
        if !side.contains(&self.width_px) || !side.contains(&self.height_px) {
            return Err(ConfigError::InvalidWorldSize {
                width: self.width_px,
                height: self.height_px,
                max: MAX_WORLD_PX,
            });
        }
        if self.max_rings == 0 || self.max_rings > MAX_RINGS {
            return Err(ConfigError::InvalidMaxRings {
                got: self.max_rings,
                max: MAX_RINGS,
            });
        }
        if self.initial_lives <= 0 {
            return Err(ConfigError::InvalidLives(self.initial_lives));
        }
        Ok(())
    }

    /// World width in fixed-point units.
    #[inline]
    pub fn width(&self) -> Fixed {
        from_pixels(self.width_px)
    }

    /// World height in fixed-point units.
    #[inline]
    pub fn height(&self) -> Fixed {
        from_pixels(self.height_px)
    }
}
