//! # World Configuration
//!
//! Everything needed to stream a world, loaded once at startup from TOML.
//! Every field has a default, so a config file only lists what it changes:
//!
//! ```toml
//! [seed]
//! use_random_seed = false
//! seed = 1234
//!
//! [streaming]
//! lookahead_distance = 24.0
//!
//! [underworld]
//! border_tile = "red_rock_hard"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::method::{OverworldSettings, UnderworldSettings};
use crate::noise::WorldSeed;
use crate::random::RandomService;

/// Default chunk width in cells.
pub const DEFAULT_CHUNK_WIDTH: usize = 64;
/// Default chunk height in cells.
pub const DEFAULT_CHUNK_HEIGHT: usize = 64;
/// Default seed when a fixed seed is requested without one.
pub const DEFAULT_SEED: u64 = 1234;
/// Default look-ahead distance in world units.
pub const DEFAULT_LOOKAHEAD: f64 = 40.0;
/// Default transition margin in world units.
pub const DEFAULT_TRANSITION_MARGIN: f64 = 10.0;

/// Chunk dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkSection {
    /// Columns per chunk.
    pub width: usize,
    /// Rows per chunk.
    pub height: usize,
    /// Cell edge length in world units.
    pub cell_size: f64,
}

impl Default for ChunkSection {
    fn default() -> Self {
        Self { width: DEFAULT_CHUNK_WIDTH, height: DEFAULT_CHUNK_HEIGHT, cell_size: 1.0 }
    }
}

/// Seed selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedSection {
    /// Draw a fresh seed at startup and ignore `seed`.
    pub use_random_seed: bool,
    /// Fixed world seed.
    pub seed: u64,
}

impl Default for SeedSection {
    fn default() -> Self {
        Self { use_random_seed: true, seed: DEFAULT_SEED }
    }
}

/// Which layers exist and how they stack.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerSection {
    /// Generate the surface layer.
    pub overworld: bool,
    /// Generate the cavern layer below it.
    pub underworld: bool,
    /// Empty rows between the two layers.
    pub gap: f64,
}

impl Default for LayerSection {
    fn default() -> Self {
        Self { overworld: true, underworld: true, gap: 0.0 }
    }
}

/// Admission, eviction and scheduling.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingSection {
    /// Admit the next chunk once the viewpoint is this close to its start.
    pub lookahead_distance: f64,
    /// Start checking the transition this close to the current chunk's end.
    pub transition_margin: f64,
    /// Columns written across all runs per tick.
    pub columns_per_tick: usize,
    /// Columns one run writes before it yields.
    pub columns_per_yield: usize,
    /// Ticks a run sleeps after yielding.
    pub yield_delay_ticks: u32,
    /// Chunks kept behind the viewpoint's chunk.
    pub retain_behind: u32,
    /// Chunks kept ahead of the viewpoint's chunk.
    pub retain_ahead: u32,
    /// Chunk index the walk starts in.
    pub initial_index: i64,
}

impl Default for StreamingSection {
    fn default() -> Self {
        Self {
            lookahead_distance: DEFAULT_LOOKAHEAD,
            transition_margin: DEFAULT_TRANSITION_MARGIN,
            columns_per_tick: 64,
            columns_per_yield: 5,
            yield_delay_ticks: 0,
            retain_behind: 1,
            retain_ahead: 2,
            initial_index: 0,
        }
    }
}

/// Complete streaming configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Chunk dimensions.
    pub chunk: ChunkSection,
    /// Seed selection.
    pub seed: SeedSection,
    /// Layer stacking.
    pub layers: LayerSection,
    /// Streaming behaviour.
    pub streaming: StreamingSection,
    /// Surface terrain.
    pub overworld: OverworldSettings,
    /// Cavern terrain.
    pub underworld: UnderworldSettings,
}

impl WorldConfig {
    /// Settings for a shipped game: random world every run.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Small, fixed-seed world that generates in a handful of ticks.
    #[must_use]
    pub fn test() -> Self {
        Self {
            chunk: ChunkSection { width: 16, height: 32, cell_size: 1.0 },
            seed: SeedSection { use_random_seed: false, seed: DEFAULT_SEED },
            streaming: StreamingSection {
                lookahead_distance: 8.0,
                transition_margin: 4.0,
                columns_per_tick: 1024,
                columns_per_yield: 16,
                ..StreamingSection::default()
            },
            ..Self::default()
        }
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] or any validation error.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`WorldConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Serializes to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSetting`] if a value has no TOML form.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|err| ConfigError::InvalidSetting {
            name: "config",
            reason: err.to_string(),
        })
    }

    /// Checks every dimension and tunable.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> ConfigResult<()> {
        positive_count("chunk.width", self.chunk.width)?;
        positive_count("chunk.height", self.chunk.height)?;
        positive("chunk.cell_size", self.chunk.cell_size)?;
        non_negative("layers.gap", self.layers.gap)?;
        non_negative("streaming.lookahead_distance", self.streaming.lookahead_distance)?;
        non_negative("streaming.transition_margin", self.streaming.transition_margin)?;
        positive_count("streaming.columns_per_tick", self.streaming.columns_per_tick)?;
        positive_count("streaming.columns_per_yield", self.streaming.columns_per_yield)?;

        if !self.layers.overworld && !self.layers.underworld {
            return Err(ConfigError::InvalidSetting {
                name: "layers",
                reason: "at least one layer must be enabled".into(),
            });
        }
        if self.layers.overworld {
            self.overworld.validate()?;
        }
        if self.layers.underworld {
            self.underworld.validate()?;
        }
        Ok(())
    }

    /// The seed this world runs with.
    ///
    /// Draws from entropy when a random seed is requested, so call once.
    #[must_use]
    pub fn resolve_seed(&self) -> WorldSeed {
        if self.seed.use_random_seed {
            RandomService::random_seed()
        } else {
            WorldSeed::new(self.seed.seed)
        }
    }

    /// Chunk width in world units.
    #[inline]
    #[must_use]
    pub fn chunk_world_width(&self) -> f64 {
        self.chunk.width as f64 * self.chunk.cell_size
    }
}

fn positive_count(name: &'static str, value: usize) -> ConfigResult<()> {
    if value == 0 {
        return Err(ConfigError::NonPositiveDimension { name, value: 0.0 });
    }
    Ok(())
}

fn positive(name: &'static str, value: f64) -> ConfigResult<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ConfigError::NonPositiveDimension { name, value });
    }
    Ok(())
}

fn non_negative(name: &'static str, value: f64) -> ConfigResult<()> {
    if !(value.is_finite() && value >= 0.0) {
        return Err(ConfigError::InvalidSetting {
            name,
            reason: format!("{value} must be a non-negative number"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::NoiseKind;
    use crate::tile::Tile;

    #[test]
    fn test_defaults() {
        let config = WorldConfig::default();
        assert_eq!(config.chunk.width, 64);
        assert_eq!(config.chunk.height, 64);
        assert!(config.seed.use_random_seed);
        assert_eq!(config.streaming.lookahead_distance, 40.0);
        assert_eq!(config.streaming.transition_margin, 10.0);
        assert_eq!(config.overworld.noise.frequency, 0.03);
        assert_eq!(config.underworld.noise.frequency, 0.05);
        assert!(config.validate().is_ok());
        assert!(WorldConfig::test().validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = WorldConfig::from_toml_str(
            r#"
            [chunk]
            width = 32

            [seed]
            use_random_seed = false
            seed = 99

            [underworld]
            border_tile = "red_rock_hard"

            [underworld.noise]
            kind = "simplex"
            "#,
        )
        .unwrap();

        assert_eq!(config.chunk.width, 32);
        assert_eq!(config.chunk.height, 64);
        assert_eq!(config.resolve_seed(), WorldSeed::new(99));
        assert_eq!(config.underworld.border_tile, Tile::RedRockHard);
        assert_eq!(config.underworld.noise.kind, NoiseKind::Simplex);
        assert_eq!(config.underworld.noise.frequency, 0.03);
        assert_eq!(config.chunk_world_width(), 32.0);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            WorldConfig::from_toml_str("[chunk]\nwidth = 0"),
            Err(ConfigError::NonPositiveDimension { name: "chunk.width", .. })
        ));
        assert!(matches!(
            WorldConfig::from_toml_str("[chunk]\ncell_size = -1.0"),
            Err(ConfigError::NonPositiveDimension { name: "chunk.cell_size", .. })
        ));
        assert!(matches!(
            WorldConfig::from_toml_str("[layers]\noverworld = false\nunderworld = false"),
            Err(ConfigError::InvalidSetting { name: "layers", .. })
        ));
        assert!(matches!(
            WorldConfig::from_toml_str("[overworld]\nbase_height = 1.5"),
            Err(ConfigError::InvalidSetting { name: "overworld.base_height", .. })
        ));
        assert!(matches!(WorldConfig::from_toml_str("[chunk"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_disabled_layer_not_validated() {
        let config = WorldConfig::from_toml_str(
            "[layers]\nunderworld = false\n[underworld]\nrock_below = 0.9",
        )
        .unwrap();
        assert!(!config.layers.underworld);
    }

    #[test]
    fn test_missing_file() {
        let err = WorldConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = WorldConfig::test();
        let text = config.to_toml_string().unwrap();
        assert_eq!(WorldConfig::from_toml_str(&text).unwrap(), config);
    }
}
