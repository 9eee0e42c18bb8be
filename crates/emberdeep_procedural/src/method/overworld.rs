//! # Overworld Terrain
//!
//! Surface terrain from a 1D heightmap: one fractal noise sample per global
//! column, mapped into `[base_height, 1] * grid_height` and clamped from
//! below by `min_height`.
//!
//! Columns above the mountain threshold get a rock band under the surface
//! and, unless `only_grass_on_top` is set, a rocky grass cap.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult, GenerationResult};
use crate::grid::Grid;
use crate::method::{ColumnWriter, GenerationMethod};
use crate::noise::{CoherentNoise, FractalKind, NoiseKind, NoiseSettings};
use crate::random::RandomService;
use crate::tile::Tile;

/// Tunables for [`OverworldMethod`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverworldSettings {
    /// Heightmap noise.
    pub noise: NoiseSettings,
    /// Multiplier applied to the raw noise before mapping to a height.
    pub amplitude: f64,
    /// Normalized height of the lowest terrain (noise = -1).
    pub base_height: f64,
    /// Absolute lower bound on a column's height, in cells.
    pub min_height: u32,
    /// Rock band thickness under mountain surfaces, in cells.
    pub rock_depth: u32,
    /// Normalized height at which a column counts as mountain.
    pub mountain_threshold: f64,
    /// Cap every column with plain grass, even mountains.
    pub only_grass_on_top: bool,
}

impl Default for OverworldSettings {
    fn default() -> Self {
        Self {
            noise: NoiseSettings {
                kind: NoiseKind::Perlin,
                frequency: 0.03,
                fractal: FractalKind::Fbm,
                octaves: 3,
                lacunarity: 2.0,
                gain: 0.5,
            },
            amplitude: 0.5,
            base_height: 0.4,
            min_height: 5,
            rock_depth: 5,
            mountain_threshold: 0.6,
            only_grass_on_top: true,
        }
    }
}

impl OverworldSettings {
    /// Checks ranges the algorithm relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSetting`] for out-of-range tunables.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.base_height) {
            return Err(ConfigError::InvalidSetting {
                name: "overworld.base_height",
                reason: format!("{} is outside [0, 1]", self.base_height),
            });
        }
        if !self.amplitude.is_finite() || self.amplitude < 0.0 {
            return Err(ConfigError::InvalidSetting {
                name: "overworld.amplitude",
                reason: format!("{} must be a non-negative number", self.amplitude),
            });
        }
        if !self.mountain_threshold.is_finite() {
            return Err(ConfigError::InvalidSetting {
                name: "overworld.mountain_threshold",
                reason: "must be finite".into(),
            });
        }
        self.noise.validate("overworld.noise")
    }

    /// Column height in cells (unrounded) for one noise sample.
    ///
    /// Never below `min_height`, even if that exceeds the grid.
    #[must_use]
    pub fn column_height(&self, noise_value: f64, grid_height: usize) -> f64 {
        let t = ((noise_value * self.amplitude + 1.0) / 2.0).clamp(0.0, 1.0);
        let normalized = self.base_height + (1.0 - self.base_height) * t;
        (normalized * grid_height as f64).max(f64::from(self.min_height))
    }

    /// Surface row count, rounded half to even and clamped to the grid.
    #[must_use]
    pub fn surface(height: f64, grid_height: usize) -> usize {
        let floor = height.floor();
        let rounded = match (height - floor).partial_cmp(&0.5) {
            Some(std::cmp::Ordering::Less) => floor,
            Some(std::cmp::Ordering::Greater) => floor + 1.0,
            _ if floor % 2.0 == 0.0 => floor,
            _ => floor + 1.0,
        };
        // Heights are non-negative by construction.
        (rounded.max(0.0) as usize).min(grid_height)
    }

    /// True if the column's normalized height reaches the mountain threshold.
    #[inline]
    #[must_use]
    pub fn is_mountain(&self, height: f64, grid_height: usize) -> bool {
        height / grid_height as f64 >= self.mountain_threshold
    }

    /// Tile for row `y` of a column with the given surface.
    ///
    /// `y` must be below `surface`.
    #[must_use]
    pub fn column_tile(&self, y: usize, surface: usize, mountain: bool) -> Tile {
        if y + 1 == surface {
            if mountain && !self.only_grass_on_top {
                Tile::GrassOnRock
            } else {
                Tile::Grass
            }
        } else if mountain && y + self.rock_depth as usize >= surface {
            Tile::Rock
        } else {
            Tile::Dirt
        }
    }
}

/// Heightmap surface terrain.
#[derive(Clone, Debug, Default)]
pub struct OverworldMethod {
    settings: OverworldSettings,
}

impl OverworldMethod {
    /// Creates the method with the given tunables.
    #[must_use]
    pub const fn new(settings: OverworldSettings) -> Self {
        Self { settings }
    }

    /// The method's tunables.
    #[inline]
    #[must_use]
    pub const fn settings(&self) -> &OverworldSettings {
        &self.settings
    }

    /// Unrounded column heights for `width` columns starting at global
    /// column `chunk_offset`.
    #[must_use]
    pub fn heightmap(
        &self,
        random: &RandomService,
        chunk_offset: i64,
        width: usize,
        grid_height: usize,
    ) -> Vec<f64> {
        let noise = random.coherent_noise(self.settings.noise);
        (0..width)
            .map(|x| {
                let global_x = (chunk_offset + x as i64) as f64;
                self.settings.column_height(noise.sample(global_x, 0.0), grid_height)
            })
            .collect()
    }
}

impl GenerationMethod for OverworldMethod {
    fn name(&self) -> &str {
        "overworld"
    }

    fn initialize(
        &self,
        _grid: &Grid,
        random: &RandomService,
        chunk_offset: i64,
    ) -> GenerationResult<Box<dyn ColumnWriter>> {
        Ok(Box::new(OverworldWriter {
            settings: self.settings,
            noise: random.coherent_noise(self.settings.noise),
            chunk_offset,
        }))
    }
}

/// Samples each column as it is written, so the column budget covers the
/// noise work too.
struct OverworldWriter {
    settings: OverworldSettings,
    noise: CoherentNoise,
    chunk_offset: i64,
}

impl ColumnWriter for OverworldWriter {
    fn write_column(&mut self, grid: &mut Grid, x: usize) -> GenerationResult<()> {
        let grid_height = grid.height();
        let global_x = (self.chunk_offset + x as i64) as f64;
        let height = self.settings.column_height(self.noise.sample(global_x, 0.0), grid_height);
        let surface = OverworldSettings::surface(height, grid_height);
        let mountain = self.settings.is_mountain(height, grid_height);

        for y in 0..surface {
            grid.place_tile(x, y, self.settings.column_tile(y, surface, mountain), true)?;
        }
        Ok(())
    }
}
