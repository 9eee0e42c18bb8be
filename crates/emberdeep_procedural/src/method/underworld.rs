//! # Underworld Caverns
//!
//! Threshold terrain over a 2D noise field. Each interior cell compares its
//! sample against an ascending ladder of cut-points:
//!
//! ```text
//!  -1 ── hard_rock_below ── rock_below ── sand_below ── cavity_below ── 1
//!   RedRockHard │  RedRock  │  RedSand   │  (cavity)   │  (open)
//! ```
//!
//! Every cut-point is exclusive on its own band: a value equal to
//! `rock_below` is already sand. The two upper bands both leave the cell
//! empty. A frame of `border_thickness` cells around the chunk is always
//! filled with the border tile.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult, GenerationResult};
use crate::grid::Grid;
use crate::method::{ColumnWriter, GenerationMethod};
use crate::noise::{CoherentNoise, FractalKind, NoiseKind, NoiseSettings};
use crate::random::RandomService;
use crate::tile::Tile;

/// Band a cavern sample falls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CavernCell {
    /// Below `hard_rock_below`.
    HardRock,
    /// In `[hard_rock_below, rock_below)`.
    Rock,
    /// In `[rock_below, sand_below)`.
    Sand,
    /// In `[sand_below, cavity_below)`. Empty.
    Cavity,
    /// At or above `cavity_below`. Empty.
    Open,
}

impl CavernCell {
    /// Tile placed for this band, if any.
    #[must_use]
    pub const fn tile(self) -> Option<Tile> {
        match self {
            Self::HardRock => Some(Tile::RedRockHard),
            Self::Rock => Some(Tile::RedRock),
            Self::Sand => Some(Tile::RedSand),
            Self::Cavity | Self::Open => None,
        }
    }
}

/// Tunables for [`UnderworldMethod`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnderworldSettings {
    /// Cavern noise.
    pub noise: NoiseSettings,
    /// Multiplier applied to each sample before classification.
    pub amplitude: f64,
    /// Upper (exclusive) bound of the hard rock band.
    pub hard_rock_below: f64,
    /// Upper (exclusive) bound of the rock band.
    pub rock_below: f64,
    /// Upper (exclusive) bound of the sand band.
    pub sand_below: f64,
    /// Upper (exclusive) bound of the cavity band.
    pub cavity_below: f64,
    /// Width of the solid frame around the chunk, in cells.
    pub border_thickness: usize,
    /// Tile used for the frame.
    pub border_tile: Tile,
}

impl Default for UnderworldSettings {
    fn default() -> Self {
        Self {
            noise: NoiseSettings {
                kind: NoiseKind::Perlin,
                frequency: 0.05,
                fractal: FractalKind::Fbm,
                octaves: 3,
                lacunarity: 2.0,
                gain: 0.5,
            },
            amplitude: 1.0,
            hard_rock_below: -0.3,
            rock_below: 0.2,
            sand_below: 0.5,
            cavity_below: 0.7,
            border_thickness: 2,
            border_tile: Tile::RedRock,
        }
    }
}

impl UnderworldSettings {
    /// Checks that the cut-points ascend and the noise is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSetting`] otherwise.
    pub fn validate(&self) -> ConfigResult<()> {
        let ladder = [self.hard_rock_below, self.rock_below, self.sand_below, self.cavity_below];
        if ladder.iter().any(|v| !v.is_finite()) || ladder.windows(2).any(|w| w[0] > w[1]) {
            return Err(ConfigError::InvalidSetting {
                name: "underworld.thresholds",
                reason: format!("cut-points must ascend, got {ladder:?}"),
            });
        }
        if !self.amplitude.is_finite() {
            return Err(ConfigError::InvalidSetting {
                name: "underworld.amplitude",
                reason: "must be finite".into(),
            });
        }
        self.noise.validate("underworld.noise")
    }

    /// Classifies one (amplitude-scaled) sample.
    #[must_use]
    pub fn classify(&self, value: f64) -> CavernCell {
        if value < self.hard_rock_below {
            CavernCell::HardRock
        } else if value < self.rock_below {
            CavernCell::Rock
        } else if value < self.sand_below {
            CavernCell::Sand
        } else if value < self.cavity_below {
            CavernCell::Cavity
        } else {
            CavernCell::Open
        }
    }

    /// True if `(x, y)` lies in the frame of a `width x height` chunk.
    #[inline]
    #[must_use]
    pub const fn is_border(&self, x: usize, y: usize, width: usize, height: usize) -> bool {
        let t = self.border_thickness;
        x < t || y < t || x.saturating_add(t) >= width || y.saturating_add(t) >= height
    }
}

/// Threshold cavern terrain.
#[derive(Clone, Debug, Default)]
pub struct UnderworldMethod {
    settings: UnderworldSettings,
}

impl UnderworldMethod {
    /// Creates the method with the given tunables.
    #[must_use]
    pub const fn new(settings: UnderworldSettings) -> Self {
        Self { settings }
    }

    /// The method's tunables.
    #[inline]
    #[must_use]
    pub const fn settings(&self) -> &UnderworldSettings {
        &self.settings
    }
}

impl GenerationMethod for UnderworldMethod {
    fn name(&self) -> &str {
        "underworld"
    }

    fn initialize(
        &self,
        _grid: &Grid,
        random: &RandomService,
        chunk_offset: i64,
    ) -> GenerationResult<Box<dyn ColumnWriter>> {
        Ok(Box::new(UnderworldWriter {
            settings: self.settings,
            noise: random.coherent_noise(self.settings.noise),
            chunk_offset,
        }))
    }
}

/// Samples each column as it is written, so the column budget covers the
/// noise work too.
struct UnderworldWriter {
    settings: UnderworldSettings,
    noise: CoherentNoise,
    chunk_offset: i64,
}

impl ColumnWriter for UnderworldWriter {
    fn write_column(&mut self, grid: &mut Grid, x: usize) -> GenerationResult<()> {
        let (width, height) = (grid.width(), grid.height());
        let global_x = (self.chunk_offset + x as i64) as f64;
        for y in 0..height {
            let tile = if self.settings.is_border(x, y, width, height) {
                Some(self.settings.border_tile)
            } else {
                let value = self.noise.sample(global_x, y as f64) * self.settings.amplitude;
                self.settings.classify(value).tile()
            };
            if let Some(tile) = tile {
                grid.place_tile(x, y, tile, true)?;
            }
        }
        Ok(())
    }
}
