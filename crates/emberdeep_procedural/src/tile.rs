//! # Tiles
//!
//! Tile identifiers written by the generation methods.
//!
//! The host maps these to whatever visual or physical tile it renders;
//! the core only deals in identifiers.

use serde::{Deserialize, Serialize};

/// A tile identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u16)]
pub enum Tile {
    /// Surface grass.
    Grass = 1,
    /// Grass capping a rocky mountain column.
    GrassOnRock = 2,
    /// Mountain rock below the surface.
    Rock = 3,
    /// Ordinary sub-surface soil.
    Dirt = 4,
    /// Hardest cavern rock.
    RedRockHard = 5,
    /// Softer cavern rock (also the default cavern border).
    RedRock = 6,
    /// Cavern sand.
    RedSand = 7,
}

impl Tile {
    /// Every tile, in identifier order.
    pub const ALL: [Self; 7] = [
        Self::Grass,
        Self::GrassOnRock,
        Self::Rock,
        Self::Dirt,
        Self::RedRockHard,
        Self::RedRock,
        Self::RedSand,
    ];

    /// Returns the numeric identifier.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u16 {
        self as u16
    }

    /// Converts from a numeric identifier.
    #[must_use]
    pub const fn from_id(id: u16) -> Option<Self> {
        match id {
            1 => Some(Self::Grass),
            2 => Some(Self::GrassOnRock),
            3 => Some(Self::Rock),
            4 => Some(Self::Dirt),
            5 => Some(Self::RedRockHard),
            6 => Some(Self::RedRock),
            7 => Some(Self::RedSand),
            _ => None,
        }
    }

    /// Human-readable tile name, as hosts usually key their tile assets.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Grass => "Grass",
            Self::GrassOnRock => "GrassOnRock",
            Self::Rock => "Rock",
            Self::Dirt => "Dirt",
            Self::RedRockHard => "RedRockHard",
            Self::RedRock => "RedRock",
            Self::RedSand => "RedSand",
        }
    }

    /// Returns true for tiles that cap a surface column.
    #[inline]
    #[must_use]
    pub const fn is_surface(self) -> bool {
        matches!(self, Self::Grass | Self::GrassOnRock)
    }
}

impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
