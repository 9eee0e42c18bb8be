//! # Cell Lattice
//!
//! A chunk-layer's private grid: `width x height` cells addressed by local
//! `(x, y)`, with `y = 0` at the bottom. A grid knows nothing about its
//! neighbours or its world placement; the owning
//! [`GridOwner`](crate::grid_owner::GridOwner) keeps that.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult, GenerationError, GenerationResult};
use crate::tile::Tile;

/// Local cell coordinate inside one grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    /// Column (0 = left edge of the chunk).
    pub x: usize,
    /// Row (0 = bottom of the chunk).
    pub y: usize,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// A world-space position in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPosition {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}

impl WorldPosition {
    /// The canonical local origin.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Creates a new position.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One lattice cell: an ordered stack of tiles, bottom first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    tiles: Vec<Tile>,
}

impl Cell {
    /// Places a tile on the stack.
    ///
    /// With `below_existing` the tile slides under whatever is already here
    /// (base terrain under decorations); otherwise it goes on top.
    pub fn place(&mut self, tile: Tile, below_existing: bool) {
        if below_existing {
            self.tiles.insert(0, tile);
        } else {
            self.tiles.push(tile);
        }
    }

    /// Tiles in stack order, bottom first.
    #[inline]
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// The top-most tile, if any.
    #[inline]
    #[must_use]
    pub fn top(&self) -> Option<Tile> {
        self.tiles.last().copied()
    }

    /// Returns true if no tile was placed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// A `width x height` lattice of cells, stored column-major so one
/// generation work unit (a column) touches contiguous memory.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    cell_size: f64,
    cells: Vec<Cell>,
}

impl Grid {
    /// Builds an empty lattice.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonPositiveDimension`] if any dimension is zero
    /// or the cell size is not a positive finite number.
    pub fn new(width: usize, height: usize, cell_size: f64) -> ConfigResult<Self> {
        if width == 0 {
            return Err(ConfigError::NonPositiveDimension { name: "grid width", value: 0.0 });
        }
        if height == 0 {
            return Err(ConfigError::NonPositiveDimension { name: "grid height", value: 0.0 });
        }
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(ConfigError::NonPositiveDimension { name: "cell size", value: cell_size });
        }

        Ok(Self {
            width,
            height,
            cell_size,
            cells: vec![Cell::default(); width * height],
        })
    }

    /// Number of columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Cell edge length in world units.
    #[inline]
    #[must_use]
    pub const fn cell_size(&self) -> f64 {
        self.cell_size
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| x * self.height + y)
    }

    /// Gets a cell at local coordinates.
    #[inline]
    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Gets a mutable cell at local coordinates.
    #[inline]
    pub fn cell_mut(&mut self, x: usize, y: usize) -> Option<&mut Cell> {
        let i = self.index(x, y)?;
        Some(&mut self.cells[i])
    }

    /// Places a tile at local coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::CellOutOfBounds`] outside the lattice.
    pub fn place_tile(
        &mut self,
        x: usize,
        y: usize,
        tile: Tile,
        below_existing: bool,
    ) -> GenerationResult<()> {
        let (width, height) = (self.width, self.height);
        let cell = self
            .cell_mut(x, y)
            .ok_or(GenerationError::CellOutOfBounds { x, y, width, height })?;
        cell.place(tile, below_existing);
        Ok(())
    }

    /// The top-most tile of a cell, if any.
    #[inline]
    #[must_use]
    pub fn top_tile(&self, x: usize, y: usize) -> Option<Tile> {
        self.cell(x, y).and_then(Cell::top)
    }

    /// Top tiles of one column, bottom first.
    #[must_use]
    pub fn column(&self, x: usize) -> Vec<Option<Tile>> {
        (0..self.height).map(|y| self.top_tile(x, y)).collect()
    }

    /// Index of the first empty cell above the solid base of a column.
    ///
    /// For overworld columns this is the surface height.
    #[must_use]
    pub fn column_fill_height(&self, x: usize) -> usize {
        (0..self.height)
            .find(|&y| self.cell(x, y).map_or(true, Cell::is_empty))
            .unwrap_or(self.height)
    }

    /// Iterates every non-empty cell in column-major order.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (CellCoord, &Cell)> + '_ {
        self.cells.iter().enumerate().filter(|(_, cell)| !cell.is_empty()).map(|(i, cell)| {
            (CellCoord::new(i / self.height, i % self.height), cell)
        })
    }

    /// Total number of tiles placed.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.cells.iter().map(|cell| cell.tiles.len()).sum()
    }

    /// World position of a cell's lower-left corner, given the grid's origin.
    #[inline]
    #[must_use]
    pub fn cell_world_position(&self, origin: WorldPosition, cell: CellCoord) -> WorldPosition {
        WorldPosition::new(
            origin.x + cell.x as f64 * self.cell_size,
            origin.y + cell.y as f64 * self.cell_size,
        )
    }
}
