//! # Chunk Host
//!
//! The boundary to whatever stores and renders tiles. The streaming core
//! only ever asks a host to create a chunk container, put a tile in one of
//! its cells, or destroy it.
//!
//! [`MemoryHost`] is a recording host used by the demo binary, the
//! benchmarks and the tests. It can be told to reject specific containers
//! to exercise rollback.

use std::collections::{BTreeMap, BTreeSet};

use crate::chunk_manager::Layer;
use crate::error::HostError;
use crate::grid::{CellCoord, WorldPosition};
use crate::tile::Tile;

/// Opaque handle to a host-side chunk container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(pub u64);

/// Everything a host needs to create one chunk-layer container.
#[derive(Clone, Debug, PartialEq)]
pub struct ContainerSpec {
    /// Display name, `Chunk_<Layer>_<index>`.
    pub name: String,
    /// Layer the container holds.
    pub layer: Layer,
    /// Chunk index.
    pub chunk_index: i64,
    /// World position of the container's lower-left corner.
    pub position: WorldPosition,
    /// Columns.
    pub width: usize,
    /// Rows.
    pub height: usize,
    /// Cell edge length in world units.
    pub cell_size: f64,
}

impl ContainerSpec {
    /// Canonical container name for a chunk-layer.
    #[must_use]
    pub fn container_name(layer: Layer, chunk_index: i64) -> String {
        format!("Chunk_{}_{chunk_index}", layer.title())
    }
}

/// The external tile store.
pub trait ChunkHost {
    /// Creates a container.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::InstantiationFailed`] if the host refuses.
    fn instantiate(&mut self, spec: &ContainerSpec) -> Result<ContainerId, HostError>;

    /// Places a tile in a container cell, under or over what is there.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown containers or rejected placements.
    fn place_tile(
        &mut self,
        container: ContainerId,
        cell: CellCoord,
        tile: Tile,
        below_existing: bool,
    ) -> Result<(), HostError>;

    /// Destroys a container and everything in it. Unknown ids are ignored.
    fn destroy(&mut self, container: ContainerId);
}

/// One container recorded by [`MemoryHost`].
#[derive(Clone, Debug)]
pub struct MemoryContainer {
    /// Creation parameters.
    pub spec: ContainerSpec,
    /// Tile stacks by cell, bottom first.
    pub cells: BTreeMap<CellCoord, Vec<Tile>>,
}

impl MemoryContainer {
    /// Top tile of a cell.
    #[must_use]
    pub fn top_tile(&self, cell: CellCoord) -> Option<Tile> {
        self.cells.get(&cell).and_then(|stack| stack.last().copied())
    }

    /// Number of tiles placed.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }
}

/// An in-memory recording host.
#[derive(Debug, Default)]
pub struct MemoryHost {
    next_id: u64,
    containers: BTreeMap<ContainerId, MemoryContainer>,
    reject_instantiate: BTreeSet<String>,
    reject_placement: BTreeSet<String>,
    instantiated: u64,
    destroyed: u64,
    placements: u64,
}

impl MemoryHost {
    /// Creates an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every future `instantiate` of a container with this name fail.
    pub fn reject_instantiation(&mut self, name: impl Into<String>) {
        self.reject_instantiate.insert(name.into());
    }

    /// Makes every future tile placement into a container with this name fail.
    pub fn reject_placement(&mut self, name: impl Into<String>) {
        self.reject_placement.insert(name.into());
    }

    /// Clears all injected failures.
    pub fn clear_rejections(&mut self) {
        self.reject_instantiate.clear();
        self.reject_placement.clear();
    }

    /// A live container by id.
    #[must_use]
    pub fn container(&self, id: ContainerId) -> Option<&MemoryContainer> {
        self.containers.get(&id)
    }

    /// A live container by name.
    #[must_use]
    pub fn container_named(&self, name: &str) -> Option<&MemoryContainer> {
        self.containers.values().find(|c| c.spec.name == name)
    }

    /// Names of every live container, sorted.
    #[must_use]
    pub fn live_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.containers.values().map(|c| c.spec.name.clone()).collect();
        names.sort();
        names
    }

    /// Number of live containers.
    #[inline]
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.containers.len()
    }

    /// Containers ever created.
    #[inline]
    #[must_use]
    pub const fn instantiated(&self) -> u64 {
        self.instantiated
    }

    /// Containers ever destroyed.
    #[inline]
    #[must_use]
    pub const fn destroyed(&self) -> u64 {
        self.destroyed
    }

    /// Tiles ever placed.
    #[inline]
    #[must_use]
    pub const fn placements(&self) -> u64 {
        self.placements
    }
}

impl ChunkHost for MemoryHost {
    fn instantiate(&mut self, spec: &ContainerSpec) -> Result<ContainerId, HostError> {
        if self.reject_instantiate.contains(&spec.name) {
            return Err(HostError::InstantiationFailed {
                name: spec.name.clone(),
                reason: "rejected by host".into(),
            });
        }

        self.next_id += 1;
        let id = ContainerId(self.next_id);
        self.containers.insert(id, MemoryContainer { spec: spec.clone(), cells: BTreeMap::new() });
        self.instantiated += 1;
        Ok(id)
    }

    fn place_tile(
        &mut self,
        container: ContainerId,
        cell: CellCoord,
        tile: Tile,
        below_existing: bool,
    ) -> Result<(), HostError> {
        let entry = self.containers.get_mut(&container).ok_or(HostError::UnknownContainer(container.0))?;
        if self.reject_placement.contains(&entry.spec.name) {
            return Err(HostError::PlacementRejected(format!("{tile} into {}", entry.spec.name)));
        }
        if cell.x >= entry.spec.width || cell.y >= entry.spec.height {
            return Err(HostError::PlacementRejected(format!(
                "cell ({}, {}) outside {}",
                cell.x, cell.y, entry.spec.name
            )));
        }

        let stack = entry.cells.entry(cell).or_default();
        if below_existing {
            stack.insert(0, tile);
        } else {
            stack.push(tile);
        }
        self.placements += 1;
        Ok(())
    }

    fn destroy(&mut self, container: ContainerId) {
        if self.containers.remove(&container).is_some() {
            self.destroyed += 1;
        }
    }
}
