//! # EMBERDEEP Procedural Streaming
//!
//! Deterministic, chunked terrain for an endless side-scrolling world.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: same seed and global coordinate, same tile
//! 2. **Chunked**: the world is a row of fixed-size chunks, each with an
//!    overworld layer on top of an underworld layer
//! 3. **Streamable**: chunks are admitted ahead of the viewpoint and evicted
//!    behind it, generation spread over ticks by a column budget
//! 4. **Seamless**: generation samples global coordinates, so neighbouring
//!    chunks meet without a seam
//!
//! ## Core Components
//!
//! - [`CoherentNoise`]: seeded Simplex/Perlin/Value noise with fractal octaves
//! - [`OverworldMethod`], [`UnderworldMethod`]: the terrain algorithms
//! - [`GridOwner`]: one chunk-layer's lattice and resumable generation run
//! - [`ChunkManager`]: admission, generation pump, transition and eviction
//! - [`ChunkHost`]: the tile store the manager publishes to
//!
//! ## Example
//!
//! ```rust
//! use emberdeep_procedural::{ChunkManager, Layer, MemoryHost, WorldConfig};
//!
//! let mut manager = ChunkManager::new(WorldConfig::test(), MemoryHost::new()).unwrap();
//! manager.start().unwrap();
//!
//! // The viewpoint sits at x = 0 until the first pair of chunks is ready.
//! while !manager.is_chunk_ready(1) {
//!     manager.tick(0.0);
//! }
//! assert!(manager.ready_grid(0, Layer::Overworld).is_some());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

pub mod chunk_manager;
pub mod config;
pub mod error;
pub mod grid;
pub mod grid_owner;
pub mod host;
pub mod method;
pub mod noise;
pub mod random;
pub mod tile;

pub use chunk_manager::{
    ChunkFailure, ChunkManager, ChunkRecord, ChunkState, Layer, LayerMethods, LayerState,
    StreamStats, TickReport,
};
pub use config::WorldConfig;
pub use error::{ConfigError, ConfigResult, GenerationError, GenerationResult, HostError};
pub use grid::{Cell, CellCoord, Grid, WorldPosition};
pub use grid_owner::{GridOwner, GridOwnerConfig};
pub use host::{ChunkHost, ContainerId, ContainerSpec, MemoryHost};
pub use method::{
    CancellationToken, CavernCell, ColumnWriter, GenerationMethod, GenerationRun,
    OverworldMethod, OverworldSettings, RunState, UnderworldMethod, UnderworldSettings,
};
pub use noise::{CoherentNoise, FractalKind, NoiseKind, NoiseSettings, WorldSeed};
pub use random::RandomService;
pub use tile::Tile;
