//! # Chunk Manager
//!
//! Streams an endless row of chunks past a moving viewpoint.
//!
//! ## Tick
//!
//! Each [`ChunkManager::tick`] runs, in order:
//!
//! 1. **Re-anchor**: a viewpoint that jumped outside `[current, next]`
//!    resets both counters around it.
//! 2. **Admission**: the current chunk if missing, and the next one once the
//!    viewpoint is within `lookahead_distance` of its start.
//! 3. **Pump**: in-flight runs advance round-robin within the tick's column
//!    budget. A layer whose run completes is published to the host.
//! 4. **Transition**: once the viewpoint crosses into a ready next chunk, the
//!    counters advance. The chunk behind is evicted if it has left the
//!    retention window.
//! 5. **Retention**: anything outside `[v - retain_behind, v + retain_ahead]`
//!    is evicted, `current` and `next` excepted.
//!
//! ## Admission Protocol
//!
//! An index is reserved in the generating set before any container exists.
//! Every exit path (ready, failed, cancelled, evicted) releases it, and a
//! failed or cancelled chunk leaves no record and no container behind.
//!
//! A layer reaches the host only once its run is complete, so the host never
//! sees a half-written layer.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::WorldConfig;
use crate::error::{ConfigError, ConfigResult, GenerationError, GenerationResult};
use crate::grid::{Grid, WorldPosition};
use crate::grid_owner::{GridOwner, GridOwnerConfig};
use crate::host::{ChunkHost, ContainerId, ContainerSpec};
use crate::method::{CancellationToken, GenerationMethod, OverworldMethod, RunState, UnderworldMethod};
use crate::noise::WorldSeed;

/// A vertical terrain layer of a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// Surface heightmap terrain.
    Overworld,
    /// Cavern terrain below the surface.
    Underworld,
}

impl Layer {
    /// Every layer, top first.
    pub const ALL: [Self; 2] = [Self::Overworld, Self::Underworld];

    /// Capitalized name used in container names.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Overworld => "Overworld",
            Self::Underworld => "Underworld",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Overworld => "overworld",
            Self::Underworld => "underworld",
        })
    }
}

/// Lifecycle of one chunk-layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerState {
    /// Not admitted, or the layer is disabled.
    NotRequested,
    /// Run in flight; nothing published yet.
    Generating,
    /// Run complete and published to the host.
    Ready,
    /// Evicted; its container is gone.
    Destroyed,
}

/// Lifecycle of a whole chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChunkState {
    /// No record (never admitted, evicted, or rolled back).
    Absent,
    /// At least one enabled layer still generating.
    Generating,
    /// Every enabled layer ready.
    Ready,
}

/// Generation methods bound to each layer.
#[derive(Clone, Default)]
pub struct LayerMethods {
    /// Surface method.
    pub overworld: Option<Arc<dyn GenerationMethod>>,
    /// Cavern method.
    pub underworld: Option<Arc<dyn GenerationMethod>>,
}

impl LayerMethods {
    /// The stock methods built from the config's terrain settings.
    #[must_use]
    pub fn from_config(config: &WorldConfig) -> Self {
        Self {
            overworld: Some(Arc::new(OverworldMethod::new(config.overworld))),
            underworld: Some(Arc::new(UnderworldMethod::new(config.underworld))),
        }
    }

    /// Method bound to a layer.
    #[must_use]
    pub fn get(&self, layer: Layer) -> Option<&Arc<dyn GenerationMethod>> {
        match layer {
            Layer::Overworld => self.overworld.as_ref(),
            Layer::Underworld => self.underworld.as_ref(),
        }
    }
}

impl fmt::Debug for LayerMethods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerMethods")
            .field("overworld", &self.overworld.as_ref().map(|m| m.name().to_owned()))
            .field("underworld", &self.underworld.as_ref().map(|m| m.name().to_owned()))
            .finish()
    }
}

#[derive(Debug)]
struct LayerSlot {
    layer: Layer,
    state: LayerState,
    owner: GridOwner,
    container: ContainerId,
    wake_at: u64,
}

impl LayerSlot {
    fn columns_done(&self) -> usize {
        self.owner.progress().map_or(0, |(done, _)| done)
    }
}

/// One admitted chunk and its layers.
#[derive(Debug)]
pub struct ChunkRecord {
    index: i64,
    layers: Vec<LayerSlot>,
    cancel: CancellationToken,
    admitted_at: Instant,
}

impl ChunkRecord {
    /// Chunk index.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> i64 {
        self.index
    }

    /// State of one layer. Disabled layers report `NotRequested`.
    #[must_use]
    pub fn layer_state(&self, layer: Layer) -> LayerState {
        self.slot(layer).map_or(LayerState::NotRequested, |slot| slot.state)
    }

    /// True once every enabled layer is ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.layers.iter().all(|slot| slot.state == LayerState::Ready)
    }

    /// A layer's grid, only once that layer is ready.
    #[must_use]
    pub fn grid(&self, layer: Layer) -> Option<&Grid> {
        self.slot(layer)
            .filter(|slot| slot.state == LayerState::Ready)
            .and_then(|slot| slot.owner.grid())
    }

    /// A layer's host container.
    #[must_use]
    pub fn container(&self, layer: Layer) -> Option<ContainerId> {
        self.slot(layer).map(|slot| slot.container)
    }

    /// Layers this chunk carries.
    pub fn layers(&self) -> impl Iterator<Item = Layer> + '_ {
        self.layers.iter().map(|slot| slot.layer)
    }

    fn slot(&self, layer: Layer) -> Option<&LayerSlot> {
        self.layers.iter().find(|slot| slot.layer == layer)
    }
}

/// A chunk that failed during admission or generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkFailure {
    /// Chunk index.
    pub index: i64,
    /// Rendered error.
    pub message: String,
}

/// What one tick did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// Chunk index the viewpoint is in.
    pub viewpoint_index: i64,
    /// Indices admitted this tick.
    pub admitted: Vec<i64>,
    /// Indices that became ready this tick.
    pub completed: Vec<i64>,
    /// Indices evicted this tick.
    pub evicted: Vec<i64>,
    /// Indices rolled back after an error.
    pub failed: Vec<ChunkFailure>,
    /// Indices rolled back after cancellation.
    pub cancelled: Vec<i64>,
    /// Columns written by all runs.
    pub columns_written: usize,
    /// The current/next pair advanced.
    pub transitioned: bool,
    /// The current/next pair was reset around the viewpoint.
    pub reanchored: bool,
}

/// Running totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Ticks run.
    pub ticks: u64,
    /// Chunks admitted.
    pub admitted: u64,
    /// Chunks that became ready.
    pub generated: u64,
    /// Chunks evicted.
    pub evicted: u64,
    /// Chunks rolled back after an error.
    pub failed: u64,
    /// Chunks rolled back after cancellation.
    pub cancelled: u64,
    /// Transitions committed.
    pub transitions: u64,
    /// Re-anchors.
    pub reanchors: u64,
    /// Columns written.
    pub columns_written: u64,
    /// Tiles published to the host.
    pub tiles_published: u64,
}

enum Interrupt {
    Failed(GenerationError),
    Cancelled,
}

/// Drives chunk admission, generation and eviction for one world.
pub struct ChunkManager<H: ChunkHost> {
    config: WorldConfig,
    seed: WorldSeed,
    methods: LayerMethods,
    host: H,
    active: BTreeMap<i64, ChunkRecord>,
    generating: BTreeSet<i64>,
    current: i64,
    next: i64,
    cursor: Option<i64>,
    warned_not_ready: Option<i64>,
    started: bool,
    stats: StreamStats,
}

impl<H: ChunkHost> fmt::Debug for ChunkManager<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkManager")
            .field("seed", &self.seed)
            .field("current", &self.current)
            .field("next", &self.next)
            .field("active", &self.active.keys().collect::<Vec<_>>())
            .field("generating", &self.generating)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<H: ChunkHost> ChunkManager<H> {
    /// Creates a manager with the stock terrain methods.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the config does not validate.
    pub fn new(config: WorldConfig, host: H) -> ConfigResult<Self> {
        let methods = LayerMethods::from_config(&config);
        let seed = config.resolve_seed();
        Self::with_methods(config, seed, methods, host)
    }

    /// Creates a manager with explicit methods and seed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingGenerationMethod`] if an enabled layer
    /// has no method, or any validation error of the config.
    pub fn with_methods(
        config: WorldConfig,
        seed: WorldSeed,
        methods: LayerMethods,
        host: H,
    ) -> ConfigResult<Self> {
        config.validate()?;
        for layer in Layer::ALL {
            if Self::layer_enabled(&config, layer) && methods.get(layer).is_none() {
                return Err(ConfigError::MissingGenerationMethod(layer));
            }
        }

        let current = config.streaming.initial_index;
        Ok(Self {
            config,
            seed,
            methods,
            host,
            active: BTreeMap::new(),
            generating: BTreeSet::new(),
            current,
            next: current + 1,
            cursor: None,
            warned_not_ready: None,
            started: false,
            stats: StreamStats::default(),
        })
    }

    const fn layer_enabled(config: &WorldConfig, layer: Layer) -> bool {
        match layer {
            Layer::Overworld => config.layers.overworld,
            Layer::Underworld => config.layers.underworld,
        }
    }

    /// Admits the initial `(current, next)` pair. Later calls do nothing.
    ///
    /// # Errors
    ///
    /// Returns the first admission failure; the failed index is already
    /// rolled back and will be retried by [`ChunkManager::tick`].
    pub fn start(&mut self) -> GenerationResult<()> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        tracing::info!(
            "Streaming world with seed {} from chunk {}",
            self.seed.value(),
            self.current
        );

        let first = self.request_chunk(self.current);
        let second = self.request_chunk(self.next);
        first?;
        second?;
        Ok(())
    }

    /// Admits a chunk and starts generating its enabled layers.
    ///
    /// Returns `Ok(false)` without side effects if the index is already
    /// active or in flight.
    ///
    /// # Errors
    ///
    /// Returns the host or setup error. Every container created for the
    /// index has been destroyed and the reservation released.
    pub fn request_chunk(&mut self, index: i64) -> GenerationResult<bool> {
        if self.active.contains_key(&index) || !self.generating.insert(index) {
            tracing::debug!(chunk = index, "Chunk already active or generating");
            return Ok(false);
        }

        match self.admit(index) {
            Ok(record) => {
                self.active.insert(index, record);
                self.stats.admitted += 1;
                tracing::debug!(chunk = index, "Chunk admitted");
                Ok(true)
            }
            Err(err) => {
                self.generating.remove(&index);
                self.stats.failed += 1;
                tracing::error!(chunk = index, "Chunk admission failed: {}", err);
                Err(err)
            }
        }
    }

    fn admit(&mut self, index: i64) -> GenerationResult<ChunkRecord> {
        let mut record = ChunkRecord {
            index,
            layers: Vec::with_capacity(Layer::ALL.len()),
            cancel: CancellationToken::new(),
            admitted_at: Instant::now(),
        };

        for layer in Layer::ALL {
            if !Self::layer_enabled(&self.config, layer) {
                continue;
            }
            let Some(method) = self.methods.get(layer).cloned() else {
                Self::destroy_containers(&mut self.host, &mut record);
                return Err(ConfigError::MissingGenerationMethod(layer).into());
            };

            let spec = self.container_spec(layer, index);
            let container = match self.host.instantiate(&spec) {
                Ok(container) => container,
                Err(err) => {
                    Self::destroy_containers(&mut self.host, &mut record);
                    return Err(err.into());
                }
            };

            let mut owner = GridOwner::new(
                GridOwnerConfig {
                    width: self.config.chunk.width,
                    height: self.config.chunk.height,
                    cell_size: self.config.chunk.cell_size,
                    seed: self.seed,
                    chunk_offset: self.chunk_offset(index),
                    origin: spec.position,
                },
                method,
            );
            let started = owner.generate(record.cancel.clone());
            record.layers.push(LayerSlot {
                layer,
                state: LayerState::Generating,
                owner,
                container,
                wake_at: 0,
            });
            if let Err(err) = started {
                Self::destroy_containers(&mut self.host, &mut record);
                return Err(err);
            }
        }

        Ok(record)
    }

    /// Requests cooperative cancellation of an in-flight chunk.
    ///
    /// The chunk is rolled back the next time one of its runs is resumed.
    /// Returns false if the index is not generating.
    pub fn cancel_chunk(&mut self, index: i64) -> bool {
        if !self.generating.contains(&index) {
            return false;
        }
        match self.active.get(&index) {
            Some(record) => {
                record.cancel.cancel();
                tracing::debug!(chunk = index, "Chunk cancellation requested");
                true
            }
            None => false,
        }
    }

    /// Advances the world for a viewpoint at `viewpoint_x`.
    pub fn tick(&mut self, viewpoint_x: f64) -> TickReport {
        self.stats.ticks += 1;
        let viewpoint_index = self.chunk_index_at(viewpoint_x);
        let mut report = TickReport { tick: self.stats.ticks, viewpoint_index, ..TickReport::default() };

        if !self.started {
            self.started = true;
            tracing::info!("Streaming world with seed {}", self.seed.value());
        }

        if viewpoint_index > self.next || viewpoint_index < self.current {
            tracing::info!(
                "Re-anchoring from chunk {} to {}",
                self.current,
                viewpoint_index
            );
            self.current = viewpoint_index;
            self.next = viewpoint_index + 1;
            self.stats.reanchors += 1;
            report.reanchored = true;
        }

        if !self.is_present(self.current) {
            self.admit_into(self.current, &mut report);
        }
        let next_start = self.chunk_start_x(self.next);
        if next_start - viewpoint_x <= self.config.streaming.lookahead_distance
            && !self.is_present(self.next)
        {
            self.admit_into(self.next, &mut report);
        }

        self.pump(&mut report);
        self.check_transition(viewpoint_x, viewpoint_index, &mut report);
        self.sweep(viewpoint_index, &mut report);

        report
    }

    fn admit_into(&mut self, index: i64, report: &mut TickReport) {
        match self.request_chunk(index) {
            Ok(true) => report.admitted.push(index),
            Ok(false) => {}
            Err(err) => report.failed.push(ChunkFailure { index, message: err.to_string() }),
        }
    }

    fn check_transition(&mut self, viewpoint_x: f64, viewpoint_index: i64, report: &mut TickReport) {
        let current_end = self.chunk_start_x(self.current + 1);
        if current_end - viewpoint_x > self.config.streaming.transition_margin {
            return;
        }

        if !self.is_chunk_ready(self.next) {
            if self.warned_not_ready != Some(self.next) {
                tracing::warn!(chunk = self.next, "Next chunk not ready at transition margin");
                self.warned_not_ready = Some(self.next);
            }
            return;
        }

        if viewpoint_x >= current_end {
            // The chunk behind only goes once it leaves the retention window.
            let behind = self.current - 1;
            let low = viewpoint_index - i64::from(self.config.streaming.retain_behind);
            if behind < low && self.evict(behind) {
                report.evicted.push(behind);
            }
            self.current += 1;
            self.next += 1;
            self.stats.transitions += 1;
            report.transitioned = true;
            tracing::debug!(current = self.current, next = self.next, "Chunk transition");
        }
    }

    fn sweep(&mut self, viewpoint_index: i64, report: &mut TickReport) {
        let low = viewpoint_index - i64::from(self.config.streaming.retain_behind);
        let high = viewpoint_index + i64::from(self.config.streaming.retain_ahead);
        let stale: Vec<i64> = self
            .active
            .keys()
            .chain(self.generating.iter())
            .copied()
            .filter(|&i| (i < low || i > high) && i != self.current && i != self.next)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        for index in stale {
            if self.evict(index) {
                report.evicted.push(index);
            }
        }
    }

    fn pump(&mut self, report: &mut TickReport) {
        let mut budget = self.config.streaming.columns_per_tick;

        // Round-robin: start after the last chunk served.
        let order: Vec<i64> = match self.cursor {
            Some(cursor) => self
                .generating
                .range(cursor + 1..)
                .chain(self.generating.range(..=cursor))
                .copied()
                .collect(),
            None => self.generating.iter().copied().collect(),
        };

        loop {
            let mut progressed = false;
            for &index in &order {
                if budget == 0 {
                    break;
                }
                if self.generating.contains(&index) {
                    progressed |= self.pump_chunk(index, &mut budget, report);
                    self.cursor = Some(index);
                }
            }
            if !progressed || budget == 0 {
                break;
            }
        }
    }

    fn pump_chunk(&mut self, index: i64, budget: &mut usize, report: &mut TickReport) -> bool {
        let Some(mut record) = self.active.remove(&index) else {
            self.generating.remove(&index);
            return false;
        };

        let tick = self.stats.ticks;
        let per_yield = self.config.streaming.columns_per_yield;
        let delay = u64::from(self.config.streaming.yield_delay_ticks);
        let mut progressed = false;
        let mut interrupt = None;

        for slot in &mut record.layers {
            if *budget == 0 {
                break;
            }
            if slot.state != LayerState::Generating || slot.wake_at > tick {
                continue;
            }

            let before = slot.columns_done();
            let state = match slot.owner.resume(per_yield.min(*budget)) {
                Ok(state) => state,
                Err(err) => {
                    interrupt = Some(Interrupt::Failed(err));
                    break;
                }
            };
            let written = slot.columns_done() - before;
            *budget = budget.saturating_sub(written);
            report.columns_written += written;
            self.stats.columns_written += written as u64;
            progressed |= written > 0;

            match state {
                RunState::Suspended => {
                    slot.wake_at = if delay == 0 { tick } else { tick + delay + 1 };
                }
                RunState::Complete => {
                    match Self::publish(&mut self.host, slot) {
                        Ok(tiles) => self.stats.tiles_published += tiles,
                        Err(err) => {
                            interrupt = Some(Interrupt::Failed(err));
                            break;
                        }
                    }
                    slot.state = LayerState::Ready;
                    progressed = true;
                    tracing::debug!(chunk = index, layer = %slot.layer, "Layer ready");
                }
                RunState::Cancelled => {
                    interrupt = Some(Interrupt::Cancelled);
                    break;
                }
            }
        }

        match interrupt {
            Some(Interrupt::Failed(err)) => {
                Self::destroy_containers(&mut self.host, &mut record);
                self.generating.remove(&index);
                self.stats.failed += 1;
                tracing::error!(chunk = index, "Chunk generation failed: {}", err);
                report.failed.push(ChunkFailure { index, message: err.to_string() });
                true
            }
            Some(Interrupt::Cancelled) => {
                Self::destroy_containers(&mut self.host, &mut record);
                self.generating.remove(&index);
                self.stats.cancelled += 1;
                tracing::debug!(chunk = index, "Chunk generation cancelled");
                report.cancelled.push(index);
                true
            }
            None => {
                if record.is_ready() {
                    self.generating.remove(&index);
                    self.stats.generated += 1;
                    report.completed.push(index);
                    tracing::info!(
                        chunk = index,
                        elapsed_ms = record.admitted_at.elapsed().as_millis() as u64,
                        "Chunk ready"
                    );
                }
                self.active.insert(index, record);
                progressed
            }
        }
    }

    /// Publishes a completed layer, bottom to top. Returns tiles placed.
    fn publish(host: &mut H, slot: &LayerSlot) -> GenerationResult<u64> {
        let grid = slot.owner.grid().ok_or(GenerationError::NotStarted)?;
        let mut placed = 0;
        for (coord, cell) in grid.occupied_cells() {
            for &tile in cell.tiles() {
                host.place_tile(slot.container, coord, tile, false)?;
                placed += 1;
            }
        }
        Ok(placed)
    }

    fn destroy_containers(host: &mut H, record: &mut ChunkRecord) {
        for slot in &mut record.layers {
            host.destroy(slot.container);
            slot.state = LayerState::Destroyed;
        }
    }

    /// Evicts a chunk, ready or in flight. Returns false if it was absent.
    pub fn evict(&mut self, index: i64) -> bool {
        let was_generating = self.generating.remove(&index);
        let Some(mut record) = self.active.remove(&index) else {
            return was_generating;
        };

        record.cancel.cancel();
        Self::destroy_containers(&mut self.host, &mut record);
        self.stats.evicted += 1;
        tracing::debug!(chunk = index, in_flight = was_generating, "Chunk evicted");
        true
    }

    /// Destroys every container and forgets every chunk.
    pub fn shutdown(&mut self) {
        let indices: Vec<i64> = self.active.keys().copied().collect();
        for index in &indices {
            if let Some(mut record) = self.active.remove(index) {
                record.cancel.cancel();
                Self::destroy_containers(&mut self.host, &mut record);
            }
        }
        self.generating.clear();
        self.cursor = None;
        self.warned_not_ready = None;
        self.started = false;
        tracing::info!("Chunk manager shut down, {} chunks released", indices.len());
    }

    fn container_spec(&self, layer: Layer, index: i64) -> ContainerSpec {
        let chunk = &self.config.chunk;
        let y = match layer {
            Layer::Overworld => 0.0,
            Layer::Underworld => -(chunk.height as f64 + self.config.layers.gap) * chunk.cell_size,
        };
        ContainerSpec {
            name: ContainerSpec::container_name(layer, index),
            layer,
            chunk_index: index,
            position: WorldPosition::new(self.chunk_start_x(index), y),
            width: chunk.width,
            height: chunk.height,
            cell_size: chunk.cell_size,
        }
    }

    /// Global column of a chunk's first column.
    #[inline]
    #[must_use]
    pub fn chunk_offset(&self, index: i64) -> i64 {
        index * self.config.chunk.width as i64
    }

    /// World X of a chunk's left edge.
    #[inline]
    #[must_use]
    pub fn chunk_start_x(&self, index: i64) -> f64 {
        index as f64 * self.config.chunk_world_width()
    }

    /// Chunk index containing world X.
    #[inline]
    #[must_use]
    pub fn chunk_index_at(&self, x: f64) -> i64 {
        (x / self.config.chunk_world_width()).floor() as i64
    }

    fn is_present(&self, index: i64) -> bool {
        self.active.contains_key(&index) || self.generating.contains(&index)
    }

    /// Lifecycle of a chunk.
    #[must_use]
    pub fn chunk_state(&self, index: i64) -> ChunkState {
        match self.active.get(&index) {
            None => ChunkState::Absent,
            Some(record) if record.is_ready() => ChunkState::Ready,
            Some(_) => ChunkState::Generating,
        }
    }

    /// Lifecycle of one layer of a chunk.
    #[must_use]
    pub fn layer_state(&self, index: i64, layer: Layer) -> LayerState {
        self.active.get(&index).map_or(LayerState::NotRequested, |record| record.layer_state(layer))
    }

    /// True once every enabled layer of the chunk is ready.
    #[must_use]
    pub fn is_chunk_ready(&self, index: i64) -> bool {
        self.chunk_state(index) == ChunkState::Ready
    }

    /// A layer's grid, only once that layer is ready.
    #[must_use]
    pub fn ready_grid(&self, index: i64, layer: Layer) -> Option<&Grid> {
        self.active.get(&index)?.grid(layer)
    }

    /// An admitted chunk.
    #[must_use]
    pub fn chunk(&self, index: i64) -> Option<&ChunkRecord> {
        self.active.get(&index)
    }

    /// Indices with a record, ascending.
    #[must_use]
    pub fn active_indices(&self) -> Vec<i64> {
        self.active.keys().copied().collect()
    }

    /// Indices reserved for generation, ascending.
    #[must_use]
    pub fn generating_indices(&self) -> Vec<i64> {
        self.generating.iter().copied().collect()
    }

    /// The chunk the walk is in.
    #[inline]
    #[must_use]
    pub const fn current_index(&self) -> i64 {
        self.current
    }

    /// The chunk the walk moves into next.
    #[inline]
    #[must_use]
    pub const fn next_index(&self) -> i64 {
        self.next
    }

    /// Running totals.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> &StreamStats {
        &self.stats
    }

    /// The world seed.
    #[inline]
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// The configuration in use.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The host.
    #[inline]
    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably.
    #[inline]
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}
