//! # Grid Owner
//!
//! Owns one chunk-layer: its private lattice, its world placement and the
//! resumable run of its bound generation method.
//!
//! Generation always happens in the canonical local frame (origin at zero),
//! so every index the method computes is chunk-local. The real placement is
//! kept beside the grid and only used when tiles are published.

use std::sync::Arc;

use crate::error::{GenerationError, GenerationResult};
use crate::grid::{Grid, WorldPosition};
use crate::method::{CancellationToken, GenerationMethod, GenerationRun, RunState};
use crate::noise::WorldSeed;
use crate::random::RandomService;

/// Explicit parameters for one chunk-layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridOwnerConfig {
    /// Columns in the grid.
    pub width: usize,
    /// Rows in the grid.
    pub height: usize,
    /// Cell edge length in world units.
    pub cell_size: f64,
    /// World seed handed to the method's random service.
    pub seed: WorldSeed,
    /// Global column of local column 0.
    pub chunk_offset: i64,
    /// World position of the grid's lower-left corner.
    pub origin: WorldPosition,
}

/// A single-use owner of one grid and its generation run.
pub struct GridOwner {
    config: GridOwnerConfig,
    method: Arc<dyn GenerationMethod>,
    grid: Option<Grid>,
    run: Option<GenerationRun>,
}

impl std::fmt::Debug for GridOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridOwner")
            .field("config", &self.config)
            .field("method", &self.method.name())
            .field("run", &self.run)
            .finish_non_exhaustive()
    }
}

impl GridOwner {
    /// Creates an owner. Nothing is allocated until [`GridOwner::generate`].
    #[must_use]
    pub fn new(config: GridOwnerConfig, method: Arc<dyn GenerationMethod>) -> Self {
        Self { config, method, grid: None, run: None }
    }

    /// Builds the empty lattice and binds the method to it.
    ///
    /// # Errors
    ///
    /// Returns a config error for bad dimensions, the method's
    /// initialization error, or [`GenerationError::AlreadyStarted`].
    pub fn generate(&mut self, cancel: CancellationToken) -> GenerationResult<()> {
        if self.grid.is_some() {
            return Err(GenerationError::AlreadyStarted);
        }

        let grid = Grid::new(self.config.width, self.config.height, self.config.cell_size)?;
        let random = RandomService::new(self.config.seed);
        let run =
            GenerationRun::start(self.method.as_ref(), &grid, &random, self.config.chunk_offset, cancel)?;

        self.grid = Some(grid);
        self.run = Some(run);
        Ok(())
    }

    /// Advances the run by up to `max_columns` columns.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::NotStarted`] before [`GridOwner::generate`],
    /// or the method's error.
    pub fn resume(&mut self, max_columns: usize) -> GenerationResult<RunState> {
        match (self.run.as_mut(), self.grid.as_mut()) {
            (Some(run), Some(grid)) => run.resume(grid, max_columns),
            _ => Err(GenerationError::NotStarted),
        }
    }

    /// Drives the run until it completes or observes cancellation.
    ///
    /// # Errors
    ///
    /// Same as [`GridOwner::resume`].
    pub fn run_to_completion(&mut self) -> GenerationResult<RunState> {
        loop {
            match self.resume(self.config.width)? {
                RunState::Suspended => continue,
                done => return Ok(done),
            }
        }
    }

    /// Generates a complete grid synchronously.
    ///
    /// # Errors
    ///
    /// Same as [`GridOwner::generate`] and [`GridOwner::resume`].
    pub fn generate_grid(
        config: GridOwnerConfig,
        method: Arc<dyn GenerationMethod>,
    ) -> GenerationResult<Grid> {
        let mut owner = Self::new(config, method);
        owner.generate(CancellationToken::new())?;
        owner.run_to_completion()?;
        owner.grid.ok_or(GenerationError::NotStarted)
    }

    /// The lattice, once generation started.
    #[inline]
    #[must_use]
    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    /// World position of the grid's lower-left corner.
    #[inline]
    #[must_use]
    pub const fn origin(&self) -> WorldPosition {
        self.config.origin
    }

    /// The owner's parameters.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &GridOwnerConfig {
        &self.config
    }

    /// Name of the bound method.
    #[must_use]
    pub fn method_name(&self) -> &str {
        self.method.name()
    }

    /// `(columns written, columns total)` of the run, if started.
    #[must_use]
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.run.as_ref().map(|run| (run.columns_done(), run.columns_total()))
    }

    /// Requests cooperative cancellation of the run, if started.
    pub fn cancel(&self) {
        if let Some(run) = &self.run {
            run.cancellation().cancel();
        }
    }
}
