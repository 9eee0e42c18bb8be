//! # Generation Methods
//!
//! A generation method is a stateless strategy: it is shared by every chunk
//! (`Arc<dyn GenerationMethod>`) and never mutated. Binding it to one
//! chunk-layer happens in [`GenerationMethod::initialize`], which receives
//! the per-run parameter bundle (grid shape, seeded [`RandomService`], chunk
//! offset) and returns a fresh [`ColumnWriter`] holding whatever the run
//! needs (settings, seeded noise). Writers sample per column, so a run's
//! cost is paid inside the column budget.
//!
//! [`GenerationRun`] drives a writer one whole column at a time:
//!
//! ```text
//! resume(budget) ──► cancelled? ──yes──► Cancelled
//!                        │ no
//!                        ▼
//!              write up to `budget` columns
//!                        │
//!            all columns? ──yes──► Complete
//!                        │ no
//!                        ▼
//!                    Suspended
//! ```
//!
//! The cancellation token is only consulted when a run is resumed, so an
//! abort always lands between columns and never leaves a half-written one.

pub mod overworld;
pub mod underworld;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{GenerationError, GenerationResult};
use crate::grid::Grid;
use crate::random::RandomService;

pub use overworld::{OverworldMethod, OverworldSettings};
pub use underworld::{CavernCell, UnderworldMethod, UnderworldSettings};

/// A pure terrain algorithm.
///
/// Implementations must be pure functions of (seed, global coordinates,
/// settings): the tile written at local column `x` may depend on
/// `chunk_offset + x` but never on `chunk_offset` alone.
pub trait GenerationMethod: fmt::Debug + Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Binds the method to one chunk-layer run.
    ///
    /// `grid` is the freshly built, empty lattice the run will fill.
    ///
    /// # Errors
    ///
    /// Returns an error if the method cannot run on this grid.
    fn initialize(
        &self,
        grid: &Grid,
        random: &RandomService,
        chunk_offset: i64,
    ) -> GenerationResult<Box<dyn ColumnWriter>>;
}

/// Per-run state of a bound method. Writes one whole column per call.
pub trait ColumnWriter: Send {
    /// Fills every cell of column `x`.
    ///
    /// # Errors
    ///
    /// Any error aborts the run; the caller rolls the chunk back.
    fn write_column(&mut self, grid: &mut Grid, x: usize) -> GenerationResult<()>;
}

/// Cooperative cancellation flag, passed by value to each run.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates an untriggered token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Honored the next time the run is resumed.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Returns true once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Outcome of one [`GenerationRun::resume`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// Work remains; resume again later.
    Suspended,
    /// Every column was written.
    Complete,
    /// Cancellation was observed before any further column was written.
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Running,
    Complete,
    Cancelled,
    Failed,
}

/// A resumable generation run over one grid.
pub struct GenerationRun {
    method: String,
    writer: Box<dyn ColumnWriter>,
    width: usize,
    next_column: usize,
    cancel: CancellationToken,
    phase: Phase,
}

impl fmt::Debug for GenerationRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationRun")
            .field("method", &self.method)
            .field("next_column", &self.next_column)
            .field("width", &self.width)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl GenerationRun {
    /// Initializes `method` against `grid` and wraps it in a run.
    ///
    /// # Errors
    ///
    /// Propagates [`GenerationMethod::initialize`] failures.
    pub fn start(
        method: &dyn GenerationMethod,
        grid: &Grid,
        random: &RandomService,
        chunk_offset: i64,
        cancel: CancellationToken,
    ) -> GenerationResult<Self> {
        let writer = method.initialize(grid, random, chunk_offset)?;
        Ok(Self {
            method: method.name().to_owned(),
            writer,
            width: grid.width(),
            next_column: 0,
            cancel,
            phase: Phase::Running,
        })
    }

    /// Writes up to `max_columns` whole columns (at least one), then yields.
    ///
    /// # Errors
    ///
    /// Returns the writer's error, or [`GenerationError::NotStarted`] when
    /// resuming a run that already failed.
    pub fn resume(&mut self, grid: &mut Grid, max_columns: usize) -> GenerationResult<RunState> {
        match self.phase {
            Phase::Complete => return Ok(RunState::Complete),
            Phase::Cancelled => return Ok(RunState::Cancelled),
            Phase::Failed => return Err(GenerationError::NotStarted),
            Phase::Running => {}
        }

        if self.cancel.is_cancelled() {
            self.phase = Phase::Cancelled;
            return Ok(RunState::Cancelled);
        }

        let end = self.next_column.saturating_add(max_columns.max(1)).min(self.width);
        while self.next_column < end {
            if let Err(err) = self.writer.write_column(grid, self.next_column) {
                self.phase = Phase::Failed;
                return Err(err);
            }
            self.next_column += 1;
        }

        if self.next_column >= self.width {
            self.phase = Phase::Complete;
            Ok(RunState::Complete)
        } else {
            Ok(RunState::Suspended)
        }
    }

    /// Name of the bound method.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Columns fully written so far.
    #[inline]
    #[must_use]
    pub const fn columns_done(&self) -> usize {
        self.next_column
    }

    /// Total columns in the run.
    #[inline]
    #[must_use]
    pub const fn columns_total(&self) -> usize {
        self.width
    }

    /// The run's cancellation token.
    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::WorldSeed;
    use crate::tile::Tile;

    /// Fills every column with dirt up to its index, failing at `fail_at`.
    #[derive(Debug)]
    struct Staircase {
        fail_at: Option<usize>,
    }

    struct StaircaseWriter {
        fail_at: Option<usize>,
    }

    impl GenerationMethod for Staircase {
        fn name(&self) -> &str {
            "staircase"
        }

        fn initialize(
            &self,
            _grid: &Grid,
            _random: &RandomService,
            _chunk_offset: i64,
        ) -> GenerationResult<Box<dyn ColumnWriter>> {
            Ok(Box::new(StaircaseWriter { fail_at: self.fail_at }))
        }
    }

    impl ColumnWriter for StaircaseWriter {
        fn write_column(&mut self, grid: &mut Grid, x: usize) -> GenerationResult<()> {
            if Some(x) == self.fail_at {
                return Err(GenerationError::Method {
                    method: "staircase".into(),
                    reason: format!("column {x}"),
                });
            }
            for y in 0..=x.min(grid.height() - 1) {
                grid.place_tile(x, y, Tile::Dirt, true)?;
            }
            Ok(())
        }
    }

    fn start(method: &Staircase, grid: &Grid, cancel: CancellationToken) -> GenerationRun {
        let random = RandomService::new(WorldSeed::new(1));
        GenerationRun::start(method, grid, &random, 0, cancel).unwrap()
    }

    #[test]
    fn test_resume_writes_whole_columns() {
        let mut grid = Grid::new(10, 10, 1.0).unwrap();
        let mut run = start(&Staircase { fail_at: None }, &grid, CancellationToken::new());

        assert_eq!(run.resume(&mut grid, 4).unwrap(), RunState::Suspended);
        assert_eq!(run.columns_done(), 4);
        assert_eq!(grid.column_fill_height(3), 4);
        assert_eq!(grid.column_fill_height(4), 0);

        assert_eq!(run.resume(&mut grid, 4).unwrap(), RunState::Suspended);
        assert_eq!(run.resume(&mut grid, 4).unwrap(), RunState::Complete);
        assert_eq!(run.columns_done(), 10);

        // Resuming a finished run is a no-op.
        assert_eq!(run.resume(&mut grid, 4).unwrap(), RunState::Complete);
    }

    #[test]
    fn test_zero_budget_still_progresses() {
        let mut grid = Grid::new(3, 3, 1.0).unwrap();
        let mut run = start(&Staircase { fail_at: None }, &grid, CancellationToken::new());

        assert_eq!(run.resume(&mut grid, 0).unwrap(), RunState::Suspended);
        assert_eq!(run.columns_done(), 1);
    }

    #[test]
    fn test_cancellation_lands_between_columns() {
        let mut grid = Grid::new(8, 8, 1.0).unwrap();
        let cancel = CancellationToken::new();
        let mut run = start(&Staircase { fail_at: None }, &grid, cancel.clone());

        assert_eq!(run.resume(&mut grid, 3).unwrap(), RunState::Suspended);
        cancel.cancel();
        assert_eq!(run.resume(&mut grid, 3).unwrap(), RunState::Cancelled);
        assert_eq!(run.columns_done(), 3);

        // Columns already written are complete; nothing after them was touched.
        for x in 0..3 {
            assert_eq!(grid.column_fill_height(x), x + 1);
        }
        for x in 3..8 {
            assert_eq!(grid.column_fill_height(x), 0);
        }
        assert_eq!(run.resume(&mut grid, 3).unwrap(), RunState::Cancelled);
    }

    #[test]
    fn test_failure_is_sticky() {
        let mut grid = Grid::new(6, 6, 1.0).unwrap();
        let mut run = start(&Staircase { fail_at: Some(2) }, &grid, CancellationToken::new());

        let err = run.resume(&mut grid, 6).unwrap_err();
        assert!(matches!(err, GenerationError::Method { .. }));
        assert_eq!(run.columns_done(), 2);
        assert!(matches!(run.resume(&mut grid, 6), Err(GenerationError::NotStarted)));
    }

    #[test]
    fn test_token_shared_between_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
