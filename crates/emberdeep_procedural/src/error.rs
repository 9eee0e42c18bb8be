//! # Error Types
//!
//! All errors that can occur while configuring or streaming terrain.
//!
//! Cancellation is deliberately absent: a cancelled run is reported through
//! [`crate::method::RunState::Cancelled`], never as an error.

use thiserror::Error;

use crate::chunk_manager::Layer;

/// Errors raised before any cell is touched.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A layer is enabled but has no generation method bound to it.
    #[error("no generation method bound for enabled {0} layer")]
    MissingGenerationMethod(Layer),

    /// A dimension that must be strictly positive was not.
    #[error("{name} must be positive, got {value}")]
    NonPositiveDimension {
        /// Setting name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// A tunable is outside its valid range or inconsistent with another.
    #[error("invalid setting {name}: {reason}")]
    InvalidSetting {
        /// Setting name.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The configuration file could not be parsed.
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration file could not be read.
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reported by a [`crate::host::ChunkHost`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The host refused to create a chunk container.
    #[error("container {name} could not be instantiated: {reason}")]
    InstantiationFailed {
        /// Requested container name.
        name: String,
        /// Host-provided reason.
        reason: String,
    },

    /// A tile was addressed to a container the host does not know.
    #[error("unknown container {0}")]
    UnknownContainer(u64),

    /// The host rejected a tile placement.
    #[error("tile placement rejected: {0}")]
    PlacementRejected(String),
}

/// Errors that abort one chunk-layer generation.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// A method addressed a cell outside its grid.
    #[error("cell ({x}, {y}) outside {width}x{height} grid")]
    CellOutOfBounds {
        /// Requested column.
        x: usize,
        /// Requested row.
        y: usize,
        /// Grid width.
        width: usize,
        /// Grid height.
        height: usize,
    },

    /// The host collaborator failed.
    #[error("host error: {0}")]
    Host(#[from] HostError),

    /// The generation method itself failed.
    #[error("{method} failed: {reason}")]
    Method {
        /// Method name.
        method: String,
        /// Failure description.
        reason: String,
    },

    /// A run was resumed before it was started, or after it failed.
    #[error("generation run is not active")]
    NotStarted,

    /// A single-use grid owner was asked to generate twice.
    #[error("generation already started for this grid")]
    AlreadyStarted,

    /// Setup for the run was invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for generation.
pub type GenerationResult<T> = Result<T, GenerationError>;
