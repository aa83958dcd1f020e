use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the process-planning pipeline.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The part file is missing, unreadable, or yields a null/empty shape.
    #[error("failed to load geometry from {path}: {reason}")]
    GeometryLoad { path: PathBuf, reason: String },

    /// A planar section did not complete. Recovered by the extractor.
    #[error("section cut failed: {0}")]
    SectionCut(String),

    /// The material code has no entry in the reference table.
    #[error("unknown material code `{0}`")]
    UnknownMaterial(String),

    /// The selector was handed empty geometry or an empty setup list.
    #[error("invalid planning input: {0}")]
    InvalidPlanningInput(String),

    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised inside the geometry kernel.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to topological lookups.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("wire is not closed")]
    WireNotClosed,

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors related to kernel operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("operation failed: {0}")]
    Failed(String),

    #[error("unsupported configuration: {0}")]
    Unsupported(String),
}

/// Errors raised while reading a part document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed part document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid part document: {0}")]
    Invalid(String),
}

/// Errors raised while loading shop reference data.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid setting `{key}`: {reason}")]
    InvalidSetting { key: String, reason: String },
}

/// Convenience alias for pipeline results.
pub type Result<T> = std::result::Result<T, PlanError>;

/// Convenience alias for kernel results.
pub type KernelResult<T> = std::result::Result<T, KernelError>;
