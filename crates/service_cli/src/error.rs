//! CLI error type.

use thiserror::Error;

/// Errors surfaced to the command line.
#[derive(Debug, Error)]
pub enum CliError {
    /// Plan file could not be found.
    #[error("plan file not found: {0}")]
    FileNotFound(String),

    /// Underlying I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Plan file failed to parse as TOML.
    #[error("plan file parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Plan file parsed but a field is invalid.
    #[error("invalid plan field {field}: {reason}")]
    InvalidField {
        /// Offending field path.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Simulation engine rejected the run.
    #[error(transparent)]
    Engine(#[from] plan_engine::EngineError),

    /// Result could not be serialised for output.
    #[error("output serialisation error: {0}")]
    Output(#[from] serde_json::Error),

    /// Bad command-line argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// CLI result alias.
pub type Result<T> = std::result::Result<T, CliError>;
