//! Error types for the daygrid ecosystem.

use thiserror::Error;

/// Errors that can occur at the shell boundary (config, event sources).
/// The layout/navigation engine itself is total and never returns these.
#[derive(Error, Debug)]
pub enum DaygridError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for daygrid operations.
pub type DaygridResult<T> = Result<T, DaygridError>;
