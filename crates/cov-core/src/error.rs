//! Error types for cov-core

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating the toolchain or loading configuration.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Neither a version override nor a Coverity home was supplied
    #[error("No Coverity installation configured (set COVERITY_HOME or a version override)")]
    NoInstallation,

    /// A file could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The VERSION file carries no externalVersion entry
    #[error("No externalVersion entry in {0}")]
    VersionNotFound(PathBuf),

    /// Malformed pipeline configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for cov-core operations
pub type Result<T> = std::result::Result<T, CoreError>;
