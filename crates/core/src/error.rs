//! Error types shared by the engine crates.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for engine-level failures that are not GPU specific.
#[derive(Error, Debug)]
pub enum Error {
    /// Window creation or management errors
    #[error("Window error: {0}")]
    Window(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Config error in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Configuration parsed but holds a value the engine cannot use
    #[error("Invalid config value: {0}")]
    InvalidConfig(String),
}

/// Result type alias using the engine's Error type.
pub type Result<T> = std::result::Result<T, Error>;
