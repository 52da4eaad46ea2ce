//! Error types for the tightline core.
//!
//! Only configuration loading can fail hard; everything inside the tick
//! loop recovers locally (default trait fallback, silent no-ops).

use thiserror::Error;

/// Errors raised while loading configuration or species trait tables.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File system errors
    #[error("failed to read `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing errors
    #[error("malformed configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A species table was provided but contained no entries
    #[error("species table is empty")]
    EmptySpeciesTable,
}

/// Result type alias for core configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
