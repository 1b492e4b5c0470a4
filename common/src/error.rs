//! Error types for configuration loading and directory resolution.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while loading configuration or resolving the cache root.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}")]
    Read {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML or does not match the schema.
    #[error("invalid configuration file {path}: {reason}")]
    Parse {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// No data directory was configured and the platform offers no cache
    /// directory to fall back to.
    #[error("could not determine a data directory; set AUXDATA_DATA_DIR or pass --data-dir")]
    NoDataDir,

    /// A platform directory was found but is not valid UTF-8.
    #[error("platform directory {path} is not valid UTF-8")]
    NonUtf8Path {
        /// Lossy rendering of the offending path.
        path: String,
    },
}

/// Result type alias using [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;
