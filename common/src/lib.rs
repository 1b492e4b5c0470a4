//! Shared configuration for the auxdata cache: the `auxdata.toml` schema,
//! platform directory lookup, environment overrides, and cache root
//! resolution.

pub mod config;
pub mod data_dir;
pub mod dirs;
pub mod environment;
pub mod error;

pub use config::{CONFIG_PATH_ENV, DATA_DIR_ENV, DataConfig, DownloadConfig};
pub use data_dir::{DataDirSelection, DataDirSource, resolve_data_dir};
pub use dirs::{BaseDirs, CONFIG_FILE_NAME, SystemBaseDirs};
pub use environment::Environment;
pub use error::ConfigError;
