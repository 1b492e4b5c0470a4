//! Command execution for `auxdata-fetch`.
//!
//! A [`Session`] combines the configuration file, the `AUXDATA_*`
//! environment variables and the command-line flags into the catalog, cache
//! root and fetch options a command runs with. Flags take precedence over the
//! environment, which takes precedence over the configuration file.

use std::io::Write;

use auxdata_common::{
    BaseDirs, ConfigError, DataConfig, DataDirSelection, Environment, resolve_data_dir,
};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use thiserror::Error;

use crate::catalog::ComponentCatalog;
use crate::cli::{Cli, Command};
use crate::discovery::{DiscoveryError, find_registerable_files, retrieve_all};
use crate::download::FileDownloader;
use crate::error::FetchError;
use crate::registry::FileRegistry;
use crate::retrieve::{FetchOptions, Retriever};

/// Errors surfaced by the command-line tool.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded or resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Component discovery or bulk retrieval failed.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// Retrieving a single file failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Result type alias using [`CliError`].
pub type Result<T> = std::result::Result<T, CliError>;

/// Resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct Session {
    catalog: ComponentCatalog,
    data_dir: DataDirSelection,
    options: FetchOptions,
}

impl Session {
    /// Resolve settings from `cli`, the configuration file and
    /// `environment`.
    ///
    /// `--config` must name an existing file; the platform default
    /// configuration file is optional.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Config`] if the configuration file cannot be read
    /// or parsed, or if no cache root can be determined.
    pub fn resolve(cli: &Cli, dirs: &dyn BaseDirs, environment: &Environment) -> Result<Self> {
        let config = load_config(cli.config.as_deref(), dirs)?;

        let mut search_path = config.search_path(environment.config_path.as_ref());
        search_path.extend(cli.config_path.iter().cloned());
        let features = config.features.iter().chain(&cli.features).cloned();
        let catalog = ComponentCatalog::new(search_path, features);

        let data_dir = resolve_data_dir(
            cli.data_dir.as_deref(),
            environment.data_dir.clone(),
            config.data_dir.as_deref(),
            dirs,
        )?;
        data_dir.log_outcome();

        let options = FetchOptions {
            timeout: config.download.timeout(),
        };
        Ok(Self {
            catalog,
            data_dir,
            options,
        })
    }

    /// Component catalog built from the merged search path and features.
    #[must_use]
    pub const fn catalog(&self) -> &ComponentCatalog {
        &self.catalog
    }

    /// Cache root and where it came from.
    #[must_use]
    pub const fn data_dir(&self) -> &DataDirSelection {
        &self.data_dir
    }

    /// Options for downloads made in this session.
    #[must_use]
    pub const fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Run `command`, writing its results to `stdout`.
    ///
    /// - `list` prints every registered cache key.
    /// - `retrieve` prints the local path of the requested key.
    /// - `all` prints the local path of every registered key.
    ///
    /// # Errors
    ///
    /// Returns the first discovery, retrieval or output failure.
    pub fn execute<D: FileDownloader>(
        &self,
        command: &Command,
        downloader: D,
        stdout: &mut dyn Write,
    ) -> Result<()> {
        let mut registry = FileRegistry::new();
        let retriever = Retriever::with_downloader(self.data_dir.path(), downloader);
        match command {
            Command::List => {
                for key in find_registerable_files(&self.catalog, &mut registry)? {
                    writeln!(stdout, "{key}")?;
                }
            }
            Command::Retrieve { key } => {
                find_registerable_files(&self.catalog, &mut registry)?;
                let path = retriever.retrieve(&registry, key)?;
                writeln!(stdout, "{path}")?;
            }
            Command::All => {
                for path in retrieve_all(&self.catalog, &mut registry, &retriever)? {
                    writeln!(stdout, "{path}")?;
                }
            }
        }
        Ok(())
    }
}

/// Load `explicit`, or the platform configuration file when it exists.
fn load_config(explicit: Option<&Utf8Path>, dirs: &dyn BaseDirs) -> Result<DataConfig> {
    if let Some(path) = explicit {
        debug!(target: "auxdata::config", "loading configuration from {path}");
        return Ok(DataConfig::load_from(path)?);
    }
    let Some(default_file) = dirs.config_file() else {
        return Ok(DataConfig::default());
    };
    let path = Utf8PathBuf::from_path_buf(default_file).map_err(|path| {
        ConfigError::NonUtf8Path {
            path: path.display().to_string(),
        }
    })?;
    debug!(target: "auxdata::config", "looking for configuration at {path}");
    Ok(DataConfig::load_or_default(&path)?)
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
