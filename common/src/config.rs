//! Configuration for the ancillary data cache.
//!
//! Settings live in `auxdata.toml`. Every field is optional so that an empty
//! (or missing) file yields working defaults; unknown keys are rejected to
//! surface typos early. Environment variables layer on top of the file via
//! the helpers in this module and in [`crate::data_dir`].

use std::ffi::OsString;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use log::warn;
use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Environment variable overriding the cache root.
pub const DATA_DIR_ENV: &str = "AUXDATA_DATA_DIR";

/// Environment variable appending directories to the component search path.
///
/// The value uses the platform path-list syntax (`:` on Unix, `;` on
/// Windows).
pub const CONFIG_PATH_ENV: &str = "AUXDATA_CONFIG_PATH";

/// Top-level configuration.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// Cache root for downloaded files. When absent the resolver falls back
    /// to the environment and then to the platform cache directory.
    pub data_dir: Option<Utf8PathBuf>,
    /// Directories searched for component definitions, lowest precedence
    /// first.
    pub config_path: Vec<Utf8PathBuf>,
    /// Optional features available in this deployment. Components that
    /// require anything else are skipped during discovery.
    pub features: Vec<String>,
    /// Network settings.
    pub download: DownloadConfig,
}

impl DataConfig {
    /// Parse configuration from TOML source.
    ///
    /// `origin` is only used to label errors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the source is not valid TOML or
    /// contains unknown fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use auxdata_common::config::DataConfig;
    /// use camino::Utf8Path;
    ///
    /// let config = DataConfig::from_toml_str(
    ///     "data_dir = \"/srv/auxdata\"\n",
    ///     Utf8Path::new("inline"),
    /// )
    /// .expect("valid configuration");
    /// assert_eq!(config.data_dir.as_deref(), Some(Utf8Path::new("/srv/auxdata")));
    /// ```
    pub fn from_toml_str(source: &str, origin: &Utf8Path) -> Result<Self> {
        toml::from_str(source).map_err(|err| ConfigError::Parse {
            path: origin.to_owned(),
            reason: err.to_string(),
        })
    }

    /// Read and parse the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is malformed.
    pub fn load_from(path: &Utf8Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml_str(&source, path)
    }

    /// Read `path` if it exists, otherwise return the defaults.
    ///
    /// # Errors
    ///
    /// Propagates read and parse failures for a file that does exist.
    pub fn load_or_default(path: &Utf8Path) -> Result<Self> {
        if path.is_file() {
            Self::load_from(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Component search path with entries from `environment` appended.
    ///
    /// `environment` is the raw value of [`CONFIG_PATH_ENV`]. Blank entries
    /// and entries that are not valid UTF-8 are ignored.
    #[must_use]
    pub fn search_path(&self, environment: Option<&OsString>) -> Vec<Utf8PathBuf> {
        let mut search_path = self.config_path.clone();
        if let Some(raw) = environment {
            search_path.extend(std::env::split_paths(raw).filter_map(|entry| {
                if entry.as_os_str().is_empty() {
                    return None;
                }
                Utf8PathBuf::from_path_buf(entry)
                    .map_err(|entry| {
                        warn!(
                            target: "auxdata::config",
                            "ignoring non UTF-8 {CONFIG_PATH_ENV} entry {}",
                            entry.display()
                        );
                    })
                    .ok()
            }));
        }
        search_path
    }
}

/// Network settings for downloads.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DownloadConfig {
    /// Global timeout for a single download, in seconds.
    #[serde(default = "DownloadConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl DownloadConfig {
    const fn default_timeout_secs() -> u64 {
        30
    }

    /// The configured timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}
