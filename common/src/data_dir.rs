//! Cache root resolution.
//!
//! The data directory is used both as the cache root for downloaded files
//! and as the base location reported to users. Candidates are considered in
//! the following order:
//!
//! 1. The explicit directory supplied by the caller (for example a CLI flag).
//! 2. The `AUXDATA_DATA_DIR` environment variable.
//! 3. The `data_dir` key of `auxdata.toml`.
//! 4. The platform cache directory.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;

use crate::dirs::BaseDirs;
use crate::error::{ConfigError, Result};

/// Source for a resolved data directory.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DataDirSource {
    /// Directory supplied explicitly by the caller.
    ExplicitArgument,
    /// Directory sourced from the `AUXDATA_DATA_DIR` environment variable.
    EnvironmentVariable,
    /// Directory taken from `auxdata.toml`.
    Configuration,
    /// Platform cache directory.
    PlatformDefault,
}

impl fmt::Display for DataDirSource {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExplicitArgument => formatter.write_str("explicit data directory"),
            Self::EnvironmentVariable => formatter.write_str("AUXDATA_DATA_DIR"),
            Self::Configuration => formatter.write_str("configuration data_dir"),
            Self::PlatformDefault => formatter.write_str("platform cache directory"),
        }
    }
}

/// Outcome of data directory resolution including its provenance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DataDirSelection {
    path: Utf8PathBuf,
    source: DataDirSource,
}

impl DataDirSelection {
    /// The resolved directory.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Where the directory came from.
    #[must_use]
    pub const fn source(&self) -> DataDirSource {
        self.source
    }

    /// Consumes the selection, yielding the path.
    #[must_use]
    pub fn into_path(self) -> Utf8PathBuf {
        self.path
    }

    /// Emit a debug log summarising the resolved directory.
    pub fn log_outcome(&self) {
        debug!(
            target: "auxdata::data_dir",
            "resolved {} to `{}`",
            self.source,
            self.path,
        );
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

/// Resolve the cache root.
///
/// `environment` is the raw value of `AUXDATA_DATA_DIR`; whitespace-only
/// values are treated as absent.
///
/// # Errors
///
/// Returns [`ConfigError::NoDataDir`] when no candidate is set and the
/// platform has no cache directory, or [`ConfigError::NonUtf8Path`] when the
/// platform directory cannot be represented as UTF-8.
///
/// # Examples
///
/// ```
/// use auxdata_common::data_dir::{DataDirSource, resolve_data_dir};
/// use auxdata_common::dirs::SystemBaseDirs;
/// use camino::Utf8Path;
///
/// let selection = resolve_data_dir(
///     Some(Utf8Path::new("/tmp/explicit")),
///     Some("/tmp/from-env".to_owned()),
///     None,
///     &SystemBaseDirs,
/// )
/// .expect("explicit directory always resolves");
/// assert_eq!(selection.source(), DataDirSource::ExplicitArgument);
/// ```
pub fn resolve_data_dir(
    explicit: Option<&Utf8Path>,
    environment: Option<String>,
    configuration: Option<&Utf8Path>,
    dirs: &dyn BaseDirs,
) -> Result<DataDirSelection> {
    let candidates = [
        (
            DataDirSource::ExplicitArgument,
            non_blank(explicit.map(Utf8Path::as_str)),
        ),
        (
            DataDirSource::EnvironmentVariable,
            non_blank(environment.as_deref()),
        ),
        (
            DataDirSource::Configuration,
            non_blank(configuration.map(Utf8Path::as_str)),
        ),
    ];

    if let Some((source, path)) = candidates
        .into_iter()
        .find_map(|(source, raw)| raw.map(|path| (source, Utf8PathBuf::from(path))))
    {
        return Ok(DataDirSelection { path, source });
    }

    let platform = dirs.cache_dir().ok_or(ConfigError::NoDataDir)?;
    let path = Utf8PathBuf::from_path_buf(platform).map_err(|path| ConfigError::NonUtf8Path {
        path: path.display().to_string(),
    })?;
    Ok(DataDirSelection {
        path,
        source: DataDirSource::PlatformDefault,
    })
}
