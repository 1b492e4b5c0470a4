//! Download-on-demand retrieval of registered files.
//!
//! The local copy of a file lives at `<cache root>/<cache key>`, with `/` in
//! the key mapped to subdirectories. Retrieval downloads the file when it is
//! missing, downloads it again when a registered hash no longer matches the
//! cached copy, and otherwise returns the cached path without touching the
//! network.
//!
//! Downloads land in a scratch directory next to the destination, are
//! verified there, and are then renamed into place, so a failed download
//! never leaves a partial file at the cache path.

use std::fmt;
use std::time::Duration;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use log::debug;

use crate::download::{DEFAULT_DOWNLOAD_TIMEOUT, FileDownloader, HttpDownloader};
use crate::error::{FetchError, Result};
use crate::key::CacheKey;
use crate::known_hash::KnownHash;
use crate::registry::{FileRegistry, RegistryEntry};

/// Prefix of the scratch directories used for in-flight downloads.
const SCRATCH_PREFIX: &str = ".auxdata-download-";

/// Options applied to every fetch made by a [`Retriever`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Global timeout for a single download.
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_DOWNLOAD_TIMEOUT,
        }
    }
}

/// What [`Retriever::retrieve`] has to do for a given key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchAction {
    /// The file is not cached yet.
    Download,
    /// The cached file does not match the registered hash.
    Update,
    /// The cached file can be used as is.
    Fetch,
}

impl fmt::Display for FetchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Download => f.write_str("download"),
            Self::Update => f.write_str("update"),
            Self::Fetch => f.write_str("fetch"),
        }
    }
}

/// Fetches registered files into a cache directory.
///
/// # Examples
///
/// ```
/// use auxdata_fetcher::registry::FileRegistry;
/// use auxdata_fetcher::retrieve::{FetchOptions, Retriever};
///
/// let cache = tempfile::tempdir().expect("temp dir");
/// let source = cache.path().join("upstream.dat");
/// std::fs::write(&source, b"payload").expect("write source");
///
/// let mut registry = FileRegistry::new();
/// let url = format!("file://{}", source.display());
/// let key = registry
///     .register_file(&url, Some("a.dat"), Some("readers"), None)
///     .expect("filename given");
///
/// let root = camino::Utf8PathBuf::try_from(cache.path().join("cache")).expect("UTF-8");
/// let retriever = Retriever::new(root, &FetchOptions::default());
/// let path = retriever.retrieve(&registry, key.as_str()).expect("retrieved");
/// assert!(path.ends_with("readers/a.dat"));
/// ```
#[derive(Debug)]
pub struct Retriever<D = HttpDownloader> {
    cache_root: Utf8PathBuf,
    downloader: D,
}

impl Retriever<HttpDownloader> {
    /// Create a retriever backed by [`HttpDownloader`].
    #[must_use]
    pub fn new(cache_root: impl Into<Utf8PathBuf>, options: &FetchOptions) -> Self {
        Self::with_downloader(cache_root, HttpDownloader::new(options.timeout))
    }
}

impl<D: FileDownloader> Retriever<D> {
    /// Create a retriever with an injected downloader.
    pub fn with_downloader(cache_root: impl Into<Utf8PathBuf>, downloader: D) -> Self {
        Self {
            cache_root: cache_root.into(),
            downloader,
        }
    }

    /// The cache root directory.
    #[must_use]
    pub fn cache_root(&self) -> &Utf8Path {
        &self.cache_root
    }

    /// Where the file for `key` is stored in the cache.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::UnsafeKey`] if the key is absolute or contains
    /// `..`, since the path would then leave the cache root.
    pub fn local_path(&self, key: &CacheKey) -> Result<Utf8PathBuf> {
        let relative = Utf8Path::new(key.as_str());
        let confined = relative.components().all(|component| {
            matches!(component, Utf8Component::Normal(_) | Utf8Component::CurDir)
        });
        if !confined {
            return Err(FetchError::UnsafeKey {
                key: key.to_string(),
            });
        }
        Ok(self.cache_root.join(relative))
    }

    /// Ensure the file registered under `cache_key` is cached and return its
    /// local path.
    ///
    /// The registry is only read. Unknown keys and malformed hashes are
    /// reported before any network access.
    ///
    /// # Errors
    ///
    /// - [`FetchError::UnknownKey`] if `cache_key` was never registered.
    /// - [`FetchError::UnsafeKey`] if the key would resolve outside the
    ///   cache root.
    /// - [`FetchError::InvalidKnownHash`] if the registered hash cannot be
    ///   parsed.
    /// - [`FetchError::Download`] if the source cannot be fetched.
    /// - [`FetchError::IntegrityMismatch`] if the downloaded bytes do not
    ///   match the registered hash.
    /// - [`FetchError::Io`] for cache file system failures.
    pub fn retrieve(&self, registry: &FileRegistry, cache_key: &str) -> Result<Utf8PathBuf> {
        let (key, entry) =
            registry
                .get_key_value(cache_key)
                .ok_or_else(|| FetchError::UnknownKey {
                    key: cache_key.to_owned(),
                })?;
        let known_hash = parse_known_hash(key, entry)?;
        let path = self.local_path(key)?;

        let action = download_action(&path, known_hash.as_ref())?;
        match action {
            FetchAction::Fetch => {
                debug!(target: "auxdata::retrieve", "using cached '{key}' at {path}");
            }
            FetchAction::Download | FetchAction::Update => {
                debug!(
                    target: "auxdata::retrieve",
                    "{action} '{key}' from {} to {path}",
                    entry.url()
                );
                self.download_verified(key, entry.url(), &path, known_hash.as_ref())?;
            }
        }
        Ok(path)
    }

    /// Download into a scratch directory, verify, and move into place.
    fn download_verified(
        &self,
        key: &CacheKey,
        url: &str,
        path: &Utf8Path,
        known_hash: Option<&KnownHash>,
    ) -> Result<()> {
        let parent = path.parent().unwrap_or(self.cache_root.as_path());
        std::fs::create_dir_all(parent).map_err(|source| FetchError::Io {
            path: parent.to_owned(),
            source,
        })?;
        let scratch = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(parent)
            .map_err(|source| FetchError::Io {
                path: parent.to_owned(),
                source,
            })?;
        let staged = scratch.path().join("payload");

        self.downloader
            .download(url, &staged)
            .map_err(|source| FetchError::Download {
                key: key.to_string(),
                source,
            })?;

        if let Some(expected) = known_hash {
            let actual = expected
                .algorithm()
                .hash_file(&staged)
                .map_err(|source| FetchError::Io {
                    path: path.to_owned(),
                    source,
                })?;
            if !expected.matches_digest(&actual) {
                return Err(FetchError::IntegrityMismatch {
                    key: key.to_string(),
                    url: url.to_owned(),
                    expected: expected.to_string(),
                    actual: format!("{}:{actual}", expected.algorithm()),
                });
            }
        }

        std::fs::rename(&staged, path).map_err(|source| FetchError::Io {
            path: path.to_owned(),
            source,
        })
    }
}

fn parse_known_hash(key: &CacheKey, entry: &RegistryEntry) -> Result<Option<KnownHash>> {
    entry
        .known_hash()
        .map(|raw| {
            KnownHash::parse(raw).map_err(|source| FetchError::InvalidKnownHash {
                key: key.to_string(),
                source,
            })
        })
        .transpose()
}

/// Decide what retrieval must do for the file at `path`.
///
/// # Errors
///
/// Returns [`FetchError::Io`] if an existing file cannot be hashed.
pub fn download_action(path: &Utf8Path, known_hash: Option<&KnownHash>) -> Result<FetchAction> {
    if !path.is_file() {
        return Ok(FetchAction::Download);
    }
    let Some(hash) = known_hash else {
        return Ok(FetchAction::Fetch);
    };
    let matches = hash
        .matches_file(path.as_std_path())
        .map_err(|source| FetchError::Io {
            path: path.to_owned(),
            source,
        })?;
    Ok(if matches {
        FetchAction::Fetch
    } else {
        FetchAction::Update
    })
}

#[cfg(test)]
#[path = "retrieve_tests.rs"]
mod tests;
