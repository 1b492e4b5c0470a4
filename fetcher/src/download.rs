//! Network fetch primitive for registered data files.
//!
//! Provides a trait-based abstraction for downloading a URL to a local path,
//! enabling dependency injection for testing. [`HttpDownloader`] handles
//! `http`, `https`, and `file` URLs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

/// Default network timeout for a single download.
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for downloading a URL into a file.
///
/// Abstractions allow tests to mock HTTP behaviour without network access.
///
/// # Examples
///
/// ```
/// use auxdata_fetcher::download::HttpDownloader;
///
/// let downloader = HttpDownloader::default();
/// // Use downloader.download(url, dest) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait FileDownloader {
    /// Download `url` and write the body to `dest`, replacing any existing
    /// file.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the resource does not exist, or
    /// the file cannot be written.
    fn download(&self, url: &str, dest: &Path) -> Result<(), DownloadError>;
}

impl<T: FileDownloader + ?Sized> FileDownloader for &T {
    fn download(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        (**self).download(url, dest)
    }
}

/// Errors arising from download operations.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// HTTP request failed.
    #[error("download failed for {url}: {reason}")]
    HttpError {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The requested file was not found (HTTP 404 or missing local file).
    #[error("file not found: {url}")]
    NotFound {
        /// The URL that could not be resolved.
        url: String,
    },

    /// The URL scheme is not one the downloader understands.
    #[error("unsupported URL scheme: {url}")]
    UnsupportedScheme {
        /// The offending URL.
        url: String,
    },

    /// A `file://` URL does not name a local path.
    #[error("not a local file URL: {url}")]
    InvalidFileUrl {
        /// The offending URL.
        url: String,
    },

    /// I/O error writing the downloaded file.
    #[error("I/O error writing download: {0}")]
    Io(#[from] std::io::Error),
}

/// Downloader using a shared `ureq` agent for HTTP(S) and plain file copies
/// for `file://` URLs.
#[derive(Clone)]
pub struct HttpDownloader {
    agent: ureq::Agent,
}

impl std::fmt::Debug for HttpDownloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDownloader").finish_non_exhaustive()
    }
}

impl HttpDownloader {
    /// Create a downloader whose requests time out after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

impl Default for HttpDownloader {
    fn default() -> Self {
        Self::new(DEFAULT_DOWNLOAD_TIMEOUT)
    }
}

impl FileDownloader for HttpDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        match UrlScheme::of(url) {
            Some(UrlScheme::Http) => download_to_file(&self.agent, url, dest),
            Some(UrlScheme::File) => copy_local_file(url, dest),
            None => Err(DownloadError::UnsupportedScheme {
                url: url.to_owned(),
            }),
        }
    }
}

/// URL schemes understood by [`HttpDownloader`].
#[derive(Debug, PartialEq, Eq)]
enum UrlScheme {
    Http,
    File,
}

impl UrlScheme {
    fn of(url: &str) -> Option<Self> {
        let (scheme, _) = url.split_once("://")?;
        match scheme.to_ascii_lowercase().as_str() {
            "http" | "https" => Some(Self::Http),
            "file" => Some(Self::File),
            _ => None,
        }
    }
}

/// Download a URL and write the body to a file.
fn download_to_file(agent: &ureq::Agent, url: &str, dest: &Path) -> Result<(), DownloadError> {
    let response = agent
        .get(url)
        .call()
        .map_err(|e| map_ureq_error(url, &e))?;
    let mut file = std::fs::File::create(dest)?;
    std::io::copy(&mut response.into_body().as_reader(), &mut file).map_err(|e| {
        DownloadError::HttpError {
            url: url.to_owned(),
            reason: e.to_string(),
        }
    })?;
    Ok(())
}

/// Local path named by a `file://` URL.
///
/// Percent-escapes are decoded and an empty or `localhost` host is accepted;
/// any other host is rejected.
fn file_url_path(url: &str) -> Result<PathBuf, DownloadError> {
    let invalid = || DownloadError::InvalidFileUrl {
        url: url.to_owned(),
    };
    let parsed = Url::parse(url).map_err(|_| invalid())?;
    parsed.to_file_path().map_err(|()| invalid())
}

/// Copy the file behind a `file://` URL.
fn copy_local_file(url: &str, dest: &Path) -> Result<(), DownloadError> {
    let source = file_url_path(url)?;
    match std::fs::copy(&source, dest) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(DownloadError::NotFound {
            url: url.to_owned(),
        }),
        Err(e) => Err(DownloadError::Io(e)),
    }
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        other => DownloadError::HttpError {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
