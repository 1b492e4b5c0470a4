//! Error types for registration and retrieval.
//!
//! Usage errors (`MissingUrl`, `MissingFilename`, `UnsafeKey`) and
//! `UnknownKey` indicate a programming or configuration mistake; `Download`
//! and `IntegrityMismatch` describe runtime failures. None of them are retried or swallowed.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::download::DownloadError;
use crate::key::ComponentKind;
use crate::known_hash::KnownHashError;

/// Errors that can occur while registering or retrieving data files.
#[derive(Debug, Error)]
pub enum FetchError {
    /// A data file descriptor has no `url`.
    #[error("data file #{index} of a {component} component has no url")]
    MissingUrl {
        /// Kind of the component declaring the file.
        component: ComponentKind,
        /// Position of the descriptor in the component's list.
        index: usize,
    },

    /// No filename could be derived for a data file.
    #[error("cannot derive a filename for {url}; set `filename` explicitly")]
    MissingFilename {
        /// The URL whose final path segment is empty.
        url: String,
    },

    /// Retrieval was requested for a key that was never registered.
    #[error("unknown cache key '{key}'; the file was never registered")]
    UnknownKey {
        /// The requested key.
        key: String,
    },

    /// A cache key resolves outside the cache root, for example through a
    /// `..` segment or an absolute filename.
    #[error("cache key '{key}' escapes the cache root")]
    UnsafeKey {
        /// The offending key.
        key: String,
    },

    /// The registered hash string could not be parsed.
    #[error("invalid known hash for '{key}': {source}")]
    InvalidKnownHash {
        /// The cache key the hash belongs to.
        key: String,
        /// Why the hash was rejected.
        #[source]
        source: KnownHashError,
    },

    /// Fetching the file from its source failed.
    #[error("failed to download '{key}': {source}")]
    Download {
        /// The cache key being fetched.
        key: String,
        /// The underlying download failure.
        #[source]
        source: DownloadError,
    },

    /// The downloaded bytes do not match the registered hash.
    #[error("integrity check failed for '{key}' from {url}: expected {expected}, got {actual}")]
    IntegrityMismatch {
        /// The cache key being fetched.
        key: String,
        /// The source URL.
        url: String,
        /// The registered hash.
        expected: String,
        /// The hash of the downloaded bytes.
        actual: String,
    },

    /// A cache file system operation failed.
    #[error("cache I/O error at {path}")]
    Io {
        /// The path being accessed.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using [`FetchError`].
pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_key_names_the_key() {
        let err = FetchError::UnknownKey {
            key: "readers/a.dat".to_owned(),
        };
        assert!(err.to_string().contains("readers/a.dat"));
    }

    #[test]
    fn missing_url_names_component_and_position() {
        let err = FetchError::MissingUrl {
            component: ComponentKind::Writers,
            index: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("writers"));
        assert!(msg.contains("#2"));
    }

    #[test]
    fn integrity_mismatch_reports_both_digests() {
        let err = FetchError::IntegrityMismatch {
            key: "readers/a.dat".to_owned(),
            url: "https://example.org/a.dat".to_owned(),
            expected: "sha256:aaaa".to_owned(),
            actual: "sha256:bbbb".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("sha256:aaaa"));
        assert!(msg.contains("sha256:bbbb"));
    }

    #[test]
    fn download_error_preserves_source() {
        let err = FetchError::Download {
            key: "readers/a.dat".to_owned(),
            source: DownloadError::NotFound {
                url: "https://example.org/a.dat".to_owned(),
            },
        };
        assert!(std::error::Error::source(&err).is_some());
    }
}
