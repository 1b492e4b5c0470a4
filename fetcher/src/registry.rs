//! Registry of downloadable files.
//!
//! Registration is pure bookkeeping: it records where a file can be fetched
//! from and how to verify it, without touching the network or the cache.
//! The registry is an ordinary owned value; sharing it between threads is up
//! to the caller (for example behind a `Mutex`).

use std::collections::BTreeMap;

use log::debug;

use crate::key::{CacheKey, generate_key};

/// Source URL and optional integrity hash of a registered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    url: String,
    known_hash: Option<String>,
}

impl RegistryEntry {
    /// Where the file is downloaded from.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The algorithm-prefixed hash, if one was registered.
    ///
    /// The string is stored as given and only validated on retrieval.
    #[must_use]
    pub fn known_hash(&self) -> Option<&str> {
        self.known_hash.as_deref()
    }
}

/// Mapping from cache key to [`RegistryEntry`].
///
/// Iteration is ordered by cache key.
///
/// # Examples
///
/// ```
/// use auxdata_fetcher::registry::FileRegistry;
///
/// let mut registry = FileRegistry::new();
/// let key = registry
///     .register_file("https://example.org/a.dat", Some("a.dat"), Some("readers"), None)
///     .expect("filename given");
/// assert_eq!(key.as_str(), "readers/a.dat");
/// assert_eq!(registry.get("readers/a.dat").map(|e| e.url()), Some("https://example.org/a.dat"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FileRegistry {
    entries: BTreeMap<CacheKey, RegistryEntry>,
}

impl FileRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file for later retrieval.
    ///
    /// Returns the cache key to pass to the retriever, or `None` (with no
    /// change to the registry) when `filename` is `None`. Registering an
    /// existing key replaces its URL and hash.
    pub fn register_file(
        &mut self,
        url: &str,
        filename: Option<&str>,
        component_type: Option<&str>,
        known_hash: Option<&str>,
    ) -> Option<CacheKey> {
        let key = generate_key(filename, component_type)?;
        debug!(target: "auxdata::registry", "registering '{key}' from {url}");
        let entry = RegistryEntry {
            url: url.to_owned(),
            known_hash: known_hash.map(str::to_owned),
        };
        self.entries.insert(key.clone(), entry);
        Some(key)
    }

    /// Look up the entry for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RegistryEntry> {
        self.entries.get(key)
    }

    /// Look up `key`, returning the stored key alongside its entry.
    #[must_use]
    pub fn get_key_value(&self, key: &str) -> Option<(&CacheKey, &RegistryEntry)> {
        self.entries.get_key_value(key)
    }

    /// Whether `key` has been registered.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.entries.keys()
    }

    /// Registered entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&CacheKey, &RegistryEntry)> {
        self.entries.iter()
    }

    /// Number of registered files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
