//! Integration contract for components that declare data files.
//!
//! A component exposes its data files as a list of [`DataFileDescriptor`]s
//! and registers them with [`DataFileComponent::register_data_files`]. The
//! cache key namespace comes from [`DataFileComponent::component_kind`].

use serde::Deserialize;

use crate::error::{FetchError, Result};
use crate::key::{CacheKey, ComponentKind};
use crate::registry::FileRegistry;

/// One downloadable file declared by a component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataFileDescriptor {
    /// Source URL. Required; a descriptor without one is rejected at
    /// registration.
    pub url: Option<String>,
    /// Name of the cached file. Defaults to the last segment of `url`.
    pub filename: Option<String>,
    /// Algorithm-prefixed hash such as `sha256:<hex>`.
    pub known_hash: Option<String>,
}

impl DataFileDescriptor {
    /// Describe the file at `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Override the cached filename.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Attach an integrity hash.
    #[must_use]
    pub fn with_known_hash(mut self, known_hash: impl Into<String>) -> Self {
        self.known_hash = Some(known_hash.into());
        self
    }

    /// The filename the file is cached under, if one can be determined.
    ///
    /// # Examples
    ///
    /// ```
    /// use auxdata_fetcher::component::DataFileDescriptor;
    ///
    /// let descriptor = DataFileDescriptor::new("https://example.org/luts/a.dat?raw=1");
    /// assert_eq!(descriptor.resolved_filename(), Some("a.dat"));
    ///
    /// let renamed = descriptor.with_filename("custom.dat");
    /// assert_eq!(renamed.resolved_filename(), Some("custom.dat"));
    /// ```
    #[must_use]
    pub fn resolved_filename(&self) -> Option<&str> {
        match self.filename.as_deref() {
            Some(name) => Some(name).filter(|name| !name.is_empty()),
            None => self.url.as_deref().and_then(url_basename),
        }
    }
}

/// Final path segment of `url` with any query string or fragment removed.
fn url_basename(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().filter(|segment| !segment.is_empty())
}

/// A component whose data files can be registered for download.
pub trait DataFileComponent {
    /// Namespace used for this component's cache keys.
    ///
    /// The default guesses from the implementing type's name; override it
    /// whenever the kind is known.
    fn component_kind(&self) -> ComponentKind {
        ComponentKind::infer_from_name(std::any::type_name::<Self>())
    }

    /// Data files declared by this component.
    fn data_files(&self) -> &[DataFileDescriptor];

    /// Register `data_files`, or [`Self::data_files`] when `None`.
    ///
    /// Returns the cache keys in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::MissingUrl`] for a descriptor without a URL and
    /// [`FetchError::MissingFilename`] when no filename can be derived.
    /// Descriptors before the failing one stay registered.
    fn register_data_files(
        &self,
        registry: &mut FileRegistry,
        data_files: Option<&[DataFileDescriptor]>,
    ) -> Result<Vec<CacheKey>> {
        let kind = self.component_kind();
        let descriptors = data_files.unwrap_or_else(|| self.data_files());
        let mut keys = Vec::with_capacity(descriptors.len());
        for (index, descriptor) in descriptors.iter().enumerate() {
            let url = descriptor
                .url
                .as_deref()
                .ok_or(FetchError::MissingUrl {
                    component: kind,
                    index,
                })?;
            let filename = descriptor
                .resolved_filename()
                .ok_or_else(|| FetchError::MissingFilename {
                    url: url.to_owned(),
                })?;
            let key = registry
                .register_file(
                    url,
                    Some(filename),
                    Some(kind.label()),
                    descriptor.known_hash.as_deref(),
                )
                .ok_or_else(|| FetchError::MissingFilename {
                    url: url.to_owned(),
                })?;
            keys.push(key);
        }
        Ok(keys)
    }
}
