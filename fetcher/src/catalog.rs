//! Component definitions discovered on the configuration search path.
//!
//! Each search-path directory may contain:
//!
//! - `readers/*.toml` with a `[reader]` table,
//! - `writers/*.toml` with a `[writer]` table,
//! - `composites/<sensor>.toml` with `sensor_name` and `[[composites]]`.
//!
//! A component table has a `name`, an optional `requires` list of optional
//! features and an optional `data_files` array. When the same relative file
//! exists in several directories the later directory wins; composites are
//! merged by name across every file for a sensor.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use glob::{Pattern, glob};
use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::component::{DataFileComponent, DataFileDescriptor};
use crate::key::ComponentKind;

/// Errors raised while loading a component definition.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The component requires a feature that is not available.
    #[error("component '{component}' requires unavailable feature '{feature}'")]
    MissingDependency {
        /// Name of the component.
        component: String,
        /// The first missing feature.
        feature: String,
    },

    /// The definition file could not be parsed.
    #[error("malformed component definition {path}: {reason}")]
    Malformed {
        /// The offending file.
        path: Utf8PathBuf,
        /// Parser diagnostic.
        reason: String,
    },

    /// The file system could not be read.
    #[error("failed to read component definitions at {path}")]
    Io {
        /// The path being read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    /// Whether the error means "this component is not available here" and
    /// the component may be skipped.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::MissingDependency { .. } | Self::Malformed { .. })
    }
}

/// Result type alias using [`LoadError`].
pub type Result<T> = std::result::Result<T, LoadError>;

#[derive(Debug, Deserialize)]
struct ComponentTable {
    name: String,
    #[serde(default)]
    requires: Vec<String>,
    #[serde(default)]
    data_files: Vec<DataFileDescriptor>,
}

#[derive(Debug, Deserialize)]
struct ReaderFile {
    reader: ComponentTable,
}

#[derive(Debug, Deserialize)]
struct WriterFile {
    writer: ComponentTable,
}

#[derive(Debug, Deserialize)]
struct CompositeFile {
    sensor_name: String,
    #[serde(default)]
    composites: Vec<ComponentTable>,
}

/// A loaded reader, writer or compositor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDefinition {
    kind: ComponentKind,
    name: String,
    sensor: Option<String>,
    source: Utf8PathBuf,
    data_files: Vec<DataFileDescriptor>,
}

impl ComponentDefinition {
    /// Component name as declared in its table.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sensor the component belongs to; only set for compositors.
    #[must_use]
    pub fn sensor(&self) -> Option<&str> {
        self.sensor.as_deref()
    }

    /// File the definition was loaded from.
    #[must_use]
    pub fn source(&self) -> &Utf8Path {
        &self.source
    }
}

impl DataFileComponent for ComponentDefinition {
    fn component_kind(&self) -> ComponentKind {
        self.kind
    }

    fn data_files(&self) -> &[DataFileDescriptor] {
        &self.data_files
    }
}

/// Component definitions visible through a search path.
///
/// # Examples
///
/// ```
/// use auxdata_fetcher::catalog::ComponentCatalog;
///
/// let dir = tempfile::tempdir().expect("temp dir");
/// let root = camino::Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("UTF-8");
/// std::fs::create_dir_all(root.join("readers")).expect("mkdir");
/// std::fs::write(
///     root.join("readers/seviri.toml"),
///     "[reader]\nname = \"seviri\"\n",
/// )
/// .expect("write");
///
/// let catalog = ComponentCatalog::new(vec![root], Vec::<String>::new());
/// let configs = catalog.reader_configs().expect("listed");
/// let first = configs.first().expect("one reader");
/// let reader = catalog.load_reader(first).expect("loaded");
/// assert_eq!(reader.name(), "seviri");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ComponentCatalog {
    search_path: Vec<Utf8PathBuf>,
    features: BTreeSet<String>,
}

impl ComponentCatalog {
    /// Create a catalog over `search_path`, lowest priority first.
    #[must_use]
    pub fn new<I, S>(search_path: Vec<Utf8PathBuf>, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            search_path,
            features: features.into_iter().map(Into::into).collect(),
        }
    }

    /// Directories searched, lowest priority first.
    #[must_use]
    pub fn search_path(&self) -> &[Utf8PathBuf] {
        &self.search_path
    }

    /// Whether `feature` is available.
    #[must_use]
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }

    /// Reader definition files, sorted by file name.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if a directory cannot be listed.
    pub fn reader_configs(&self) -> Result<Vec<Utf8PathBuf>> {
        Ok(self.shadowed_configs("readers")?.into_values().collect())
    }

    /// Writer definition files, sorted by file name.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if a directory cannot be listed.
    pub fn writer_configs(&self) -> Result<Vec<Utf8PathBuf>> {
        Ok(self.shadowed_configs("writers")?.into_values().collect())
    }

    /// Sensors with at least one compositor file, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if a directory cannot be listed.
    pub fn composite_sensors(&self) -> Result<Vec<String>> {
        let mut sensors = BTreeSet::new();
        for directory in &self.search_path {
            for path in list_toml(&directory.join("composites"))? {
                if let Some(stem) = path.file_stem() {
                    sensors.insert(stem.to_owned());
                }
            }
        }
        Ok(sensors.into_iter().collect())
    }

    /// Load the reader defined in `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Malformed`] for invalid TOML,
    /// [`LoadError::MissingDependency`] when a required feature is missing
    /// and [`LoadError::Io`] when the file cannot be read.
    pub fn load_reader(&self, path: &Utf8Path) -> Result<ComponentDefinition> {
        let file: ReaderFile = parse_file(path)?;
        self.definition(ComponentKind::Readers, file.reader, None, path)
    }

    /// Load the writer defined in `path`.
    ///
    /// # Errors
    ///
    /// As for [`Self::load_reader`].
    pub fn load_writer(&self, path: &Utf8Path) -> Result<ComponentDefinition> {
        let file: WriterFile = parse_file(path)?;
        self.definition(ComponentKind::Writers, file.writer, None, path)
    }

    /// Load every compositor for `sensor`, merged across the search path.
    ///
    /// Compositors are returned sorted by name. Later files replace earlier
    /// compositors with the same name, and compositors requiring unavailable
    /// features are left out.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Malformed`] if any of the sensor's files is
    /// invalid and [`LoadError::Io`] if one cannot be read.
    pub fn load_compositors(&self, sensor: &str) -> Result<Vec<ComponentDefinition>> {
        let file_name = format!("{sensor}.toml");
        let mut merged = BTreeMap::new();
        for directory in &self.search_path {
            let path = directory.join("composites").join(&file_name);
            if !path.is_file() {
                continue;
            }
            let file: CompositeFile = parse_file(&path)?;
            for table in file.composites {
                let name = table.name.clone();
                match self.definition(
                    ComponentKind::Composites,
                    table,
                    Some(file.sensor_name.clone()),
                    &path,
                ) {
                    Ok(definition) => {
                        merged.insert(name, definition);
                    }
                    Err(err @ LoadError::MissingDependency { .. }) => {
                        debug!(target: "auxdata::catalog", "skipping compositor: {err}");
                        merged.remove(&name);
                    }
                    Err(err) => return Err(err),
                }
            }
        }
        Ok(merged.into_values().collect())
    }

    fn definition(
        &self,
        kind: ComponentKind,
        table: ComponentTable,
        sensor: Option<String>,
        source: &Utf8Path,
    ) -> Result<ComponentDefinition> {
        if let Some(missing) = table.requires.iter().find(|f| !self.has_feature(f)) {
            return Err(LoadError::MissingDependency {
                component: table.name,
                feature: missing.clone(),
            });
        }
        Ok(ComponentDefinition {
            kind,
            name: table.name,
            sensor,
            source: source.to_owned(),
            data_files: table.data_files,
        })
    }

    /// Files under `<dir>/<subdir>/*.toml` keyed by file name, later
    /// directories replacing earlier ones.
    fn shadowed_configs(&self, subdir: &str) -> Result<BTreeMap<String, Utf8PathBuf>> {
        let mut configs = BTreeMap::new();
        for directory in &self.search_path {
            for path in list_toml(&directory.join(subdir))? {
                if let Some(name) = path.file_name() {
                    configs.insert(name.to_owned(), path);
                }
            }
        }
        Ok(configs)
    }
}

/// List `*.toml` files directly inside `directory`.
fn list_toml(directory: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    let pattern = format!("{}/*.toml", Pattern::escape(directory.as_str()));
    let walker = glob(&pattern).map_err(|error| LoadError::Io {
        path: directory.to_owned(),
        source: std::io::Error::other(error.to_string()),
    })?;
    let mut files = Vec::new();
    for entry in walker {
        let path = entry.map_err(|error| LoadError::Io {
            path: directory.to_owned(),
            source: error.into_error(),
        })?;
        match Utf8PathBuf::try_from(path) {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(error) => {
                warn!(
                    target: "auxdata::catalog",
                    "ignoring non-UTF-8 path {}",
                    error.into_path_buf().display()
                );
            }
        }
    }
    files.sort();
    Ok(files)
}

fn parse_file<T: serde::de::DeserializeOwned>(path: &Utf8Path) -> Result<T> {
    let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_owned(),
        source,
    })?;
    toml::from_str(&source).map_err(|error| LoadError::Malformed {
        path: path.to_owned(),
        reason: error.to_string(),
    })
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
