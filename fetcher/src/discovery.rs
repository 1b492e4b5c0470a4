//! Bulk discovery and prefetch of every declared data file.
//!
//! Discovery loads each compositor, reader and writer in the catalog only to
//! register its data files. Components that are unavailable in this
//! environment are skipped; anything else aborts the run.

use camino::Utf8PathBuf;
use log::{debug, info};
use thiserror::Error;

use crate::catalog::{ComponentCatalog, ComponentDefinition, LoadError};
use crate::component::DataFileComponent;
use crate::download::FileDownloader;
use crate::error::FetchError;
use crate::key::CacheKey;
use crate::registry::FileRegistry;
use crate::retrieve::Retriever;

/// Errors raised by [`find_registerable_files`] and [`retrieve_all`].
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A component could not be loaded for a reason other than being
    /// unavailable.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Registration or retrieval failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Result type alias using [`DiscoveryError`].
pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Register the data files of every component in `catalog`.
///
/// Compositors are processed first (sensor by sensor), then readers, then
/// writers. Returns every key in `registry`, sorted, including keys
/// registered before the call.
///
/// # Errors
///
/// Returns [`DiscoveryError::Load`] for file system failures while loading
/// and [`DiscoveryError::Fetch`] for invalid data file declarations.
pub fn find_registerable_files(
    catalog: &ComponentCatalog,
    registry: &mut FileRegistry,
) -> Result<Vec<CacheKey>> {
    for sensor in catalog.composite_sensors()? {
        match catalog.load_compositors(&sensor) {
            Ok(compositors) => register_all(&compositors, registry)?,
            Err(err) => skip_unavailable(&format!("compositors for {sensor}"), err)?,
        }
    }
    for path in catalog.reader_configs()? {
        match catalog.load_reader(&path) {
            Ok(reader) => register_all(std::slice::from_ref(&reader), registry)?,
            Err(err) => skip_unavailable(path.as_str(), err)?,
        }
    }
    for path in catalog.writer_configs()? {
        match catalog.load_writer(&path) {
            Ok(writer) => register_all(std::slice::from_ref(&writer), registry)?,
            Err(err) => skip_unavailable(path.as_str(), err)?,
        }
    }
    Ok(registry.keys().cloned().collect())
}

/// Discover every data file and make sure each one is cached.
///
/// Logs one `info` record per key before retrieving it and a final one when
/// everything is done. The first failure stops the run.
///
/// # Errors
///
/// As for [`find_registerable_files`], plus any [`FetchError`] raised by
/// [`Retriever::retrieve`].
pub fn retrieve_all<D: FileDownloader>(
    catalog: &ComponentCatalog,
    registry: &mut FileRegistry,
    retriever: &Retriever<D>,
) -> Result<Vec<Utf8PathBuf>> {
    let keys = find_registerable_files(catalog, registry)?;
    let mut paths = Vec::with_capacity(keys.len());
    for key in &keys {
        info!(target: "auxdata::discovery", "Downloading extra data file '{key}'...");
        paths.push(retriever.retrieve(registry, key.as_str())?);
    }
    info!(target: "auxdata::discovery", "Done downloading all extra files.");
    Ok(paths)
}

fn register_all(components: &[ComponentDefinition], registry: &mut FileRegistry) -> Result<()> {
    for component in components {
        component.register_data_files(registry, None)?;
    }
    Ok(())
}

fn skip_unavailable(what: &str, err: LoadError) -> Result<()> {
    if err.is_unavailable() {
        debug!(target: "auxdata::discovery", "skipping {what}: {err}");
        Ok(())
    } else {
        Err(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::MockFileDownloader;
    use std::fs;
    use tempfile::TempDir;

    fn catalog_root() -> (TempDir, Utf8PathBuf) {
        let temp = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 path");
        (temp, root)
    }

    fn write(root: &camino::Utf8Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().expect("has parent")).expect("create dirs");
        fs::write(path, contents).expect("write definition");
    }

    #[test]
    fn registers_every_available_component() {
        let (_temp, root) = catalog_root();
        write(
            &root,
            "readers/seviri.toml",
            "[reader]\nname = \"seviri\"\ndata_files = [{ url = \"https://x/coeffs.dat\" }]\n",
        );
        write(
            &root,
            "readers/needs_hdf5.toml",
            "[reader]\nname = \"h5\"\nrequires = [\"hdf5\"]\ndata_files = [{ url = \"https://x/h5.dat\" }]\n",
        );
        write(&root, "readers/broken.toml", "[reader\n");
        write(
            &root,
            "writers/geotiff.toml",
            "[writer]\nname = \"geotiff\"\ndata_files = [{ url = \"https://x/palette.txt\" }]\n",
        );
        write(
            &root,
            "composites/visir.toml",
            "sensor_name = \"visir\"\n[[composites]]\nname = \"true_color\"\ndata_files = [{ url = \"https://x/rayleigh.h5\" }]\n",
        );
        let catalog = ComponentCatalog::new(vec![root], Vec::<String>::new());
        let mut registry = FileRegistry::new();

        let keys = find_registerable_files(&catalog, &mut registry).expect("discovered");

        assert_eq!(
            keys,
            vec![
                "composites/rayleigh.h5",
                "readers/coeffs.dat",
                "writers/palette.txt"
            ]
        );
    }

    #[test]
    fn empty_catalog_registers_nothing() {
        let (_temp, root) = catalog_root();
        let catalog = ComponentCatalog::new(vec![root], Vec::<String>::new());
        let mut registry = FileRegistry::new();

        let keys = find_registerable_files(&catalog, &mut registry).expect("discovered");

        assert!(keys.is_empty());
    }

    #[test]
    fn missing_url_aborts_discovery() {
        let (_temp, root) = catalog_root();
        write(
            &root,
            "writers/bad.toml",
            "[writer]\nname = \"bad\"\ndata_files = [{ filename = \"x.dat\" }]\n",
        );
        let catalog = ComponentCatalog::new(vec![root], Vec::<String>::new());
        let mut registry = FileRegistry::new();

        let outcome = find_registerable_files(&catalog, &mut registry);

        assert!(matches!(
            outcome,
            Err(DiscoveryError::Fetch(FetchError::MissingUrl { .. }))
        ));
    }

    #[test]
    fn retrieve_all_stops_at_first_failure() {
        let (_temp, root) = catalog_root();
        write(
            &root,
            "readers/a.toml",
            "[reader]\nname = \"a\"\ndata_files = [{ url = \"https://x/a.dat\" }, { url = \"https://x/b.dat\" }]\n",
        );
        let catalog = ComponentCatalog::new(vec![root.clone()], Vec::<String>::new());
        let mut registry = FileRegistry::new();
        let mut downloader = MockFileDownloader::new();
        downloader.expect_download().times(1).returning(|url, _dest| {
            Err(crate::download::DownloadError::NotFound {
                url: url.to_owned(),
            })
        });
        let retriever = Retriever::with_downloader(root.join("cache"), downloader);

        let outcome = retrieve_all(&catalog, &mut registry, &retriever);

        assert!(matches!(
            outcome,
            Err(DiscoveryError::Fetch(FetchError::Download { key, .. })) if key == "readers/a.dat"
        ));
    }
}
