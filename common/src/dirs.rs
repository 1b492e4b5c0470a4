//! Platform directory lookup behind an injectable trait.
//!
//! Production code uses [`SystemBaseDirs`], which defers to
//! `directories-next`. Tests provide their own [`BaseDirs`] implementation so
//! that path resolution never touches the real user profile.

use std::path::PathBuf;

const QUALIFIER: &str = "";
const ORGANISATION: &str = "";
const APPLICATION: &str = "auxdata";

/// Name of the configuration file looked up in [`BaseDirs::config_dir`].
pub const CONFIG_FILE_NAME: &str = "auxdata.toml";

/// Source of platform-specific directories.
pub trait BaseDirs {
    /// Per-user cache directory for downloaded data files.
    fn cache_dir(&self) -> Option<PathBuf>;

    /// Per-user configuration directory.
    fn config_dir(&self) -> Option<PathBuf>;

    /// Location of the default configuration file, if a configuration
    /// directory is available.
    fn config_file(&self) -> Option<PathBuf> {
        self.config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
    }
}

/// [`BaseDirs`] backed by the operating system conventions.
///
/// # Examples
///
/// ```
/// use auxdata_common::dirs::{BaseDirs, SystemBaseDirs};
///
/// let dirs = SystemBaseDirs;
/// let config_file = dirs.config_file();
/// assert!(config_file.is_none_or(|path| path.ends_with("auxdata.toml")));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBaseDirs;

impl SystemBaseDirs {
    fn project_dirs() -> Option<directories_next::ProjectDirs> {
        directories_next::ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION)
    }
}

impl BaseDirs for SystemBaseDirs {
    fn cache_dir(&self) -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
    }

    fn config_dir(&self) -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedDirs(Option<PathBuf>);

    impl BaseDirs for FixedDirs {
        fn cache_dir(&self) -> Option<PathBuf> {
            None
        }

        fn config_dir(&self) -> Option<PathBuf> {
            self.0.clone()
        }
    }

    #[test]
    fn config_file_joins_the_file_name() {
        let dirs = FixedDirs(Some(PathBuf::from("/home/user/.config/auxdata")));
        assert_eq!(
            dirs.config_file(),
            Some(PathBuf::from("/home/user/.config/auxdata/auxdata.toml"))
        );
    }

    #[test]
    fn config_file_is_absent_without_config_dir() {
        assert!(FixedDirs(None).config_file().is_none());
    }
}
