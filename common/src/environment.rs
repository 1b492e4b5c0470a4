//! Snapshot of the environment variables that influence configuration.
//!
//! Capturing the variables once keeps the rest of the resolution logic pure,
//! so callers and tests can pass an explicit [`Environment`] around instead of
//! reading process state ad hoc.

use std::ffi::OsString;

use crate::config::{CONFIG_PATH_ENV, DATA_DIR_ENV};

/// Values of the `AUXDATA_*` environment variables.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Environment {
    /// Raw value of `AUXDATA_DATA_DIR`.
    pub data_dir: Option<String>,
    /// Raw value of `AUXDATA_CONFIG_PATH`.
    pub config_path: Option<OsString>,
}

impl Environment {
    /// Read the variables from the current process.
    ///
    /// A `AUXDATA_DATA_DIR` value that is not valid UTF-8 is treated as unset.
    #[must_use]
    pub fn from_process() -> Self {
        Self {
            data_dir: std::env::var(DATA_DIR_ENV).ok(),
            config_path: std::env::var_os(CONFIG_PATH_ENV),
        }
    }
}
