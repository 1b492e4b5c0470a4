//! CLI argument definitions for `auxdata-fetch`.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint so the argument surface can be tested directly.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use log::LevelFilter;

/// Register and prefetch ancillary data files.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "auxdata-fetch")]
#[command(version, about)]
#[command(long_about = concat!(
    "Register and prefetch ancillary data files.\n\n",
    "Component definitions (readers, writers and compositors) are read from ",
    "TOML files on the component search path. Every data file they declare is ",
    "registered under a cache key such as `readers/coeffs.dat` and can be ",
    "downloaded into the data directory ahead of time.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  List every registered cache key:\n",
    "    $ auxdata-fetch --config-path /etc/auxdata list\n\n",
    "  Download one file and print its local path:\n",
    "    $ auxdata-fetch retrieve readers/coeffs.dat\n\n",
    "  Prefetch everything into a specific directory:\n",
    "    $ auxdata-fetch --data-dir /srv/auxdata all",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file [default: platform config directory].
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Directory downloaded files are cached in.
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<Utf8PathBuf>,

    /// Component search path entry (can be repeated; later entries win).
    #[arg(long = "config-path", global = true, value_name = "DIR")]
    pub config_path: Vec<Utf8PathBuf>,

    /// Optional feature available in this environment (can be repeated).
    #[arg(long = "feature", global = true, value_name = "NAME")]
    pub features: Vec<String>,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbosity")]
    pub quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, Default, PartialEq, Eq)]
pub enum Command {
    /// Discover components and print every registered cache key.
    #[default]
    List,

    /// Discover components, then fetch one file and print its local path.
    Retrieve {
        /// Cache key to fetch, for example `readers/coeffs.dat`.
        key: String,
    },

    /// Discover components and fetch every registered file.
    All,
}

impl Cli {
    /// Log level selected by `-v` and `-q`.
    ///
    /// # Examples
    ///
    /// ```
    /// use auxdata_fetcher::cli::Cli;
    /// use log::LevelFilter;
    ///
    /// assert_eq!(Cli::default().log_level(), LevelFilter::Info);
    /// let quiet = Cli { quiet: true, ..Cli::default() };
    /// assert_eq!(quiet.log_level(), LevelFilter::Warn);
    /// ```
    #[must_use]
    pub const fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Warn;
        }
        match self.verbosity {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
