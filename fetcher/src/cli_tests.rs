//! Tests for CLI parsing.

use super::*;
use rstest::rstest;

#[test]
fn cli_parses_list_with_defaults() {
    let cli = Cli::parse_from(["auxdata-fetch", "list"]);
    assert_eq!(cli.command, Command::List);
    assert!(cli.config.is_none());
    assert!(cli.data_dir.is_none());
    assert!(cli.config_path.is_empty());
    assert!(cli.features.is_empty());
    assert_eq!(cli.verbosity, 0);
    assert!(!cli.quiet);
}

#[test]
fn cli_parses_retrieve_key() {
    let cli = Cli::parse_from(["auxdata-fetch", "retrieve", "readers/coeffs.dat"]);
    assert_eq!(
        cli.command,
        Command::Retrieve {
            key: "readers/coeffs.dat".to_owned()
        }
    );
}

#[test]
fn cli_requires_a_subcommand() {
    assert!(Cli::try_parse_from(["auxdata-fetch"]).is_err());
}

#[test]
fn cli_retrieve_requires_a_key() {
    assert!(Cli::try_parse_from(["auxdata-fetch", "retrieve"]).is_err());
}

#[test]
fn cli_accepts_global_options_after_subcommand() {
    let cli = Cli::parse_from([
        "auxdata-fetch",
        "all",
        "--data-dir",
        "/srv/auxdata",
        "--config-path",
        "/etc/auxdata",
        "--config-path",
        "/home/user/.auxdata",
        "--feature",
        "hdf5",
    ]);
    assert_eq!(cli.command, Command::All);
    assert_eq!(cli.data_dir, Some(Utf8PathBuf::from("/srv/auxdata")));
    assert_eq!(
        cli.config_path,
        vec![
            Utf8PathBuf::from("/etc/auxdata"),
            Utf8PathBuf::from("/home/user/.auxdata")
        ]
    );
    assert_eq!(cli.features, vec!["hdf5".to_owned()]);
}

#[test]
fn cli_rejects_verbose_with_quiet() {
    assert!(Cli::try_parse_from(["auxdata-fetch", "-v", "-q", "list"]).is_err());
}

#[rstest]
#[case::default(&["auxdata-fetch", "list"], LevelFilter::Info)]
#[case::verbose(&["auxdata-fetch", "-v", "list"], LevelFilter::Debug)]
#[case::very_verbose(&["auxdata-fetch", "-vv", "list"], LevelFilter::Trace)]
#[case::quiet(&["auxdata-fetch", "--quiet", "list"], LevelFilter::Warn)]
fn cli_maps_flags_to_log_level(#[case] args: &[&str], #[case] expected: LevelFilter) {
    let cli = Cli::parse_from(args);
    assert_eq!(cli.log_level(), expected);
}
