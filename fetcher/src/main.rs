//! `auxdata-fetch` entrypoint.
//!
//! Lists, retrieves or prefetches the data files declared by the components
//! on the search path. Progress is logged to stderr; results go to stdout.

use std::io::Write;

use auxdata_common::{Environment, SystemBaseDirs};
use auxdata_fetcher::cli::Cli;
use auxdata_fetcher::download::HttpDownloader;
use auxdata_fetcher::session::{Result, Session};
use clap::Parser;

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_env("AUXDATA_LOG")
        .init();

    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stdout);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stdout: &mut dyn Write) -> Result<()> {
    let session = Session::resolve(cli, &SystemBaseDirs, &Environment::from_process())?;
    let downloader = HttpDownloader::new(session.options().timeout);
    session.execute(&cli.command, downloader, stdout)
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format_error_chain(&err));
            1
        }
    }
}

/// Render `err` followed by each of its sources.
fn format_error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "error: {message}").is_err() {
        // Best-effort reporting; ignore write failures.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auxdata_common::ConfigError;
    use auxdata_fetcher::error::FetchError;
    use auxdata_fetcher::session::CliError;

    #[test]
    fn exit_code_for_run_result_returns_zero_on_success() {
        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Ok(()), &mut stderr);
        assert_eq!(exit_code, 0);
        assert!(stderr.is_empty());
    }

    #[test]
    fn exit_code_for_run_result_prints_error_and_returns_one() {
        let err = CliError::Fetch(FetchError::UnknownKey {
            key: "readers/missing.dat".to_owned(),
        });

        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Err(err), &mut stderr);
        assert_eq!(exit_code, 1);

        let stderr_text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(stderr_text.starts_with("error: unknown cache key 'readers/missing.dat'"));
    }

    #[test]
    fn error_chain_includes_io_cause() {
        let err = CliError::Config(ConfigError::Read {
            path: "/etc/auxdata.toml".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        });

        let rendered = format_error_chain(&err);

        assert!(rendered.contains("/etc/auxdata.toml"));
        assert!(rendered.ends_with("no such file"));
    }
}
