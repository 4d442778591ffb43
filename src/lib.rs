//! Core library entry for the `syllabi` CLI.
//!
//! `syllabi links` walks cloud storage for PDFs, groups their share links by
//! the name of the containing folder (the course code), and writes the
//! grouping to a JSON handoff file. `syllabi sync` reads that file and
//! writes each group into the matching row of the course table.

pub mod adapters;
pub mod auth;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod inspect;
pub mod links;
pub mod logging;
pub mod ports;
pub mod sync;

#[cfg(test)]
mod testing;

use clap::error::ErrorKind;
use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// `--help` and `--version` print their output and succeed.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return err.print().map_err(|e| format!("Failed to print help: {e}"));
        }
        Err(err) => return Err(err.to_string()),
    };
    logging::init(cli.verbose);
    commands::dispatch(&cli.command, &config::Config::from_env())
}
