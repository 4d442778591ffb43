//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::links::store::DEFAULT_LINKS_FILE;

/// Top-level CLI parser for `syllabi`.
#[derive(Debug, Parser)]
#[command(
    name = "syllabi",
    version,
    about = "Collect course PDF links and sync them to the course table"
)]
pub struct Cli {
    /// Log debug detail to stderr (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    pub verbose: bool,
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Collect every PDF link, grouped by course code, into a JSON file.
    Links {
        /// Where to write the course code → links file.
        #[arg(short, long, default_value = DEFAULT_LINKS_FILE)]
        output: PathBuf,
    },
    /// Write collected links to the matching rows of the course table.
    Sync {
        /// Course code → links file produced by `links`.
        #[arg(short, long, default_value = DEFAULT_LINKS_FILE)]
        input: PathBuf,
        /// Show what would be written without writing.
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the text of every PDF in a folder.
    Inspect {
        /// Storage folder identifier.
        folder_id: String,
    },
}
