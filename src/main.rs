//! Binary entrypoint for the `syllabi` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    // Recording and replay are handled in commands::dispatch via SYLLABI_RECORD / SYLLABI_REPLAY.
    match syllabi_sync::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
