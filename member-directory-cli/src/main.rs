//! Member directory CLI
//!
//! Two steps turn the membership workbook into the public directory feed:
//!
//! 1. `extract` converts the member sheet to CSV, replacing linked cells
//!    (ORCID, CV, email) with their link targets.
//! 2. `publish` applies the consent policy and writes the CSV that the online
//!    directory loads. The full member CSV must never be published itself.
//!
//! Set `-v` for per-row debug output; personal data is only ever logged in
//! its masked form.

mod args;
mod commands;
mod logging;

use std::process::ExitCode;

use clap::Parser;
use slog::error;

use args::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let logger = logging::build_logger(logging::level_for(cli.verbose, cli.quiet));

    let code = match commands::run(cli.command, &logger) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(logger, "{:#}", err);
            ExitCode::FAILURE
        }
    };
    // flush the async drain before exiting
    drop(logger);
    code
}
