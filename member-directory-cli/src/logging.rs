//! Terminal logger for the command-line front end.

use slog::{o, Drain, Level, Logger};

/// Maps `-q` / `-v` flags onto a level threshold.
pub fn level_for(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::Warning;
    }
    match verbose {
        0 => Level::Info,
        1 => Level::Debug,
        _ => Level::Trace,
    }
}

/// Builds an asynchronous stderr logger filtered at `level`.
///
/// Records still queued are flushed when the last clone of the returned
/// logger is dropped.
pub fn build_logger(level: Level) -> Logger {
    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = drain.filter_level(level).fuse();
    Logger::root(drain, o!("app" => env!("CARGO_PKG_NAME")))
}
