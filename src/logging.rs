//! Logger setup for the binary

use std::path::Path;

use log::LevelFilter;

/// Install a global `fern` logger writing `[date][time][target][LEVEL] message`
/// lines to stdout, or to `log_file` when given (appending).
///
/// # Errors
///
/// Fails if the log file cannot be opened or a logger is already installed.
pub fn setup_logger(log_level: LevelFilter, log_file: Option<&Path>) -> Result<(), fern::InitError> {
    let dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(log_level);

    match log_file {
        None => dispatch.chain(std::io::stdout()),
        Some(path) => dispatch.chain(fern::log_file(path)?),
    }
    .apply()?;
    Ok(())
}
