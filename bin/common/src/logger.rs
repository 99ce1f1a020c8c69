use std::path::PathBuf;

use fern::colors::Color;
use log::info;
use thiserror::Error;

use crate::Config;

/// Errors when setting up the logger
#[derive(Error, Debug)]
pub enum Error {
    /// Returned for log levels above 3
    #[error("Invalid log level {0}")]
    InvalidLogLevel(u8),

    /// Returned when no data directory is given and the default one cannot be found
    #[error("No data directory available")]
    NoDataDirectory,

    /// Returned when the log file cannot be created
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Returned when a logger is already installed
    #[error(transparent)]
    SetLogger(#[from] log::SetLoggerError),
}

fn level_filter(log_level: u8) -> Result<log::LevelFilter, Error> {
    match log_level {
        0 => Ok(log::LevelFilter::Warn),
        1 => Ok(log::LevelFilter::Info),
        2 => Ok(log::LevelFilter::Debug),
        3 => Ok(log::LevelFilter::Trace),
        _ => Err(Error::InvalidLogLevel(log_level)),
    }
}

/// Logs to stdout and to `<data directory>/<binary_name>.log`
///
/// Returns the path of the log file
pub fn init(config: &Config, binary_name: &str) -> Result<PathBuf, Error> {
    let colors = fern::colors::ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Cyan)
        .debug(Color::Green)
        .trace(Color::Magenta);

    let log_level = level_filter(config.log_level)?;

    let mut log_file_path = config.data_directory().ok_or(Error::NoDataDirectory)?;
    std::fs::create_dir_all(&log_file_path)?;

    log_file_path.push(binary_name);
    log_file_path.set_extension("log");

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{color_line}[{date}][{target}][{level}{color_line}]\t{message}\x1B[0m",
                color_line = format_args!("\x1B[{}m", colors.get_color(&record.level()).to_fg_str()),
                date = chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                target = record.target(),
                level = colors.color(record.level()),
                message = message,
            ))
        })
        .level(log_level)
        .chain(std::io::stdout())
        .chain(fern::log_file(&log_file_path)?)
        .apply()?;

    info!("Logging events to {}", log_file_path.display());
    Ok(log_file_path)
}
