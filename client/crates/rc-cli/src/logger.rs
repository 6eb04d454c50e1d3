use crate::{CliClientResult, ClientError};

use rc_config::LogLevel;

use std::path::Path;
use std::time::SystemTime;

use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, Output};

/// Install the global logger.
///
/// Stdout carries command output, so records go to stderr unless `log_file`
/// is set. Colors apply to stderr only.
pub fn initialize(level: LogLevel, log_file: Option<&Path>, colored: bool) -> CliClientResult<()> {
    let (sink, colors) = match log_file {
        Some(path) => (open_log_file(path)?, None),
        None => (Output::from(std::io::stderr()), colored.then(level_colors)),
    };

    Dispatch::new()
        .level(level.0)
        .format(move |out, message, record| {
            let stamp = humantime::format_rfc3339_seconds(SystemTime::now());
            match &colors {
                Some(colors) => out.finish(format_args!(
                    "{stamp} {} {}: {message}",
                    colors.color(record.level()),
                    record.target()
                )),
                None => out.finish(format_args!(
                    "{stamp} {} {}: {message}",
                    record.level(),
                    record.target()
                )),
            }
        })
        .chain(sink)
        .apply()
        .map_err(|e| ClientError::setup(format!("Failed to initialize logger: {e}")))
}

fn open_log_file(path: &Path) -> CliClientResult<Output> {
    fern::log_file(path).map(Output::from).map_err(|e| {
        ClientError::setup(format!(
            "Failed to open log file {}: {}",
            path.display(),
            e
        ))
    })
}

fn level_colors() -> ColoredLevelConfig {
    ColoredLevelConfig::new()
        .debug(Color::Blue)
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::Red)
}
