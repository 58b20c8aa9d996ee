use clap::ValueEnum;
use colored::Colorize;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

/// Level names are accepted in any casing (`debug`, `DEBUG`, `Debug`).
impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <LogLevel as ValueEnum>::from_str(s.trim(), true)
    }
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, <Self as TryFrom<String>>::Error> {
        value.parse()
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Installs the global logger. Library noise from the gateway and HTTP stacks
/// is capped at `warn` regardless of the requested level.
pub fn init(level: LogLevel) -> Result<(), log::SetLoggerError> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Cyan)
        .trace(Color::BrightBlack);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} {} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .level(level.into())
        .level_for("serenity", LevelFilter::Warn)
        .level_for("tracing", LevelFilter::Warn)
        .level_for("reqwest", LevelFilter::Warn)
        .level_for("hyper", LevelFilter::Warn)
        .level_for("rustls", LevelFilter::Warn)
        .chain(std::io::stdout())
        .apply()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_order_from_quietest_to_noisiest() {
        assert!(LogLevel::Error < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Trace);
        assert_eq!(LevelFilter::from(LogLevel::default()), LevelFilter::Info);
    }

    #[test]
    fn level_names_ignore_case() {
        for name in ["debug", "DEBUG", "Debug", " dEbUg "] {
            assert_eq!(name.parse::<LogLevel>(), Ok(LogLevel::Debug));
        }
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn level_deserializes_from_mixed_case() {
        let level: LogLevel = serde_json::from_str("\"Warn\"").unwrap();
        assert_eq!(level, LogLevel::Warn);
        assert_eq!(serde_json::to_string(&LogLevel::Trace).unwrap(), "\"trace\"");
    }
}
