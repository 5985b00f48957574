//! Leveled diagnostics on stderr.
//!
//! Entries are printed either as prefixed text or as one JSON object per
//! line. Quiet mode drops everything below [`LogLevel::Error`]. The initial
//! mode comes from `RECORDLOAD_LOG` (`quiet`, `text`, `json`).

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

/// Environment variable selecting the default log mode.
pub const LOG_ENV: &str = "RECORDLOAD_LOG";

/// Severity of a diagnostic line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    fn marker(self) -> &'static str {
        match self {
            Self::Info => "  ",
            Self::Success => "✓",
            Self::Warning => "⚠️",
            Self::Error => "❌",
        }
    }
}

/// One diagnostic line. Serialized as-is in JSON mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth under the previous top-level line.
    #[serde(default, skip_serializing_if = "is_top_level")]
    pub depth: u8,
}

fn is_top_level(depth: &u8) -> bool {
    *depth == 0
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>, depth: u8) -> Self {
        Self {
            level,
            message: message.into(),
            depth,
        }
    }

    /// Text form: indentation, level marker, message.
    pub fn to_text(&self) -> String {
        format!(
            "{}{} {}",
            "   ".repeat(self.depth as usize),
            self.level.marker(),
            self.message
        )
    }
}

/// How entries are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogMode {
    /// Errors only
    Quiet,
    /// Prefixed human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

impl LogMode {
    fn to_u8(self) -> u8 {
        match self {
            Self::Quiet => 0,
            Self::Text => 1,
            Self::Json => 2,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Quiet,
            2 => Self::Json,
            _ => Self::Text,
        }
    }
}

impl FromStr for LogMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quiet" | "off" => Ok(Self::Quiet),
            "text" | "" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log mode '{}'", other)),
        }
    }
}

/// Global logger
pub static LOGGER: Lazy<Logger> = Lazy::new(Logger::from_env);

/// Writes entries to stderr in the configured mode.
pub struct Logger {
    mode: AtomicU8,
}

impl Logger {
    pub fn new(mode: LogMode) -> Self {
        Self { mode: AtomicU8::new(mode.to_u8()) }
    }

    /// Mode from `RECORDLOAD_LOG`, text when unset or unrecognized.
    pub fn from_env() -> Self {
        let mode = std::env::var(LOG_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(LogMode::Text);
        Self::new(mode)
    }

    pub fn mode(&self) -> LogMode {
        LogMode::from_u8(self.mode.load(Ordering::Relaxed))
    }

    pub fn set_mode(&self, mode: LogMode) {
        self.mode.store(mode.to_u8(), Ordering::Relaxed);
    }

    /// Format an entry for the current mode, or `None` if it is filtered out.
    pub fn format(&self, entry: &LogEntry) -> Option<String> {
        match self.mode() {
            LogMode::Quiet if entry.level != LogLevel::Error => None,
            LogMode::Quiet | LogMode::Text => Some(entry.to_text()),
            LogMode::Json => Some(
                serde_json::to_string(entry).unwrap_or_else(|_| entry.to_text()),
            ),
        }
    }

    pub fn log(&self, entry: LogEntry) {
        if let Some(line) = self.format(&entry) {
            eprintln!("{}", line);
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LogMode::Text)
    }
}

fn emit(level: LogLevel, msg: impl Into<String>, depth: u8) {
    LOGGER.log(LogEntry::new(level, msg, depth));
}

pub fn log_info(msg: impl Into<String>) {
    emit(LogLevel::Info, msg, 0);
}

/// Info line nested one level under the preceding entry.
pub fn log_detail(msg: impl Into<String>) {
    emit(LogLevel::Info, msg, 1);
}

pub fn log_success(msg: impl Into<String>) {
    emit(LogLevel::Success, msg, 0);
}

pub fn log_warning(msg: impl Into<String>) {
    emit(LogLevel::Warning, msg, 0);
}

pub fn log_error(msg: impl Into<String>) {
    emit(LogLevel::Error, msg, 0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_keeps_errors_only() {
        let logger = Logger::new(LogMode::Quiet);
        assert!(logger.format(&LogEntry::new(LogLevel::Info, "loading", 0)).is_none());
        assert!(logger.format(&LogEntry::new(LogLevel::Warning, "odd", 0)).is_none());
        let line = logger.format(&LogEntry::new(LogLevel::Error, "boom", 0)).unwrap();
        assert!(line.contains("boom"));
    }

    #[test]
    fn test_json_lines() {
        let logger = Logger::new(LogMode::Json);
        let line = logger.format(&LogEntry::new(LogLevel::Success, "3 records", 1)).unwrap();
        let parsed: LogEntry = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed.level, LogLevel::Success);
        assert_eq!(parsed.message, "3 records");
        assert_eq!(parsed.depth, 1);

        let top = logger.format(&LogEntry::new(LogLevel::Info, "start", 0)).unwrap();
        assert_eq!(top, r#"{"level":"info","message":"start"}"#);
    }

    #[test]
    fn test_text_depth() {
        let text = LogEntry::new(LogLevel::Info, "Rows: 2", 2).to_text();
        assert!(text.starts_with("      "));
        assert!(text.ends_with("Rows: 2"));
    }

    #[test]
    fn test_mode_switch() {
        let logger = Logger::default();
        assert_eq!(logger.mode(), LogMode::Text);
        logger.set_mode(LogMode::Json);
        assert_eq!(logger.mode(), LogMode::Json);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("JSON".parse::<LogMode>(), Ok(LogMode::Json));
        assert_eq!("off".parse::<LogMode>(), Ok(LogMode::Quiet));
        assert!("loud".parse::<LogMode>().is_err());
    }
}
