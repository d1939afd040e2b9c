//! Structured log forwarding.
//!
//! The tracing layer in `core-runtime` converts events into [`LogEntry`]
//! values and hands them to a [`LoggerSink`], which decides where they go
//! (rotating files, a host collector, a test buffer).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    /// Module path that emitted the event
    pub target: String,
    pub message: String,
    /// Structured fields, ordered for stable rendering
    pub fields: BTreeMap<String, String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            target: target.into(),
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Single-line rendering used by file sinks:
    /// `2024-01-01 00:00:00.000 - target - INFO - message key=value`
    pub fn render_line(&self) -> String {
        let mut line = format!(
            "{} - {} - {} - {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            self.target,
            self.level,
            self.message
        );
        for (key, value) in &self.fields {
            line.push(' ');
            line.push_str(key);
            line.push('=');
            line.push_str(value);
        }
        line
    }
}

/// Logger sink trait
///
/// Implementations must not block the caller for long; the tracing layer
/// spawns the `log` future onto the runtime.
///
/// # Security
///
/// API keys and access tokens must never reach a sink. The logging layer
/// redacts fields with sensitive names before forwarding.
#[async_trait]
pub trait LoggerSink: Send + Sync {
    /// Forward a log entry
    async fn log(&self, entry: LogEntry) -> Result<()>;

    /// Flush any buffered logs
    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Entries below this level are dropped before reaching the sink.
    fn min_level(&self) -> LogLevel {
        LogLevel::Info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_log_entry_builder() {
        let entry = LogEntry::new(LogLevel::Info, "core_sync", "User sync finished")
            .with_field("username", "alice")
            .with_field("added", "3");

        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.fields.get("username"), Some(&"alice".to_string()));
    }

    #[test]
    fn test_render_line_orders_fields() {
        let mut entry = LogEntry::new(LogLevel::Warn, "provider_tmdb", "Search failed")
            .with_field("title", "Heat")
            .with_field("attempt", "1");
        entry.timestamp = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

        assert_eq!(
            entry.render_line(),
            "2024-03-01 12:00:00.000 - provider_tmdb - WARN - Search failed attempt=1 title=Heat"
        );
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Error > LogLevel::Warn);
        assert!(LogLevel::Debug < LogLevel::Info);
    }
}
