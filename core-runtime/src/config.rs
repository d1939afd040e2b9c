//! # Service Configuration
//!
//! Settings for the API server, the sync engine, the scheduled trigger and
//! logging.
//!
//! ## Overview
//!
//! Configuration is read once at startup from the process environment (after
//! loading an optional `.env` file) into an [`AppConfig`]. Nothing below the
//! service layer reads the environment; components receive the pieces they
//! need explicitly.
//!
//! Sync settings are validated separately through
//! [`TmdbSyncConfig::validate`], which yields a [`SyncSettings`] holding the
//! non-optional credentials. A failed validation is a configuration error:
//! the service keeps running, but the sync trigger rejects every request
//! without attempting any user.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::AppConfig;
//!
//! let config = AppConfig::from_env()?;
//! match config.sync.validate() {
//!     Ok(settings) => println!("sync limit {}", settings.limit),
//!     Err(e) => eprintln!("sync unavailable: {}", e),
//! }
//! ```

use crate::error::{Error, Result};
use crate::logging::{parse_level, LogFormat, LoggingConfig};
use bridge_traits::LogLevel;
use core_library::{SortField, SortOrder};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_SYNC_LIMIT: usize = 100;
pub const DEFAULT_RATE_LIMIT_MS: u64 = 250;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CRON_SCHEDULE: &str = "0 0 * * *";
pub const DEFAULT_CRON_TIMEZONE: &str = "UTC";

/// Bind address of the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Catalog sync settings as read from the environment; may be incomplete.
#[derive(Clone, PartialEq, Eq)]
pub struct TmdbSyncConfig {
    pub enabled: bool,
    /// v3 API key used for movie search
    pub api_key: Option<String>,
    /// v4 user access token used for list management
    pub access_token: Option<String>,
    /// v4 account object id; derived from the access token when absent
    pub account_object_id: Option<String>,
    pub limit: usize,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    /// Minimum delay between two catalog requests
    pub rate_limit: Duration,
}

impl Default for TmdbSyncConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            access_token: None,
            account_object_id: None,
            limit: DEFAULT_SYNC_LIMIT,
            sort_by: SortField::Rating,
            sort_order: SortOrder::Desc,
            rate_limit: Duration::from_millis(DEFAULT_RATE_LIMIT_MS),
        }
    }
}

impl fmt::Debug for TmdbSyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmdbSyncConfig")
            .field("enabled", &self.enabled)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("account_object_id", &self.account_object_id)
            .field("limit", &self.limit)
            .field("sort_by", &self.sort_by)
            .field("sort_order", &self.sort_order)
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}

impl TmdbSyncConfig {
    /// Enabled configuration with both credentials set and defaults elsewhere.
    pub fn enabled_with(api_key: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            enabled: true,
            api_key: Some(api_key.into()),
            access_token: Some(access_token.into()),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_sort(mut self, sort_by: SortField, sort_order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.sort_order = sort_order;
        self
    }

    /// Check that sync can run and return the complete settings.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] when sync is disabled, a credential is missing or
    /// blank, or the limit is zero.
    pub fn validate(&self) -> Result<SyncSettings> {
        if !self.enabled {
            return Err(Error::Config(
                "TMDb sync is disabled. Set TMDB_SYNC_ENABLED=true to enable it.".to_string(),
            ));
        }

        let api_key = non_blank(&self.api_key).ok_or_else(|| {
            Error::Config("TMDB_API_KEY is required when TMDb sync is enabled".to_string())
        })?;
        let access_token = non_blank(&self.access_token).ok_or_else(|| {
            Error::Config(
                "TMDB_V4_ACCESS_TOKEN is required when TMDb sync is enabled".to_string(),
            )
        })?;

        if self.limit == 0 {
            return Err(Error::Config(
                "TMDB_SYNC_LIMIT must be at least 1".to_string(),
            ));
        }

        Ok(SyncSettings {
            api_key,
            access_token,
            account_object_id: non_blank(&self.account_object_id),
            limit: self.limit,
            sort_by: self.sort_by,
            sort_order: self.sort_order,
            rate_limit: self.rate_limit,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Validated sync settings. Only obtainable through
/// [`TmdbSyncConfig::validate`].
#[derive(Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub api_key: String,
    pub access_token: String,
    pub account_object_id: Option<String>,
    pub limit: usize,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub rate_limit: Duration,
}

impl fmt::Debug for SyncSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncSettings")
            .field("api_key_len", &self.api_key.len())
            .field("access_token_len", &self.access_token.len())
            .field("account_object_id", &self.account_object_id)
            .field("limit", &self.limit)
            .field("sort_by", &self.sort_by)
            .field("sort_order", &self.sort_order)
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}

/// Scheduled trigger settings, unvalidated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub enabled: bool,
    /// Five-field crontab expression
    pub expression: String,
    /// IANA timezone name
    pub timezone: String,
    pub target_users: Vec<String>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            expression: DEFAULT_CRON_SCHEDULE.to_string(),
            timezone: DEFAULT_CRON_TIMEZONE.to_string(),
            target_users: Vec::new(),
        }
    }
}

/// Logging settings as read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LogLevel,
    pub format: LogFormat,
    pub filter: Option<String>,
    /// Directory for rotating log files; `None` disables file logging
    pub dir: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::default(),
            filter: None,
            dir: Some(PathBuf::from("logs")),
        }
    }
}

impl LogSettings {
    /// Console logging configuration; the caller attaches the file sink.
    pub fn to_logging_config(&self) -> LoggingConfig {
        let config = LoggingConfig::default()
            .with_format(self.format)
            .with_level(self.level);
        match &self.filter {
            Some(filter) => config.with_filter(filter.clone()),
            None => config,
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub sync: TmdbSyncConfig,
    pub schedule: ScheduleConfig,
    pub logging: LogSettings,
    /// Upper bound for every outbound HTTP request
    pub http_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            sync: TmdbSyncConfig::default(),
            schedule: ScheduleConfig::default(),
            logging: LogSettings::default(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self> {
        load_dotenv()?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which returns the value of an
    /// environment variable by name.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader { lookup };

        let server = ServerConfig {
            host: env
                .string("SERVER_HOST")
                .unwrap_or_else(|| ServerConfig::default().host),
            port: env.parse("SERVER_PORT")?.unwrap_or(8000),
        };

        let sync = TmdbSyncConfig {
            enabled: env.flag("TMDB_SYNC_ENABLED")?.unwrap_or(false),
            api_key: env.string("TMDB_API_KEY"),
            access_token: env.string("TMDB_V4_ACCESS_TOKEN"),
            account_object_id: env.string("TMDB_ACCOUNT_OBJECT_ID"),
            limit: env.parse("TMDB_SYNC_LIMIT")?.unwrap_or(DEFAULT_SYNC_LIMIT),
            sort_by: env
                .parse_with("TMDB_SYNC_SORT_BY", SortField::from_str)?
                .unwrap_or(SortField::Rating),
            sort_order: env
                .parse_with("TMDB_SYNC_SORT_ORDER", SortOrder::from_str)?
                .unwrap_or(SortOrder::Desc),
            rate_limit: Duration::from_millis(
                env.parse("TMDB_RATE_LIMIT_MS")?
                    .unwrap_or(DEFAULT_RATE_LIMIT_MS),
            ),
        };

        let schedule = ScheduleConfig {
            enabled: env.flag("CRON_ENABLED")?.unwrap_or(false),
            expression: env
                .string("CRON_SCHEDULE")
                .unwrap_or_else(|| DEFAULT_CRON_SCHEDULE.to_string()),
            timezone: env
                .string("CRON_TIMEZONE")
                .unwrap_or_else(|| DEFAULT_CRON_TIMEZONE.to_string()),
            target_users: env
                .string("CRON_TARGET_USERS")
                .map(|raw| split_list(&raw))
                .unwrap_or_default(),
        };

        let logging = LogSettings {
            level: env
                .parse_with("LOG_LEVEL", parse_level)?
                .unwrap_or(LogLevel::Info),
            format: env
                .parse_with("LOG_FORMAT", LogFormat::from_str)?
                .unwrap_or_default(),
            filter: env.string("LOG_FILTER"),
            dir: match env.raw("LOG_DIR") {
                Some(dir) if dir.trim().is_empty() => None,
                Some(dir) => Some(PathBuf::from(dir.trim())),
                None => LogSettings::default().dir,
            },
        };

        let http_timeout = Duration::from_secs(
            env.parse("HTTP_TIMEOUT_SECS")?
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        );
        if http_timeout.is_zero() {
            return Err(Error::Config(
                "HTTP_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            server,
            sync,
            schedule,
            logging,
            http_timeout,
        })
    }
}

/// Load a `.env` file from the working directory. A missing file is not an
/// error.
pub fn load_dotenv() -> Result<bool> {
    dotenvy::dotenv().map(|_| true).or_else(|err| match err {
        dotenvy::Error::Io(_) => Ok(false),
        other => Err(Error::EnvFile(other)),
    })
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn raw(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
    }

    /// Trimmed, non-empty value.
    fn string(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn flag(&self, key: &str) -> Result<Option<bool>> {
        self.parse_with(key, |raw| match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(Error::Config("expected true or false".to_string())),
        })
    }

    fn parse<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.parse_with(key, |raw| raw.parse::<T>())
    }

    fn parse_with<T, E, P>(&self, key: &str, parser: P) -> Result<Option<T>>
    where
        E: fmt::Display,
        P: FnOnce(&str) -> std::result::Result<T, E>,
    {
        match self.string(key) {
            None => Ok(None),
            Some(raw) => parser(&raw)
                .map(Some)
                .map_err(|e| Error::Config(format!("Invalid value for {}: {}", key, e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(move |key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.server.bind_address(), "0.0.0.0:8000");
        assert!(!config.sync.enabled);
        assert_eq!(config.sync.limit, 100);
        assert_eq!(config.sync.sort_by, SortField::Rating);
        assert_eq!(config.sync.sort_order, SortOrder::Desc);
        assert_eq!(config.sync.rate_limit, Duration::from_millis(250));
        assert!(!config.schedule.enabled);
        assert_eq!(config.schedule.expression, "0 0 * * *");
        assert_eq!(config.schedule.timezone, "UTC");
        assert!(config.schedule.target_users.is_empty());
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.logging.dir, Some(PathBuf::from("logs")));
    }

    #[test]
    fn test_reads_sync_and_schedule_settings() {
        let config = config_from(&[
            ("TMDB_SYNC_ENABLED", "true"),
            ("TMDB_API_KEY", "key"),
            ("TMDB_V4_ACCESS_TOKEN", "token"),
            ("TMDB_SYNC_LIMIT", "25"),
            ("TMDB_SYNC_SORT_BY", "year"),
            ("TMDB_SYNC_SORT_ORDER", "asc"),
            ("CRON_ENABLED", "1"),
            ("CRON_SCHEDULE", "30 6 * * 1"),
            ("CRON_TIMEZONE", "Europe/Berlin"),
            ("CRON_TARGET_USERS", " alice, bob ,,carol "),
            ("LOG_DIR", ""),
        ])
        .unwrap();

        let settings = config.sync.validate().unwrap();
        assert_eq!(settings.limit, 25);
        assert_eq!(settings.sort_by, SortField::Year);
        assert_eq!(settings.sort_order, SortOrder::Asc);
        assert!(config.schedule.enabled);
        assert_eq!(config.schedule.expression, "30 6 * * 1");
        assert_eq!(config.schedule.target_users, vec!["alice", "bob", "carol"]);
        assert_eq!(config.logging.dir, None);
    }

    #[test]
    fn test_invalid_values_fail_fast() {
        assert!(config_from(&[("SERVER_PORT", "eighty")]).is_err());
        assert!(config_from(&[("TMDB_SYNC_SORT_BY", "popularity")]).is_err());
        assert!(config_from(&[("TMDB_SYNC_ENABLED", "maybe")]).is_err());
        assert!(config_from(&[("HTTP_TIMEOUT_SECS", "0")]).is_err());
        assert!(config_from(&[("LOG_FORMAT", "xml")]).is_err());
    }

    #[test]
    fn test_validate_rejects_disabled_sync() {
        let err = TmdbSyncConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("disabled"));
    }

    #[test]
    fn test_validate_rejects_missing_credentials() {
        let mut config = TmdbSyncConfig::enabled_with("key", "token");
        config.access_token = Some("   ".to_string());
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("TMDB_V4_ACCESS_TOKEN"));

        let mut config = TmdbSyncConfig::enabled_with("key", "token");
        config.api_key = None;
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("TMDB_API_KEY"));
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let config = TmdbSyncConfig::enabled_with("key", "token").with_limit(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_output_hides_credentials() {
        let config = TmdbSyncConfig::enabled_with("secret-key", "secret-token");
        let settings = config.validate().unwrap();

        assert!(!format!("{:?}", config).contains("secret"));
        assert!(!format!("{:?}", settings).contains("secret"));
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a,b"), vec!["a", "b"]);
        assert!(split_list(" , ").is_empty());
    }
}
