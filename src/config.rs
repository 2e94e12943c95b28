use chrono::{DateTime, Utc};

use crate::clock::ClockMode;
use crate::error::{AppError, Result};

/// Fixtures shown per window unless the last day runs over.
pub const MIN_FIXTURES_TO_DISPLAY: usize = 10;

/// Rows in an abbreviated standings table.
pub const MAX_STANDINGS_TO_DISPLAY: usize = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub db_path: String,
    pub api_port: u16,
    /// Minimum fixtures per window (MIN_FIXTURES_TO_DISPLAY)
    pub min_fixtures_to_display: usize,
    /// Abbreviated standings length (MAX_STANDINGS_TO_DISPLAY)
    pub max_standings_to_display: usize,
    /// live, fixed or elapsed (CLOCK_MODE)
    pub clock_mode: ClockMode,
    /// Start instant for fixed/elapsed clocks (CLOCK_START, RFC 3339)
    pub clock_start: Option<DateTime<Utc>>,
    /// JSON prize definitions replacing the built-in ones (PRIZES_FILE)
    pub prizes_file: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let clock_mode = var("CLOCK_MODE").unwrap_or_else(|| "live".to_string()).parse::<ClockMode>()?;
        let clock_start = var("CLOCK_START")
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                DateTime::parse_from_rfc3339(s.trim())
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(|e| AppError::Config(format!("CLOCK_START must be an RFC 3339 instant: {e}")))
            })
            .transpose()?;

        let cfg = Self {
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            db_path: var("DB_PATH").unwrap_or_else(|| "league.db".to_string()),
            api_port: var("API_PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            min_fixtures_to_display: var("MIN_FIXTURES_TO_DISPLAY")
                .map(|v| v.parse::<usize>())
                .transpose()
                .map_err(|_| AppError::Config("MIN_FIXTURES_TO_DISPLAY must be a non-negative integer".to_string()))?
                .unwrap_or(MIN_FIXTURES_TO_DISPLAY),
            max_standings_to_display: var("MAX_STANDINGS_TO_DISPLAY")
                .map(|v| v.parse::<usize>())
                .transpose()
                .map_err(|_| AppError::Config("MAX_STANDINGS_TO_DISPLAY must be a non-negative integer".to_string()))?
                .unwrap_or(MAX_STANDINGS_TO_DISPLAY),
            clock_mode,
            clock_start,
            prizes_file: var("PRIZES_FILE").filter(|s| !s.trim().is_empty()),
        };

        // fixed and elapsed clocks need CLOCK_START
        cfg.clock_mode.build(cfg.clock_start)?;
        Ok(cfg)
    }
}
