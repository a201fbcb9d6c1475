//! Application configuration loaded from environment variables.
//!
//! Every variable is optional:
//! - `TICKDECK_QUOTE_ENDPOINT`, `TICKDECK_CANDLE_ENDPOINT`,
//!   `TICKDECK_LATENCY_ENDPOINT`: publisher endpoints, one per stream
//! - `TICKDECK_CONTROL_ENDPOINT`: request/reply control endpoint
//! - `TICKDECK_CONTROL_TIMEOUT_MS`: reply budget for control requests
//! - `TICKDECK_QUEUE_CAPACITY`: ingestion queue slots per stream
//! - `TICKDECK_SYMBOL`: symbol requested at startup
//! - `TICKDECK_DATA_FILE`: historical market-data JSON to analyze
//! - `TICKDECK_BACKTEST_CONFIG`: JSON file of strategy parameters

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::TickdeckError;

const DEFAULT_QUOTE_ENDPOINT: &str = "ws://127.0.0.1:5555";
const DEFAULT_CANDLE_ENDPOINT: &str = "ws://127.0.0.1:5556";
const DEFAULT_LATENCY_ENDPOINT: &str = "ws://127.0.0.1:5557";
const DEFAULT_CONTROL_ENDPOINT: &str = "ws://127.0.0.1:5558";
const DEFAULT_CONTROL_TIMEOUT_MS: u64 = 500;
const DEFAULT_QUEUE_CAPACITY: usize = 1024;
const DEFAULT_SYMBOL: &str = "btcusdt";

/// Top-level application configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub feeds: FeedConfig,
    pub control: ControlConfig,
    /// Symbol requested from the publisher at startup.
    pub symbol: String,
    /// Historical market-data file, if one should be analyzed.
    pub data_file: Option<PathBuf>,
    pub backtest: BacktestConfig,
}

/// Publisher endpoints and queue sizing.
#[derive(Debug)]
pub struct FeedConfig {
    pub quote_endpoint: String,
    pub candle_endpoint: String,
    pub latency_endpoint: String,
    pub queue_capacity: usize,
}

/// Control channel endpoint and reply budget.
#[derive(Debug)]
pub struct ControlConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

/// Strategy parameters for the dashboard's indicators and backtests.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub starting_capital: f64,
    pub fast_sma: usize,
    pub slow_sma: usize,
    pub ema_period: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            starting_capital: 50_000.0,
            fast_sma: 10,
            slow_sma: 50,
            ema_period: 10,
            rsi_period: 10,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
        }
    }
}

impl BacktestConfig {
    /// Loads strategy parameters from a JSON file. Missing keys keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            TickdeckError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }
}

/// Loads the application configuration from environment variables.
///
/// # Errors
///
/// Returns [`TickdeckError::Config`] if a numeric variable is not a positive
/// integer, or if the backtest config file cannot be loaded.
pub fn fetch_config() -> crate::Result<AppConfig> {
    let feeds = FeedConfig {
        quote_endpoint: var_or("TICKDECK_QUOTE_ENDPOINT", DEFAULT_QUOTE_ENDPOINT),
        candle_endpoint: var_or("TICKDECK_CANDLE_ENDPOINT", DEFAULT_CANDLE_ENDPOINT),
        latency_endpoint: var_or("TICKDECK_LATENCY_ENDPOINT", DEFAULT_LATENCY_ENDPOINT),
        queue_capacity: positive_var("TICKDECK_QUEUE_CAPACITY")?
            .map_or(DEFAULT_QUEUE_CAPACITY, |v| v as usize),
    };

    let control = ControlConfig {
        endpoint: var_or("TICKDECK_CONTROL_ENDPOINT", DEFAULT_CONTROL_ENDPOINT),
        timeout: Duration::from_millis(
            positive_var("TICKDECK_CONTROL_TIMEOUT_MS")?.unwrap_or(DEFAULT_CONTROL_TIMEOUT_MS),
        ),
    };

    let backtest = match non_empty_var("TICKDECK_BACKTEST_CONFIG") {
        Some(path) => BacktestConfig::load(Path::new(&path))?,
        None => BacktestConfig::default(),
    };

    Ok(AppConfig {
        feeds,
        control,
        symbol: var_or("TICKDECK_SYMBOL", DEFAULT_SYMBOL),
        data_file: non_empty_var("TICKDECK_DATA_FILE").map(PathBuf::from),
        backtest,
    })
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn var_or(name: &str, default: &str) -> String {
    non_empty_var(name).unwrap_or_else(|| default.to_string())
}

/// Parses an optional positive integer variable.
fn positive_var(name: &str) -> crate::Result<Option<u64>> {
    let Some(raw) = non_empty_var(name) else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(TickdeckError::Config(format!("{name} must be greater than zero"))),
        Ok(value) => Ok(Some(value)),
        Err(_) => Err(TickdeckError::Config(format!(
            "{name} must be a positive integer, got {raw:?}"
        ))),
    }
}
