//! Runtime configuration read from the environment (after `.env` is loaded)

use std::time::Duration;

use chrono::NaiveTime;

use crate::api::delta::DeltaClient;
use crate::services::report_service::default_marks;
use crate::services::time_service::parse_time_of_day;
use crate::utils::errors::ConfigError;

const ENV_SYMBOL: &str = "TRACKER_SYMBOL";
const ENV_BASE_URL: &str = "TRACKER_BASE_URL";
const ENV_MORNING_TIME: &str = "TRACKER_MORNING_TIME";
const ENV_EVENING_TIME: &str = "TRACKER_EVENING_TIME";
const ENV_TIMEOUT_SECS: &str = "TRACKER_TIMEOUT_SECS";
const ENV_REFRESH_SECS: &str = "TRACKER_REFRESH_SECS";

const DEFAULT_SYMBOL: &str = "BTCUSDT";

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub symbol: String,
    pub base_url: String,
    pub morning_mark: NaiveTime,
    pub evening_mark: NaiveTime,
    pub timeout: Duration,
    /// `None` renders one report and exits
    pub refresh_interval: Option<Duration>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        let (morning_mark, evening_mark) = default_marks();
        Self {
            symbol: DEFAULT_SYMBOL.to_string(),
            base_url: DeltaClient::DEFAULT_BASE_URL.to_string(),
            morning_mark,
            evening_mark,
            timeout: DeltaClient::DEFAULT_TIMEOUT,
            refresh_interval: None,
        }
    }
}

impl TrackerConfig {
    /// Load from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup; unset or blank keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(symbol) = get(ENV_SYMBOL) {
            config.symbol = symbol.to_uppercase();
        }

        if let Some(url) = get(ENV_BASE_URL) {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid {
                    var: ENV_BASE_URL,
                    value: url,
                    reason: "must start with http:// or https://".to_string(),
                });
            }
            config.base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(value) = get(ENV_MORNING_TIME) {
            config.morning_mark = parse_mark(ENV_MORNING_TIME, &value)?;
        }

        if let Some(value) = get(ENV_EVENING_TIME) {
            config.evening_mark = parse_mark(ENV_EVENING_TIME, &value)?;
        }

        if let Some(value) = get(ENV_TIMEOUT_SECS) {
            let secs = parse_secs(ENV_TIMEOUT_SECS, &value)?;
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    var: ENV_TIMEOUT_SECS,
                    value,
                    reason: "must be greater than zero".to_string(),
                });
            }
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(value) = get(ENV_REFRESH_SECS) {
            let secs = parse_secs(ENV_REFRESH_SECS, &value)?;
            config.refresh_interval = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }
}

fn parse_mark(var: &'static str, value: &str) -> Result<NaiveTime, ConfigError> {
    parse_time_of_day(value).map_err(|reason| ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason,
    })
}

fn parse_secs(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|e| ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
