use std::env;
use std::time::Duration;

use crate::error::AppError;
use crate::models::Credentials;

pub const DEFAULT_POLL_SECS: u64 = 300;
pub const DEFAULT_DEBOUNCE_MS: u64 = 3000;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub credentials: Option<Credentials>,
    pub poll_interval: Duration,
    pub debounce: Duration,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("DASH_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AppError::Config("DASH_BASE_URL is not set".to_string()))?;

        let credentials = match (lookup("DASH_USER"), lookup("DASH_PASSWORD")) {
            (Some(id), Some(password)) => Some(Credentials { id, password, remember: true }),
            (None, None) => None,
            _ => {
                return Err(AppError::Config(
                    "DASH_USER and DASH_PASSWORD must be set together".to_string(),
                ));
            }
        };

        let poll_secs = parse_number(&lookup, "DASH_POLL_SECS")?.unwrap_or(DEFAULT_POLL_SECS);
        if poll_secs == 0 {
            return Err(AppError::Config("DASH_POLL_SECS must be at least 1".to_string()));
        }
        let debounce_ms =
            parse_number(&lookup, "DASH_DEBOUNCE_MS")?.unwrap_or(DEFAULT_DEBOUNCE_MS);
        let timeout = parse_number(&lookup, "DASH_TIMEOUT_SECS")?.map(Duration::from_secs);

        Ok(Self {
            base_url,
            credentials,
            poll_interval: Duration::from_secs(poll_secs),
            debounce: Duration::from_millis(debounce_ms),
            timeout,
        })
    }
}

fn parse_number<F>(lookup: &F, key: &str) -> Result<Option<u64>, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|_| AppError::Config(format!("{} must be a number, got {:?}", key, raw)))
        })
        .transpose()
}
