use std::env;
use std::time::Duration;

use shared::constants::{API_BASE_URL, DICTIONARY_API_BASE_URL, WORD_API_BASE_URL};

use crate::error::ClientError;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_AD_DELAY_MS: u64 = 1500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub word_api_base_url: String,
    pub dictionary_api_base_url: String,
    pub user_id: i64,
    pub username: Option<String>,
    pub http_timeout: Duration,
    pub ad_delay: Duration,
    /// Fixed seed for puzzle generation; random when unset.
    pub rng_seed: Option<u64>,
}

impl ClientConfig {
    /// Reads configuration from the process environment (after `.env` has
    /// been loaded by the caller).
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let user_id = lookup("TONMICS_USER_ID")
            .ok_or_else(|| ClientError::Config("TONMICS_USER_ID must be set".to_string()))
            .and_then(|raw| parse_number::<i64>("TONMICS_USER_ID", &raw))?;

        let http_timeout = match lookup("HTTP_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_number("HTTP_TIMEOUT_SECS", &raw)?),
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        let ad_delay = match lookup("AD_DELAY_MS") {
            Some(raw) => Duration::from_millis(parse_number("AD_DELAY_MS", &raw)?),
            None => Duration::from_millis(DEFAULT_AD_DELAY_MS),
        };

        let rng_seed = match lookup("JUMBLE_SEED") {
            Some(raw) => Some(parse_number("JUMBLE_SEED", &raw)?),
            None => None,
        };

        Ok(Self {
            api_base_url: lookup("TONMICS_API_BASE_URL").unwrap_or_else(|| API_BASE_URL.to_string()),
            word_api_base_url: lookup("WORD_API_BASE_URL").unwrap_or_else(|| WORD_API_BASE_URL.to_string()),
            dictionary_api_base_url: lookup("DICTIONARY_API_BASE_URL")
                .unwrap_or_else(|| DICTIONARY_API_BASE_URL.to_string()),
            user_id,
            username: lookup("TONMICS_USERNAME").filter(|name| !name.trim().is_empty()),
            http_timeout,
            ad_delay,
            rng_seed,
        })
    }

    pub fn http_client(&self) -> Result<reqwest::Client, ClientError> {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .build()
            .map_err(ClientError::Http)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ClientError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ClientError::Config(format!("{} must be a number, got {:?}", key, raw)))
}
