use crate::progress::Pacing;
use std::{env, fmt, time::Duration};
use url::Url;

pub const API_URL_VAR: &str = "CHATPULSE_API_URL";
pub const PORT_VAR: &str = "PORT";
pub const INSTANT_VAR: &str = "CHATPULSE_INSTANT";
pub const TIMEOUT_VAR: &str = "CHATPULSE_TIMEOUT_SECS";
pub const MAX_UPLOAD_VAR: &str = "CHATPULSE_MAX_UPLOAD_BYTES";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub port: u16,
    pub pacing: Pacing,
    pub request_timeout: Option<Duration>,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingApiUrl,
    InvalidApiUrl { value: String, reason: String },
    InvalidNumber { var: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiUrl => write!(f, "{API_URL_VAR} is missing; set it to the analysis endpoint URL"),
            Self::InvalidApiUrl { value, reason } => {
                write!(f, "{API_URL_VAR} is not a usable http(s) URL ({value}): {reason}")
            }
            Self::InvalidNumber { var, value } => write!(f, "{var} must be a positive number, got {value:?}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = lookup(API_URL_VAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingApiUrl)?;
        let api_url = parse_api_url(&raw_url)?;

        // A malformed PORT falls back to the default, as it always has.
        let port = lookup(PORT_VAR)
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let pacing = match lookup(INSTANT_VAR).as_deref().map(str::trim) {
            Some("1") | Some("true") | Some("yes") => Pacing::Instant,
            _ => Pacing::Animated,
        };

        let request_timeout = positive_number(&lookup, TIMEOUT_VAR)?.map(Duration::from_secs);
        let max_upload_bytes = positive_number(&lookup, MAX_UPLOAD_VAR)?
            .map(|bytes| bytes as usize)
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        Ok(Self {
            api_url,
            port,
            pacing,
            request_timeout,
            max_upload_bytes,
        })
    }
}

fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|err| ConfigError::InvalidApiUrl {
        value: raw.to_string(),
        reason: err.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidApiUrl {
            value: raw.to_string(),
            reason: format!("unsupported scheme {other}"),
        }),
    }
}

fn positive_number(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<u64>, ConfigError> {
    let Some(value) = lookup(var) else {
        return Ok(None);
    };
    match value.trim().parse::<u64>() {
        Ok(number) if number > 0 => Ok(Some(number)),
        _ => Err(ConfigError::InvalidNumber { var, value }),
    }
}
