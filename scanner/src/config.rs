use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:5002";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DATA_DIR: &str = ".scanner";
pub const DEFAULT_NOTIFICATION_TTL_MS: u64 = 5000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid inference API URL '{0}': {1}")]
    InvalidUrl(String, url::ParseError),
    #[error("Invalid value for {0}: {1}")]
    InvalidNumber(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub request_timeout: Duration,
    pub data_dir: PathBuf,
    pub notification_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            notification_ttl: Duration::from_millis(DEFAULT_NOTIFICATION_TTL_MS),
        }
    }
}

impl Config {
    /// Reads configuration from the process environment, after loading a
    /// `.env` file when one is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let api_url = env::var("INFERENCE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(&api_url).map_err(|e| ConfigError::InvalidUrl(api_url.clone(), e))?;

        let timeout_secs = read_number("INFERENCE_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let ttl_ms = read_number("NOTIFICATION_TTL_MS", DEFAULT_NOTIFICATION_TTL_MS)?;
        let data_dir = env::var("SCANNER_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());

        let config = Self {
            api_url,
            request_timeout: Duration::from_secs(timeout_secs),
            data_dir: PathBuf::from(data_dir),
            notification_ttl: Duration::from_millis(ttl_ms),
        };

        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }
}

fn read_number(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber(key, raw)),
        Err(_) => Ok(default),
    }
}
