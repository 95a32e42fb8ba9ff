use crate::error::ApiError;
use rust_decimal::Decimal;
use std::env;
use std::time::Duration;
use url::Url;

/// Tunnel the API is published behind. Change it here when the tunnel moves.
pub const DEFAULT_API_URL: &str = "https://unsecularized-marshlike-lavone.ngrok-free.dev";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Flat-rate fallback used when the server cannot price an exit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeSchedule {
    pub first_hour: Decimal,
    pub additional_hour: Decimal,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        FeeSchedule {
            first_hour: Decimal::new(2000, 0),
            additional_hour: Decimal::new(1000, 0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub timeout: Duration,
    pub fees: FeeSchedule,
}

impl Config {
    pub fn new(base_url: &str) -> Result<Config, ApiError> {
        Ok(Config {
            base_url: parse_base_url(base_url)?,
            timeout: DEFAULT_TIMEOUT,
            fees: FeeSchedule::default(),
        })
    }

    /// Reads `SIGEPARK_API_URL`, `SIGEPARK_TIMEOUT_SECS`, `SIGEPARK_FEE_BASE`
    /// and `SIGEPARK_FEE_INCREMENT`, falling back to the built-in defaults.
    pub fn from_env() -> Result<Config, ApiError> {
        let base_url = env::var("SIGEPARK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let mut config = Config::new(&base_url)?;
        if let Ok(secs) = env::var("SIGEPARK_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| ApiError::Config(format!("SIGEPARK_TIMEOUT_SECS={}", secs)))?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Ok(base) = env::var("SIGEPARK_FEE_BASE") {
            config.fees.first_hour = parse_amount("SIGEPARK_FEE_BASE", &base)?;
        }
        if let Ok(increment) = env::var("SIGEPARK_FEE_INCREMENT") {
            config.fees.additional_hour = parse_amount("SIGEPARK_FEE_INCREMENT", &increment)?;
        }
        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Config {
        self.timeout = timeout;
        self
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| ApiError::Config(format!("{}: {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::Config(format!("{} cannot be a base URL", raw)));
    }
    // Endpoint paths are absolute, so any path on the base is dropped.
    url.set_path("/");
    Ok(url)
}

fn parse_amount(name: &str, raw: &str) -> Result<Decimal, ApiError> {
    raw.trim()
        .parse::<Decimal>()
        .ok()
        .filter(|d| !d.is_sign_negative())
        .ok_or_else(|| ApiError::Config(format!("{}={}", name, raw)))
}
