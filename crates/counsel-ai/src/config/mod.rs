use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use chrono::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub prediction: PredictionSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let cache_ttl_secs: u32 = parse_var("PREDICTION_CACHE_TTL_SECS", 300)?;
        let lookback_years: u16 = parse_var("PREDICTION_LOOKBACK_YEARS", 3)?;
        let store_timeout_ms: u32 = parse_var("PREDICTION_STORE_TIMEOUT_MS", 2_000)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            prediction: PredictionSettings {
                cache_ttl: Duration::seconds(i64::from(cache_ttl_secs)),
                lookback_years,
                store_timeout: Duration::milliseconds(i64::from(store_timeout_ms)),
                cutoffs_csv: env::var("PREDICTION_CUTOFFS_CSV").ok().map(PathBuf::from),
                colleges_csv: env::var("PREDICTION_COLLEGES_CSV").ok().map(PathBuf::from),
            },
        })
    }
}

fn parse_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
        _ => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Runtime knobs for the prediction pipeline and its reference data.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionSettings {
    pub cache_ttl: Duration,
    pub lookback_years: u16,
    pub store_timeout: Duration,
    pub cutoffs_csv: Option<PathBuf>,
    pub colleges_csv: Option<PathBuf>,
}

impl Default for PredictionSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::minutes(5),
            lookback_years: 3,
            store_timeout: Duration::seconds(2),
            cutoffs_csv: None,
            colleges_csv: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a non-negative integer, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "PREDICTION_CACHE_TTL_SECS",
            "PREDICTION_LOOKBACK_YEARS",
            "PREDICTION_STORE_TIMEOUT_MS",
            "PREDICTION_CUTOFFS_CSV",
            "PREDICTION_COLLEGES_CSV",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.prediction, PredictionSettings::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn reads_prediction_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PREDICTION_CACHE_TTL_SECS", "600");
        env::set_var("PREDICTION_LOOKBACK_YEARS", "5");
        env::set_var("PREDICTION_CUTOFFS_CSV", "/data/cutoffs.csv");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.prediction.cache_ttl, Duration::minutes(10));
        assert_eq!(config.prediction.lookback_years, 5);
        assert_eq!(
            config.prediction.cutoffs_csv,
            Some(PathBuf::from("/data/cutoffs.csv"))
        );
        reset_env();
    }

    #[test]
    fn rejects_non_numeric_ttl() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PREDICTION_CACHE_TTL_SECS", "five minutes");
        let error = AppConfig::load().expect_err("ttl must be numeric");
        assert!(error.to_string().contains("PREDICTION_CACHE_TTL_SECS"));
        reset_env();
    }

    #[test]
    fn rejects_negative_durations() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PREDICTION_STORE_TIMEOUT_MS", "-1");
        let error = AppConfig::load().expect_err("timeout must be non-negative");
        assert!(error.to_string().contains("PREDICTION_STORE_TIMEOUT_MS"));

        reset_env();
        env::set_var("PREDICTION_CACHE_TTL_SECS", "-300");
        let error = AppConfig::load().expect_err("ttl must be non-negative");
        assert!(error.to_string().contains("PREDICTION_CACHE_TTL_SECS"));
        reset_env();
    }
}
