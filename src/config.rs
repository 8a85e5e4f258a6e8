//! Application configuration loaded from environment variables.
//!
//! Cloud Run injects secrets as environment variables via secret bindings,
//! so everything is read from the environment once at startup.

use chrono_tz::Tz;
use std::env;
use std::time::Duration;

/// Zone used when `TIME_ZONE` is unset. The product's users are on campus.
const DEFAULT_TIME_ZONE: Tz = chrono_tz::America::Los_Angeles;

/// Sessions untouched for this long are flushed and dropped.
const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// IANA zone of the users, used to decide which calendar day an entry
    /// belongs to (daylight saving included).
    pub time_zone: Tz,
    /// How long an unused in-memory session is kept.
    pub session_idle_timeout: Duration,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            time_zone: Tz::UTC,
            session_idle_timeout: Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let time_zone = match env::var("TIME_ZONE") {
            Ok(raw) => raw
                .trim()
                .parse::<Tz>()
                .map_err(|_| ConfigError::Invalid("TIME_ZONE"))?,
            Err(_) => DEFAULT_TIME_ZONE,
        };

        let session_idle_secs = match env::var("SESSION_IDLE_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid("SESSION_IDLE_SECS"))?,
            Err(_) => DEFAULT_SESSION_IDLE_SECS,
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .trim()
                .as_bytes()
                .to_vec(),
            time_zone,
            session_idle_timeout: Duration::from_secs(session_idle_secs),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Both cases share one test so they do not race on the environment.
    #[test]
    fn test_config_from_env() {
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("TIME_ZONE", "America/New_York");
        env::set_var("SESSION_IDLE_SECS", "90");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.jwt_signing_key, b"test_jwt_key_32_bytes_minimum!!");
        assert_eq!(config.time_zone, chrono_tz::America::New_York);
        assert_eq!(config.session_idle_timeout, Duration::from_secs(90));
        assert_eq!(config.port, 8080);

        env::set_var("TIME_ZONE", "Pacific/Atlantis");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("TIME_ZONE"))
        ));

        env::remove_var("TIME_ZONE");
        env::set_var("SESSION_IDLE_SECS", "0");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("SESSION_IDLE_SECS"))
        ));

        env::remove_var("SESSION_IDLE_SECS");
        let config = Config::from_env().expect("Config should load");
        assert_eq!(config.time_zone, DEFAULT_TIME_ZONE);
    }

    #[test]
    fn test_default_time_zone_is_utc() {
        assert_eq!(Config::test_default().time_zone, Tz::UTC);
    }
}
