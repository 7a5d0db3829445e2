//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use wager_duel::duel::{DuelConfig, RoundSpeed};

/// Default HTTP bind address
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Default directory served for unmatched paths
pub const DEFAULT_STATIC_DIR: &str = "public";

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Directory of static client files
    pub static_dir: PathBuf,
    /// Prometheus exporter address, disabled when unset
    pub metrics_bind: Option<SocketAddr>,
    /// Match configuration
    pub duel: DuelConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `static_dir_override` - Optional static directory override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but cannot be parsed
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        static_dir_override: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_env_strict("SERVER_BIND")?.unwrap_or(default_bind()),
        };

        let static_dir = static_dir_override
            .or_else(|| std::env::var("STATIC_DIR").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR));

        let metrics_bind = parse_env_strict("METRICS_BIND")?;

        let defaults = DuelConfig::default();
        let speed = match std::env::var("ROUND_SPEED") {
            Ok(value) => value
                .parse::<RoundSpeed>()
                .map_err(|reason| ConfigError::Invalid {
                    var: "ROUND_SPEED".to_string(),
                    reason,
                })?,
            Err(_) => defaults.speed,
        };

        let duel = DuelConfig {
            name: std::env::var("MATCH_NAME").unwrap_or(defaults.name),
            speed,
            starting_balance: parse_env_or("MATCH_STARTING_BALANCE", defaults.starting_balance),
            min_wager: parse_env_or("MATCH_MIN_WAGER", defaults.min_wager),
            bankruptcy_threshold: parse_env_or(
                "MATCH_BANKRUPTCY_THRESHOLD",
                defaults.bankruptcy_threshold,
            ),
            disparity_multiplier: parse_env_or(
                "MATCH_DISPARITY_MULTIPLIER",
                defaults.disparity_multiplier,
            ),
            double_timeout_limit: parse_env_or(
                "MATCH_DOUBLE_TIMEOUT_LIMIT",
                defaults.double_timeout_limit,
            ),
            reconnect_grace_secs: parse_env_or(
                "RECONNECT_GRACE_SECS",
                defaults.reconnect_grace_secs,
            ),
        };

        Ok(ServerConfig {
            bind,
            static_dir,
            metrics_bind,
            duel,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(metrics_bind) = self.metrics_bind
            && metrics_bind == self.bind
        {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from server bind ({})", self.bind),
            });
        }

        self.duel.validate().map_err(|reason| ConfigError::Invalid {
            var: "MATCH_*".to_string(),
            reason,
        })
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Like [`parse_env_or`] but a present, unparsable value is an error
fn parse_env_strict<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value.parse().map(Some).map_err(|e: T::Err| ConfigError::Invalid {
            var: key.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ServerConfig {
        ServerConfig {
            bind: "127.0.0.1:8080".parse().unwrap(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            metrics_bind: None,
            duel: DuelConfig::default(),
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Invalid {
            var: "ROUND_SPEED".to_string(),
            reason: "Unknown round speed 'warp'".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ROUND_SPEED"));
        assert!(msg.contains("warp"));
    }

    #[test]
    fn test_default_bind_matches_constant() {
        assert_eq!(default_bind(), DEFAULT_BIND.parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_config_validation_defaults() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_metrics_on_server_port() {
        let mut config = config();
        config.metrics_bind = Some(config.bind);

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "METRICS_BIND"));
    }

    #[test]
    fn test_config_validation_bad_match_settings() {
        let mut config = config();
        config.duel.bankruptcy_threshold = config.duel.starting_balance + 1;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_parse_env_or_falls_back_when_unset() {
        assert_eq!(parse_env_or("WD_SERVER_TEST_UNSET_VAR", 42u32), 42);
    }

    #[test]
    fn test_parse_env_strict_unset_is_none() {
        let value: Option<SocketAddr> = parse_env_strict("WD_SERVER_TEST_UNSET_BIND").unwrap();
        assert!(value.is_none());
    }
}
