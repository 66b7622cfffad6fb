//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::net::SocketAddr;

/// Default HTTP bind address
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Default size of the blocking thread pool that runs ledger calls
pub const DEFAULT_BLOCKING_THREADS: usize = 64;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Prometheus exporter bind address (exporter disabled when `None`)
    pub metrics_bind: Option<SocketAddr>,
    /// Maximum threads in the tokio blocking pool
    pub blocking_threads: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `metrics_bind_override` - Optional metrics address override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if a variable is present but cannot be parsed
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        metrics_bind_override: Option<SocketAddr>,
    ) -> Result<Self, ConfigError> {
        Self::from_lookup(
            |key| std::env::var(key).ok(),
            bind_override,
            metrics_bind_override,
        )
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(
        lookup: F,
        bind_override: Option<SocketAddr>,
        metrics_bind_override: Option<SocketAddr>,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind = match bind_override {
            Some(addr) => addr,
            None => parse_var(&lookup, "SERVER_BIND")?.unwrap_or_else(default_bind),
        };

        let metrics_bind = match metrics_bind_override {
            Some(addr) => Some(addr),
            None => parse_var(&lookup, "METRICS_BIND")?,
        };

        let blocking_threads =
            parse_var(&lookup, "BLOCKING_THREADS")?.unwrap_or(DEFAULT_BLOCKING_THREADS);

        Ok(ServerConfig {
            bind,
            metrics_bind,
            blocking_threads,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blocking_threads == 0 {
            return Err(ConfigError::Invalid {
                var: "BLOCKING_THREADS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from the server bind address ({})", self.bind),
            });
        }

        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            metrics_bind: None,
            blocking_threads: DEFAULT_BLOCKING_THREADS,
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

/// Parse an optional variable, rejecting values that are set but malformed
fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                var: key.to_string(),
                reason: format!("{raw:?}: {e}"),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[]), None, None).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind.to_string(), DEFAULT_BIND);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_values() {
        let config = ServerConfig::from_lookup(
            lookup_from(&[
                ("SERVER_BIND", "0.0.0.0:9000"),
                ("METRICS_BIND", "0.0.0.0:9100"),
                ("BLOCKING_THREADS", "8"),
            ]),
            None,
            None,
        )
        .unwrap();
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.metrics_bind.map(|a| a.port()), Some(9100));
        assert_eq!(config.blocking_threads, 8);
    }

    #[test]
    fn test_overrides_win() {
        let bind: SocketAddr = "127.0.0.1:7000".parse().unwrap();
        let config = ServerConfig::from_lookup(
            lookup_from(&[("SERVER_BIND", "0.0.0.0:9000")]),
            Some(bind),
            None,
        )
        .unwrap();
        assert_eq!(config.bind, bind);
    }

    #[test]
    fn test_malformed_value_rejected() {
        let err = ServerConfig::from_lookup(lookup_from(&[("SERVER_BIND", "not-an-addr")]), None, None)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("SERVER_BIND"));
        assert!(msg.contains("not-an-addr"));
    }

    #[test]
    fn test_config_validation_zero_threads() {
        let config = ServerConfig {
            blocking_threads: 0,
            ..ServerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_config_validation_metrics_clash() {
        let config = ServerConfig {
            metrics_bind: Some(default_bind()),
            ..ServerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }
}
