//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use live_bracket::feed::{DEFAULT_CHANNEL_CAPACITY, FeedConfig};
use live_bracket::store::DatabaseConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default listen address
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Accepted range for `FEED_TICK_MS`
pub const TICK_MS_RANGE: std::ops::RangeInclusive<u64> = 100..=60_000;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Where snapshots are read from
    pub store: StoreBackend,
    /// Subscription cadence and buffering
    pub feed: FeedConfig,
    /// Prometheus exporter address, disabled when `None`
    pub metrics_bind: Option<SocketAddr>,
}

/// Snapshot store selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// PostgreSQL written by the administrative service
    Postgres(DatabaseConfig),
    /// In-memory store seeded from a JSON file
    Memory { seed_path: PathBuf },
}

/// Values given on the command line, taking precedence over the environment
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub bind: Option<SocketAddr>,
    pub database_url: Option<String>,
    pub memory_seed: Option<PathBuf>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or unparsable
    pub fn from_env(overrides: CliOverrides) -> Result<Self, ConfigError> {
        Self::from_lookup(overrides, |key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process environment
    pub fn from_lookup<F>(overrides: CliOverrides, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader { lookup };

        let bind = match overrides.bind {
            Some(bind) => bind,
            None => env
                .parse("SERVER_BIND")?
                .map_or_else(|| DEFAULT_BIND.parse(), Ok)
                .map_err(|_| ConfigError::Invalid {
                    var: "SERVER_BIND".to_string(),
                    reason: "Not a socket address".to_string(),
                })?,
        };

        let memory_seed = overrides
            .memory_seed
            .or_else(|| env.get("MEMORY_SEED").map(PathBuf::from));

        let store = match memory_seed {
            Some(seed_path) => StoreBackend::Memory { seed_path },
            None => {
                let database_url = overrides
                    .database_url
                    .or_else(|| env.get("DATABASE_URL"))
                    .ok_or_else(|| ConfigError::MissingRequired {
                        var: "DATABASE_URL".to_string(),
                        hint: "Set a PostgreSQL URL or pass --memory <seed.json>".to_string(),
                    })?;

                let defaults = DatabaseConfig::new(database_url);
                StoreBackend::Postgres(DatabaseConfig {
                    max_connections: env
                        .parse("DB_MAX_CONNECTIONS")?
                        .unwrap_or(defaults.max_connections),
                    min_connections: env
                        .parse("DB_MIN_CONNECTIONS")?
                        .unwrap_or(defaults.min_connections),
                    connection_timeout_secs: env
                        .parse("DB_CONNECTION_TIMEOUT_SECS")?
                        .unwrap_or(defaults.connection_timeout_secs),
                    idle_timeout_secs: env
                        .parse("DB_IDLE_TIMEOUT_SECS")?
                        .unwrap_or(defaults.idle_timeout_secs),
                    max_lifetime_secs: env
                        .parse("DB_MAX_LIFETIME_SECS")?
                        .unwrap_or(defaults.max_lifetime_secs),
                    ..defaults
                })
            }
        };

        let tick_ms: u64 = env.parse("FEED_TICK_MS")?.unwrap_or(2000);
        let feed = FeedConfig {
            tick_interval: Duration::from_millis(tick_ms),
            channel_capacity: env
                .parse("FEED_CHANNEL_CAPACITY")?
                .unwrap_or(DEFAULT_CHANNEL_CAPACITY),
        };

        let metrics_bind = env.parse("METRICS_BIND")?;

        Ok(ServerConfig {
            bind,
            store,
            feed,
            metrics_bind,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tick_ms = u64::try_from(self.feed.tick_interval.as_millis()).unwrap_or(u64::MAX);
        if !TICK_MS_RANGE.contains(&tick_ms) {
            return Err(ConfigError::Invalid {
                var: "FEED_TICK_MS".to_string(),
                reason: format!(
                    "Must be between {} and {}",
                    TICK_MS_RANGE.start(),
                    TICK_MS_RANGE.end()
                ),
            });
        }

        if self.feed.channel_capacity == 0 {
            return Err(ConfigError::Invalid {
                var: "FEED_CHANNEL_CAPACITY".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if let StoreBackend::Postgres(db) = &self.store {
            if db.max_connections == 0 {
                return Err(ConfigError::Invalid {
                    var: "DB_MAX_CONNECTIONS".to_string(),
                    reason: "Must be greater than 0".to_string(),
                });
            }
            if db.min_connections > db.max_connections {
                return Err(ConfigError::Invalid {
                    var: "DB_MIN_CONNECTIONS".to_string(),
                    reason: format!("Cannot exceed max connections ({})", db.max_connections),
                });
            }
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Raw value, with empty strings treated as unset
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    /// Parsed value; a present but unparsable value is an error
    fn parse<T: FromStr>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        self.get(key)
            .map(|raw| {
                raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    var: key.to_string(),
                    reason: format!("Cannot parse {:?}", raw),
                })
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)], overrides: CliOverrides) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(overrides, |key| vars.get(key).cloned())
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "DATABASE_URL".to_string(),
            hint: "Use --memory".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("DATABASE_URL"));
        assert!(msg.contains("Use --memory"));
    }

    #[test]
    fn test_defaults_with_database_url() {
        let config = load(&[("DATABASE_URL", "postgres://db/bracket")], CliOverrides::default())
            .unwrap();
        assert_eq!(config.bind, DEFAULT_BIND.parse().unwrap());
        assert_eq!(config.feed, FeedConfig::default());
        assert_eq!(config.metrics_bind, None);
        assert_eq!(
            config.store,
            StoreBackend::Postgres(DatabaseConfig::new("postgres://db/bracket"))
        );
        config.validate().unwrap();
    }

    #[test]
    fn test_missing_database_url() {
        let err = load(&[], CliOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { ref var, .. } if var == "DATABASE_URL"));
    }

    #[test]
    fn test_memory_seed_needs_no_database() {
        let config = load(&[("MEMORY_SEED", "seed.json")], CliOverrides::default()).unwrap();
        assert_eq!(
            config.store,
            StoreBackend::Memory {
                seed_path: PathBuf::from("seed.json")
            }
        );
    }

    #[test]
    fn test_cli_overrides_win() {
        let overrides = CliOverrides {
            bind: Some("0.0.0.0:8080".parse().unwrap()),
            database_url: Some("postgres://cli/db".to_string()),
            memory_seed: None,
        };
        let config = load(
            &[
                ("SERVER_BIND", "127.0.0.1:1"),
                ("DATABASE_URL", "postgres://env/db"),
            ],
            overrides,
        )
        .unwrap();
        assert_eq!(config.bind.port(), 8080);
        match config.store {
            StoreBackend::Postgres(db) => assert_eq!(db.database_url, "postgres://cli/db"),
            other => panic!("unexpected backend {:?}", other),
        }
    }

    #[test]
    fn test_feed_and_pool_tuning() {
        let config = load(
            &[
                ("DATABASE_URL", "postgres://db/bracket"),
                ("FEED_TICK_MS", "500"),
                ("FEED_CHANNEL_CAPACITY", "4"),
                ("DB_MAX_CONNECTIONS", "50"),
                ("METRICS_BIND", "127.0.0.1:9090"),
            ],
            CliOverrides::default(),
        )
        .unwrap();
        assert_eq!(config.feed.tick_interval, Duration::from_millis(500));
        assert_eq!(config.feed.channel_capacity, 4);
        assert_eq!(config.metrics_bind.unwrap().port(), 9090);
        match config.store {
            StoreBackend::Postgres(db) => assert_eq!(db.max_connections, 50),
            other => panic!("unexpected backend {:?}", other),
        }
    }

    #[test]
    fn test_unparsable_value_is_rejected() {
        let err = load(
            &[("DATABASE_URL", "postgres://db"), ("FEED_TICK_MS", "fast")],
            CliOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "FEED_TICK_MS"));

        let err = load(
            &[("DATABASE_URL", "postgres://db"), ("SERVER_BIND", "nowhere")],
            CliOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "SERVER_BIND"));
    }

    #[test]
    fn test_tick_out_of_range_fails_validation() {
        for tick in ["10", "600000"] {
            let config = load(
                &[("MEMORY_SEED", "seed.json"), ("FEED_TICK_MS", tick)],
                CliOverrides::default(),
            )
            .unwrap();
            assert!(matches!(
                config.validate(),
                Err(ConfigError::Invalid { ref var, .. }) if var == "FEED_TICK_MS"
            ));
        }
    }

    #[test]
    fn test_zero_capacity_fails_validation() {
        let config = load(
            &[("MEMORY_SEED", "seed.json"), ("FEED_CHANNEL_CAPACITY", "0")],
            CliOverrides::default(),
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pool_bounds_validation() {
        let config = load(
            &[
                ("DATABASE_URL", "postgres://db"),
                ("DB_MIN_CONNECTIONS", "30"),
                ("DB_MAX_CONNECTIONS", "10"),
            ],
            CliOverrides::default(),
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { ref var, .. }) if var == "DB_MIN_CONNECTIONS"
        ));
    }
}
