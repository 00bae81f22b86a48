use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL connection URL used by the command line tool
    #[serde(default)]
    pub db_url: String,

    /// PostgreSQL connection URL used by the integration tests
    #[serde(default)]
    pub test_db_url: Option<String>,

    /// Upper bound on open pool connections
    #[serde(default = "default_max_connections")]
    pub db_max_connections: u32,

    /// Idle connection budget; reported only, sqlx retires idle connections by age
    #[serde(default = "default_max_idle_connections")]
    pub db_max_idle_connections: u32,

    /// Seconds to wait for a free pool connection
    #[serde(default = "default_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    25
}

fn default_max_idle_connections() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

/// Pool sizing handed to the connection manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub max_idle_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            max_idle_connections: default_max_idle_connections(),
            acquire_timeout: Duration::from_secs(default_acquire_timeout_secs()),
        }
    }
}

impl Config {
    /// Load configuration from an optional env file, the process environment
    /// and an optional command line override for the database URL.
    ///
    /// An explicitly named env file must exist. Without one, a `.env` in the
    /// working directory is picked up if present.
    pub fn load(env_file: Option<&Path>, database_url: Option<String>) -> AppResult<Self> {
        match env_file {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| {
                    AppError::Config(format!(
                        "failed to load env file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                tracing::debug!(path = %path.display(), "Loaded env file");
            }
            None => {
                if let Ok(path) = dotenvy::dotenv() {
                    tracing::debug!(path = %path.display(), "Loaded .env");
                }
            }
        }

        Self::from_vars(std::env::vars(), database_url)
    }

    /// Build configuration from key/value pairs shaped like environment variables
    pub fn from_vars<I>(vars: I, database_url: Option<String>) -> AppResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config: Config = envy::from_iter(vars)?;
        if let Some(url) = database_url {
            config.db_url = url;
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if self.db_url.trim().is_empty() {
            return Err(AppError::Config(
                "DB_URL is not set (provide it in the environment, an env file, or --database-url)"
                    .to_string(),
            ));
        }
        if self.db_max_connections == 0 {
            return Err(AppError::Config(
                "DB_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }
        if self.db_max_idle_connections > self.db_max_connections {
            return Err(AppError::Config(format!(
                "DB_MAX_IDLE_CONNECTIONS ({}) exceeds DB_MAX_CONNECTIONS ({})",
                self.db_max_idle_connections, self.db_max_connections
            )));
        }
        Ok(())
    }

    /// `TEST_DB_URL` when set to something other than blanks
    pub fn test_database_url(&self) -> Option<&str> {
        self.test_db_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.db_max_connections,
            max_idle_connections: self.db_max_idle_connections,
            acquire_timeout: Duration::from_secs(self.db_acquire_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_vars(vars(&[("DB_URL", "postgres://localhost/app")]), None)
            .unwrap();

        assert_eq!(config.db_url, "postgres://localhost/app");
        assert_eq!(config.test_db_url, None);
        assert_eq!(config.pool_settings(), PoolSettings::default());
    }

    #[test]
    fn test_reads_all_fields() {
        let config = Config::from_vars(
            vars(&[
                ("DB_URL", "postgres://localhost/app"),
                ("TEST_DB_URL", "postgres://localhost/app_test"),
                ("DB_MAX_CONNECTIONS", "10"),
                ("DB_MAX_IDLE_CONNECTIONS", "2"),
                ("DB_ACQUIRE_TIMEOUT_SECS", "3"),
            ]),
            None,
        )
        .unwrap();

        assert_eq!(
            config.test_db_url.as_deref(),
            Some("postgres://localhost/app_test")
        );
        let pool = config.pool_settings();
        assert_eq!(pool.max_connections, 10);
        assert_eq!(pool.max_idle_connections, 2);
        assert_eq!(pool.acquire_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_blank_test_db_url_is_absent() {
        let config = Config::from_vars(
            vars(&[("DB_URL", "postgres://localhost/app"), ("TEST_DB_URL", " ")]),
            None,
        )
        .unwrap();
        assert_eq!(config.test_database_url(), None);

        let config = Config::from_vars(
            vars(&[
                ("DB_URL", "postgres://localhost/app"),
                ("TEST_DB_URL", "postgres://localhost/app_test"),
            ]),
            None,
        )
        .unwrap();
        assert_eq!(
            config.test_database_url(),
            Some("postgres://localhost/app_test")
        );
    }

    #[test]
    fn test_missing_db_url_is_rejected() {
        let result = Config::from_vars(vars(&[]), None);
        assert!(matches!(result, Err(AppError::Config(_))));

        let result = Config::from_vars(vars(&[("DB_URL", "  ")]), None);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_override_replaces_db_url() {
        let config = Config::from_vars(
            vars(&[("DB_URL", "postgres://localhost/app")]),
            Some("postgres://elsewhere/app".to_string()),
        )
        .unwrap();
        assert_eq!(config.db_url, "postgres://elsewhere/app");

        let config =
            Config::from_vars(vars(&[]), Some("postgres://elsewhere/app".to_string())).unwrap();
        assert_eq!(config.db_url, "postgres://elsewhere/app");
    }

    #[test]
    fn test_pool_bounds_validated() {
        let result = Config::from_vars(
            vars(&[
                ("DB_URL", "postgres://localhost/app"),
                ("DB_MAX_CONNECTIONS", "0"),
                ("DB_MAX_IDLE_CONNECTIONS", "0"),
            ]),
            None,
        );
        assert!(matches!(result, Err(AppError::Config(_))));

        let result = Config::from_vars(
            vars(&[
                ("DB_URL", "postgres://localhost/app"),
                ("DB_MAX_CONNECTIONS", "4"),
                ("DB_MAX_IDLE_CONNECTIONS", "5"),
            ]),
            None,
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_malformed_number_is_config_error() {
        let result = Config::from_vars(
            vars(&[
                ("DB_URL", "postgres://localhost/app"),
                ("DB_MAX_CONNECTIONS", "many"),
            ]),
            None,
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_missing_env_file_is_fatal() {
        let result = Config::load(
            Some(Path::new("/definitely/not/here/.env")),
            Some("postgres://localhost/app".to_string()),
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
