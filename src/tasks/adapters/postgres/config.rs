//! Connection configuration for the persistent task store.

use thiserror::Error;

/// Environment variable consulted by [`StoreConfig::from_env`].
pub const DATABASE_URL_ENV: &str = "TASKSYNC_DATABASE_URL";

/// Connection parameters for the persistent task store.
///
/// Consumed by the locator on first repository construction; later calls
/// reuse the already-built store and ignore the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    database_url: String,
    max_pool_size: u32,
}

impl StoreConfig {
    /// Pool size applied when none is configured explicitly.
    pub const DEFAULT_MAX_POOL_SIZE: u32 = 4;

    /// Creates a config with required connection parameters.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_pool_size: Self::DEFAULT_MAX_POOL_SIZE,
        }
    }

    /// Sets the maximum number of pooled connections.
    #[must_use]
    pub const fn with_max_pool_size(mut self, max_pool_size: u32) -> Self {
        self.max_pool_size = max_pool_size;
        self
    }

    /// Reads the connection URL from [`DATABASE_URL_ENV`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreConfigError::MissingDatabaseUrl`] when the variable is
    /// unset or empty.
    pub fn from_env() -> Result<Self, StoreConfigError> {
        let url = std::env::var(DATABASE_URL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or(StoreConfigError::MissingDatabaseUrl(DATABASE_URL_ENV))?;
        Ok(Self::new(url))
    }

    /// Returns the database connection URL.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Returns the maximum number of pooled connections.
    #[must_use]
    pub const fn max_pool_size(&self) -> u32 {
        self.max_pool_size
    }
}

/// Errors returned while assembling a store configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreConfigError {
    /// The connection URL environment variable is not set.
    #[error("environment variable {0} is not set")]
    MissingDatabaseUrl(&'static str),
}
