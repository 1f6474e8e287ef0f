//! Environment-based configuration for the client store.

use anyhow::Result;
use std::time::Duration;

use crate::errors::ConfigError;
use crate::storage::{ClientStoreOptions, PoolSettings, TableName, UserIdPolicy};

/// Maximum open pool connections
#[derive(Clone, Debug)]
pub struct MaxOpenConnections(u32);

/// Idle pool connections kept warm
#[derive(Clone, Debug)]
pub struct MaxIdleConnections(u32);

/// Lifetime after which pooled connections are recycled
#[derive(Clone, Debug)]
pub struct ConnMaxLifetime(Duration);

/// Main application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub version: String,
    pub storage_backend: String,
    pub database_url: Option<String>,
    pub table_name: TableName,
    pub max_open_connections: MaxOpenConnections,
    pub max_idle_connections: MaxIdleConnections,
    pub conn_max_lifetime: ConnMaxLifetime,
    pub user_id_policy: UserIdPolicy,
}

impl Config {
    /// Create a new configuration from environment variables
    pub fn new() -> Result<Self> {
        let storage_backend = default_env("STORAGE_BACKEND", "sqlite");
        let database_url = optional_env("DATABASE_URL");
        let table_name: TableName = default_env("CLIENT_STORE_TABLE_NAME", "").try_into()?;
        let max_open_connections: MaxOpenConnections =
            default_env("CLIENT_STORE_MAX_OPEN_CONNECTIONS", "100").try_into()?;
        let max_idle_connections: MaxIdleConnections =
            default_env("CLIENT_STORE_MAX_IDLE_CONNECTIONS", "10").try_into()?;
        let conn_max_lifetime: ConnMaxLifetime =
            default_env("CLIENT_STORE_CONN_MAX_LIFETIME", "1h").try_into()?;
        let user_id_policy: UserIdPolicy =
            default_env("CLIENT_STORE_USER_ID_POLICY", "zero").try_into()?;

        Ok(Self {
            version: version()?,
            storage_backend,
            database_url,
            table_name,
            max_open_connections,
            max_idle_connections,
            conn_max_lifetime,
            user_id_policy,
        })
    }

    /// Store construction options derived from this configuration
    pub fn client_store_options(&self) -> ClientStoreOptions {
        ClientStoreOptions::default()
            .with_table_name(self.table_name.clone())
            .with_pool(PoolSettings::new(
                *self.max_open_connections.as_ref(),
                *self.max_idle_connections.as_ref(),
                *self.conn_max_lifetime.as_ref(),
            ))
            .with_user_id_policy(self.user_id_policy)
    }
}

/// Get application version from build environment
pub fn version() -> Result<String> {
    option_env!("GIT_HASH")
        .or(option_env!("CARGO_PKG_VERSION"))
        .map(|val| val.to_string())
        .ok_or(ConfigError::VersionNotSet.into())
}

pub(crate) fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn default_env(name: &str, default_value: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default_value.to_string())
}

fn parse_count(name: &str, value: &str) -> Result<u32, ConfigError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|err| ConfigError::NumberParsingFailed(name.to_string(), err))
}

impl TryFrom<String> for MaxOpenConnections {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Ok(Self(100));
        }
        parse_count("CLIENT_STORE_MAX_OPEN_CONNECTIONS", &value).map(Self)
    }
}

impl AsRef<u32> for MaxOpenConnections {
    fn as_ref(&self) -> &u32 {
        &self.0
    }
}

impl TryFrom<String> for MaxIdleConnections {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Ok(Self(10));
        }
        parse_count("CLIENT_STORE_MAX_IDLE_CONNECTIONS", &value).map(Self)
    }
}

impl AsRef<u32> for MaxIdleConnections {
    fn as_ref(&self) -> &u32 {
        &self.0
    }
}

impl TryFrom<String> for ConnMaxLifetime {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Ok(Self(Duration::from_secs(60 * 60)));
        }
        duration_str::parse(&value)
            .map(Self)
            .map_err(|e| ConfigError::DurationParsingFailed(value, e.to_string()))
    }
}

impl AsRef<Duration> for ConnMaxLifetime {
    fn as_ref(&self) -> &Duration {
        &self.0
    }
}
