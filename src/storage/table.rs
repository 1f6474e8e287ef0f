//! Client table settings: table naming, pool sizing, and user id handling.

use crate::errors::ConfigError;
use std::fmt;
use std::time::Duration;

/// Table used when no override is configured
pub const DEFAULT_TABLE_NAME: &str = "oauth2_clients";

/// Longest identifier PostgreSQL keeps without truncation
const MAX_TABLE_NAME_LEN: usize = 63;

/// Validated table name.
///
/// Table names are interpolated into SQL, so only plain identifiers are accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableName(String);

impl TableName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted identifier for use in statements
    pub(crate) fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }

    /// Name for an index on `column` of this table
    pub(crate) fn index_name(&self, column: &str) -> String {
        format!("\"idx_{}_{}\"", self.0, column)
    }
}

impl Default for TableName {
    fn default() -> Self {
        Self(DEFAULT_TABLE_NAME.to_string())
    }
}

impl TryFrom<String> for TableName {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Ok(Self::default());
        }

        let mut chars = value.chars();
        let valid_start = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

        if !valid_start || !valid_rest || value.len() > MAX_TABLE_NAME_LEN {
            return Err(ConfigError::InvalidTableName(value));
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for TableName {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from(value.to_string())
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Connection pool parameters applied when a store opens its own pool
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolSettings {
    max_open_connections: u32,
    max_idle_connections: u32,
    max_lifetime: Duration,
}

impl PoolSettings {
    /// Idle connections never exceed the open connection limit.
    pub fn new(max_open_connections: u32, max_idle_connections: u32, max_lifetime: Duration) -> Self {
        let max_open_connections = max_open_connections.max(1);
        Self {
            max_open_connections,
            max_idle_connections: max_idle_connections.min(max_open_connections),
            max_lifetime,
        }
    }

    pub fn max_open_connections(&self) -> u32 {
        self.max_open_connections
    }

    /// Idle connections the pool keeps warm
    pub fn max_idle_connections(&self) -> u32 {
        self.max_idle_connections
    }

    pub fn max_lifetime(&self) -> Duration {
        self.max_lifetime
    }
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self::new(100, 10, Duration::from_secs(60 * 60))
    }
}

/// How `create` stores a user id string that is not an unsigned integer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UserIdPolicy {
    /// Record the owning user as 0
    #[default]
    DefaultToZero,
    /// Fail the create with `StorageError::InvalidData`
    Reject,
}

impl TryFrom<String> for UserIdPolicy {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "" | "zero" => Ok(Self::DefaultToZero),
            "reject" => Ok(Self::Reject),
            _ => Err(ConfigError::UnknownUserIdPolicy(value)),
        }
    }
}

/// Construction options shared by every client store backend
#[derive(Clone, Debug, Default)]
pub struct ClientStoreOptions {
    pub table_name: TableName,
    pub pool: PoolSettings,
    pub user_id_policy: UserIdPolicy,
}

impl ClientStoreOptions {
    pub fn with_table_name(mut self, table_name: TableName) -> Self {
        self.table_name = table_name;
        self
    }

    pub fn with_pool(mut self, pool: PoolSettings) -> Self {
        self.pool = pool;
        self
    }

    pub fn with_user_id_policy(mut self, policy: UserIdPolicy) -> Self {
        self.user_id_policy = policy;
        self
    }
}
