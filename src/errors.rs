//! Standardized error types following the `error-clientstore-<domain>-<number>` format.

use thiserror::Error;

/// Configuration errors that occur while building a client store or reading settings.
///
/// These are startup failures: the embedding process decides whether to abort.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Error when a required environment variable is not set
    #[error("error-clientstore-config-1 {0} must be set")]
    EnvVarRequired(String),

    /// Error when version information is not available
    #[error("error-clientstore-config-2 One of GIT_HASH or CARGO_PKG_VERSION must be set")]
    VersionNotSet,

    /// Error when a numeric setting cannot be parsed
    #[error("error-clientstore-config-3 Failed to parse {0}: {1}")]
    NumberParsingFailed(String, std::num::ParseIntError),

    /// Error when duration string cannot be parsed
    #[error("error-clientstore-config-4 Failed to parse duration '{0}': {1}")]
    DurationParsingFailed(String, String),

    /// Error when the storage backend name is not supported by this build
    #[error("error-clientstore-config-5 Unknown storage backend: {0}")]
    UnknownStorageBackend(String),

    /// Error when the user id policy name is not recognized
    #[error("error-clientstore-config-6 Unknown user id policy '{0}': expected zero or reject")]
    UnknownUserIdPolicy(String),

    /// Error when the table name is not a plain SQL identifier
    #[error("error-clientstore-config-7 Invalid table name: {0}")]
    InvalidTableName(String),

    /// Error when the connection pool cannot be opened
    #[error("error-clientstore-config-8 Database connection failed: {0}")]
    ConnectionFailed(String),

    /// Error when the client table cannot be checked or created
    #[error("error-clientstore-config-9 Table provisioning failed: {0}")]
    TableProvisioningFailed(String),
}

/// Errors returned by client store operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// Error when query execution fails; carries the driver message verbatim
    #[error("error-clientstore-storage-1 Query execution failed: {0}")]
    QueryFailed(String),

    /// Error when a client cannot be encoded to, or decoded from, its JSON data column
    #[error("error-clientstore-storage-2 Data serialization failed: {0}")]
    SerializationFailed(String),

    /// Error when a client with the same client id already exists
    #[error("error-clientstore-storage-3 Duplicate client id: {0}")]
    DuplicateClient(String),

    /// Error when a client violates a column constraint before it reaches the database
    #[error("error-clientstore-storage-4 Invalid data: {0}")]
    InvalidData(String),

    /// Error when no client matches the requested client id
    #[error("error-clientstore-storage-5 Not found: {0}")]
    NotFound(String),

    /// Error when the caller canceled the request context
    #[error("error-clientstore-storage-6 Operation canceled")]
    Canceled,

    /// Error when the request context deadline elapsed
    #[error("error-clientstore-storage-7 Deadline exceeded")]
    DeadlineExceeded,
}

impl StorageError {
    /// True when the lookup found no client; callers usually map this to an invalid client response.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

#[cfg(any(feature = "sqlite", feature = "postgres"))]
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::QueryFailed(err.to_string())
    }
}
