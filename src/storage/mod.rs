//! Relational OAuth client storage with SQLite and PostgreSQL backends.

pub mod context;
pub mod record;
pub mod table;
pub mod traits;

// Feature-gated storage implementations
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

// Re-export commonly used types and traits
pub use context::RequestContext;
pub use table::{ClientStoreOptions, DEFAULT_TABLE_NAME, PoolSettings, TableName, UserIdPolicy};
pub use traits::*;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteClientStore;

#[cfg(feature = "postgres")]
pub use postgres::PostgresClientStore;

use crate::errors::{ConfigError, StorageError};
use crate::oauth::types::Client;
use std::sync::Arc;

/// Storage backend configuration and factory
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    #[cfg(feature = "sqlite")]
    Sqlite(String), // Connection string/path
    #[cfg(feature = "postgres")]
    Postgres(String), // Connection string
}

/// Open a pool for the configured backend and provision the client table
pub async fn create_client_store(
    backend: StorageBackend,
    options: ClientStoreOptions,
) -> std::result::Result<Arc<dyn ClientInfoStore<Client>>, ConfigError> {
    match backend {
        #[cfg(feature = "sqlite")]
        StorageBackend::Sqlite(database_url) => {
            let store = SqliteClientStore::connect(&database_url, options).await?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "postgres")]
        StorageBackend::Postgres(database_url) => {
            let store = PostgresClientStore::connect(&database_url, options).await?;
            Ok(Arc::new(store))
        }
    }
}

/// Parse storage backend from configuration string
pub fn parse_storage_backend(
    backend_name: &str,
    database_url: Option<&str>,
) -> std::result::Result<StorageBackend, ConfigError> {
    match backend_name {
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let url = database_url.unwrap_or("sqlite:oauth2_clients.db?mode=rwc");
            Ok(StorageBackend::Sqlite(url.to_string()))
        }
        #[cfg(feature = "postgres")]
        "postgres" => {
            let url =
                database_url.ok_or_else(|| ConfigError::EnvVarRequired("DATABASE_URL".to_string()))?;
            Ok(StorageBackend::Postgres(url.to_string()))
        }
        _ => Err(ConfigError::UnknownStorageBackend(backend_name.to_string())),
    }
}

/// Map an insert failure, reporting unique index violations as duplicate clients.
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub(crate) fn insert_error(err: sqlx::Error, client_id: &str) -> StorageError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StorageError::DuplicateClient(client_id.to_string())
        }
        _ => StorageError::from(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_parse_sqlite_backend() {
        assert_eq!(
            parse_storage_backend("sqlite", None).unwrap(),
            StorageBackend::Sqlite("sqlite:oauth2_clients.db?mode=rwc".to_string())
        );
        assert_eq!(
            parse_storage_backend("sqlite", Some("sqlite::memory:")).unwrap(),
            StorageBackend::Sqlite("sqlite::memory:".to_string())
        );
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn test_parse_postgres_backend_requires_url() {
        assert!(matches!(
            parse_storage_backend("postgres", None),
            Err(ConfigError::EnvVarRequired(_))
        ));
        assert_eq!(
            parse_storage_backend("postgres", Some("postgres://localhost/clients")).unwrap(),
            StorageBackend::Postgres("postgres://localhost/clients".to_string())
        );
    }

    #[test]
    fn test_parse_unknown_backend() {
        assert!(matches!(
            parse_storage_backend("memory", None),
            Err(ConfigError::UnknownStorageBackend(_))
        ));
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn test_create_client_store_connection_failure() {
        let backend = StorageBackend::Sqlite("sqlite:/nonexistent-dir/clients.db".to_string());
        let result = create_client_store(backend, ClientStoreOptions::default()).await;
        assert!(matches!(result, Err(ConfigError::ConnectionFailed(_))));
    }
}
