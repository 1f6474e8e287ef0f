//! PostgreSQL storage implementations
//!
//! PostgreSQL is suitable for production deployments where several
//! authorization server instances share one client table.

mod oauth_clients;

pub use oauth_clients::PostgresClientStore;
