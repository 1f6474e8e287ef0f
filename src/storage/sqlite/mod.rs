//! SQLite storage implementations
//!
//! SQLite is suitable for single-instance deployments and development.

mod oauth_clients;

pub use oauth_clients::SqliteClientStore;
