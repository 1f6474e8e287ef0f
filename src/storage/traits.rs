//! Storage trait definitions for OAuth client records.

use crate::errors::StorageError;
use crate::oauth::types::ClientInfo;
use crate::storage::context::RequestContext;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Client information storage consumed by an OAuth2 authorization server
#[async_trait]
pub trait ClientInfoStore<C: ClientInfo>: Send + Sync {
    /// Retrieve a client by client id.
    ///
    /// An empty id returns `Ok(None)` without a lookup. An unknown id returns
    /// `StorageError::NotFound`.
    async fn get_by_id(&self, ctx: &RequestContext, id: &str) -> Result<Option<C>>;

    /// Store a new client
    async fn create(&self, ctx: &RequestContext, client: &C) -> Result<()>;
}
