//! OAuth client entity types.
//!
//! Defines the `ClientInfo` abstraction the store persists and the default `Client` model.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Client credential entity consumed by an OAuth2 authorization server.
///
/// The store reads these accessors to fill its indexed columns and keeps the full
/// JSON encoding of the implementor as the authoritative copy, so implementors may
/// carry any extra metadata they need.
pub trait ClientInfo: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Protocol-level client identifier
    fn id(&self) -> &str;

    /// Opaque client secret
    fn secret(&self) -> &str;

    /// Allowed redirect domain
    fn domain(&self) -> &str;

    /// True for public (non-confidential) clients
    fn is_public(&self) -> bool;

    /// Owning user reference
    fn user_id(&self) -> &str;
}

/// Default OAuth client model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Client {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Secret")]
    pub secret: String,
    #[serde(rename = "Domain")]
    pub domain: String,
    #[serde(rename = "Public")]
    pub public: bool,
    #[serde(rename = "UserID")]
    pub user_id: String,
}

impl Client {
    pub fn new(id: impl Into<String>, secret: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secret: secret.into(),
            domain: domain.into(),
            ..Default::default()
        }
    }

    pub fn with_public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }
}

impl ClientInfo for Client {
    fn id(&self) -> &str {
        &self.id
    }

    fn secret(&self) -> &str {
        &self.secret
    }

    fn domain(&self) -> &str {
        &self.domain
    }

    fn is_public(&self) -> bool {
        self.public
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }
}
