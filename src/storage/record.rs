//! Translation between client entities and client table rows.

use crate::errors::StorageError;
use crate::oauth::types::ClientInfo;
use crate::storage::table::UserIdPolicy;

const MAX_CLIENT_ID_LEN: usize = 64;
const MAX_CLIENT_SECRET_LEN: usize = 128;
const MAX_DOMAIN_LEN: usize = 512;

/// Column values for one client row.
///
/// `data` is the authoritative encoding; the other fields are indexed copies taken at write time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRecord {
    pub client_id: String,
    pub client_secret: String,
    pub domain: String,
    pub data: String,
    pub public: bool,
    pub user_id: i64,
}

impl ClientRecord {
    pub fn from_client<C: ClientInfo>(client: &C, policy: UserIdPolicy) -> Result<Self, StorageError> {
        let data = serde_json::to_string(client)
            .map_err(|e| StorageError::SerializationFailed(e.to_string()))?;

        check_length("client_id", client.id(), MAX_CLIENT_ID_LEN)?;
        check_length("client_secret", client.secret(), MAX_CLIENT_SECRET_LEN)?;
        check_length("domain", client.domain(), MAX_DOMAIN_LEN)?;

        Ok(Self {
            client_id: client.id().to_string(),
            client_secret: client.secret().to_string(),
            domain: client.domain().to_string(),
            data,
            public: client.is_public(),
            user_id: parse_user_id(client.id(), client.user_id(), policy)?,
        })
    }
}

/// Decode the `data` column back into an entity
pub fn decode_client<C: ClientInfo>(data: &str) -> Result<C, StorageError> {
    serde_json::from_str(data).map_err(|e| StorageError::SerializationFailed(e.to_string()))
}

/// Parse an owning user reference into the signed 64-bit value the `user_id` column holds.
pub fn parse_user_id(client_id: &str, user_id: &str, policy: UserIdPolicy) -> Result<i64, StorageError> {
    let parsed = user_id
        .parse::<u64>()
        .ok()
        .and_then(|value| i64::try_from(value).ok());

    match (parsed, policy) {
        (Some(value), _) => Ok(value),
        (None, UserIdPolicy::DefaultToZero) => {
            if !user_id.is_empty() {
                tracing::warn!(client_id, user_id, "user id is not an unsigned integer, storing 0");
            }
            Ok(0)
        }
        (None, UserIdPolicy::Reject) => Err(StorageError::InvalidData(format!(
            "user id '{}' for client {} is not an unsigned integer",
            user_id, client_id
        ))),
    }
}

fn check_length(column: &str, value: &str, max: usize) -> Result<(), StorageError> {
    let len = value.chars().count();
    if len > max {
        return Err(StorageError::InvalidData(format!(
            "{} is {} characters, at most {} allowed",
            column, len, max
        )));
    }
    Ok(())
}
