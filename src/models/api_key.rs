use charybdis::macros::charybdis_model;
use charybdis::types::{Boolean, Text, Timestamp};
use scylla::client::caching_session::CachingSession;
use serde::{Deserialize, Serialize};

use crate::errors::RunhubError;

/// Issued API tokens. Issuance itself lives outside this service; we only
/// consult the revocation flag.
#[charybdis_model(
    table_name = api_keys,
    partition_keys = [key],
    clustering_keys = [],
)]
#[derive(Serialize, Deserialize, Clone)]
pub struct ApiKey {
    pub key: Text,
    pub name: Text,
    pub revoked: Boolean,
    pub created_at: Timestamp,
}

impl ApiKey {
    /// A token that was never registered is not revoked; its validity is
    /// established by the JWT signature check that precedes this lookup.
    pub async fn is_revoked(db_session: &CachingSession, token: &str) -> Result<bool, RunhubError> {
        let api_key = ApiKey::maybe_find_first_by_key(token.to_string())
            .execute(db_session)
            .await?;

        Ok(api_key.is_some_and(|key| key.revoked))
    }
}
