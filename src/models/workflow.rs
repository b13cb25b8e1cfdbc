use charybdis::macros::charybdis_model;
use charybdis::types::{Text, Timestamp, Uuid};
use serde::{Deserialize, Serialize};

/// Carries the authorization scope for every run of its versions. A workflow
/// belongs to either an organization or a single user, never both.
#[charybdis_model(
    table_name = workflows,
    partition_keys = [id],
    clustering_keys = [],
)]
#[derive(Serialize, Deserialize, Clone)]
pub struct Workflow {
    pub id: Uuid,
    pub name: Text,
    pub org_id: Option<Text>,
    pub user_id: Option<Text>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
