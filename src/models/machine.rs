use charybdis::macros::charybdis_model;
use charybdis::types::{Boolean, Text, Timestamp, Uuid};
use serde::{Deserialize, Serialize};

/// A remote compute endpoint capable of executing a workflow version.
/// Administered externally; this service only reads it.
#[charybdis_model(
    table_name = machines,
    partition_keys = [id],
    clustering_keys = [],
)]
#[derive(Serialize, Deserialize, Clone)]
pub struct Machine {
    pub id: Uuid,
    pub name: Text,
    pub endpoint: Text,
    pub disabled: Boolean,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
