use charybdis::macros::charybdis_model;
use charybdis::types::{Int, Text, Timestamp, Uuid};
use serde::{Deserialize, Serialize};

/// An immutable snapshot of an executable graph definition, created once per
/// publish. Runs reference it by id and are therefore insulated from later
/// edits to the workflow.
#[charybdis_model(
    table_name = workflow_versions,
    partition_keys = [id],
    clustering_keys = [],
)]
#[derive(Serialize, Deserialize, Clone)]
pub struct WorkflowVersion {
    pub id: Uuid,
    pub workflow_id: Uuid,
    pub version: Int,
    /// JSON-encoded executable graph, sent verbatim to the machine.
    pub snapshot: Text,
    pub created_at: Timestamp,
}
