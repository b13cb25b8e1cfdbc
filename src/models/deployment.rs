use charybdis::macros::charybdis_model;
use charybdis::types::{Text, Timestamp, Uuid};
use scylla::client::caching_session::CachingSession;
use serde::{Deserialize, Serialize};

use crate::errors::RunhubError;
use crate::models::machine::Machine;
use crate::models::workflow::Workflow;
use crate::models::workflow_version::WorkflowVersion;

/// A named binding of a workflow version to a machine, the unit a caller
/// targets when submitting work. Immutable once referenced by a run.
#[charybdis_model(
    table_name = deployments,
    partition_keys = [id],
    clustering_keys = [],
)]
#[derive(Serialize, Deserialize, Clone)]
pub struct Deployment {
    pub id: Uuid,
    pub workflow_version_id: Uuid,
    pub machine_id: Uuid,
    /// Deployment slot, e.g. `production` or `staging`.
    pub environment: Text,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The fully populated join a submission needs: deployment, machine, version
/// and the owning workflow's scope. Either the whole chain resolves or the
/// resolution fails; no partial results.
pub struct ResolvedDeployment {
    pub deployment: Deployment,
    pub machine: Machine,
    pub version: WorkflowVersion,
    pub workflow: Workflow,
}

impl Deployment {
    pub async fn resolve(
        db_session: &CachingSession,
        deployment_id: Uuid,
    ) -> Result<ResolvedDeployment, RunhubError> {
        let deployment = Deployment::maybe_find_first_by_id(deployment_id)
            .execute(db_session)
            .await?
            .ok_or_else(|| RunhubError::NotFound("Deployment not found".to_string()))?;

        let machine = Machine::maybe_find_first_by_id(deployment.machine_id)
            .execute(db_session)
            .await?
            .ok_or_else(|| RunhubError::NotFound("Machine not found".to_string()))?;

        let version = WorkflowVersion::maybe_find_first_by_id(deployment.workflow_version_id)
            .execute(db_session)
            .await?
            .ok_or_else(|| RunhubError::NotFound("Workflow version not found".to_string()))?;

        let workflow = Workflow::maybe_find_first_by_id(version.workflow_id)
            .execute(db_session)
            .await?
            .ok_or_else(|| RunhubError::NotFound("Workflow not found".to_string()))?;

        Ok(ResolvedDeployment {
            deployment,
            machine,
            version,
            workflow,
        })
    }
}
