use std::str::FromStr;

use charybdis::macros::charybdis_model;
use charybdis::operations::{Insert, Update};
use charybdis::types::{Text, Timestamp, Uuid};
use scylla::client::caching_session::CachingSession;
use serde::{Deserialize, Serialize};

use crate::app::StorageConfig;
use crate::errors::RunhubError;
use crate::services::cdn;

/// Lifecycle of a run: `queued -> running -> {success, failed}`, with a
/// direct `queued -> failed` edge for dispatch-time failures reported before
/// the machine starts executing. `success` and `failed` are terminal.
#[derive(
    strum_macros::Display,
    strum_macros::EnumString,
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Queued,
    Running,
    Success,
    Failed,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Success | RunStatus::Failed)
    }

    pub fn can_transition_to(self, next: RunStatus) -> bool {
        if self == next {
            // progress callbacks may repeat a non-terminal status
            return !self.is_terminal();
        }

        matches!(
            (self, next),
            (RunStatus::Queued, RunStatus::Running)
                | (RunStatus::Queued, RunStatus::Failed)
                | (RunStatus::Running, RunStatus::Success)
                | (RunStatus::Running, RunStatus::Failed)
        )
    }
}

/// One unit of result data reported by the machine. Assets carry only a
/// `filename` in storage; the public `url` exists on outbound views.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Output {
    pub data: OutputData,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct OutputData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<OutputAsset>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<OutputAsset>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OutputAsset {
    pub filename: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[charybdis_model(
    table_name = runs,
    partition_keys = [id],
    clustering_keys = [],
)]
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct Run {
    /// Assigned by the remote machine at dispatch acknowledgement time.
    pub id: Uuid,
    pub workflow_id: Uuid,
    pub workflow_version_id: Uuid,
    pub machine_id: Uuid,
    pub status: Text,
    /// JSON-encoded ordered `Vec<Output>`, owned exclusively by this run.
    pub outputs: Text,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

partial_run!(UpdateStatusRun, id, status, outputs, updated_at);

impl Run {
    pub fn status(&self) -> Result<RunStatus, RunhubError> {
        RunStatus::from_str(&self.status).map_err(|_| {
            RunhubError::InternalServerError(format!(
                "Run {} has an unknown status: {}",
                self.id, self.status
            ))
        })
    }

    pub fn outputs(&self) -> Result<Vec<Output>, RunhubError> {
        if self.outputs.is_empty() {
            return Ok(vec![]);
        }

        Ok(serde_json::from_str(&self.outputs)?)
    }

    /// Inserts a new run in `queued` state with an empty output sequence.
    /// A duplicate dispatch acknowledgement is rejected with `Conflict`.
    pub async fn create(
        db_session: &CachingSession,
        id: Uuid,
        workflow_id: Uuid,
        workflow_version_id: Uuid,
        machine_id: Uuid,
    ) -> Result<Run, RunhubError> {
        let existing = Run::maybe_find_first_by_id(id).execute(db_session).await?;

        if existing.is_some() {
            return Err(RunhubError::Conflict(format!("Run {} already exists", id)));
        }

        let now = chrono::Utc::now();
        let run = Run {
            id,
            workflow_id,
            workflow_version_id,
            machine_id,
            status: RunStatus::Queued.to_string(),
            outputs: "[]".to_string(),
            created_at: now,
            updated_at: now,
        };

        run.insert().execute(db_session).await?;

        Ok(run)
    }

    /// The operation the machine's status callback invokes.
    pub async fn apply_status_update(
        db_session: &CachingSession,
        run_id: Uuid,
        new_status: RunStatus,
        new_outputs: Vec<Output>,
    ) -> Result<Run, RunhubError> {
        let mut run = Run::maybe_find_first_by_id(run_id)
            .execute(db_session)
            .await?
            .ok_or_else(|| RunhubError::NotFound("Run not found".to_string()))?;

        if run.apply_transition(new_status, new_outputs)? {
            // status and outputs land in a single row update so a reader can
            // never observe `success` with a short output sequence
            UpdateStatusRun {
                id: run.id,
                status: run.status.clone(),
                outputs: run.outputs.clone(),
                updated_at: run.updated_at,
            }
            .update()
            .execute(db_session)
            .await?;
        }

        Ok(run)
    }

    /// Advances the in-memory record. Returns `false` when the update is an
    /// idempotent replay of the current terminal status and nothing must be
    /// written; outputs are appended only on an applied transition.
    pub fn apply_transition(
        &mut self,
        new_status: RunStatus,
        new_outputs: Vec<Output>,
    ) -> Result<bool, RunhubError> {
        let current = self.status()?;

        if current.is_terminal() && new_status == current {
            return Ok(false);
        }

        if !current.can_transition_to(new_status) {
            return Err(RunhubError::InvalidTransition(format!(
                "Run {} cannot transition from {} to {}",
                self.id, current, new_status
            )));
        }

        let mut outputs = self.outputs()?;
        outputs.extend(new_outputs);

        self.status = new_status.to_string();
        self.outputs = serde_json::to_string(&outputs)?;
        self.updated_at = chrono::Utc::now();

        Ok(true)
    }

    /// Builds the externally visible representation. Asset URLs are rewritten
    /// to their public CDN form only for a successful run with outputs; the
    /// stored record is never touched.
    pub fn to_view(&self, storage: &StorageConfig) -> Result<RunView, RunhubError> {
        let status = self.status()?;
        let mut outputs = self.outputs()?;

        if status == RunStatus::Success && !outputs.is_empty() {
            for output in outputs.iter_mut() {
                if let Some(images) = output.data.images.as_mut() {
                    for asset in images.iter_mut() {
                        asset.url = Some(cdn::output_asset_url(storage, self.id, &asset.filename));
                    }
                } else if let Some(files) = output.data.files.as_mut() {
                    for asset in files.iter_mut() {
                        asset.url = Some(cdn::output_asset_url(storage, self.id, &asset.filename));
                    }
                }
            }
        }

        Ok(RunView {
            id: self.id,
            status,
            outputs,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Serialize, Debug)]
pub struct RunView {
    pub id: Uuid,
    pub status: RunStatus,
    pub outputs: Vec<Output>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
