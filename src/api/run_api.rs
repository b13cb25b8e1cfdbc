use std::collections::HashMap;
use std::str::FromStr;

use actix_web::{get, post, web, HttpResponse};
use charybdis::types::Uuid;
use serde::Deserialize;
use serde_json::json;

use crate::api::data::RequestData;
use crate::api::types::Response;
use crate::app::App;
use crate::authorize::auth_run_view;
use crate::errors::RunhubError;
use crate::models::deployment::Deployment;
use crate::models::run::{Output, Run, RunStatus};
use crate::models::workflow::Workflow;
use crate::services::dispatch;

#[derive(Deserialize)]
pub struct CreateRunParams {
    pub deployment_id: Uuid,
    pub inputs: Option<HashMap<String, String>>,
}

#[derive(Deserialize)]
pub struct GetRunParams {
    pub run_id: Uuid,
}

#[derive(Deserialize)]
pub struct UpdateRunParams {
    pub run_id: Uuid,
    pub status: String,
    pub outputs: Option<Vec<Output>>,
}

/// Submits a deployment for execution. The run record is created only after
/// the machine acknowledges the dispatch, under the machine-assigned id; a
/// failed dispatch leaves no record behind.
#[post("")]
pub async fn create_run(data: RequestData, params: web::Json<CreateRunParams>) -> Response {
    let params = params.into_inner();

    let resolved = Deployment::resolve(data.db_session(), params.deployment_id).await?;

    if resolved.machine.disabled {
        return Err(RunhubError::BadRequest("Machine is disabled".to_string()));
    }

    log::info!(
        "Dispatching deployment {} ({}) to machine {}",
        resolved.deployment.id,
        resolved.deployment.environment,
        resolved.machine.id
    );

    let ack = dispatch::dispatch(
        data.http_client(),
        &resolved.machine.endpoint,
        &resolved.version.snapshot,
        params.inputs.as_ref(),
        &data.app.status_endpoint(),
    )
    .await?;

    let run = Run::create(
        data.db_session(),
        ack.prompt_id,
        resolved.version.workflow_id,
        resolved.version.id,
        resolved.machine.id,
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "run_id": run.id,
    })))
}

#[get("")]
pub async fn get_run(data: RequestData, params: web::Query<GetRunParams>) -> Response {
    let run = Run::maybe_find_first_by_id(params.run_id)
        .execute(data.db_session())
        .await?
        .ok_or_else(|| RunhubError::NotFound("Run not found".to_string()))?;

    let workflow = Workflow::maybe_find_first_by_id(run.workflow_id)
        .execute(data.db_session())
        .await?
        .ok_or_else(|| RunhubError::NotFound("Run not found".to_string()))?;

    auth_run_view(&data.auth.scope, &workflow)?;

    Ok(HttpResponse::Ok().json(run.to_view(data.storage())?))
}

/// Status callback invoked by the remote machine. A callback for a run the
/// store never recorded fails with 404, which is also how an orphaned
/// dispatch surfaces.
#[post("/update")]
pub async fn update_run(app: web::Data<App>, params: web::Json<UpdateRunParams>) -> Response {
    let params = params.into_inner();

    let status = RunStatus::from_str(&params.status)
        .map_err(|_| RunhubError::BadRequest(format!("Unknown status: {}", params.status)))?;

    Run::apply_status_update(
        &app.db_session,
        params.run_id,
        status,
        params.outputs.unwrap_or_default(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
    })))
}
