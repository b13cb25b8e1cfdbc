use std::collections::HashMap;

use charybdis::types::Uuid;
use serde::{Deserialize, Serialize};

use crate::errors::RunhubError;

#[derive(Serialize)]
struct DispatchRequest<'a> {
    workflow_api: serde_json::Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    inputs: Option<&'a HashMap<String, String>>,

    status_endpoint: &'a str,
}

/// The machine's acknowledgement. `prompt_id` becomes the run's durable id;
/// an acknowledgement without it is invalid.
#[derive(Deserialize, Debug)]
pub struct MachineAck {
    pub prompt_id: Uuid,
}

/// Sends the executable payload to the machine's run endpoint. At most one
/// attempt; retry policy belongs to the caller. A transport failure and a
/// malformed acknowledgement are distinct errors, and neither leaves any
/// state behind.
pub async fn dispatch(
    http_client: &reqwest::Client,
    machine_endpoint: &str,
    snapshot: &str,
    inputs: Option<&HashMap<String, String>>,
    status_endpoint: &str,
) -> Result<MachineAck, RunhubError> {
    let workflow_api: serde_json::Value = serde_json::from_str(snapshot)?;
    let url = format!("{}/run", machine_endpoint.trim_end_matches('/'));

    let response = http_client
        .post(&url)
        .json(&DispatchRequest {
            workflow_api,
            inputs,
            status_endpoint,
        })
        .send()
        .await
        .map_err(|e| {
            log::error!("Dispatch to {} failed: {}", url, e);

            RunhubError::MachineUnreachable(format!("Failed to reach machine at {}: {}", url, e))
        })?;

    let status = response.status();

    if !status.is_success() {
        return Err(RunhubError::InvalidMachineResponse(format!(
            "Machine at {} returned {}",
            url, status
        )));
    }

    let body = response.text().await.map_err(|e| {
        RunhubError::InvalidMachineResponse(format!("Failed to read machine response: {}", e))
    })?;

    parse_ack(&body)
}

pub(crate) fn parse_ack(body: &str) -> Result<MachineAck, RunhubError> {
    serde_json::from_str(body)
        .map_err(|e| RunhubError::InvalidMachineResponse(format!("Invalid acknowledgement: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_valid_acknowledgement() {
        let ack = parse_ack(r#"{"prompt_id": "7e2f1b0a-9f6f-4b43-9a6e-0f6f4e6a1c2d"}"#).unwrap();

        assert_eq!(
            ack.prompt_id.to_string(),
            "7e2f1b0a-9f6f-4b43-9a6e-0f6f4e6a1c2d"
        );
    }

    #[test]
    fn ignores_extra_acknowledgement_fields() {
        let ack = parse_ack(
            r#"{"prompt_id": "7e2f1b0a-9f6f-4b43-9a6e-0f6f4e6a1c2d", "number": 3, "node_errors": {}}"#,
        );

        assert!(ack.is_ok());
    }

    #[test]
    fn rejects_a_missing_prompt_id() {
        let err = parse_ack(r#"{"number": 3}"#).unwrap_err();

        assert!(matches!(err, RunhubError::InvalidMachineResponse(_)));
    }

    #[test]
    fn rejects_a_non_uuid_prompt_id() {
        let err = parse_ack(r#"{"prompt_id": "not-a-uuid"}"#).unwrap_err();

        assert!(matches!(err, RunhubError::InvalidMachineResponse(_)));
    }

    #[test]
    fn rejects_a_non_json_body() {
        let err = parse_ack("<html>502 Bad Gateway</html>").unwrap_err();

        assert!(matches!(err, RunhubError::InvalidMachineResponse(_)));
    }
}
