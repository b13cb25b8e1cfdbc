use actix_web::{HttpResponse, ResponseError};
use charybdis::errors::CharybdisError;
use serde_json::json;
use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum RunhubError {
    // 400s
    Unauthorized(&'static str),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    BadRequest(String),
    InvalidTransition(String),
    // 502
    MachineUnreachable(String),
    InvalidMachineResponse(String),
    // 500
    CharybdisError(CharybdisError),
    SerdeError(serde_json::Error),
    InternalServerError(String),
}

impl fmt::Display for RunhubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunhubError::Unauthorized(e) => write!(f, "Unauthorized: {}", e),
            RunhubError::Forbidden(e) => write!(f, "Forbidden: {}", e),
            RunhubError::NotFound(e) => write!(f, "Not Found: {}", e),
            RunhubError::Conflict(e) => write!(f, "Conflict: {}", e),
            RunhubError::BadRequest(e) => write!(f, "Bad Request: {}", e),
            RunhubError::InvalidTransition(e) => write!(f, "Invalid Transition: {}", e),
            RunhubError::MachineUnreachable(e) => write!(f, "Machine Unreachable: {}", e),
            RunhubError::InvalidMachineResponse(e) => write!(f, "Invalid Machine Response: {}", e),
            RunhubError::CharybdisError(e) => write!(f, "Charybdis Error: \n{}", e),
            RunhubError::SerdeError(e) => write!(f, "Serde Error: \n{}", e),
            RunhubError::InternalServerError(e) => write!(f, "InternalServerError: \n{}", e),
        }
    }
}

impl Error for RunhubError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RunhubError::CharybdisError(e) => Some(e),
            RunhubError::SerdeError(e) => Some(e),
            _ => None,
        }
    }
}

impl ResponseError for RunhubError {
    fn error_response(&self) -> HttpResponse {
        match self {
            RunhubError::Unauthorized(e) => HttpResponse::Unauthorized().json(json!({
                "status": 401,
                "message": e
            })),
            // An out-of-scope read must be indistinguishable from a missing
            // run, otherwise the response leaks that the run id exists.
            RunhubError::Forbidden(_) => HttpResponse::NotFound().json(json!({
                "status": 404,
                "message": "Run not found"
            })),
            RunhubError::NotFound(e) => HttpResponse::NotFound().json(json!({
                "status": 404,
                "message": e
            })),
            RunhubError::Conflict(e) => HttpResponse::Conflict().json(json!({
                "status": 409,
                "message": e
            })),
            RunhubError::BadRequest(e) => HttpResponse::BadRequest().json(json!({
                "status": 400,
                "message": e
            })),
            RunhubError::InvalidTransition(e) => HttpResponse::Conflict().json(json!({
                "status": 409,
                "message": e
            })),
            RunhubError::MachineUnreachable(e) | RunhubError::InvalidMachineResponse(e) => {
                HttpResponse::BadGateway().json(json!({
                    "status": 502,
                    "message": e
                }))
            }
            _ => {
                log::error!("{}", self);

                HttpResponse::InternalServerError().json(json!({
                    "status": 500,
                    "message": "Internal Server Error"
                }))
            }
        }
    }
}

impl From<CharybdisError> for RunhubError {
    fn from(e: CharybdisError) -> Self {
        RunhubError::CharybdisError(e)
    }
}

impl From<serde_json::Error> for RunhubError {
    fn from(e: serde_json::Error) -> Self {
        RunhubError::SerdeError(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn forbidden_renders_as_run_not_found() {
        let forbidden = RunhubError::Forbidden("workflow out of scope".to_string()).error_response();
        let not_found = RunhubError::NotFound("Run not found".to_string()).error_response();

        assert_eq!(forbidden.status(), not_found.status());

        let forbidden_body = to_bytes(forbidden.into_body()).await.unwrap();
        let not_found_body = to_bytes(not_found.into_body()).await.unwrap();

        assert_eq!(forbidden_body, not_found_body);
    }

    #[test]
    fn dispatch_errors_map_to_bad_gateway() {
        let unreachable = RunhubError::MachineUnreachable("no route".to_string()).error_response();
        let bad_response = RunhubError::InvalidMachineResponse("bad ack".to_string()).error_response();

        assert_eq!(unreachable.status().as_u16(), 502);
        assert_eq!(bad_response.status().as_u16(), 502);
    }
}
