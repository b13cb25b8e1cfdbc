use actix_web::HttpResponse;

use crate::errors::RunhubError;

pub type Response = Result<HttpResponse, RunhubError>;
