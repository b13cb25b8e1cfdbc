use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use scylla::client::caching_session::CachingSession;

use crate::api::auth::AuthContext;
use crate::app::{App, StorageConfig};
use crate::errors::RunhubError;

/// Everything an authenticated handler needs: the shared app state and the
/// caller's validated auth context.
#[derive(Clone)]
pub struct RequestData {
    pub app: web::Data<App>,
    pub auth: AuthContext,
}

impl RequestData {
    pub fn db_session(&self) -> &CachingSession {
        &self.app.db_session
    }

    pub fn http_client(&self) -> &reqwest::Client {
        &self.app.http_client
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.app.config.storage
    }
}

impl FromRequest for RequestData {
    type Error = RunhubError;
    type Future = LocalBoxFuture<'static, Result<RequestData, RunhubError>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let app = req.app_data::<web::Data<App>>().cloned();
        let auth_future = AuthContext::from_request(req, payload);

        Box::pin(async move {
            let auth = auth_future.await?;
            let app = app.ok_or_else(|| {
                RunhubError::InternalServerError("App data is not configured".to_string())
            })?;

            Ok(RequestData { app, auth })
        })
    }
}
