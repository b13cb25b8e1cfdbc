use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;

use crate::app::App;
use crate::errors::RunhubError;
use crate::models::api_key::ApiKey;
use crate::services::jwt::{self, Claims};

/// Authorization scope carried by a validated token. A token is scoped to an
/// organization or to a single user, never both; the org claim wins when a
/// token carries both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthScope {
    Org(String),
    User(String),
}

/// Derived from a validated bearer credential. Extraction fails the request
/// before any handler code runs, so every core operation sits behind it.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub scope: AuthScope,
}

impl AuthContext {
    fn from_claims(claims: Claims) -> Result<Self, RunhubError> {
        let scope = match (claims.org_id, claims.user_id) {
            (Some(org_id), _) => AuthScope::Org(org_id),
            (None, Some(user_id)) => AuthScope::User(user_id),
            (None, None) => return Err(RunhubError::Unauthorized("Invalid or expired token")),
        };

        Ok(AuthContext { scope })
    }
}

impl FromRequest for AuthContext {
    type Error = RunhubError;
    type Future = LocalBoxFuture<'static, Result<AuthContext, RunhubError>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let app = req.app_data::<web::Data<App>>().cloned();
        let auth_header = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        Box::pin(async move {
            let app = app.ok_or_else(|| {
                RunhubError::InternalServerError("App data is not configured".to_string())
            })?;

            let token = bearer_token(auth_header.as_deref())
                .ok_or(RunhubError::Unauthorized("Invalid or expired token"))?;

            let claims = jwt::decode_token(token, &app.config.auth.jwt_secret)?;

            if ApiKey::is_revoked(&app.db_session, token).await? {
                return Err(RunhubError::Unauthorized("Revoked token"));
            }

            AuthContext::from_claims(claims)
        })
    }
}

fn bearer_token(header: Option<&str>) -> Option<&str> {
    header?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(user_id: Option<&str>, org_id: Option<&str>) -> Claims {
        Claims {
            user_id: user_id.map(str::to_string),
            org_id: org_id.map(str::to_string),
            exp: 0,
        }
    }

    #[test]
    fn extracts_the_bearer_token() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")), Some("abc.def.ghi"));
    }

    #[test]
    fn rejects_malformed_headers() {
        assert_eq!(bearer_token(None), None);
        assert_eq!(bearer_token(Some("abc.def.ghi")), None);
        assert_eq!(bearer_token(Some("Basic abc")), None);
        assert_eq!(bearer_token(Some("Bearer ")), None);
    }

    #[test]
    fn org_claim_wins_over_user_claim() {
        let context = AuthContext::from_claims(claims(Some("user_1"), Some("org_1"))).unwrap();

        assert_eq!(context.scope, AuthScope::Org("org_1".to_string()));
    }

    #[test]
    fn user_claim_scopes_to_the_user() {
        let context = AuthContext::from_claims(claims(Some("user_1"), None)).unwrap();

        assert_eq!(context.scope, AuthScope::User("user_1".to_string()));
    }

    #[test]
    fn a_token_without_a_scope_is_unauthorized() {
        let err = AuthContext::from_claims(claims(None, None)).unwrap_err();

        assert!(matches!(err, RunhubError::Unauthorized(_)));
    }
}
