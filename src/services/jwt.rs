use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::RunhubError;

#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub user_id: Option<String>,
    pub org_id: Option<String>,
    pub exp: usize,
}

/// Verifies the token signature and expiry. Any failure collapses into the
/// same `Unauthorized` so callers learn nothing about why a token was bad.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, RunhubError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        log::warn!("Rejected token: {}", e);

        RunhubError::Unauthorized("Invalid or expired token")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn token_for(user_id: Option<&str>, org_id: Option<&str>, exp: usize) -> String {
        let claims = Claims {
            user_id: user_id.map(str::to_string),
            org_id: org_id.map(str::to_string),
            exp,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn far_future() -> usize {
        (chrono::Utc::now().timestamp() + 3600) as usize
    }

    #[test]
    fn decodes_a_valid_token() {
        let token = token_for(Some("user_1"), None, far_future());
        let claims = decode_token(&token, SECRET).unwrap();

        assert_eq!(claims.user_id.as_deref(), Some("user_1"));
        assert_eq!(claims.org_id, None);
    }

    #[test]
    fn rejects_an_expired_token() {
        let exp = (chrono::Utc::now().timestamp() - 3600) as usize;
        let token = token_for(Some("user_1"), None, exp);

        let err = decode_token(&token, SECRET).unwrap_err();

        assert!(matches!(err, RunhubError::Unauthorized(_)));
    }

    #[test]
    fn rejects_a_token_signed_with_another_secret() {
        let token = token_for(Some("user_1"), None, far_future());

        let err = decode_token(&token, "other-secret").unwrap_err();

        assert!(matches!(err, RunhubError::Unauthorized(_)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode_token("not.a.jwt", SECRET).is_err());
    }
}
