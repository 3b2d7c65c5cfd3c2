use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::{debug, error};
use uuid::Uuid;

use crate::{config::JwtConfig, error::AuthError, state::AppState};

/// Identity claim carried in every token. Self-contained: the server keeps
/// no session record, a presented token is verified on each request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub iat: usize,
    pub exp: usize,
}

/// HS256 signing/verification keys derived from config.
///
/// When JWT_SECRET is absent the keys are `None` and both operations fail
/// with [`AuthError::MissingSecret`] instead of operating unsigned.
#[derive(Clone)]
pub struct JwtKeys {
    keys: Option<(EncodingKey, DecodingKey)>,
    ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_config(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        let keys = cfg.secret.as_ref().map(|s| {
            (
                EncodingKey::from_secret(s.as_bytes()),
                DecodingKey::from_secret(s.as_bytes()),
            )
        });
        Self {
            keys,
            ttl: Duration::minutes(cfg.ttl_minutes),
        }
    }

    /// Issue a token for `user_id`/`username`, expiring `ttl` from now.
    pub fn sign(&self, user_id: Uuid, username: &str) -> Result<String, AuthError> {
        let Some((encoding, _)) = &self.keys else {
            return Err(AuthError::MissingSecret);
        };
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: (now + self.ttl).unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, encoding).map_err(|e| {
            error!(error = %e, "jwt encode failed");
            AuthError::Verification
        })?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    /// Verify signature and expiry, classifying failures so the gate can
    /// split 401 (expired) from 403 (bad token) from 500 (everything else).
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let Some((_, decoding)) = &self.keys else {
            return Err(AuthError::MissingSecret);
        };
        let data = decode::<Claims>(token, decoding, &Validation::default()).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidToken
                | ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::ImmatureSignature
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => AuthError::InvalidToken,
                _ => {
                    error!(error = %e, "jwt verification failed");
                    AuthError::Verification
                }
            }
        })?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: Option<&str>) -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: secret.map(Into::into),
            ttl_minutes: 60,
        })
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let keys = make_keys(Some("dev-secret"));
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id, "alice").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.username, "alice");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_is_classified_as_expired() {
        let keys = make_keys(Some("dev-secret"));
        // Two hours in the past, well beyond the default validation leeway.
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: Uuid::new_v4(),
            username: "alice".into(),
            iat: (now - Duration::hours(3)).unix_timestamp() as usize,
            exp: (now - Duration::hours(2)).unix_timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"dev-secret"),
        )
        .expect("encode");
        assert_eq!(keys.verify(&token), Err(AuthError::Expired));
    }

    #[test]
    fn tampered_signature_is_classified_as_invalid() {
        let keys = make_keys(Some("dev-secret"));
        let other = make_keys(Some("other-secret"));
        let token = other.sign(Uuid::new_v4(), "alice").expect("sign");
        assert_eq!(keys.verify(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn garbage_token_is_classified_as_invalid() {
        let keys = make_keys(Some("dev-secret"));
        assert_eq!(keys.verify("not-a-jwt"), Err(AuthError::InvalidToken));
    }

    #[test]
    fn missing_secret_refuses_to_sign_or_verify() {
        let keys = make_keys(None);
        assert_eq!(
            keys.sign(Uuid::new_v4(), "alice"),
            Err(AuthError::MissingSecret)
        );
        assert_eq!(keys.verify("anything"), Err(AuthError::MissingSecret));
    }
}
