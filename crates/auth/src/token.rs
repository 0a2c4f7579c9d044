use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use thiserror::Error;

use farmstand_core::UserId;

use crate::{claims::SessionClaims, role::Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token")]
    InvalidToken,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Mints and verifies session tokens.
///
/// Implemented by [`Hs256TokenCodec`] for production; tests may substitute
/// their own.
pub trait TokenCodec: Send + Sync {
    fn issue(&self, user_id: UserId, email: &str, role: Role) -> Result<String, AuthError>;

    fn verify(&self, token: &str) -> Result<SessionClaims, AuthError>;
}

/// How long an issued session stays valid. Mirrors the long-lived cookie the
/// front end expects (90 days).
pub const SESSION_TTL_DAYS: i64 = 90;

/// HS256 JWT codec over a shared secret.
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

impl TokenCodec for Hs256TokenCodec {
    fn issue(&self, user_id: UserId, email: &str, role: Role) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = SessionClaims::new(
            user_id,
            email,
            role,
            now,
            now + Duration::days(SESSION_TTL_DAYS),
        );
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_and_carries_role() {
        let codec = Hs256TokenCodec::new(b"test-secret");
        let user_id = UserId::new();

        let token = codec.issue(user_id, "a@example.com", Role::Admin).unwrap();
        let claims = codec.verify(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "a@example.com");
        assert!(claims.role.is_admin());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let codec = Hs256TokenCodec::new(b"secret-a");
        let other = Hs256TokenCodec::new(b"secret-b");
        let token = codec
            .issue(UserId::new(), "a@example.com", Role::Customer)
            .unwrap();

        assert_eq!(other.verify(&token).unwrap_err(), AuthError::InvalidToken);
    }

    #[test]
    fn garbage_token_is_rejected() {
        let codec = Hs256TokenCodec::new(b"test-secret");
        assert_eq!(
            codec.verify("not.a.token").unwrap_err(),
            AuthError::InvalidToken
        );
    }
}
