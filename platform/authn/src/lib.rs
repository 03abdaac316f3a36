//! Platform authentication helpers.
//!
//! Local email/password logins hashed with argon2 and stateless HS256 bearer
//! tokens. There is no refresh flow; clients log in again once `exp` passes.

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuthnError {
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    InvalidToken,
}

#[derive(Clone)]
pub struct AuthConfig {
    secret: Vec<u8>,
    pub token_ttl_minutes: i64,
}

impl AuthConfig {
    pub fn new(secret: impl Into<Vec<u8>>, token_ttl_minutes: i64) -> Self {
        Self {
            secret: secret.into(),
            token_ttl_minutes,
        }
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(&self.secret)
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(&self.secret)
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: Uuid,
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

/// Issued token plus its expiry, handed back to the client at login.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: chrono::DateTime<Utc>,
}

pub fn issue_token(
    user_id: Uuid,
    role: &str,
    config: &AuthConfig,
) -> Result<IssuedToken, AuthnError> {
    let now = Utc::now();
    let expires_at = now
        .checked_add_signed(Duration::minutes(config.token_ttl_minutes))
        .unwrap_or(now);
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        exp: expires_at.timestamp().max(0) as usize,
        iat: now.timestamp().max(0) as usize,
    };
    let token = jsonwebtoken::encode(&Header::default(), &claims, &config.encoding_key())
        .map_err(|_| AuthnError::InvalidToken)?;
    Ok(IssuedToken { token, expires_at })
}

pub fn decode_token(token: &str, config: &AuthConfig) -> Result<Claims, AuthnError> {
    let mut validation = Validation::default();
    validation.leeway = 0;
    jsonwebtoken::decode::<Claims>(token, &config.decoding_key(), &validation)
        .map(|data| data.claims)
        .map_err(|err| match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthnError::Expired,
            _ => AuthnError::InvalidToken,
        })
}

pub fn hash_password(password: &str) -> Result<String, AuthnError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthnError::Hash(err.to_string()))
}

pub fn verify_password(password: &str, stored_hash: &str) -> Result<(), AuthnError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| AuthnError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthnError::InvalidCredentials)
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let rest = header_value
        .strip_prefix("Bearer ")
        .or_else(|| header_value.strip_prefix("bearer "))?;
    let token = rest.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(ttl: i64) -> AuthConfig {
        AuthConfig::new(b"0123456789abcdef0123456789abcdef".to_vec(), ttl)
    }

    #[test]
    fn token_round_trips_subject_and_role() {
        let user = Uuid::new_v4();
        let issued = issue_token(user, "HR_MANAGER", &config(30)).unwrap();
        let claims = decode_token(&issued.token, &config(30)).unwrap();
        assert_eq!(claims.sub, user);
        assert_eq!(claims.role, "HR_MANAGER");
        assert!(issued.expires_at > Utc::now());
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let issued = issue_token(Uuid::new_v4(), "ADMIN", &config(-5)).unwrap();
        assert!(matches!(
            decode_token(&issued.token, &config(30)),
            Err(AuthnError::Expired)
        ));
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let issued = issue_token(Uuid::new_v4(), "ADMIN", &config(30)).unwrap();
        let other = AuthConfig::new(b"another-secret-another-secret-xx".to_vec(), 30);
        assert!(matches!(
            decode_token(&issued.token, &other),
            Err(AuthnError::InvalidToken)
        ));
    }

    #[test]
    fn password_hash_verifies_only_the_original() {
        let hash = hash_password("s3cret!").unwrap();
        assert!(verify_password("s3cret!", &hash).is_ok());
        assert!(verify_password("wrong", &hash).is_err());
        assert!(verify_password("s3cret!", "not-a-hash").is_err());
    }

    #[test]
    fn bearer_header_parsing() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("bearer  xyz "), Some("xyz"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic abc"), None);
    }
}
