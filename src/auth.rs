//! Password hashing, bearer tokens and the request extractors built on them.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::api::SharedState;
use crate::errors::{HubError, Result};

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| HubError::Persistence(anyhow::anyhow!("Failed to hash password: {}", e)))
}

/// A stored hash that does not parse never verifies.
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Hash on the blocking pool.
pub async fn hash_password_blocking(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| HubError::Persistence(anyhow::Error::new(e).context("hash task panicked")))?
}

pub async fn verify_password_blocking(hash: String, password: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&hash, &password))
        .await
        .map_err(|e| HubError::Persistence(anyhow::Error::new(e).context("verify task panicked")))
}

/// Token payload: `{id, email, username, exp}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub exp: i64,
}

/// Ten years.
const MAX_TTL_HOURS: u64 = 24 * 365 * 10;

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: chrono::Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, ttl_hours: u64) -> Self {
        let hours = i64::try_from(ttl_hours.min(MAX_TTL_HOURS)).unwrap_or_default();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: chrono::Duration::hours(hours),
        }
    }

    pub fn issue(&self, id: i64, email: &str, username: &str) -> Result<String> {
        let claims = Claims {
            id,
            email: email.to_string(),
            username: username.to_string(),
            exp: (chrono::Utc::now() + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| HubError::Persistence(anyhow::anyhow!("Failed to sign token: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected bearer token");
                HubError::Authentication("Invalid or expired token".into())
            })
    }
}

fn bearer(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Rejects the request with 401 unless a valid bearer token is present.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = HubError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer(parts)
            .ok_or_else(|| HubError::Authentication("Authentication required".into()))?;
        state.keys.verify(token).map(AuthUser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() -> anyhow::Result<()> {
        let hash = hash_password("secret12")?;
        assert_ne!(hash, "secret12");
        assert!(verify_password(&hash, "secret12"));
        assert!(!verify_password(&hash, "secret13"));
        assert!(!verify_password("not-a-phc-string", "secret12"));
        Ok(())
    }

    #[test]
    fn test_token_round_trip() -> anyhow::Result<()> {
        let keys = JwtKeys::new("test-secret", 1);
        let token = keys.issue(7, "a@x.com", "alice")?;
        let claims = keys.verify(&token)?;
        assert_eq!(claims.id, 7);
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.username, "alice");
        Ok(())
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() -> anyhow::Result<()> {
        let token = JwtKeys::new("one", 1).issue(1, "a@x.com", "a")?;
        assert!(matches!(
            JwtKeys::new("two", 1).verify(&token),
            Err(HubError::Authentication(_))
        ));
        Ok(())
    }

    #[test]
    fn test_expired_token_is_rejected() -> anyhow::Result<()> {
        let keys = JwtKeys::new("s", 0);
        let claims = Claims {
            id: 1,
            email: "a@x.com".into(),
            username: "a".into(),
            exp: chrono::Utc::now().timestamp() - 3600,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding)?;
        assert!(keys.verify(&token).is_err());
        Ok(())
    }

    #[test]
    fn test_bearer_parsing() -> anyhow::Result<()> {
        let req = axum::http::Request::builder()
            .header(header::AUTHORIZATION, "Bearer abc.def")
            .body(())?;
        let (parts, _) = req.into_parts();
        assert_eq!(bearer(&parts), Some("abc.def"));

        let req = axum::http::Request::builder()
            .header(header::AUTHORIZATION, "Basic xyz")
            .body(())?;
        let (parts, _) = req.into_parts();
        assert_eq!(bearer(&parts), None);
        Ok(())
    }
}
