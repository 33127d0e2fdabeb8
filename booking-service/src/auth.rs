use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::AppState;
use crate::error::ApiError;

/// JWT settings, built once from the CLI/env flags and carried in
/// `AppState`. No global mutable state.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret.
    pub secret: String,
    /// Lifetime of freshly issued access tokens, in hours.
    pub token_lifetime_hours: i64,
    /// Lifetime granted when a still-valid token is exchanged at
    /// `/auth/refresh`, in hours.
    pub refresh_lifetime_hours: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub iat: usize,
    pub exp: usize,
}

fn issue(config: &AuthConfig, user_id: Uuid, email: &str, hours: i64) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + chrono::Duration::hours(hours)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(anyhow::anyhow!("failed to encode token: {e}")))
}

pub fn issue_token(config: &AuthConfig, user_id: Uuid, email: &str) -> Result<String, ApiError> {
    issue(config, user_id, email, config.token_lifetime_hours)
}

/// Re-issues a token from the claims of a still-valid one, with the
/// refresh lifetime instead of the access lifetime.
pub fn refresh_token(config: &AuthConfig, claims: &Claims) -> Result<String, ApiError> {
    issue(config, claims.sub, &claims.email, config.refresh_lifetime_hours)
}

pub fn validate_token(config: &AuthConfig, token: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::Unauthorized)
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("failed to hash password: {e}")))
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Bearer middleware for the protected routes. Validated claims are stored
/// in request extensions for handlers to pick up via `Extension<Claims>`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let claims = validate_token(&state.auth, token)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig {
            secret: "test-secret".to_string(),
            token_lifetime_hours: 24,
            refresh_lifetime_hours: 720,
        }
    }

    #[test]
    fn issued_token_round_trips() {
        let cfg = config();
        let user_id = Uuid::new_v4();
        let token = issue_token(&cfg, user_id, "guest@example.com").unwrap();
        let claims = validate_token(&cfg, &token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "guest@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = issue_token(&config(), Uuid::new_v4(), "guest@example.com").unwrap();
        let other = AuthConfig {
            secret: "different".to_string(),
            ..config()
        };
        assert!(matches!(
            validate_token(&other, &token),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            validate_token(&config(), "not-a-jwt"),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn refreshed_token_keeps_identity() {
        let cfg = config();
        let user_id = Uuid::new_v4();
        let token = issue_token(&cfg, user_id, "guest@example.com").unwrap();
        let claims = validate_token(&cfg, &token).unwrap();
        let refreshed = refresh_token(&cfg, &claims).unwrap();
        let refreshed_claims = validate_token(&cfg, &refreshed).unwrap();
        assert_eq!(refreshed_claims.sub, user_id);
    }

    #[test]
    fn password_hash_verifies_and_rejects() {
        let hash = hash_password("hunter2!").unwrap();
        assert_ne!(hash, "hunter2!");
        assert!(verify_password("hunter2!", &hash));
        assert!(!verify_password("hunter3!", &hash));
        assert!(!verify_password("hunter2!", "not-a-phc-string"));
    }
}
