use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::api::AppState;
use crate::auth::{self, Claims};
use crate::error::ApiError;
use crate::models::{NewUser, User};
use crate::schema::users;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub birthday: NaiveDate,
    pub gender: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub birthday: NaiveDate,
    pub gender: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            phone_number: user.phone_number,
            birthday: user.birthday,
            gender: user.gender,
            avatar_url: user.avatar_url,
            created_at: user.created_at,
        }
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    if request.email.trim().is_empty() || !request.email.contains('@') {
        return Err(ApiError::validation("a valid email address is required"));
    }
    if request.password.len() < 8 {
        return Err(ApiError::validation(
            "password must be at least 8 characters",
        ));
    }
    if request.full_name.trim().is_empty() {
        return Err(ApiError::validation("full name is required"));
    }

    let mut conn = state.pool.get().await?;

    let email_taken: i64 = users::table
        .filter(users::email.eq(&request.email))
        .count()
        .get_result(&mut conn)
        .await?;
    if email_taken > 0 {
        return Err(ApiError::validation("email is already registered"));
    }
    if let Some(phone) = &request.phone_number {
        let phone_taken: i64 = users::table
            .filter(users::phone_number.eq(phone))
            .count()
            .get_result(&mut conn)
            .await?;
        if phone_taken > 0 {
            return Err(ApiError::validation("phone number is already registered"));
        }
    }

    let new_user = NewUser {
        id: Uuid::new_v4(),
        email: request.email,
        password_hash: auth::hash_password(&request.password)?,
        full_name: request.full_name,
        phone_number: request.phone_number,
        birthday: request.birthday,
        gender: request.gender.unwrap_or_else(|| "OTHER".to_string()),
    };

    let user: User = diesel::insert_into(users::table)
        .values(&new_user)
        .get_result(&mut conn)
        .await
        .map_err(|e| duplicate_identity(&e).unwrap_or_else(|| e.into()))?;

    info!("registered user {}", user.id);
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// A concurrent registration can slip past the uniqueness pre-checks and
/// surface as a unique violation on insert; map it to the same validation
/// error the sequential path returns.
fn duplicate_identity(err: &diesel::result::Error) -> Option<ApiError> {
    match crate::error::unique_violation_constraint(err) {
        Some("users_email_key") => Some(ApiError::validation("email is already registered")),
        Some("users_phone_number_key") => {
            Some(ApiError::validation("phone number is already registered"))
        }
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let mut conn = state.pool.get().await?;

    let user: User = users::table
        .filter(users::email.eq(&request.email))
        .first(&mut conn)
        .await
        .optional()?
        .ok_or(ApiError::Unauthorized)?;

    if !auth::verify_password(&request.password, &user.password_hash) {
        return Err(ApiError::Unauthorized);
    }

    let token = auth::issue_token(&state.auth, user.id, &user.email)?;
    info!("user {} logged in", user.id);
    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserResponse>, ApiError> {
    let mut conn = state.pool.get().await?;
    let user: User = users::table
        .find(claims.sub)
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::not_found("user"))?;
    Ok(Json(user.into()))
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// Exchanges a still-valid token for a longer-lived one.
pub async fn refresh(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let token = auth::refresh_token(&state.auth, &claims)?;
    Ok(Json(RefreshResponse { token }))
}

#[cfg(test)]
mod tests {
    use booking_core::BookingError;

    use super::*;

    #[test]
    fn losing_the_registration_race_maps_to_validation() {
        let err = crate::error::unique_violation("users_email_key");
        match duplicate_identity(&err) {
            Some(ApiError::Booking(BookingError::Validation(msg))) => {
                assert_eq!(msg, "email is already registered")
            }
            other => panic!("expected a validation error, got {other:?}"),
        }

        let err = crate::error::unique_violation("users_phone_number_key");
        assert!(duplicate_identity(&err).is_some());
    }

    #[test]
    fn unrelated_violations_stay_internal() {
        let err = crate::error::unique_violation("bookings_booking_code_key");
        assert!(duplicate_identity(&err).is_none());
        assert!(duplicate_identity(&diesel::result::Error::NotFound).is_none());
    }
}
