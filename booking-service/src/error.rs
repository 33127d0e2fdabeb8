use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use booking_core::BookingError;

/// Everything a handler can fail with. Domain failures keep their taxonomy;
/// infrastructure faults (pool, query, hashing) collapse into `Internal` and
/// are logged rather than leaked to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error("invalid or missing credentials")]
    Unauthorized,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    pub fn not_found(what: &'static str) -> Self {
        ApiError::Booking(BookingError::NotFound(what))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Booking(BookingError::validation(message))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Booking(BookingError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Booking(BookingError::InvalidRange)
            | ApiError::Booking(BookingError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Booking(BookingError::Conflict)
            | ApiError::Booking(BookingError::InvalidStateTransition { .. }) => {
                StatusCode::CONFLICT
            }
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            ApiError::Internal(e) => {
                error!("internal error: {e:#}");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<diesel::result::Error> for ApiError {
    fn from(e: diesel::result::Error) -> Self {
        ApiError::Internal(e.into())
    }
}

impl From<bb8::RunError<diesel_async::pooled_connection::PoolError>> for ApiError {
    fn from(e: bb8::RunError<diesel_async::pooled_connection::PoolError>) -> Self {
        ApiError::Internal(e.into())
    }
}

/// The violated constraint's name when `err` is a unique-key violation.
/// Handlers match on it to turn insert races into their domain errors.
pub(crate) fn unique_violation_constraint(err: &diesel::result::Error) -> Option<&str> {
    match err {
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            info,
        ) => info.constraint_name(),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) fn unique_violation(constraint: &str) -> diesel::result::Error {
    struct Info {
        constraint: String,
    }
    impl diesel::result::DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            Some(&self.constraint)
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }
    diesel::result::Error::DatabaseError(
        diesel::result::DatabaseErrorKind::UniqueViolation,
        Box::new(Info {
            constraint: constraint.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_expected_statuses() {
        let cases = [
            (ApiError::not_found("booking"), StatusCode::NOT_FOUND),
            (
                ApiError::Booking(BookingError::InvalidRange),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Booking(BookingError::Conflict),
                StatusCode::CONFLICT,
            ),
            (ApiError::validation("bad guests"), StatusCode::BAD_REQUEST),
            (ApiError::Unauthorized, StatusCode::UNAUTHORIZED),
        ];
        for (err, expected) in cases {
            assert_eq!(err.status_code(), expected);
        }
    }

    #[test]
    fn unique_violations_expose_their_constraint() {
        let err = unique_violation("users_email_key");
        assert_eq!(unique_violation_constraint(&err), Some("users_email_key"));
        assert_eq!(
            unique_violation_constraint(&diesel::result::Error::NotFound),
            None
        );
    }

    #[test]
    fn illegal_transition_is_a_conflict() {
        use booking_core::BookingStatus::{CheckedOut, Pending};
        let err = ApiError::Booking(BookingError::InvalidStateTransition {
            from: Pending,
            to: CheckedOut,
        });
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }
}
