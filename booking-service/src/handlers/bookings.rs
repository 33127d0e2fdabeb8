use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use booking_core::{generate_booking_code, total_price, BookingError, BookingStatus, StayRange};

use crate::api::AppState;
use crate::auth::Claims;
use crate::error::ApiError;
use crate::models::{Booking, NewBooking, Room};
use crate::pagination::{Page, PageParams};
use crate::schema::{bookings, rooms, users};

/// Attempts to re-insert with a fresh code if the generated one collides
/// with an existing row. One retry has never been observed to fail twice.
const CODE_RETRIES: usize = 3;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    pub room_id: Uuid,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub guests: i32,
    pub special_requests: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub booking_code: String,
    pub user_id: Uuid,
    pub room_id: Uuid,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub guests: i32,
    pub total_price: BigDecimal,
    pub status: BookingStatus,
    pub special_requests: Option<String>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<Booking> for BookingResponse {
    type Error = ApiError;

    fn try_from(booking: Booking) -> Result<Self, Self::Error> {
        let status = booking.parsed_status()?;
        Ok(BookingResponse {
            id: booking.id,
            booking_code: booking.booking_code,
            user_id: booking.user_id,
            room_id: booking.room_id,
            check_in_date: booking.check_in_date,
            check_out_date: booking.check_out_date,
            guests: booking.guests,
            total_price: booking.total_price,
            status,
            special_requests: booking.special_requests,
            cancellation_reason: booking.cancellation_reason,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        })
    }
}

/// True when a CONFIRMED or CHECKED_IN booking for the room intersects the
/// requested half-open range. PENDING, CANCELLED and NO_SHOW rows never
/// block a room.
pub async fn has_conflicting_booking(
    conn: &mut AsyncPgConnection,
    room_id: Uuid,
    stay: &StayRange,
) -> Result<bool, ApiError> {
    let conflicts: i64 = bookings::table
        .filter(bookings::room_id.eq(room_id))
        .filter(bookings::status.eq_any(BookingStatus::HOLDING))
        .filter(bookings::check_in_date.lt(stay.check_out()))
        .filter(bookings::check_out_date.gt(stay.check_in()))
        .count()
        .get_result(conn)
        .await?;
    Ok(conflicts > 0)
}

/// Same predicate, ignoring one booking row. Used when that booking itself
/// is being promoted into a holding status.
async fn has_conflicting_booking_besides(
    conn: &mut AsyncPgConnection,
    room_id: Uuid,
    stay: &StayRange,
    booking_id: Uuid,
) -> Result<bool, ApiError> {
    let conflicts: i64 = bookings::table
        .filter(bookings::id.ne(booking_id))
        .filter(bookings::room_id.eq(room_id))
        .filter(bookings::status.eq_any(BookingStatus::HOLDING))
        .filter(bookings::check_in_date.lt(stay.check_out()))
        .filter(bookings::check_out_date.gt(stay.check_in()))
        .count()
        .get_result(conn)
        .await?;
    Ok(conflicts > 0)
}

/// Booking factory. The room row is locked for the duration of the
/// transaction, so the availability check and the insert observe a stable
/// booking set and two concurrent requests for the same room serialize.
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    let stay = StayRange::new(request.check_in_date, request.check_out_date)?;
    if request.guests < 1 {
        return Err(ApiError::validation("guests must be at least 1"));
    }

    let mut conn = state.pool.get().await?;

    for attempt in 0..CODE_RETRIES {
        let code = generate_booking_code();
        let request = request.clone();
        let user_id = claims.sub;

        let result = conn
            .transaction::<Booking, ApiError, _>(|conn| {
                Box::pin(async move {
                    let user_known: i64 = users::table
                        .filter(users::id.eq(user_id))
                        .count()
                        .get_result(conn)
                        .await?;
                    if user_known == 0 {
                        return Err(ApiError::not_found("user"));
                    }

                    let room: Room = rooms::table
                        .find(request.room_id)
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?
                        .ok_or_else(|| ApiError::not_found("room"))?;

                    if request.guests > room.capacity {
                        return Err(ApiError::validation(format!(
                            "room holds at most {} guests",
                            room.capacity
                        )));
                    }
                    if !room.is_available {
                        return Err(BookingError::Conflict.into());
                    }
                    if has_conflicting_booking(conn, room.id, &stay).await? {
                        return Err(BookingError::Conflict.into());
                    }

                    let new_booking = NewBooking {
                        id: Uuid::new_v4(),
                        booking_code: code,
                        user_id,
                        room_id: room.id,
                        check_in_date: stay.check_in(),
                        check_out_date: stay.check_out(),
                        guests: request.guests,
                        total_price: total_price(room.nightly_rate(), &stay),
                        status: BookingStatus::Pending.to_string(),
                        special_requests: request.special_requests,
                    };

                    let booking = diesel::insert_into(bookings::table)
                        .values(&new_booking)
                        .get_result(conn)
                        .await?;
                    Ok(booking)
                })
            })
            .await;

        match result {
            Ok(booking) => {
                info!(
                    "created booking {} for room {} ({} nights)",
                    booking.booking_code,
                    booking.room_id,
                    stay.nights()
                );
                return Ok((StatusCode::CREATED, Json(booking.try_into()?)));
            }
            Err(e) if is_code_collision(&e) => {
                warn!("booking code collision on attempt {attempt}, regenerating");
                continue;
            }
            Err(e) => return Err(e),
        }
    }

    Err(ApiError::Internal(anyhow::anyhow!(
        "could not generate a unique booking code after {CODE_RETRIES} attempts"
    )))
}

fn is_code_collision(err: &ApiError) -> bool {
    let ApiError::Internal(source) = err else {
        return false;
    };
    source
        .downcast_ref::<diesel::result::Error>()
        .and_then(crate::error::unique_violation_constraint)
        == Some("bookings_booking_code_key")
}

pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingResponse>, ApiError> {
    let mut conn = state.pool.get().await?;
    let booking: Booking = bookings::table
        .find(id)
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::not_found("booking"))?;
    Ok(Json(booking.try_into()?))
}

pub async fn get_booking_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<BookingResponse>, ApiError> {
    let mut conn = state.pool.get().await?;
    let booking: Booking = bookings::table
        .filter(bookings::booking_code.eq(code))
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::not_found("booking"))?;
    Ok(Json(booking.try_into()?))
}

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    pub status: Option<String>,
}

pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<PageParams>,
    Query(filter): Query<StatusFilter>,
) -> Result<Json<Page<BookingResponse>>, ApiError> {
    let status = filter
        .status
        .as_deref()
        .map(str::parse::<BookingStatus>)
        .transpose()?;

    let mut conn = state.pool.get().await?;

    let mut query = bookings::table
        .filter(bookings::user_id.eq(claims.sub))
        .into_boxed();
    if let Some(status) = status {
        query = query.filter(bookings::status.eq(status.as_str()));
    }

    let total: i64 = match status {
        Some(status) => {
            bookings::table
                .filter(bookings::user_id.eq(claims.sub))
                .filter(bookings::status.eq(status.as_str()))
                .count()
                .get_result(&mut conn)
                .await?
        }
        None => {
            bookings::table
                .filter(bookings::user_id.eq(claims.sub))
                .count()
                .get_result(&mut conn)
                .await?
        }
    };
    let rows: Vec<Booking> = query
        .order(bookings::created_at.desc())
        .limit(params.limit())
        .offset(params.offset())
        .load(&mut conn)
        .await?;

    let items = rows
        .into_iter()
        .map(BookingResponse::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(Page::new(items, params, total)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

/// Validated lifecycle transition. The booking row is locked while the edge
/// is checked so the status and its timestamp change atomically. A move that
/// begins a hold additionally locks the room row and re-runs the overlap
/// predicate, so it serializes with the factory and with other promotions
/// for the same room.
pub async fn update_booking_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking = transition(&state, id, request.status, None).await?;
    info!("booking {} moved to {}", booking.booking_code, request.status);
    Ok(Json(booking.try_into()?))
}

#[derive(Debug, Deserialize)]
pub struct CancelBookingRequest {
    pub reason: String,
}

pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CancelBookingRequest>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking = transition(&state, id, BookingStatus::Cancelled, Some(request.reason)).await?;
    info!("booking {} cancelled", booking.booking_code);
    Ok(Json(booking.try_into()?))
}

async fn transition(
    state: &AppState,
    id: Uuid,
    target: BookingStatus,
    cancellation_reason: Option<String>,
) -> Result<Booking, ApiError> {
    let mut conn = state.pool.get().await?;
    conn.transaction::<Booking, ApiError, _>(|conn| {
        Box::pin(async move {
            let booking: Booking = bookings::table
                .find(id)
                .for_update()
                .first(conn)
                .await
                .optional()?
                .ok_or_else(|| ApiError::not_found("booking"))?;

            let current = booking.parsed_status()?;
            let next = current.transition_to(target)?;

            // A PENDING booking does not block its room, so by the time it
            // is confirmed another booking may already hold the same dates.
            if current.begins_hold(next) {
                let room: Room = rooms::table
                    .find(booking.room_id)
                    .for_update()
                    .first(conn)
                    .await?;
                let stay = StayRange::new(booking.check_in_date, booking.check_out_date)?;
                if has_conflicting_booking_besides(conn, room.id, &stay, booking.id).await? {
                    return Err(BookingError::Conflict.into());
                }
            }

            let updated = match cancellation_reason {
                Some(reason) => {
                    diesel::update(bookings::table.find(id))
                        .set((
                            bookings::status.eq(next.as_str()),
                            bookings::cancellation_reason.eq(reason),
                            bookings::updated_at.eq(Utc::now()),
                        ))
                        .get_result(conn)
                        .await?
                }
                None => {
                    diesel::update(bookings::table.find(id))
                        .set((
                            bookings::status.eq(next.as_str()),
                            bookings::updated_at.eq(Utc::now()),
                        ))
                        .get_result(conn)
                        .await?
                }
            };
            Ok(updated)
        })
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_payload_uses_storage_form() {
        let request: UpdateStatusRequest =
            serde_json::from_str(r#"{"status":"CHECKED_IN"}"#).unwrap();
        assert_eq!(request.status, BookingStatus::CheckedIn);

        assert!(serde_json::from_str::<UpdateStatusRequest>(r#"{"status":"checked_in"}"#).is_err());
    }

    #[test]
    fn code_collision_is_detected_from_the_constraint_name() {
        let collision =
            ApiError::Internal(crate::error::unique_violation("bookings_booking_code_key").into());
        assert!(is_code_collision(&collision));

        let other_constraint =
            ApiError::Internal(crate::error::unique_violation("users_email_key").into());
        assert!(!is_code_collision(&other_constraint));

        assert!(!is_code_collision(&ApiError::Unauthorized));
    }

    #[test]
    fn create_request_accepts_iso_dates() {
        let request: CreateBookingRequest = serde_json::from_str(
            r#"{
                "room_id": "7d7f9c7e-3a7b-4f1e-9f7a-1c2b3d4e5f60",
                "check_in_date": "2024-03-01",
                "check_out_date": "2024-03-05",
                "guests": 2
            }"#,
        )
        .unwrap();
        assert_eq!(request.guests, 2);
        assert!(request.special_requests.is_none());
        assert!(StayRange::new(request.check_in_date, request.check_out_date).is_ok());
    }
}
