use axum::extract::{Path, Query, State};
use axum::response::Json;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use booking_core::{BookingStatus, StayRange};

use crate::api::AppState;
use crate::error::ApiError;
use crate::handlers::bookings::has_conflicting_booking;
use crate::models::Room;
use crate::schema::{bookings, hotels, rooms};

pub async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Room>, ApiError> {
    let mut conn = state.pool.get().await?;
    let room: Room = rooms::table
        .find(id)
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::not_found("room"))?;
    Ok(Json(room))
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub available: bool,
}

/// Read-only availability probe. The authoritative check runs again under
/// a row lock when the booking is actually created.
pub async fn check_room_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let stay = StayRange::new(query.check_in, query.check_out)?;
    let mut conn = state.pool.get().await?;

    let room: Room = rooms::table
        .find(id)
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::not_found("room"))?;

    let available = room.is_available && !has_conflicting_booking(&mut conn, room.id, &stay).await?;

    Ok(Json(AvailabilityResponse {
        room_id: room.id,
        check_in: stay.check_in(),
        check_out: stay.check_out(),
        available,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RoomSearchQuery {
    pub city: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

/// Rooms in a city free for the whole stay: rooms flagged available, minus
/// those with a holding booking intersecting the range.
pub async fn search_rooms(
    State(state): State<AppState>,
    Query(query): Query<RoomSearchQuery>,
) -> Result<Json<Vec<Room>>, ApiError> {
    let stay = StayRange::new(query.check_in, query.check_out)?;
    let mut conn = state.pool.get().await?;

    let held: Vec<Uuid> = bookings::table
        .filter(bookings::status.eq_any(BookingStatus::HOLDING))
        .filter(bookings::check_in_date.lt(stay.check_out()))
        .filter(bookings::check_out_date.gt(stay.check_in()))
        .select(bookings::room_id)
        .load(&mut conn)
        .await?;

    let items: Vec<Room> = rooms::table
        .inner_join(hotels::table)
        .filter(hotels::city.eq(&query.city))
        .filter(rooms::is_available.eq(true))
        .filter(rooms::id.ne_all(held))
        .select(rooms::all_columns)
        .order(rooms::price.asc())
        .load(&mut conn)
        .await?;
    Ok(Json(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_query_accepts_iso_dates() {
        let query: RoomSearchQuery = serde_json::from_str(
            r#"{"city":"Paris","check_in":"2024-03-01","check_out":"2024-03-05"}"#,
        )
        .unwrap();
        assert_eq!(query.city, "Paris");
        assert!(StayRange::new(query.check_in, query.check_out).is_ok());
    }

    #[test]
    fn reversed_search_dates_fail_range_validation() {
        let query: RoomSearchQuery = serde_json::from_str(
            r#"{"city":"Paris","check_in":"2024-03-05","check_out":"2024-03-01"}"#,
        )
        .unwrap();
        assert!(StayRange::new(query.check_in, query.check_out).is_err());
    }
}
