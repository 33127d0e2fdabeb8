use axum::extract::{Path, Query, State};
use axum::response::Json;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::AppState;
use crate::error::ApiError;
use crate::models::{Hotel, Room};
use crate::pagination::{Page, PageParams};
use crate::schema::{hotels, rooms};

#[derive(Debug, Deserialize)]
pub struct HotelFilter {
    pub city: Option<String>,
}

pub async fn list_hotels(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(filter): Query<HotelFilter>,
) -> Result<Json<Page<Hotel>>, ApiError> {
    let mut conn = state.pool.get().await?;

    let mut query = hotels::table.into_boxed();
    if let Some(city) = &filter.city {
        query = query.filter(hotels::city.eq(city.clone()));
    }

    let total: i64 = match &filter.city {
        Some(city) => {
            hotels::table
                .filter(hotels::city.eq(city.clone()))
                .count()
                .get_result(&mut conn)
                .await?
        }
        None => hotels::table.count().get_result(&mut conn).await?,
    };
    let items: Vec<Hotel> = query
        .order((hotels::star_rating.desc(), hotels::name.asc()))
        .limit(params.limit())
        .offset(params.offset())
        .load(&mut conn)
        .await?;

    Ok(Json(Page::new(items, params, total)))
}

pub async fn get_hotel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Hotel>, ApiError> {
    let mut conn = state.pool.get().await?;
    let hotel: Hotel = hotels::table
        .find(id)
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::not_found("hotel"))?;
    Ok(Json(hotel))
}

pub async fn list_hotel_rooms(
    State(state): State<AppState>,
    Path(hotel_id): Path<Uuid>,
) -> Result<Json<Vec<Room>>, ApiError> {
    let mut conn = state.pool.get().await?;

    let hotel_known: i64 = hotels::table
        .filter(hotels::id.eq(hotel_id))
        .count()
        .get_result(&mut conn)
        .await?;
    if hotel_known == 0 {
        return Err(ApiError::not_found("hotel"));
    }

    let items: Vec<Room> = rooms::table
        .filter(rooms::hotel_id.eq(hotel_id))
        .order(rooms::room_number.asc())
        .load(&mut conn)
        .await?;
    Ok(Json(items))
}
