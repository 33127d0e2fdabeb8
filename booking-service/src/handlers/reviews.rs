use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use bigdecimal::{BigDecimal, ToPrimitive};
use diesel::dsl::avg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::AppState;
use crate::auth::Claims;
use crate::error::ApiError;
use crate::models::{NewReview, Review};
use crate::pagination::{Page, PageParams};
use crate::schema::{hotels, reviews, rooms};

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub hotel_id: Uuid,
    pub room_id: Option<Uuid>,
    pub rating: i32,
    pub comment: Option<String>,
}

pub async fn create_review(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>), ApiError> {
    if !(1..=5).contains(&request.rating) {
        return Err(ApiError::validation("rating must be between 1 and 5"));
    }

    let mut conn = state.pool.get().await?;

    let hotel_known: i64 = hotels::table
        .filter(hotels::id.eq(request.hotel_id))
        .count()
        .get_result(&mut conn)
        .await?;
    if hotel_known == 0 {
        return Err(ApiError::not_found("hotel"));
    }
    if let Some(room_id) = request.room_id {
        let room_known: i64 = rooms::table
            .filter(rooms::id.eq(room_id))
            .filter(rooms::hotel_id.eq(request.hotel_id))
            .count()
            .get_result(&mut conn)
            .await?;
        if room_known == 0 {
            return Err(ApiError::not_found("room"));
        }
    }

    let new_review = NewReview {
        id: Uuid::new_v4(),
        user_id: claims.sub,
        hotel_id: request.hotel_id,
        room_id: request.room_id,
        rating: request.rating,
        comment: request.comment,
    };

    let review: Review = diesel::insert_into(reviews::table)
        .values(&new_review)
        .get_result(&mut conn)
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn reviews_by_hotel(
    State(state): State<AppState>,
    Path(hotel_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<Review>>, ApiError> {
    let mut conn = state.pool.get().await?;

    let total: i64 = reviews::table
        .filter(reviews::hotel_id.eq(hotel_id))
        .count()
        .get_result(&mut conn)
        .await?;
    let items: Vec<Review> = reviews::table
        .filter(reviews::hotel_id.eq(hotel_id))
        .order(reviews::created_at.desc())
        .limit(params.limit())
        .offset(params.offset())
        .load(&mut conn)
        .await?;

    Ok(Json(Page::new(items, params, total)))
}

pub async fn reviews_by_room(
    State(state): State<AppState>,
    Path(room_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<Review>>, ApiError> {
    let mut conn = state.pool.get().await?;

    let total: i64 = reviews::table
        .filter(reviews::room_id.eq(room_id))
        .count()
        .get_result(&mut conn)
        .await?;
    let items: Vec<Review> = reviews::table
        .filter(reviews::room_id.eq(room_id))
        .order(reviews::created_at.desc())
        .limit(params.limit())
        .offset(params.offset())
        .load(&mut conn)
        .await?;

    Ok(Json(Page::new(items, params, total)))
}

#[derive(Debug, Serialize)]
pub struct AverageRatingResponse {
    pub average_rating: Option<f64>,
    pub review_count: i64,
}

/// Aggregates are explicit read-side queries; nothing is derived from
/// loaded entity collections.
pub async fn hotel_average_rating(
    State(state): State<AppState>,
    Path(hotel_id): Path<Uuid>,
) -> Result<Json<AverageRatingResponse>, ApiError> {
    let mut conn = state.pool.get().await?;

    let average: Option<BigDecimal> = reviews::table
        .filter(reviews::hotel_id.eq(hotel_id))
        .select(avg(reviews::rating))
        .get_result(&mut conn)
        .await?;
    let count: i64 = reviews::table
        .filter(reviews::hotel_id.eq(hotel_id))
        .count()
        .get_result(&mut conn)
        .await?;

    Ok(Json(AverageRatingResponse {
        average_rating: average.as_ref().and_then(ToPrimitive::to_f64),
        review_count: count,
    }))
}

pub async fn room_average_rating(
    State(state): State<AppState>,
    Path(room_id): Path<Uuid>,
) -> Result<Json<AverageRatingResponse>, ApiError> {
    let mut conn = state.pool.get().await?;

    let average: Option<BigDecimal> = reviews::table
        .filter(reviews::room_id.eq(room_id))
        .select(avg(reviews::rating))
        .get_result(&mut conn)
        .await?;
    let count: i64 = reviews::table
        .filter(reviews::room_id.eq(room_id))
        .count()
        .get_result(&mut conn)
        .await?;

    Ok(Json(AverageRatingResponse {
        average_rating: average.as_ref().and_then(ToPrimitive::to_f64),
        review_count: count,
    }))
}
