use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use chrono::{Datelike, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::api::AppState;
use crate::auth::Claims;
use crate::error::ApiError;
use crate::models::{NewPaymentCard, PaymentCard};
use crate::schema::payment_cards;

pub async fn list_cards(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<PaymentCard>>, ApiError> {
    let mut conn = state.pool.get().await?;
    let cards: Vec<PaymentCard> = payment_cards::table
        .filter(payment_cards::user_id.eq(claims.sub))
        .order(payment_cards::created_at.asc())
        .load(&mut conn)
        .await?;
    Ok(Json(cards))
}

#[derive(Debug, Deserialize)]
pub struct AddCardRequest {
    pub card_holder_name: String,
    pub card_brand: String,
    pub card_number: String,
    pub exp_month: i32,
    pub exp_year: i32,
    #[serde(default)]
    pub is_default: bool,
}

pub async fn add_card(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<AddCardRequest>,
) -> Result<(StatusCode, Json<PaymentCard>), ApiError> {
    if !(1..=12).contains(&request.exp_month) {
        return Err(ApiError::validation("expiry month must be 1-12"));
    }
    if request.exp_year < Utc::now().year() {
        return Err(ApiError::validation("card is expired"));
    }
    if request.card_number.trim().is_empty() || request.card_holder_name.trim().is_empty() {
        return Err(ApiError::validation(
            "card number and holder name are required",
        ));
    }

    let mut conn = state.pool.get().await?;
    let user_id = claims.sub;

    let card = conn
        .transaction::<PaymentCard, ApiError, _>(|conn| {
            Box::pin(async move {
                if request.is_default {
                    diesel::update(
                        payment_cards::table.filter(payment_cards::user_id.eq(user_id)),
                    )
                    .set(payment_cards::is_default.eq(false))
                    .execute(conn)
                    .await?;
                }

                let new_card = NewPaymentCard {
                    id: Uuid::new_v4(),
                    user_id,
                    card_holder_name: request.card_holder_name,
                    card_brand: request.card_brand,
                    card_number: request.card_number,
                    exp_month: request.exp_month,
                    exp_year: request.exp_year,
                    is_default: request.is_default,
                };

                let card = diesel::insert_into(payment_cards::table)
                    .values(&new_card)
                    .get_result(conn)
                    .await?;
                Ok(card)
            })
        })
        .await?;

    info!("added payment card {} for user {}", card.id, user_id);
    Ok((StatusCode::CREATED, Json(card)))
}

pub async fn delete_card(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(card_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut conn = state.pool.get().await?;
    let deleted = diesel::delete(
        payment_cards::table
            .find(card_id)
            .filter(payment_cards::user_id.eq(claims.sub)),
    )
    .execute(&mut conn)
    .await?;

    if deleted == 0 {
        return Err(ApiError::not_found("payment card"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Promotes one card to default; the previous default is cleared in the
/// same transaction so a user never ends up with two.
pub async fn set_default_card(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(card_id): Path<Uuid>,
) -> Result<Json<PaymentCard>, ApiError> {
    let mut conn = state.pool.get().await?;
    let user_id = claims.sub;

    let card = conn
        .transaction::<PaymentCard, ApiError, _>(|conn| {
            Box::pin(async move {
                let owned: i64 = payment_cards::table
                    .find(card_id)
                    .filter(payment_cards::user_id.eq(user_id))
                    .count()
                    .get_result(conn)
                    .await?;
                if owned == 0 {
                    return Err(ApiError::not_found("payment card"));
                }

                diesel::update(payment_cards::table.filter(payment_cards::user_id.eq(user_id)))
                    .set(payment_cards::is_default.eq(false))
                    .execute(conn)
                    .await?;

                let card = diesel::update(payment_cards::table.find(card_id))
                    .set((
                        payment_cards::is_default.eq(true),
                        payment_cards::updated_at.eq(Utc::now()),
                    ))
                    .get_result(conn)
                    .await?;
                Ok(card)
            })
        })
        .await?;

    Ok(Json(card))
}
