use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use diesel_async::pooled_connection::bb8::Pool;
use diesel_async::AsyncPgConnection;

use crate::auth::{require_auth, AuthConfig};
use crate::handlers;

pub type DbPool = Pool<AsyncPgConnection>;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub auth: AuthConfig,
}

pub fn create_router(state: AppState) -> Router {
    // Catalog browsing and the availability probe are public; everything
    // that touches a user's own data sits behind the bearer middleware.
    let public = Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/auth/register", post(handlers::auth::register))
        .route("/api/v1/auth/login", post(handlers::auth::login))
        .route("/api/v1/hotels", get(handlers::hotels::list_hotels))
        .route("/api/v1/hotels/:id", get(handlers::hotels::get_hotel))
        .route(
            "/api/v1/hotels/:id/rooms",
            get(handlers::hotels::list_hotel_rooms),
        )
        .route("/api/v1/rooms/search", get(handlers::rooms::search_rooms))
        .route("/api/v1/rooms/:id", get(handlers::rooms::get_room))
        .route(
            "/api/v1/rooms/:id/availability",
            get(handlers::rooms::check_room_availability),
        )
        .route(
            "/api/v1/reviews/hotel/:id",
            get(handlers::reviews::reviews_by_hotel),
        )
        .route(
            "/api/v1/reviews/room/:id",
            get(handlers::reviews::reviews_by_room),
        )
        .route(
            "/api/v1/reviews/hotel/:id/average-rating",
            get(handlers::reviews::hotel_average_rating),
        )
        .route(
            "/api/v1/reviews/room/:id/average-rating",
            get(handlers::reviews::room_average_rating),
        );

    let protected = Router::new()
        .route("/api/v1/auth/me", get(handlers::auth::me))
        .route("/api/v1/auth/refresh", post(handlers::auth::refresh))
        .route("/api/v1/bookings", post(handlers::bookings::create_booking))
        .route("/api/v1/bookings/my", get(handlers::bookings::my_bookings))
        .route("/api/v1/bookings/:id", get(handlers::bookings::get_booking))
        .route(
            "/api/v1/bookings/code/:code",
            get(handlers::bookings::get_booking_by_code),
        )
        .route(
            "/api/v1/bookings/:id/status",
            put(handlers::bookings::update_booking_status),
        )
        .route(
            "/api/v1/bookings/:id/cancel",
            put(handlers::bookings::cancel_booking),
        )
        .route(
            "/api/v1/payments/cards",
            get(handlers::cards::list_cards).post(handlers::cards::add_card),
        )
        .route(
            "/api/v1/payments/cards/:id",
            delete(handlers::cards::delete_card),
        )
        .route(
            "/api/v1/payments/cards/:id/set-default",
            put(handlers::cards::set_default_card),
        )
        .route("/api/v1/reviews", post(handlers::reviews::create_review))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public)
        .merge(protected)
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
}

pub async fn health_check() -> &'static str {
    "OK"
}
