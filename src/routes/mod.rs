pub mod auth;
pub mod bookings;
pub mod calendar;
pub mod catalog;
pub mod chat;
pub mod extract;
pub mod health;
pub mod vendors;
pub mod verification;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};

use crate::config::get_config;
use crate::middleware::auth::require_bearer_auth;
use crate::middleware::rate_limit::{new_rps_state, rps_middleware};
use crate::AppState;

/// Every HTTP and WebSocket route of the API, without the outer tower layers.
pub fn router(state: AppState) -> Router {
    let config = get_config();

    let auth_api = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/token/refresh", post(auth::refresh))
        .layer(from_fn_with_state(
            new_rps_state(config.auth_rps),
            rps_middleware,
        ));

    let protected_api = Router::new()
        .route("/api/auth/logout", post(auth::logout))
        .route(
            "/api/auth/profile",
            get(auth::get_profile).put(auth::update_profile),
        )
        .route("/api/dashboard/stats", get(bookings::dashboard_stats))
        .route(
            "/api/bookings",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route("/api/bookings/:id", get(bookings::get_booking))
        .route(
            "/api/bookings/:id/status",
            put(bookings::update_booking_status),
        )
        .route("/api/chat/vendors", get(chat::list_contacts))
        .route("/api/chat/unread", get(chat::unread_count))
        .route(
            "/api/chat/messages/:other_id",
            get(chat::get_messages).post(chat::send_message),
        )
        .route("/api/chat/messages/:other_id/read", put(chat::mark_read))
        .route(
            "/api/verification",
            get(verification::get_verification).post(verification::submit_verification),
        )
        .route(
            "/api/services",
            get(catalog::list_services).post(catalog::create_service),
        )
        .route(
            "/api/services/:id",
            get(catalog::get_service)
                .put(catalog::update_service)
                .delete(catalog::delete_service),
        )
        .route(
            "/api/calendar/events",
            get(calendar::list_events).post(calendar::create_event),
        )
        .route(
            "/api/calendar/events/:id",
            get(calendar::get_event)
                .put(calendar::update_event)
                .delete(calendar::delete_event),
        )
        .route("/api/vendors", get(vendors::list_vendors))
        .layer(from_fn(require_bearer_auth))
        .layer(from_fn_with_state(
            new_rps_state(config.api_rps),
            rps_middleware,
        ));

    // Authenticated by the `token` query parameter inside the handler.
    let socket_api = Router::new()
        .route("/api/ws/chat/:other_id", get(chat::chat_socket))
        .layer(from_fn_with_state(
            new_rps_state(config.api_rps),
            rps_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .merge(auth_api)
        .merge(protected_api)
        .merge(socket_api)
        .with_state(state)
}
