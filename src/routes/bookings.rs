use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::booking_dto::{CreateBookingPayload, DashboardStats, UpdateBookingStatusPayload},
    error::Result,
    middleware::auth::Claims,
    routes::extract::{ApiJson, ApiPath},
    models::booking::Booking,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    responses(
        (status = 200, description = "Booking counts and revenue", body = Json<DashboardStats>),
        (status = 401, description = "Missing or invalid token")
    )
)]
#[axum::debug_handler]
pub async fn dashboard_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let stats = state
        .booking_service
        .compute_stats(claims.account_id()?)
        .await?;
    Ok(Json(stats))
}

#[axum::debug_handler]
pub async fn list_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let bookings = state.booking_service.list(claims.account_id()?).await?;
    Ok(Json(bookings))
}

#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<CreateBookingPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let booking = state
        .booking_service
        .create(claims.account_id()?, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

#[axum::debug_handler]
pub async fn get_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    let booking = state.booking_service.get(claims.account_id()?, id).await?;
    Ok(Json(booking))
}

#[utoipa::path(
    put,
    path = "/api/bookings/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Booking ID")
    ),
    request_body = UpdateBookingStatusPayload,
    responses(
        (status = 200, description = "Status updated", body = Json<Booking>),
        (status = 403, description = "Booking belongs to another vendor"),
        (status = 404, description = "Booking not found")
    )
)]
#[axum::debug_handler]
pub async fn update_booking_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateBookingStatusPayload>,
) -> Result<impl IntoResponse> {
    let booking = state
        .booking_service
        .update_status(claims.account_id()?, id, payload.status)
        .await?;
    Ok(Json(booking))
}
