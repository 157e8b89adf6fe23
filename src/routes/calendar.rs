use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::calendar_dto::{CreateCalendarEventPayload, UpdateCalendarEventPayload},
    error::Result,
    middleware::auth::Claims,
    routes::extract::{ApiJson, ApiPath},
    AppState,
};

#[axum::debug_handler]
pub async fn list_events(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let events = state.calendar_service.list(claims.account_id()?).await?;
    Ok(Json(events))
}

#[axum::debug_handler]
pub async fn create_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<CreateCalendarEventPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let event = state
        .calendar_service
        .create(claims.account_id()?, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

#[axum::debug_handler]
pub async fn get_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    let event = state.calendar_service.get(claims.account_id()?, id).await?;
    Ok(Json(event))
}

#[axum::debug_handler]
pub async fn update_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateCalendarEventPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let event = state
        .calendar_service
        .update(claims.account_id()?, id, payload)
        .await?;
    Ok(Json(event))
}

#[axum::debug_handler]
pub async fn delete_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    state
        .calendar_service
        .delete(claims.account_id()?, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
