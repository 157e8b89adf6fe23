use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::auth_dto::{
        AuthResponse, LoginPayload, RefreshPayload, RefreshResponse, RegisterPayload,
        UpdateProfilePayload,
    },
    dto::vendor_dto::VendorSummary,
    error::Result,
    middleware::auth::Claims,
    routes::extract::ApiJson,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "Vendor registered", body = Json<AuthResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email already registered")
    )
)]
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterPayload>,
) -> Result<impl IntoResponse> {
    if let Err(errors) = payload.validate() {
        tracing::warn!(error = %errors, "registration rejected");
        return Err(errors.into());
    }
    let response = state.account_service.register(payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Logged in", body = Json<AuthResponse>),
        (status = 400, description = "Invalid credentials")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let response = state.account_service.login(payload).await?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RefreshPayload>,
) -> Result<impl IntoResponse> {
    let access = state.account_service.refresh(&payload.refresh).await?;
    Ok(Json(RefreshResponse { access }))
}

#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    state.account_service.logout(claims.account_id()?).await?;
    Ok(Json(json!({ "message": "Logged out successfully" })))
}

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let profile = state.account_service.get_profile(claims.account_id()?).await?;
    Ok(Json(profile))
}

#[utoipa::path(
    put,
    path = "/api/auth/profile",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Profile updated", body = Json<VendorSummary>),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Missing or invalid token")
    )
)]
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<UpdateProfilePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let profile = state
        .account_service
        .update_profile(claims.account_id()?, payload)
        .await?;
    Ok(Json(profile))
}
