use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::catalog_dto::{CreateServicePayload, UpdateServicePayload},
    error::Result,
    middleware::auth::Claims,
    routes::extract::{ApiJson, ApiPath},
    models::vendor_service::VendorService,
    AppState,
};

#[axum::debug_handler]
pub async fn list_services(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let services = state.catalog_service.list(claims.account_id()?).await?;
    Ok(Json(services))
}

#[utoipa::path(
    post,
    path = "/api/services",
    request_body = CreateServicePayload,
    responses(
        (status = 201, description = "Service listing created", body = Json<VendorService>),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Service name already used by this vendor")
    )
)]
#[axum::debug_handler]
pub async fn create_service(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<CreateServicePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let service = state
        .catalog_service
        .create(claims.account_id()?, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(service)))
}

#[axum::debug_handler]
pub async fn get_service(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    let service = state.catalog_service.get(claims.account_id()?, id).await?;
    Ok(Json(service))
}

#[axum::debug_handler]
pub async fn update_service(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateServicePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let service = state
        .catalog_service
        .update(claims.account_id()?, id, payload)
        .await?;
    Ok(Json(service))
}

#[axum::debug_handler]
pub async fn delete_service(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    state
        .catalog_service
        .delete(claims.account_id()?, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
