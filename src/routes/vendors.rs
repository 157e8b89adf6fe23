use axum::{
    extract::State,
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::vendor_dto::{VendorListQuery, VendorListResponse},
    error::Result,
    middleware::auth::Claims,
    routes::extract::ApiQuery,
    services::discovery_service::{PageRequest, VendorFilter},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/vendors",
    params(
        ("category" = Option<String>, Query, description = "Business category substring"),
        ("location" = Option<String>, Query, description = "City, state, location or address substring"),
        ("search" = Option<String>, Query, description = "Name, category or service text"),
        ("price_range" = Option<String>, Query, description = "Under 10000 | 10000-25000 | 25000-50000 | Above 50000"),
        ("limit" = Option<i64>, Query, description = "Bounded unpaginated slice"),
        ("page" = Option<i64>, Query, description = "Page number, ignored with limit"),
        ("per_page" = Option<i64>, Query, description = "Page size, ignored with limit")
    ),
    responses(
        (status = 200, description = "Matching vendors", body = Json<VendorListResponse>),
        (status = 400, description = "Invalid filter")
    )
)]
#[axum::debug_handler]
pub async fn list_vendors(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiQuery(query): ApiQuery<VendorListQuery>,
) -> Result<impl IntoResponse> {
    let filter = VendorFilter::from_query(claims.account_id()?, &query)?;
    let page = PageRequest::from_query(&query)?;
    let vendors = state.discovery_service.list_vendors(&filter, page).await?;
    Ok(Json(vendors))
}
