use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    error::Result,
    middleware::auth::Claims,
    services::verification_service::{DocumentKind, DocumentUpload, VerificationSubmission},
    AppState,
};

#[axum::debug_handler]
pub async fn get_verification(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let verification = state
        .verification_service
        .get(claims.account_id()?)
        .await?;
    Ok(Json(verification))
}

/// Multipart fields: `identity_document`, `tax_document` (files) and `address`.
/// Returns 201 for a first submission and 200 when an existing one is replaced.
#[axum::debug_handler]
pub async fn submit_verification(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let account_id = claims.account_id()?;
    let mut submission = VerificationSubmission::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        if name == "address" {
            submission.address = Some(field.text().await?);
            continue;
        }
        let Some(kind) = DocumentKind::from_field(&name) else {
            tracing::debug!(field = %name, "ignoring unknown verification field");
            continue;
        };

        let file_name = field.file_name().unwrap_or("document").to_string();
        let data = field.bytes().await?;
        if data.is_empty() {
            continue;
        }
        let upload = DocumentUpload { file_name, data };
        match kind {
            DocumentKind::Identity => submission.identity_document = Some(upload),
            DocumentKind::Tax => submission.tax_document = Some(upload),
        }
    }

    let (verification, created) = state
        .verification_service
        .submit(account_id, submission)
        .await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(verification)))
}
