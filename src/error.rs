use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::BadRequest(_)
            | Error::Validation(_)
            | Error::Json(_)
            | Error::Multipart(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Config(_)
            | Error::Database(_)
            | Error::Internal(_)
            | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show a caller; server-side failures are logged and masked.
    pub fn public_message(&self) -> String {
        match self {
            Error::BadRequest(msg)
            | Error::Unauthorized(msg)
            | Error::Forbidden(msg)
            | Error::NotFound(msg)
            | Error::Conflict(msg) => msg.clone(),
            Error::Validation(err) => err.to_string(),
            Error::Json(err) => err.to_string(),
            Error::Multipart(err) => err.to_string(),
            other => {
                tracing::error!(error = ?other, "request failed with internal error");
                "An unexpected error occurred".to_string()
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let body = Json(json!({ "error": self.public_message() }));
        (self.status(), body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Error::Conflict(conflict_message(db_err.constraint()).to_string())
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                Error::NotFound("Referenced vendor or booking not found".to_string())
            }
            sqlx::Error::Database(db_err) if is_range_violation(db_err.code().as_deref()) => {
                Error::BadRequest("Value is outside the allowed range".to_string())
            }
            other => Error::Database(other),
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::BadRequest(rejection.body_text())
    }
}

/// `numeric_value_out_of_range` and `check_violation`.
fn is_range_violation(code: Option<&str>) -> bool {
    matches!(code, Some("22003") | Some("23514"))
}

/// Maps unique constraint names from the migrations to caller-facing messages.
fn conflict_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("accounts_email_key") => "A vendor with this email already exists",
        Some("vendor_services_account_id_service_name_key") => {
            "Service with this name already exists for your account"
        }
        Some("calendar_events_booking_id_key") => {
            "This booking is already linked to a calendar event"
        }
        Some("verifications_account_id_key") => "Verification already submitted",
        _ => "Resource already exists",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = Error::from(sqlx::Error::RowNotFound);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn pool_timeout_is_internal() {
        let err = Error::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn numeric_overflow_codes_are_range_violations() {
        assert!(is_range_violation(Some("22003")));
        assert!(is_range_violation(Some("23514")));
        assert!(!is_range_violation(Some("23505")));
        assert!(!is_range_violation(None));
    }

    #[tokio::test]
    async fn query_rejection_uses_error_envelope() {
        use axum::extract::{FromRequestParts, Query};
        use std::collections::HashMap;

        let (mut parts, _) = axum::http::Request::builder()
            .uri("/api/vendors?limit=many")
            .body(())
            .unwrap()
            .into_parts();
        #[derive(Debug, serde::Deserialize)]
        struct LimitOnly {
            #[allow(dead_code)]
            limit: i64,
        }
        let rejection = Query::<LimitOnly>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        let err = Error::from(rejection);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let response = err.into_response();
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: HashMap<String, String> = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].starts_with("Failed to deserialize query string"));
    }

    #[test]
    fn conflict_messages_follow_constraint_names() {
        assert_eq!(
            conflict_message(Some("accounts_email_key")),
            "A vendor with this email already exists"
        );
        assert_eq!(conflict_message(None), "Resource already exists");
    }

    #[tokio::test]
    async fn internal_errors_do_not_leak_details() {
        let response =
            Error::Internal("relation \"accounts\" does not exist".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "An unexpected error occurred");
    }
}
