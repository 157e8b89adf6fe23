use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::vendor_dto::VendorSummary;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterPayload {
    #[validate(email)]
    pub email: String,
    #[validate(
        length(min = 1, max = 255),
        custom(function = "crate::utils::validation::validate_full_name")
    )]
    pub full_name: String,
    #[validate(custom(function = "crate::utils::validation::validate_mobile"))]
    pub mobile: String,
    #[validate(custom(function = "crate::utils::validation::validate_business"))]
    pub business: String,
    #[validate(custom(function = "crate::utils::validation::validate_experience_level"))]
    pub experience_level: Option<String>,
    /// Comma separated service names.
    #[serde(default)]
    pub services: Option<String>,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub location: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub state: Option<String>,
    #[serde(default)]
    #[validate(length(max = 10))]
    pub pincode: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

impl RegisterPayload {
    /// Distinct, trimmed, non-empty service names in input order.
    pub fn service_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in self
            .services
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshPayload {
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProfilePayload {
    #[validate(
        length(min = 1, max = 255),
        custom(function = "crate::utils::validation::validate_full_name")
    )]
    pub full_name: Option<String>,
    #[validate(custom(function = "crate::utils::validation::validate_mobile"))]
    pub mobile: Option<String>,
    #[validate(custom(function = "crate::utils::validation::validate_business"))]
    pub business: Option<String>,
    #[validate(custom(function = "crate::utils::validation::validate_experience_level"))]
    pub experience_level: Option<String>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub state: Option<String>,
    #[validate(length(max = 10))]
    pub pincode: Option<String>,
    pub profile_image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub vendor: VendorSummary,
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    pub access: String,
}
