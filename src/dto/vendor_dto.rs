use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::account::VendorProfile;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub id: Uuid,
    pub name: String,
    pub price: Option<Decimal>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorSummary {
    #[serde(flatten)]
    pub profile: VendorProfile,
    pub services: Vec<ServiceSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VendorListQuery {
    pub category: Option<String>,
    pub location: Option<String>,
    pub search: Option<String>,
    pub price_range: Option<String>,
    pub limit: Option<i64>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// A `limit` query yields a bare, bounded array; otherwise results are paginated.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum VendorListResponse {
    Paginated {
        items: Vec<VendorSummary>,
        total: i64,
        page: i64,
        per_page: i64,
        total_pages: i64,
    },
    Limited(Vec<VendorSummary>),
}
