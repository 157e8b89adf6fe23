use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VendorService {
    pub id: Uuid,
    pub account_id: Uuid,
    pub service_name: String,
    pub category: String,
    pub service_price: Option<Decimal>,
    pub minimum_people: Option<i32>,
    pub maximum_people: Option<i32>,
    pub description: String,
    pub image: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
