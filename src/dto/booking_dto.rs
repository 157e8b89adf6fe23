use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::booking::BookingStatus;
use crate::utils::validation::validate_money;

fn validate_amount(amount: &Decimal) -> Result<(), ValidationError> {
    validate_money(amount)
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBookingPayload {
    #[validate(length(min = 1, max = 255))]
    pub customer_name: String,
    #[validate(length(min = 1, max = 255))]
    pub service_type: String,
    pub event_date: NaiveDate,
    #[validate(custom(function = "validate_amount"))]
    pub amount: Decimal,
    pub status: Option<BookingStatus>,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateBookingStatusPayload {
    pub status: BookingStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_bookings: i64,
    pub pending_bookings: i64,
    pub in_progress_bookings: i64,
    pub completed_bookings: i64,
    pub total_revenue: Decimal,
    pub monthly_revenue: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn booking(amount: &str) -> CreateBookingPayload {
        serde_json::from_value(json!({
            "customer_name": "Meera Iyer",
            "service_type": "Wedding Shoot",
            "event_date": "2030-02-14",
            "amount": amount,
            "location": "Pune"
        }))
        .unwrap()
    }

    #[test]
    fn amount_must_fit_the_ledger_column() {
        assert!(booking("15000").validate().is_ok());
        assert!(booking("99999999.99").validate().is_ok());
        assert!(booking("1000000000").validate().is_err());
        assert!(booking("100.005").validate().is_err());
        assert!(booking("-5").validate().is_err());
    }
}
