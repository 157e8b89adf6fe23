use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::utils::validation::validate_money;

fn validate_capacity(
    minimum: Option<i32>,
    maximum: Option<i32>,
    price: Option<Decimal>,
) -> Result<(), ValidationError> {
    if let (Some(min), Some(max)) = (minimum, maximum) {
        if min > max {
            return Err(ValidationError::new("minimum_people_exceeds_maximum"));
        }
    }
    match price {
        Some(price) => validate_money(&price),
        None => Ok(()),
    }
}

fn validate_create(payload: &CreateServicePayload) -> Result<(), ValidationError> {
    validate_capacity(
        payload.minimum_people,
        payload.maximum_people,
        payload.service_price,
    )
}

fn validate_update(payload: &UpdateServicePayload) -> Result<(), ValidationError> {
    validate_capacity(
        payload.minimum_people,
        payload.maximum_people,
        payload.service_price,
    )
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_create"))]
pub struct CreateServicePayload {
    #[validate(length(min = 1, max = 255))]
    pub service_name: String,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    pub service_price: Option<Decimal>,
    #[validate(range(min = 1))]
    pub minimum_people: Option<i32>,
    #[validate(range(min = 1))]
    pub maximum_people: Option<i32>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_update"))]
pub struct UpdateServicePayload {
    #[validate(length(min = 1, max = 255))]
    pub service_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    pub service_price: Option<Decimal>,
    #[validate(range(min = 1))]
    pub minimum_people: Option<i32>,
    #[validate(range(min = 1))]
    pub maximum_people: Option<i32>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn capacity_range_must_be_ordered() {
        let payload: CreateServicePayload = serde_json::from_value(json!({
            "service_name": "Buffet",
            "minimum_people": 50,
            "maximum_people": 10
        }))
        .unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn price_is_parsed_as_decimal() {
        let payload: CreateServicePayload = serde_json::from_value(json!({
            "service_name": "Buffet",
            "service_price": "12500.50",
            "minimum_people": 10,
            "maximum_people": 200
        }))
        .unwrap();
        assert!(payload.validate().is_ok());
        assert_eq!(payload.service_price, Some(Decimal::new(1250050, 2)));
    }

    #[test]
    fn price_beyond_column_range_is_rejected() {
        let payload: CreateServicePayload = serde_json::from_value(json!({
            "service_name": "Palace Venue",
            "service_price": "150000000"
        }))
        .unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn negative_price_is_rejected() {
        let payload: UpdateServicePayload = serde_json::from_value(json!({
            "service_price": "-1"
        }))
        .unwrap();
        assert!(payload.validate().is_err());
    }
}
