use std::borrow::Cow;

use rust_decimal::Decimal;
use validator::ValidationError;

use crate::models::account::{BusinessCategory, ExperienceLevel};

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Letters and spaces only.
pub fn validate_full_name(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_alphabetic() || c == ' ') {
        return Err(invalid("full_name", "Only letters and spaces allowed"));
    }
    Ok(())
}

pub fn validate_mobile(value: &str) -> Result<(), ValidationError> {
    if value.len() != 10 || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("mobile", "Enter a valid 10-digit mobile number"));
    }
    Ok(())
}

pub fn validate_business(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<BusinessCategory>()
        .map(|_| ())
        .map_err(|_| invalid("business", "Unknown business category"))
}

pub fn validate_experience_level(value: &str) -> Result<(), ValidationError> {
    ExperienceLevel::parse_or_default(Some(value))
        .map(|_| ())
        .map_err(|_| invalid("experience_level", "Unknown experience level"))
}

/// Largest value a `NUMERIC(10, 2)` money column holds.
pub fn max_money() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

/// Non-negative, at most two decimal places and within the money column range.
pub fn validate_money(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(invalid("negative_amount", "Amount cannot be negative"));
    }
    if amount.normalize().scale() > 2 {
        return Err(invalid("amount_precision", "Amount allows at most two decimal places"));
    }
    if *amount > max_money() {
        return Err(invalid("amount_too_large", "Amount cannot exceed 99999999.99"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_rejects_digits_and_symbols() {
        assert!(validate_full_name("Asha Verma").is_ok());
        assert!(validate_full_name("Asha V3rma").is_err());
        assert!(validate_full_name("   ").is_err());
    }

    #[test]
    fn mobile_requires_ten_digits() {
        assert!(validate_mobile("9876543210").is_ok());
        assert!(validate_mobile("98765").is_err());
        assert!(validate_mobile("98765432a0").is_err());
    }

    #[test]
    fn money_fits_the_column() {
        assert!(validate_money(&Decimal::ZERO).is_ok());
        assert!(validate_money(&Decimal::new(1250050, 2)).is_ok());
        assert!(validate_money(&max_money()).is_ok());
        assert!(validate_money(&Decimal::new(15000, 4)).is_ok());

        assert!(validate_money(&Decimal::from(100_000_000)).is_err());
        assert!(validate_money(&Decimal::new(10_000_000_000, 2)).is_err());
        assert!(validate_money(&Decimal::new(12345, 3)).is_err());
        assert!(validate_money(&Decimal::from(-1)).is_err());
    }

    #[test]
    fn business_must_be_known_category() {
        assert!(validate_business("Catering").is_ok());
        assert!(validate_business("Plumbing").is_err());
    }
}
