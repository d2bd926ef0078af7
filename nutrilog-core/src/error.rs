//! Validation error types.

use thiserror::Error;

/// Errors raised when an entry, patch or goal carries values the ledger refuses to store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("weight must be greater than zero (got {0})")]
    NonPositiveWeight(f64),

    #[error("food name must not be empty")]
    EmptyFoodName,

    #[error("{field} of {value} exceeds the plausible maximum of {max}")]
    Implausible {
        field: &'static str,
        value: f64,
        max: f64,
    },
}

/// Checks that a nutrient amount or goal target is finite and non-negative.
pub(crate) fn check_amount(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(())
}

pub(crate) fn check_weight(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field: "weight" });
    }
    if value <= 0.0 {
        return Err(ValidationError::NonPositiveWeight(value));
    }
    Ok(())
}
