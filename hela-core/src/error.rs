//! Validation errors for domain input.

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("amount must not be zero")]
    ZeroAmount,

    #[error("amount exceeds the maximum of {max}")]
    AmountTooLarge { max: Decimal },

    #[error("amount must be positive")]
    NonPositiveAmount,

    #[error("description must not be empty")]
    EmptyDescription,

    #[error("name must not be empty")]
    EmptyName,

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("unknown payment channel: {0}")]
    UnknownChannel(String),

    #[error("unknown frequency: {0}")]
    UnknownFrequency(String),

    #[error("unknown budget period: {0}")]
    UnknownPeriod(String),

    #[error("cannot withdraw {requested}; only {available} saved")]
    InsufficientSavings { requested: Decimal, available: Decimal },
}
