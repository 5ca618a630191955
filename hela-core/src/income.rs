//! Recurring income streams and their monthly equivalents.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::finance::check_magnitude;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Multiplier that turns one payment into a monthly amount
    pub fn monthly_factor(&self) -> Decimal {
        match self {
            Frequency::Weekly => Decimal::from(52) / Decimal::from(12),
            Frequency::Biweekly => Decimal::from(26) / Decimal::from(12),
            Frequency::Monthly => Decimal::ONE,
            Frequency::Yearly => Decimal::ONE / Decimal::from(12),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        };
        f.write_str(s)
    }
}

impl FromStr for Frequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(Frequency::Weekly),
            "biweekly" | "fortnightly" => Ok(Frequency::Biweekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" | "annual" | "annually" => Ok(Frequency::Yearly),
            _ => Err(ValidationError::UnknownFrequency(s.to_string())),
        }
    }
}

/// A source of regular income (salary, rent received, side business)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncomeStream {
    pub id: String,
    pub name: String,
    /// Amount per payment, always positive
    pub amount: Decimal,
    pub frequency: Frequency,
    pub active: bool,
}

impl IncomeStream {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        amount: Decimal,
        frequency: Frequency,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount);
        }
        check_magnitude(amount)?;
        Ok(Self {
            id: id.into(),
            name: name.trim().to_string(),
            amount,
            frequency,
            active: true,
        })
    }

    pub fn monthly_equivalent(&self) -> Decimal {
        self.amount.saturating_mul(self.frequency.monthly_factor()).round_dp(2)
    }
}

/// Sum of monthly equivalents across active streams
pub fn projected_monthly_income(streams: &[IncomeStream]) -> Decimal {
    streams
        .iter()
        .filter(|s| s.active)
        .map(IncomeStream::monthly_equivalent)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}
