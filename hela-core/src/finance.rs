//! Transaction record types: the signed ledger entries everything else aggregates.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Largest magnitude accepted for any stored amount (one trillion).
/// Keeps sums, ratios and projections well inside `Decimal` range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Reject amounts whose magnitude exceeds [`MAX_AMOUNT`]
pub fn check_magnitude(amount: Decimal) -> Result<(), ValidationError> {
    if amount.abs() > MAX_AMOUNT {
        return Err(ValidationError::AmountTooLarge { max: MAX_AMOUNT });
    }
    Ok(())
}

/// A stored income or expense entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRecord {
    /// Unique identifier for this record
    pub id: String,
    /// Positive = income, negative = expense
    pub amount: Decimal,
    pub category: Category,
    /// Human-readable description
    pub description: String,
    /// Calendar date of the transaction (YYYY-MM-DD)
    pub date: NaiveDate,
    pub channel: PaymentChannel,
}

/// Input for creating a transaction; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub amount: Decimal,
    pub category: Category,
    pub description: String,
    pub date: NaiveDate,
    pub channel: PaymentChannel,
}

/// Partial update for an existing transaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub amount: Option<Decimal>,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub channel: Option<PaymentChannel>,
}

/// Transaction categories with stable kebab-case labels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Food,
    Transport,
    Housing,
    Utilities,
    Airtime,
    Health,
    Education,
    Entertainment,
    Shopping,
    FamilySupport,
    Savings,
    Salary,
    Business,
    Transfer,
    Other,
}

impl Category {
    pub const ALL: [Category; 15] = [
        Category::Food,
        Category::Transport,
        Category::Housing,
        Category::Utilities,
        Category::Airtime,
        Category::Health,
        Category::Education,
        Category::Entertainment,
        Category::Shopping,
        Category::FamilySupport,
        Category::Savings,
        Category::Salary,
        Category::Business,
        Category::Transfer,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Housing => "housing",
            Category::Utilities => "utilities",
            Category::Airtime => "airtime",
            Category::Health => "health",
            Category::Education => "education",
            Category::Entertainment => "entertainment",
            Category::Shopping => "shopping",
            Category::FamilySupport => "family-support",
            Category::Savings => "savings",
            Category::Salary => "salary",
            Category::Business => "business",
            Category::Transfer => "transfer",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace([' ', '_'], "-");
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.label() == wanted)
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}

/// How the money moved
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentChannel {
    MobileMoney,
    Cash,
    BankTransfer,
    Card,
}

impl PaymentChannel {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentChannel::MobileMoney => "mobile-money",
            PaymentChannel::Cash => "cash",
            PaymentChannel::BankTransfer => "bank-transfer",
            PaymentChannel::Card => "card",
        }
    }
}

impl fmt::Display for PaymentChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentChannel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '_'], "-").as_str() {
            "mobile-money" | "mpesa" | "m-pesa" => Ok(PaymentChannel::MobileMoney),
            "cash" => Ok(PaymentChannel::Cash),
            "bank-transfer" | "bank" => Ok(PaymentChannel::BankTransfer),
            "card" => Ok(PaymentChannel::Card),
            _ => Err(ValidationError::UnknownChannel(s.to_string())),
        }
    }
}

impl NewTransaction {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.amount.is_zero() {
            return Err(ValidationError::ZeroAmount);
        }
        check_magnitude(self.amount)?;
        if self.description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        Ok(())
    }
}

impl TransactionRecord {
    /// Build a stored record from validated input
    pub fn from_new(id: impl Into<String>, new: NewTransaction) -> Result<Self, ValidationError> {
        new.validate()?;
        Ok(Self {
            id: id.into(),
            amount: new.amount,
            category: new.category,
            description: new.description.trim().to_string(),
            date: new.date,
            channel: new.channel,
        })
    }

    /// Returns true if this is an expense (negative amount)
    pub fn is_expense(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Returns true if this is income (positive amount)
    pub fn is_income(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    /// Get the absolute amount
    pub fn abs_amount(&self) -> Decimal {
        self.amount.abs()
    }
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        *self == TransactionPatch::default()
    }

    /// Apply the patch, leaving the record untouched when it would become invalid.
    pub fn apply(&self, record: &mut TransactionRecord) -> Result<(), ValidationError> {
        if let Some(amount) = self.amount {
            if amount.is_zero() {
                return Err(ValidationError::ZeroAmount);
            }
            check_magnitude(amount)?;
        }
        if let Some(desc) = &self.description {
            if desc.trim().is_empty() {
                return Err(ValidationError::EmptyDescription);
            }
        }

        if let Some(amount) = self.amount {
            record.amount = amount;
        }
        if let Some(category) = self.category {
            record.category = category;
        }
        if let Some(desc) = &self.description {
            record.description = desc.trim().to_string();
        }
        if let Some(date) = self.date {
            record.date = date;
        }
        if let Some(channel) = self.channel {
            record.channel = channel;
        }
        Ok(())
    }
}
