use std::fmt;

use hela_core::PaymentChannel;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which way the money moved, from the account holder's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl Direction {
    /// Apply the sign convention: incoming is positive, outgoing negative.
    pub fn signed(&self, magnitude: Decimal) -> Decimal {
        match self {
            Direction::Incoming => magnitude.abs(),
            Direction::Outgoing => -magnitude.abs(),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Incoming => f.write_str("incoming"),
            Direction::Outgoing => f.write_str("outgoing"),
        }
    }
}

/// Normalized output of the confirmation-message parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedMessage {
    /// Positive means money received; negative means money paid out.
    pub amount: Decimal,
    pub direction: Direction,
    pub description: String,
    /// Always mobile money for this parser
    pub channel: PaymentChannel,
    /// Provider label, e.g. "M-Pesa"
    pub provider: String,
    /// Provider transaction code when the message starts with one
    pub reference: Option<String>,
}
