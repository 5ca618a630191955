//! Savings goals with progress tracking

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::finance::check_magnitude;
use crate::time::months_between;

/// A target amount the user is saving towards
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavingsGoal {
    pub id: String,
    /// Name of the goal
    pub name: String,
    pub target: Decimal,
    /// Amount put aside so far
    pub saved: Decimal,
    /// Optional date the target should be reached by
    pub deadline: Option<NaiveDate>,
}

impl SavingsGoal {
    /// Create a new savings goal with nothing saved yet
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        target: Decimal,
        deadline: Option<NaiveDate>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if target <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount);
        }
        check_magnitude(target)?;
        Ok(Self {
            id: id.into(),
            name: name.trim().to_string(),
            target,
            saved: Decimal::ZERO,
            deadline,
        })
    }

    /// Add money to the goal. Overshooting the target is allowed.
    pub fn contribute(&mut self, amount: Decimal) -> Result<(), ValidationError> {
        if amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount);
        }
        check_magnitude(amount)?;
        let saved = self.saved.saturating_add(amount);
        check_magnitude(saved)?;
        self.saved = saved;
        Ok(())
    }

    /// Take money back out of the goal
    pub fn withdraw(&mut self, amount: Decimal) -> Result<(), ValidationError> {
        if amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount);
        }
        if amount > self.saved {
            return Err(ValidationError::InsufficientSavings {
                requested: amount,
                available: self.saved,
            });
        }
        self.saved -= amount;
        Ok(())
    }

    /// Fraction saved, clamped to 0.0-1.0
    pub fn progress(&self) -> Decimal {
        self.saved
            .checked_div(self.target)
            .unwrap_or(Decimal::ONE)
            .clamp(Decimal::ZERO, Decimal::ONE)
    }

    pub fn remaining(&self) -> Decimal {
        self.target.saturating_sub(self.saved).max(Decimal::ZERO)
    }

    pub fn is_complete(&self) -> bool {
        self.saved >= self.target
    }

    /// Monthly contribution needed to hit the deadline from `as_of`.
    ///
    /// A deadline that has passed (or is this month) asks for everything at once.
    pub fn monthly_required(&self, as_of: NaiveDate) -> Option<Decimal> {
        let deadline = self.deadline?;
        let months = months_between(as_of, deadline).max(1);
        Some((self.remaining() / Decimal::from(months)).round_dp(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::MAX_AMOUNT;

    fn goal(target: i64, deadline: Option<NaiveDate>) -> SavingsGoal {
        SavingsGoal::new("g-1", "Emergency fund", Decimal::new(target, 0), deadline).unwrap()
    }

    #[test]
    fn test_contribute_and_progress() {
        let mut g = goal(10_000, None);
        g.contribute(Decimal::new(2_500, 0)).unwrap();
        assert_eq!(g.progress(), Decimal::new(25, 2));
        assert_eq!(g.remaining(), Decimal::new(7_500, 0));
        assert!(!g.is_complete());

        g.contribute(Decimal::new(8_000, 0)).unwrap();
        assert_eq!(g.progress(), Decimal::ONE);
        assert_eq!(g.remaining(), Decimal::ZERO);
        assert!(g.is_complete());
    }

    #[test]
    fn test_withdraw_cannot_go_negative() {
        let mut g = goal(10_000, None);
        g.contribute(Decimal::new(1_000, 0)).unwrap();
        assert!(matches!(
            g.withdraw(Decimal::new(1_500, 0)),
            Err(ValidationError::InsufficientSavings { .. })
        ));
        g.withdraw(Decimal::new(400, 0)).unwrap();
        assert_eq!(g.saved, Decimal::new(600, 0));
        assert!(g.contribute(Decimal::ZERO).is_err());
    }

    #[test]
    fn test_monthly_required() {
        let as_of = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let g = goal(12_000, NaiveDate::from_ymd_opt(2024, 7, 1));
        assert_eq!(g.monthly_required(as_of), Some(Decimal::new(2_000, 0)));

        let overdue = goal(3_000, NaiveDate::from_ymd_opt(2023, 12, 1));
        assert_eq!(overdue.monthly_required(as_of), Some(Decimal::new(3_000, 0)));

        assert_eq!(goal(3_000, None).monthly_required(as_of), None);
    }

    #[test]
    fn test_amounts_are_capped() {
        let mut g = goal(10_000, None);
        assert!(g.contribute(MAX_AMOUNT).is_ok());
        assert_eq!(
            g.contribute(Decimal::ONE),
            Err(ValidationError::AmountTooLarge { max: MAX_AMOUNT })
        );
        assert_eq!(g.saved, MAX_AMOUNT);
        assert_eq!(g.progress(), Decimal::ONE);

        let tiny = SavingsGoal {
            saved: MAX_AMOUNT,
            ..SavingsGoal::new("g-2", "Tiny", Decimal::new(1, 28), None).unwrap()
        };
        assert_eq!(tiny.progress(), Decimal::ONE);
        assert!(SavingsGoal::new("g-3", "Moon", Decimal::MAX, None).is_err());
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            SavingsGoal::new("g", "  ", Decimal::ONE, None),
            Err(ValidationError::EmptyName)
        );
        assert_eq!(
            SavingsGoal::new("g", "Car", Decimal::new(-1, 0), None),
            Err(ValidationError::NonPositiveAmount)
        );
    }
}
