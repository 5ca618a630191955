//! Spending limits per category and their status against recorded expenses.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::finance::{Category, TransactionRecord, check_magnitude};
use crate::time::{month_range, week_range};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Weekly,
    Monthly,
}

impl BudgetPeriod {
    /// Inclusive date range of the period containing `as_of`
    pub fn range(&self, as_of: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            BudgetPeriod::Weekly => week_range(as_of),
            BudgetPeriod::Monthly => month_range(as_of),
        }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetPeriod::Weekly => f.write_str("weekly"),
            BudgetPeriod::Monthly => f.write_str("monthly"),
        }
    }
}

impl FromStr for BudgetPeriod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" | "week" => Ok(BudgetPeriod::Weekly),
            "monthly" | "month" => Ok(BudgetPeriod::Monthly),
            _ => Err(ValidationError::UnknownPeriod(s.to_string())),
        }
    }
}

/// A spending cap for one category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub id: String,
    pub category: Category,
    /// Positive spending cap for one period
    pub limit: Decimal,
    pub period: BudgetPeriod,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetStatus {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub spent: Decimal,
    /// Never negative; see `over_budget`
    pub remaining: Decimal,
    /// Spent / limit, as a percentage (may exceed 100)
    pub percent_used: Decimal,
    pub over_budget: bool,
}

impl Budget {
    pub fn new(
        id: impl Into<String>,
        category: Category,
        limit: Decimal,
        period: BudgetPeriod,
    ) -> Result<Self, ValidationError> {
        if limit <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount);
        }
        check_magnitude(limit)?;
        Ok(Self {
            id: id.into(),
            category,
            limit,
            period,
        })
    }

    /// Expenses in this budget's category within the period containing `as_of`.
    /// Income booked to the same category does not offset spending.
    pub fn status(&self, records: &[TransactionRecord], as_of: NaiveDate) -> BudgetStatus {
        let (start, end) = self.period.range(as_of);
        let spent: Decimal = records
            .iter()
            .filter(|r| r.category == self.category && r.is_expense())
            .filter(|r| r.date >= start && r.date <= end)
            .map(|r| r.abs_amount())
            .fold(Decimal::ZERO, Decimal::saturating_add);

        // Saturates for records stored before amounts were capped
        let percent_used = spent
            .checked_div(self.limit)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map(|p| p.round_dp(1))
            .unwrap_or(Decimal::MAX);

        BudgetStatus {
            period_start: start,
            period_end: end,
            spent,
            remaining: self.limit.saturating_sub(spent).max(Decimal::ZERO),
            percent_used,
            over_budget: spent > self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::PaymentChannel;

    fn tx(day: u32, amount: i64, category: Category) -> TransactionRecord {
        TransactionRecord {
            id: format!("tx-{day}-{amount}"),
            amount: Decimal::new(amount, 0),
            category,
            description: "test".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            channel: PaymentChannel::MobileMoney,
        }
    }

    #[test]
    fn test_monthly_status_counts_only_category_expenses() {
        let records = vec![
            tx(2, -1200, Category::Food),
            tx(15, -800, Category::Food),
            tx(16, 500, Category::Food),
            tx(16, -3000, Category::Transport),
        ];
        let budget = Budget::new("b-1", Category::Food, Decimal::new(5000, 0), BudgetPeriod::Monthly).unwrap();
        let status = budget.status(&records, NaiveDate::from_ymd_opt(2024, 3, 20).unwrap());

        assert_eq!(status.spent, Decimal::new(2000, 0));
        assert_eq!(status.remaining, Decimal::new(3000, 0));
        assert_eq!(status.percent_used, Decimal::new(400, 1));
        assert!(!status.over_budget);
    }

    #[test]
    fn test_weekly_status_and_overspend() {
        let records = vec![
            tx(4, -900, Category::Transport),  // previous week
            tx(11, -700, Category::Transport), // Monday
            tx(14, -600, Category::Transport),
        ];
        let budget = Budget::new("b-2", Category::Transport, Decimal::new(1000, 0), BudgetPeriod::Weekly).unwrap();
        let status = budget.status(&records, NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());

        assert_eq!(status.spent, Decimal::new(1300, 0));
        assert_eq!(status.remaining, Decimal::ZERO);
        assert!(status.over_budget);
    }

    #[test]
    fn test_non_positive_limit_rejected() {
        assert!(Budget::new("b-3", Category::Food, Decimal::ZERO, BudgetPeriod::Monthly).is_err());
        assert_eq!(
            Budget::new("b-4", Category::Food, Decimal::MAX, BudgetPeriod::Monthly),
            Err(ValidationError::AmountTooLarge { max: crate::finance::MAX_AMOUNT })
        );
    }

    #[test]
    fn test_status_with_huge_spending_does_not_overflow() {
        let huge = TransactionRecord {
            amount: Decimal::MIN,
            ..tx(5, -1, Category::Food)
        };
        let records = vec![huge.clone(), huge];
        let tiny = Budget::new("b-5", Category::Food, Decimal::new(1, 28), BudgetPeriod::Monthly).unwrap();
        let status = tiny.status(&records, NaiveDate::from_ymd_opt(2024, 3, 20).unwrap());

        assert_eq!(status.spent, Decimal::MAX);
        assert_eq!(status.percent_used, Decimal::MAX);
        assert_eq!(status.remaining, Decimal::ZERO);
        assert!(status.over_budget);
    }
}
