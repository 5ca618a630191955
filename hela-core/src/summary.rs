//! Dashboard aggregation: totals, per-category spending and the monthly
//! income/expense series the charts are drawn from.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::finance::{Category, TransactionRecord};

/// Income and expense for one calendar month
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotals {
    pub year: i32,
    pub month: u32,
    pub income: Decimal,
    /// Positive magnitude of spending
    pub expense: Decimal,
}

impl MonthlyTotals {
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    pub fn net(&self) -> Decimal {
        self.income.saturating_sub(self.expense)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: Category,
    /// Positive magnitude of spending
    pub total: Decimal,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net: Decimal,
    /// Sorted by total descending
    pub by_category: Vec<CategoryTotal>,
    /// Sorted by month ascending
    pub monthly: Vec<MonthlyTotals>,
    pub transaction_count: usize,
}

impl Summary {
    /// Aggregate records, optionally restricted to an inclusive date range
    pub fn build(records: &[TransactionRecord], range: Option<(NaiveDate, NaiveDate)>) -> Self {
        let in_range = |r: &&TransactionRecord| match range {
            Some((start, end)) => r.date >= start && r.date <= end,
            None => true,
        };

        let mut total_income = Decimal::ZERO;
        let mut total_expense = Decimal::ZERO;
        let mut count = 0;
        let mut categories: HashMap<Category, (Decimal, usize)> = HashMap::new();
        let mut months: BTreeMap<(i32, u32), (Decimal, Decimal)> = BTreeMap::new();

        for r in records.iter().filter(in_range) {
            count += 1;
            let month = months.entry((r.date.year(), r.date.month())).or_default();
            // Saturating sums: stored files may predate the amount cap
            if r.is_income() {
                total_income = total_income.saturating_add(r.amount);
                month.0 = month.0.saturating_add(r.amount);
            } else if r.is_expense() {
                let spent = r.abs_amount();
                total_expense = total_expense.saturating_add(spent);
                month.1 = month.1.saturating_add(spent);
                let entry = categories.entry(r.category).or_default();
                entry.0 = entry.0.saturating_add(spent);
                entry.1 += 1;
            }
        }

        let mut by_category: Vec<CategoryTotal> = categories
            .into_iter()
            .map(|(category, (total, transaction_count))| CategoryTotal {
                category,
                total,
                transaction_count,
            })
            .collect();
        // Ties fall back to category order so output is stable
        by_category.sort_by(|a, b| b.total.cmp(&a.total).then(a.category.cmp(&b.category)));

        let monthly = months
            .into_iter()
            .map(|((year, month), (income, expense))| MonthlyTotals {
                year,
                month,
                income,
                expense,
            })
            .collect();

        Summary {
            total_income,
            total_expense,
            net: total_income.saturating_sub(total_expense),
            by_category,
            monthly,
            transaction_count: count,
        }
    }

    /// Share of income kept, as a fraction. None without income.
    pub fn savings_rate(&self) -> Option<Decimal> {
        if self.total_income.is_zero() {
            return None;
        }
        self.net.checked_div(self.total_income).map(|rate| rate.round_dp(4))
    }

    pub fn top_categories(&self, n: usize) -> &[CategoryTotal] {
        &self.by_category[..n.min(self.by_category.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::{MAX_AMOUNT, PaymentChannel};

    fn tx(m: u32, d: u32, amount: i64, category: Category) -> TransactionRecord {
        TransactionRecord {
            id: format!("tx-{m}-{d}"),
            amount: Decimal::new(amount, 0),
            category,
            description: "test".to_string(),
            date: NaiveDate::from_ymd_opt(2024, m, d).unwrap(),
            channel: PaymentChannel::MobileMoney,
        }
    }

    fn sample() -> Vec<TransactionRecord> {
        vec![
            tx(1, 28, 50_000, Category::Salary),
            tx(2, 1, -12_000, Category::Housing),
            tx(2, 3, -2_500, Category::Food),
            tx(2, 9, -1_500, Category::Food),
            tx(2, 25, 50_000, Category::Salary),
            tx(3, 2, -12_000, Category::Housing),
        ]
    }

    #[test]
    fn test_totals_and_sign_convention() {
        let s = Summary::build(&sample(), None);
        assert_eq!(s.total_income, Decimal::new(100_000, 0));
        assert_eq!(s.total_expense, Decimal::new(28_000, 0));
        assert_eq!(s.net, Decimal::new(72_000, 0));
        assert_eq!(s.transaction_count, 6);
        assert_eq!(s.savings_rate(), Some(Decimal::new(72, 2)));
    }

    #[test]
    fn test_category_breakdown_sorted() {
        let s = Summary::build(&sample(), None);
        assert_eq!(s.by_category[0].category, Category::Housing);
        assert_eq!(s.by_category[0].total, Decimal::new(24_000, 0));
        assert_eq!(s.by_category[1].category, Category::Food);
        assert_eq!(s.by_category[1].transaction_count, 2);
        // Income categories never appear as spending
        assert!(s.by_category.iter().all(|c| c.category != Category::Salary));
        assert_eq!(s.top_categories(10).len(), 2);
    }

    #[test]
    fn test_monthly_series_and_range() {
        let s = Summary::build(&sample(), None);
        let labels: Vec<String> = s.monthly.iter().map(|m| m.label()).collect();
        assert_eq!(labels, vec!["2024-01", "2024-02", "2024-03"]);
        assert_eq!(s.monthly[1].expense, Decimal::new(16_000, 0));
        assert_eq!(s.monthly[1].net(), Decimal::new(34_000, 0));

        let feb = (
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
        );
        let s = Summary::build(&sample(), Some(feb));
        assert_eq!(s.transaction_count, 4);
        assert_eq!(s.monthly.len(), 1);
    }

    #[test]
    fn test_extreme_amounts_saturate() {
        let huge = |amount: Decimal| TransactionRecord {
            amount,
            ..tx(3, 5, -1, Category::Other)
        };
        let records = vec![huge(Decimal::MIN), huge(Decimal::MIN), huge(Decimal::new(1, 28))];
        let s = Summary::build(&records, None);

        assert_eq!(s.total_expense, Decimal::MAX);
        assert_eq!(s.by_category[0].total, Decimal::MAX);
        assert!(s.monthly[0].net() < -MAX_AMOUNT);
        assert!(s.net < -MAX_AMOUNT);
        // Net over a one-ulp income does not fit in a Decimal
        assert_eq!(s.savings_rate(), None);
    }

    #[test]
    fn test_empty() {
        let s = Summary::build(&[], None);
        assert_eq!(s.net, Decimal::ZERO);
        assert_eq!(s.savings_rate(), None);
        assert!(s.monthly.is_empty());
    }
}
