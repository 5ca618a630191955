use anyhow::Result;
use clap::Subcommand;
use hela_core::{Budget, BudgetPeriod, Category};
use hela_finance::{RecordStore, new_id, short_id};
use rust_decimal::Decimal;

use crate::app::App;

#[derive(Subcommand, Debug)]
pub enum BudgetCommand {
    /// Set the spending limit for a category (replaces an existing one for the same period)
    Set {
        #[arg(long)]
        category: Category,

        #[arg(long)]
        limit: Decimal,

        #[arg(long, default_value = "monthly")]
        period: BudgetPeriod,
    },

    /// Show each budget against spending in the current period
    List,

    /// Delete a budget
    Rm {
        /// Id or unique id prefix
        id: String,
    },
}

pub fn run(app: &App, cmd: BudgetCommand) -> Result<()> {
    match cmd {
        BudgetCommand::Set {
            category,
            limit,
            period,
        } => {
            let mut store = app.store::<Budget>();
            let existing = store
                .list(app.user())?
                .into_iter()
                .find(|b| b.category == category && b.period == period);

            let budget = match existing {
                Some(old) => {
                    let updated = Budget::new(old.id, category, limit, period)?;
                    store.update(app.user(), updated)?
                }
                None => {
                    let budget = Budget::new(new_id(), category, limit, period)?;
                    store.create(app.user(), budget)?
                }
            };
            println!(
                "Budget {}: {} {} per {}",
                short_id(&budget.id),
                budget.category.label(),
                app.money(budget.limit),
                period_noun(budget.period)
            );
            Ok(())
        }
        BudgetCommand::List => list(app),
        BudgetCommand::Rm { id } => {
            let (mut store, budget) = app.find::<Budget>(&id)?;
            store.delete(app.user(), &budget.id)?;
            println!("Deleted budget for {} ({})", budget.category.label(), budget.period);
            Ok(())
        }
    }
}

fn list(app: &App) -> Result<()> {
    let mut budgets = app.store::<Budget>().list(app.user())?;
    if budgets.is_empty() {
        println!("No budgets. Set one with `hela budget set --category food --limit 8000`.");
        return Ok(());
    }
    budgets.sort_by_key(|b| (b.category.label(), b.period.to_string()));

    let today = app.today()?;
    let records = app.session().transactions()?;
    for b in &budgets {
        let status = b.status(&records, today);
        let flag = if status.over_budget { "  OVER" } else { "" };
        println!(
            "{}  {:<14} {:<8} {:>14} of {:>14}  {:>6}%  {} left{}",
            short_id(&b.id),
            b.category.label(),
            b.period,
            app.money(status.spent),
            app.money(b.limit),
            status.percent_used,
            app.money(status.remaining),
            flag
        );
    }
    Ok(())
}

fn period_noun(period: BudgetPeriod) -> &'static str {
    match period {
        BudgetPeriod::Weekly => "week",
        BudgetPeriod::Monthly => "month",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_noun() {
        assert_eq!(period_noun(BudgetPeriod::Weekly), "week");
        assert_eq!(period_noun(BudgetPeriod::Monthly), "month");
    }

    #[test]
    fn test_zero_limit_rejected_before_store() {
        let err = Budget::new(new_id(), Category::Food, Decimal::ZERO, BudgetPeriod::Monthly);
        assert!(err.is_err());
    }
}
