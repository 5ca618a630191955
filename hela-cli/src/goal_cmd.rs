use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;
use hela_core::SavingsGoal;
use hela_finance::{RecordStore, new_id, short_id};
use rust_decimal::Decimal;

use crate::app::App;
use crate::fmt::percent;

#[derive(Subcommand, Debug)]
pub enum GoalCommand {
    /// Start a new savings goal
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        target: Decimal,

        /// Date the target should be reached by
        #[arg(long)]
        deadline: Option<NaiveDate>,
    },

    /// Put money towards a goal
    Contribute {
        /// Id or unique id prefix
        id: String,

        #[arg(long)]
        amount: Decimal,
    },

    /// Take money back out of a goal
    Withdraw {
        /// Id or unique id prefix
        id: String,

        #[arg(long)]
        amount: Decimal,
    },

    /// Show progress on every goal
    List,

    /// Delete a goal
    Rm {
        /// Id or unique id prefix
        id: String,
    },
}

pub fn run(app: &App, cmd: GoalCommand) -> Result<()> {
    match cmd {
        GoalCommand::Add {
            name,
            target,
            deadline,
        } => {
            let goal = SavingsGoal::new(new_id(), name, target, deadline)?;
            let goal = app.store::<SavingsGoal>().create(app.user(), goal)?;
            println!("Goal {}: {} ({})", short_id(&goal.id), goal.name, app.money(goal.target));
            Ok(())
        }
        GoalCommand::Contribute { id, amount } => {
            let (mut store, mut goal) = app.find::<SavingsGoal>(&id)?;
            goal.contribute(amount)?;
            let goal = store.update(app.user(), goal)?;
            println!("{}", line(app, &goal)?);
            if goal.is_complete() {
                println!("Target reached.");
            }
            Ok(())
        }
        GoalCommand::Withdraw { id, amount } => {
            let (mut store, mut goal) = app.find::<SavingsGoal>(&id)?;
            goal.withdraw(amount)?;
            let goal = store.update(app.user(), goal)?;
            println!("{}", line(app, &goal)?);
            Ok(())
        }
        GoalCommand::List => {
            let goals = app.store::<SavingsGoal>().list(app.user())?;
            if goals.is_empty() {
                println!("No savings goals. Start one with `hela goal add --name \"Emergency fund\" --target 50000`.");
                return Ok(());
            }
            for g in &goals {
                println!("{}", line(app, g)?);
            }
            Ok(())
        }
        GoalCommand::Rm { id } => {
            let (mut store, goal) = app.find::<SavingsGoal>(&id)?;
            store.delete(app.user(), &goal.id)?;
            println!("Deleted goal {}", goal.name);
            Ok(())
        }
    }
}

fn line(app: &App, g: &SavingsGoal) -> Result<String> {
    let mut s = format!(
        "{}  {:<24} {:>14} of {:>14}  {:>4}",
        short_id(&g.id),
        g.name,
        app.money(g.saved),
        app.money(g.target),
        percent(g.progress())
    );
    if let Some(deadline) = g.deadline {
        s.push_str(&format!("  by {deadline}"));
        if !g.is_complete() {
            if let Some(monthly) = g.monthly_required(app.today()?) {
                s.push_str(&format!(", {}/month", app.money(monthly)));
            }
        }
    }
    Ok(s)
}
