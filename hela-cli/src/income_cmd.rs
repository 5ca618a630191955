use anyhow::Result;
use clap::Subcommand;
use hela_core::{Frequency, IncomeStream, projected_monthly_income};
use hela_finance::{RecordStore, new_id, short_id};
use rust_decimal::Decimal;

use crate::app::App;

#[derive(Subcommand, Debug)]
pub enum IncomeCommand {
    /// Register a recurring income source
    Add {
        #[arg(long)]
        name: String,

        /// Amount received per payment
        #[arg(long)]
        amount: Decimal,

        #[arg(long, default_value = "monthly")]
        frequency: Frequency,
    },

    /// List income sources and the projected monthly total
    List,

    /// Delete an income source
    Rm {
        /// Id or unique id prefix
        id: String,
    },
}

pub fn run(app: &App, cmd: IncomeCommand) -> Result<()> {
    match cmd {
        IncomeCommand::Add {
            name,
            amount,
            frequency,
        } => {
            let stream = IncomeStream::new(new_id(), name, amount, frequency)?;
            let stream = app.store::<IncomeStream>().create(app.user(), stream)?;
            println!(
                "Income {}: {} {} {} (~{}/month)",
                short_id(&stream.id),
                stream.name,
                app.money(stream.amount),
                stream.frequency,
                app.money(stream.monthly_equivalent())
            );
            Ok(())
        }
        IncomeCommand::List => {
            let streams = app.store::<IncomeStream>().list(app.user())?;
            if streams.is_empty() {
                println!("No income sources. Add one with `hela income add --name Salary --amount 85000`.");
                return Ok(());
            }
            for s in &streams {
                println!(
                    "{}  {:<24} {:>14} {:<9} {:>14}/month{}",
                    short_id(&s.id),
                    s.name,
                    app.money(s.amount),
                    s.frequency,
                    app.money(s.monthly_equivalent()),
                    if s.active { "" } else { "  (inactive)" }
                );
            }
            let total: Decimal = projected_monthly_income(&streams);
            println!("Projected monthly income: {}", app.money(total));
            Ok(())
        }
        IncomeCommand::Rm { id } => {
            let (mut store, stream) = app.find::<IncomeStream>(&id)?;
            store.delete(app.user(), &stream.id)?;
            println!("Deleted income source {}", stream.name);
            Ok(())
        }
    }
}
