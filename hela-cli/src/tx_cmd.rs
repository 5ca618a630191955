use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::Subcommand;
use hela_core::{Category, NewTransaction, PaymentChannel, TransactionPatch, TransactionRecord};
use hela_finance::{export_csv, import_csv, resolve_id, short_id};
use rust_decimal::Decimal;
use std::fs::File;
use std::path::PathBuf;

use crate::app::App;

#[derive(Subcommand, Debug)]
pub enum TxCommand {
    /// Record a transaction by hand (negative amount = expense)
    Add {
        #[arg(long, allow_negative_numbers = true)]
        amount: Decimal,

        #[arg(long)]
        category: Category,

        #[arg(long)]
        description: String,

        /// Defaults to today in the configured timezone
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long, default_value = "cash")]
        channel: PaymentChannel,
    },

    /// List transactions, newest first
    List {
        /// Only this month (YYYY-MM)
        #[arg(long)]
        month: Option<String>,

        #[arg(long)]
        category: Option<Category>,

        #[arg(long, default_value_t = 50)]
        limit: usize,
    },

    /// Change fields of a transaction
    Edit {
        /// Id or unique id prefix
        id: String,

        #[arg(long, allow_negative_numbers = true)]
        amount: Option<Decimal>,

        #[arg(long)]
        category: Option<Category>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        channel: Option<PaymentChannel>,
    },

    /// Delete a transaction
    Rm {
        /// Id or unique id prefix
        id: String,
    },

    /// Write all transactions as CSV (stdout unless --out)
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Add transactions from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,

        /// Channel for rows without a channel column
        #[arg(long, default_value = "cash")]
        channel: PaymentChannel,
    },
}

pub fn run(app: &App, cmd: TxCommand) -> Result<()> {
    match cmd {
        TxCommand::Add {
            amount,
            category,
            description,
            date,
            channel,
        } => {
            let date = match date {
                Some(d) => d,
                None => app.today()?,
            };
            let new = NewTransaction {
                amount,
                category,
                description,
                date,
                channel,
            };
            let record = app.session().add(new)?;
            println!("Added {}", line(app, &record));
            Ok(())
        }
        TxCommand::List {
            month,
            category,
            limit,
        } => list(app, month.as_deref(), category, limit),
        TxCommand::Edit {
            id,
            amount,
            category,
            description,
            date,
            channel,
        } => {
            let patch = TransactionPatch {
                amount,
                category,
                description,
                date,
                channel,
            };
            if patch.is_empty() {
                bail!("nothing to change (pass --amount, --category, --description, --date or --channel)");
            }
            let mut session = app.session();
            let id = resolve_id(&session.transactions()?, &id)?;
            let record = session.update(&id, &patch)?;
            println!("Updated {}", line(app, &record));
            Ok(())
        }
        TxCommand::Rm { id } => {
            let mut session = app.session();
            let id = resolve_id(&session.transactions()?, &id)?;
            let record = session.remove(&id)?;
            println!("Deleted {}", line(app, &record));
            Ok(())
        }
        TxCommand::Export { out } => {
            let records = app.session().transactions()?;
            match out {
                Some(path) => {
                    let f = File::create(&path).with_context(|| format!("create {}", path.display()))?;
                    export_csv(&records, f)?;
                    eprintln!("Wrote {} transactions to {}", records.len(), path.display());
                }
                None => export_csv(&records, std::io::stdout().lock())?,
            }
            Ok(())
        }
        TxCommand::Import { csv, channel } => {
            let f = File::open(&csv).with_context(|| format!("open {}", csv.display()))?;
            let drafts = import_csv(f, channel).with_context(|| format!("parsing {}", csv.display()))?;
            let mut session = app.session();
            let count = drafts.len();
            for draft in drafts {
                session.add(draft)?;
            }
            println!("Imported {} transactions from {}", count, csv.display());
            Ok(())
        }
    }
}

fn list(app: &App, month: Option<&str>, category: Option<Category>, limit: usize) -> Result<()> {
    let range = month.map(hela_core::time::parse_month).transpose()?;
    let records: Vec<TransactionRecord> = app
        .session()
        .transactions()?
        .into_iter()
        .filter(|r| range.is_none_or(|(start, end)| r.date >= start && r.date <= end))
        .filter(|r| category.is_none_or(|c| r.category == c))
        .collect();

    if records.is_empty() {
        println!("No transactions. Add one with `hela tx add` or `hela sms import`.");
        return Ok(());
    }

    for r in records.iter().take(limit) {
        println!("{}", line(app, r));
    }
    if records.len() > limit {
        println!("... {} more (raise --limit)", records.len() - limit);
    }
    Ok(())
}

fn line(app: &App, r: &TransactionRecord) -> String {
    format!(
        "{}  {}  {:>16}  {:<14} {:<13} {}",
        short_id(&r.id),
        r.date,
        app.money(r.amount),
        r.category.label(),
        r.channel.label(),
        r.description
    )
}
