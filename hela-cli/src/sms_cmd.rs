use anyhow::{Result, bail};
use chrono::NaiveDate;
use clap::Subcommand;
use hela_core::{Category, categorize};
use hela_finance::{import_message, short_id};
use hela_ingest::ParsedMessage;

use crate::app::App;
use crate::state::read_stdin;

const MANUAL_ENTRY_HINT: &str = "No amount recognized — enter the transaction manually with `hela tx add`";

#[derive(Subcommand, Debug)]
pub enum SmsCommand {
    /// Show what would be extracted from a confirmation message
    Parse {
        /// Message text (read from stdin when omitted)
        text: Option<String>,

        /// Print the result as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Parse a confirmation message and record it as a transaction
    Import {
        /// Message text (read from stdin when omitted)
        text: Option<String>,

        /// Override the suggested category
        #[arg(long)]
        category: Option<Category>,

        /// Defaults to today in the configured timezone
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub fn run(app: &App, cmd: SmsCommand) -> Result<()> {
    match cmd {
        SmsCommand::Parse { text, json } => {
            let text = message_text(text)?;
            let parser = app.parser()?;
            match parser.parse(&text) {
                Some(parsed) if json => println!("{}", serde_json::to_string_pretty(&parsed)?),
                Some(parsed) => print_parsed(app, &parsed),
                None => println!("{MANUAL_ENTRY_HINT}"),
            }
            Ok(())
        }
        SmsCommand::Import {
            text,
            category,
            date,
        } => {
            let text = message_text(text)?;
            let parser = app.parser()?;
            let date = match date {
                Some(d) => d,
                None => app.today()?,
            };
            let mut session = app.session();
            match import_message(&parser, &mut session, &text, category, date)? {
                Some(record) => {
                    println!(
                        "Recorded {} {} {} ({}) as {}",
                        short_id(&record.id),
                        record.date,
                        app.money(record.amount),
                        record.category,
                        record.description
                    );
                    Ok(())
                }
                None => bail!(MANUAL_ENTRY_HINT),
            }
        }
    }
}

fn message_text(text: Option<String>) -> Result<String> {
    let text = match text {
        Some(t) => t,
        None => read_stdin()?,
    };
    if text.trim().is_empty() {
        bail!("empty message");
    }
    Ok(text)
}

fn print_parsed(app: &App, parsed: &ParsedMessage) {
    println!("Amount:      {}", app.money(parsed.amount));
    println!("Direction:   {}", parsed.direction);
    println!("Description: {}", parsed.description);
    println!("Channel:     {} ({})", parsed.provider, parsed.channel);
    if let Some(reference) = &parsed.reference {
        println!("Reference:   {reference}");
    }
    println!("Category:    {} (suggested)", categorize(&parsed.description));
}
