use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod budget_cmd;
mod config;
mod dashboard;
mod fmt;
mod goal_cmd;
mod income_cmd;
mod setup;
mod sms_cmd;
mod state;
mod tx_cmd;

use app::App;

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("HELA_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(
    name = "hela",
    version,
    long_version = LONG_VERSION,
    about = "Personal finance tracker with M-Pesa message import"
)]
struct Cli {
    /// Debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// One-time interactive setup: user id, name and timezone
    Setup,

    /// Manage ~/.hela/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Parse or import mobile-money confirmation messages
    Sms {
        #[command(subcommand)]
        command: sms_cmd::SmsCommand,
    },

    /// Add, list, edit and delete transactions
    Tx {
        #[command(subcommand)]
        command: tx_cmd::TxCommand,
    },

    /// Spending limits per category
    Budget {
        #[command(subcommand)]
        command: budget_cmd::BudgetCommand,
    },

    /// Savings goals
    Goal {
        #[command(subcommand)]
        command: goal_cmd::GoalCommand,
    },

    /// Recurring income sources
    Income {
        #[command(subcommand)]
        command: income_cmd::IncomeCommand,
    },

    /// Totals, spending by category, budgets and goals
    Dashboard {
        /// Only this month (YYYY-MM)
        #[arg(long)]
        month: Option<String>,

        /// Full-screen charts (q to quit)
        #[arg(long, default_value_t = false)]
        tui: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn,hela=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Setup => setup::run_setup()?,

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },

        Command::Sms { command } => sms_cmd::run(&App::load()?, command)?,
        Command::Tx { command } => tx_cmd::run(&App::load()?, command)?,
        Command::Budget { command } => budget_cmd::run(&App::load()?, command)?,
        Command::Goal { command } => goal_cmd::run(&App::load()?, command)?,
        Command::Income { command } => income_cmd::run(&App::load()?, command)?,
        Command::Dashboard { month, tui } => dashboard::run(&App::load()?, month, tui)?,
    }

    Ok(())
}
