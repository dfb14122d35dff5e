use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use mktlogic::cli::setup::setup;
use mktlogic::core::log::init_logging;
use mktlogic::core::period::ChartPeriod;
use mktlogic::core::transform::Transform;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for mktlogic::AppCommand {
    fn from(cmd: Commands) -> mktlogic::AppCommand {
        match cmd {
            Commands::Dashboard { group } => mktlogic::AppCommand::Dashboard { group },
            Commands::Series {
                indicator,
                period,
                transform,
            } => mktlogic::AppCommand::Series {
                indicator,
                period,
                transform,
            },
            Commands::Signal => mktlogic::AppCommand::Signal,
            Commands::ClearCache => mktlogic::AppCommand::ClearCache,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the latest reading of every indicator
    Dashboard {
        /// Only show indicators in this group
        #[arg(short, long)]
        group: Option<String>,
    },
    /// Display one indicator's history
    Series {
        /// Indicator id from the configuration
        indicator: String,
        /// Chart window: 1mo, 3mo, 6mo, 1y, 3y, 5y or all
        #[arg(short, long, default_value_t = ChartPeriod::OneYear)]
        period: ChartPeriod,
        /// Override the configured transform: identity, yoy or diff
        #[arg(short, long)]
        transform: Option<Transform>,
    },
    /// Ask for AI commentary and an investment signal
    Signal,
    /// Drop all cached series
    ClearCache,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => mktlogic::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
