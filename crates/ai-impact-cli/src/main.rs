mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::compare::CompareArgs;
use commands::scenarios::ScenariosArgs;
use commands::simulate::SimulateArgs;

/// Monte Carlo analysis of AI development tool adoption
#[derive(Parser)]
#[command(
    name = "ai-impact",
    version,
    about = "Monte Carlo analysis of AI development tool adoption",
    long_about = "Simulates the financial outcome of rolling out AI coding tools across \
                  adoption approaches (conservative, moderate, aggressive) and company \
                  profiles (startup, enterprise, scaleup). Reports NPV, ROI, payback and \
                  adoption distributions and ranks scenarios by reliability and \
                  risk-adjusted return."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Monte Carlo simulation for one scenario
    Simulate(SimulateArgs),
    /// Run several scenarios and rank them
    Compare(CompareArgs),
    /// List valid scenario identifiers
    Scenarios(ScenariosArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` overrides
/// the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Simulate(args) => commands::simulate::run_simulate(args),
        Commands::Compare(args) => commands::compare::run_compare(args),
        Commands::Scenarios(args) => commands::scenarios::run_scenarios(args),
        Commands::Version => {
            println!("ai-impact {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
