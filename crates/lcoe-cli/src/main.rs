mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::lcoe::{CompareArgs, RunArgs};
use commands::wacc::{DiscountFactorArgs, WaccArgs};

/// Levelized cost of electricity for long-build generation assets
#[derive(Parser)]
#[command(
    name = "lcoe",
    version,
    about = "Levelized cost of electricity for long-build generation assets",
    long_about = "A CLI for decomposed levelized cost of electricity with decimal precision. \
                  Models construction drawdown, interest during construction, RAB \
                  surcharging, declining equity returns and turnkey sales across three \
                  methodology steps."
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
    /// Nominal WACC from real costs of debt and equity
    Wacc(WaccArgs),
    /// Mid-year operating discount factors
    DiscountFactors(DiscountFactorArgs),
    /// Construction drawdown, IDC and SOC/COD roll-up
    Construction(RunArgs),
    /// Decomposed LCOE for one methodology step
    Lcoe(RunArgs),
    /// Run methodology steps 1, 2 and 3 side by side
    Compare(CompareArgs),
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

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Wacc(args) => commands::wacc::run_wacc(args),
        Commands::DiscountFactors(args) => commands::wacc::run_discount_factors(args),
        Commands::Construction(args) => commands::lcoe::run_construction(args),
        Commands::Lcoe(args) => commands::lcoe::run_lcoe(args),
        Commands::Compare(args) => commands::lcoe::run_compare(args),
        Commands::Version => {
            println!("lcoe {}", env!("CARGO_PKG_VERSION"));
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
