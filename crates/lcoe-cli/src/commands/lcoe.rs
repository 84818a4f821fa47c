use clap::Args;
use serde_json::Value;

use lcoe_core::methodology::{self, ComparisonRequest, LcoeRequest, MethodologyStep};

use crate::commands::project::{ProjectArgs, ToggleArgs};
use crate::input;

/// Arguments for a single-step LCOE or construction run
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct RunArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Methodology step: 1 biased baseline, 2 corrected financing, 3 advanced options
    #[arg(long, default_value = "2", value_parser = clap::value_parser!(u8).range(1..=3))]
    pub step: u8,

    #[command(flatten)]
    pub toggles: ToggleArgs,

    /// Path to a JSON or YAML request file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the three-step comparison
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct CompareArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub toggles: ToggleArgs,

    /// Path to a JSON or YAML request file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

fn load_request(args: &RunArgs) -> Result<LcoeRequest, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        input::file::read_input(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        Ok(LcoeRequest {
            inputs: args.project.to_inputs(),
            step: MethodologyStep::try_from(args.step)?,
            toggles: args.toggles.to_toggles(),
        })
    }
}

pub fn run_lcoe(args: RunArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = load_request(&args)?;
    let result = methodology::analyze_lcoe(&request)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_construction(args: RunArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = load_request(&args)?;
    let result = methodology::analyze_construction(&request)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: ComparisonRequest = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        ComparisonRequest {
            inputs: args.project.to_inputs(),
            toggles: args.toggles.to_toggles(),
        }
    };

    let result = methodology::compare_methodologies(&request)?;
    Ok(serde_json::to_value(result)?)
}
