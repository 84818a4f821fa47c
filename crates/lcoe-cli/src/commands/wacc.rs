use clap::Args;
use serde_json::{json, Value};

use lcoe_core::discount_factors::discount_factors_for;
use lcoe_core::wacc;
use lcoe_core::ProjectInputs;

use crate::commands::project::ProjectArgs;
use crate::input;

/// Arguments for the nominal WACC
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct WaccArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Path to a JSON or YAML project file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the operating discount sequence
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct DiscountFactorArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Step the real cost of equity down over three life tranches
    #[arg(long)]
    pub declining_equity_return: bool,

    /// Years between the valuation epoch and COD (defaults to the construction time)
    #[arg(long)]
    pub offset: Option<u32>,

    /// Path to a JSON or YAML project file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

fn load_inputs(
    project: &ProjectArgs,
    path: Option<&str>,
) -> Result<ProjectInputs, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        input::file::read_input(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        Ok(project.to_inputs())
    }
}

pub fn run_wacc(args: WaccArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = load_inputs(&args.project, args.input.as_deref())?;
    let result = wacc::analyze_wacc(&inputs)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_discount_factors(args: DiscountFactorArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = load_inputs(&args.project, args.input.as_deref())?;
    // Validates the rates and collects capital structure warnings.
    let rates = wacc::analyze_wacc(&inputs)?;

    let offset = args.offset.unwrap_or(inputs.construction_time);
    let factors = discount_factors_for(&inputs, args.declining_equity_return, offset);
    let rows: Vec<Value> = factors
        .iter()
        .enumerate()
        .map(|(i, df)| json!({ "year": i + 1, "discount_factor": df }))
        .collect();

    Ok(json!({
        "result": {
            "wacc_nominal_blend": rates.result.wacc_nominal_blend,
            "declining_equity_return": args.declining_equity_return,
            "offset": offset,
            "sum": factors.prefix_sum(factors.len()),
            "factors": rows,
        },
        "methodology": "Mid-year discount factors at the blended nominal WACC",
        "warnings": rates.warnings,
    }))
}
