use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::LcoeError;
use crate::time_value::fisher_nominal;
use crate::types::{with_metadata, ComputationOutput, Percent, ProjectInputs, Rate};
use crate::EngineResult;

/// Largest rate (% p.a.) the envelope functions accept.
const MAX_RATE_PERCENT: Decimal = dec!(100);

/// Bound on any growth factor over the full build plus operating horizon. Its reciprocal
/// bounds the smallest discount factor.
const MAX_HORIZON_GROWTH: Decimal = dec!(1000000000000000000);

/// Nominal financing rates derived from the real inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaccBreakdown {
    /// Gearing-weighted blend of the nominal costs of debt and equity
    pub wacc_nominal_blend: Rate,
    pub cost_of_debt_nominal: Rate,
    pub cost_of_equity_nominal: Rate,
    /// Debt weight actually used, after clamping to [0, 1]
    pub gearing: Rate,
}

/// Convert the real costs of debt and equity to nominal via Fisher and blend them by gearing.
///
/// Total for every input: gearing is clamped, nothing is rejected.
pub fn compute_wacc(inputs: &ProjectInputs) -> WaccBreakdown {
    let gearing = inputs.gearing();
    let inflation = inputs.inflation();
    let cost_of_debt_nominal = fisher_nominal(inputs.cost_of_debt_real(), inflation);
    let cost_of_equity_nominal = fisher_nominal(inputs.cost_of_equity_real(), inflation);

    WaccBreakdown {
        wacc_nominal_blend: blend(gearing, cost_of_debt_nominal, cost_of_equity_nominal),
        cost_of_debt_nominal,
        cost_of_equity_nominal,
        gearing,
    }
}

/// Gearing-weighted blend of a nominal cost of debt and a nominal cost of equity.
pub fn blend(gearing: Rate, cost_of_debt_nominal: Rate, cost_of_equity_nominal: Rate) -> Rate {
    gearing * cost_of_debt_nominal + (Decimal::ONE - gearing) * cost_of_equity_nominal
}

/// [`compute_wacc`] wrapped in the standard output envelope.
pub fn analyze_wacc(inputs: &ProjectInputs) -> EngineResult<ComputationOutput<WaccBreakdown>> {
    let start = Instant::now();
    validate_inputs(inputs)?;
    let mut warnings = Vec::new();
    push_capital_structure_warnings(inputs, &mut warnings);

    let output = compute_wacc(inputs);
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Nominal WACC via Fisher conversion of real costs of capital",
        inputs,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Validation shared by the envelope functions
// ---------------------------------------------------------------------------

pub(crate) fn validate_inputs(inputs: &ProjectInputs) -> EngineResult<()> {
    check_rate("cost_of_equity", inputs.cost_of_equity)?;
    check_rate("cost_of_debt", inputs.cost_of_debt)?;
    check_rate("inflation_rate", inputs.inflation_rate)?;
    check_horizon(inputs)
}

/// Rejects horizons over which some rate compounds past [`MAX_HORIZON_GROWTH`] (or below its
/// reciprocal), where products of cost and growth would leave the decimal range.
fn check_horizon(inputs: &ProjectInputs) -> EngineResult<()> {
    let periods = inputs
        .construction_time
        .saturating_add(inputs.useful_life)
        .saturating_add(1);
    let rates = compute_wacc(inputs);
    let candidates = [
        ("inflation_rate", inputs.inflation()),
        ("cost_of_debt", rates.cost_of_debt_nominal),
        ("cost_of_equity", rates.cost_of_equity_nominal),
        ("wacc", rates.wacc_nominal_blend),
    ];
    for (name, rate) in candidates {
        if !growth_in_range(Decimal::ONE + rate, periods) {
            return Err(LcoeError::InvalidInput {
                field: "useful_life".into(),
                reason: format!(
                    "Construction time plus useful life ({periods} periods) compounds {name} \
                     at {}% beyond the decimal range",
                    rate * dec!(100)
                ),
            });
        }
    }
    Ok(())
}

fn growth_in_range(base: Decimal, periods: u32) -> bool {
    let floor = Decimal::ONE / MAX_HORIZON_GROWTH;
    let mut growth = Decimal::ONE;
    for _ in 0..periods {
        growth = match growth.checked_mul(base) {
            Some(g) => g,
            None => return false,
        };
        if growth > MAX_HORIZON_GROWTH || growth < floor {
            return false;
        }
    }
    true
}

fn check_rate(field: &str, value: Percent) -> EngineResult<()> {
    if value <= dec!(-100) {
        return Err(LcoeError::InvalidInput {
            field: field.into(),
            reason: format!("Rate must be greater than -100%, got {value}%"),
        });
    }
    if value > MAX_RATE_PERCENT {
        return Err(LcoeError::InvalidInput {
            field: field.into(),
            reason: format!("Rate must not exceed {MAX_RATE_PERCENT}% p.a., got {value}%"),
        });
    }
    Ok(())
}

pub(crate) fn push_capital_structure_warnings(inputs: &ProjectInputs, warnings: &mut Vec<String>) {
    if inputs.target_gearing < Decimal::ZERO || inputs.target_gearing > dec!(100) {
        warnings.push(format!(
            "Target gearing {}% outside [0, 100]; clamped to {}%",
            inputs.target_gearing,
            inputs.gearing() * dec!(100)
        ));
    }
    if inputs.cost_of_equity < inputs.cost_of_debt {
        warnings.push(format!(
            "Real cost of equity ({}%) below real cost of debt ({}%): unusual capital structure",
            inputs.cost_of_equity, inputs.cost_of_debt
        ));
    }
}
