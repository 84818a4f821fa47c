use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Monetary values (currency/kW, currency/MWh). Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%).
pub type Rate = Decimal;

/// Rates and shares as entered by the user (5.0 = 5%). Converted to [`Rate`] once, at the
/// component boundary.
pub type Percent = Decimal;

/// Convert a percentage into a decimal rate.
pub fn percent_to_rate(value: Percent) -> Rate {
    value / dec!(100)
}

/// Clamp a decimal share into [0, 1].
pub fn clamp_unit(value: Rate) -> Rate {
    value.max(Decimal::ZERO).min(Decimal::ONE)
}

/// Techno-economic assumptions for one generating asset.
///
/// Every monetary input is real and expressed in start-of-construction currency; the engine
/// alone applies inflation indexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectInputs {
    /// Operating life after commercial operation, in years
    pub useful_life: u32,
    /// Overnight construction cost (currency/kW, real)
    pub overnight_cost: Money,
    /// Construction duration, in years
    pub construction_time: u32,
    /// Real cost of equity (% p.a.)
    pub cost_of_equity: Percent,
    /// Real cost of debt (% p.a.)
    pub cost_of_debt: Percent,
    /// Debt share of the capital structure (%), clamped to [0, 100]
    pub target_gearing: Percent,
    /// Fuel cost (currency/MWh, real)
    pub fuel_cost: Money,
    /// Fixed operations and maintenance (currency/kW-yr, real)
    pub om_cost: Money,
    /// Full-load hours per year (0..=8760)
    pub load_hours: Decimal,
    /// Decommissioning cost (currency/kW, real)
    pub decommissioning_cost: Money,
    /// Share of construction interest levied on consumers under a RAB model (%)
    pub rab_proportion: Percent,
    /// Expected inflation (% p.a.)
    pub inflation_rate: Percent,
}

impl Default for ProjectInputs {
    /// Large nuclear-style reference plant.
    fn default() -> Self {
        ProjectInputs {
            useful_life: 60,
            overnight_cost: dec!(6500),
            construction_time: 8,
            cost_of_equity: dec!(9.0),
            cost_of_debt: dec!(4.0),
            target_gearing: dec!(60),
            fuel_cost: dec!(10),
            om_cost: dec!(140),
            load_hours: dec!(7884),
            decommissioning_cost: dec!(1000),
            rab_proportion: dec!(50),
            inflation_rate: dec!(2),
        }
    }
}

impl ProjectInputs {
    /// Energy delivered per kW of capacity per year, in MWh.
    pub fn annual_energy(&self) -> Decimal {
        self.load_hours / dec!(1000)
    }

    /// Debt weight as a decimal share in [0, 1].
    pub fn gearing(&self) -> Rate {
        clamp_unit(percent_to_rate(self.target_gearing))
    }

    /// RAB surcharge share as a decimal in [0, 1].
    pub fn rab_fraction(&self) -> Rate {
        clamp_unit(percent_to_rate(self.rab_proportion))
    }

    pub fn inflation(&self) -> Rate {
        percent_to_rate(self.inflation_rate)
    }

    pub fn cost_of_equity_real(&self) -> Rate {
        percent_to_rate(self.cost_of_equity)
    }

    pub fn cost_of_debt_real(&self) -> Rate {
        percent_to_rate(self.cost_of_debt)
    }

    /// True when `other` differs from `self` only in operational inputs (fuel, O&M, load hours,
    /// decommissioning). A construction phase and discount sequence built for one can then be
    /// reused for the other.
    pub fn same_financial_basis(&self, other: &ProjectInputs) -> bool {
        self.useful_life == other.useful_life
            && self.overnight_cost == other.overnight_cost
            && self.construction_time == other.construction_time
            && self.cost_of_equity == other.cost_of_equity
            && self.cost_of_debt == other.cost_of_debt
            && self.target_gearing == other.target_gearing
            && self.rab_proportion == other.rab_proportion
            && self.inflation_rate == other.inflation_rate
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gearing_and_rab_are_clamped() {
        let mut inputs = ProjectInputs::default();
        inputs.target_gearing = dec!(140);
        inputs.rab_proportion = dec!(-10);
        assert_eq!(inputs.gearing(), Decimal::ONE);
        assert_eq!(inputs.rab_fraction(), Decimal::ZERO);
    }

    #[test]
    fn test_annual_energy_in_mwh_per_kw() {
        let inputs = ProjectInputs::default();
        assert_eq!(inputs.annual_energy(), dec!(7.884));
    }

    #[test]
    fn test_operational_inputs_keep_financial_basis() {
        let base = ProjectInputs::default();
        let mut other = base.clone();
        other.fuel_cost = dec!(25);
        other.om_cost = dec!(90);
        other.load_hours = dec!(6000);
        other.decommissioning_cost = dec!(1500);
        assert!(base.same_financial_basis(&other));

        other.inflation_rate = dec!(3);
        assert!(!base.same_financial_basis(&other));
    }
}
