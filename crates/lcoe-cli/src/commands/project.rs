use clap::{Args, ValueEnum};
use rust_decimal::Decimal;

use lcoe_core::methodology::{MethodologyToggles, ValuationPoint};
use lcoe_core::ProjectInputs;

/// Plant and financing assumptions. Any flag left out takes the reference plant's value.
#[derive(Args)]
pub struct ProjectArgs {
    /// Operating life after commercial operation (years)
    #[arg(long)]
    pub useful_life: Option<u32>,

    /// Overnight construction cost (currency/kW, real)
    #[arg(long, alias = "occ")]
    pub overnight_cost: Option<Decimal>,

    /// Construction duration (years)
    #[arg(long)]
    pub construction_time: Option<u32>,

    /// Real cost of equity (% p.a., e.g. 9.0)
    #[arg(long)]
    pub cost_of_equity: Option<Decimal>,

    /// Real cost of debt (% p.a., e.g. 4.0)
    #[arg(long)]
    pub cost_of_debt: Option<Decimal>,

    /// Debt share of the capital structure (%)
    #[arg(long, alias = "gearing")]
    pub target_gearing: Option<Decimal>,

    /// Fuel cost (currency/MWh, real)
    #[arg(long)]
    pub fuel_cost: Option<Decimal>,

    /// Fixed O&M (currency/kW-yr, real)
    #[arg(long)]
    pub om_cost: Option<Decimal>,

    /// Full-load hours per year
    #[arg(long)]
    pub load_hours: Option<Decimal>,

    /// Decommissioning cost (currency/kW, real)
    #[arg(long)]
    pub decommissioning_cost: Option<Decimal>,

    /// Share of construction interest surcharged under RAB (%)
    #[arg(long)]
    pub rab_proportion: Option<Decimal>,

    /// Expected inflation (% p.a.)
    #[arg(long)]
    pub inflation_rate: Option<Decimal>,
}

impl ProjectArgs {
    pub fn to_inputs(&self) -> ProjectInputs {
        let reference = ProjectInputs::default();
        ProjectInputs {
            useful_life: self.useful_life.unwrap_or(reference.useful_life),
            overnight_cost: self.overnight_cost.unwrap_or(reference.overnight_cost),
            construction_time: self.construction_time.unwrap_or(reference.construction_time),
            cost_of_equity: self.cost_of_equity.unwrap_or(reference.cost_of_equity),
            cost_of_debt: self.cost_of_debt.unwrap_or(reference.cost_of_debt),
            target_gearing: self.target_gearing.unwrap_or(reference.target_gearing),
            fuel_cost: self.fuel_cost.unwrap_or(reference.fuel_cost),
            om_cost: self.om_cost.unwrap_or(reference.om_cost),
            load_hours: self.load_hours.unwrap_or(reference.load_hours),
            decommissioning_cost: self
                .decommissioning_cost
                .unwrap_or(reference.decommissioning_cost),
            rab_proportion: self.rab_proportion.unwrap_or(reference.rab_proportion),
            inflation_rate: self.inflation_rate.unwrap_or(reference.inflation_rate),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ValuationArg {
    /// Start of construction
    Soc,
    /// Commercial operation date
    Cod,
}

impl From<ValuationArg> for ValuationPoint {
    fn from(arg: ValuationArg) -> Self {
        match arg {
            ValuationArg::Soc => ValuationPoint::Soc,
            ValuationArg::Cod => ValuationPoint::Cod,
        }
    }
}

/// Advanced options, honoured at methodology step 3.
#[derive(Args)]
pub struct ToggleArgs {
    /// Surcharge the RAB share of construction interest to consumers
    #[arg(long)]
    pub rab: bool,

    /// Step the real cost of equity down over three life tranches
    #[arg(long)]
    pub declining_equity_return: bool,

    /// Value the plant as a turnkey sale to a buyer at COD
    #[arg(long)]
    pub turnkey: bool,

    /// Report first-half and second-half life LCOE
    #[arg(long)]
    pub dual_life: bool,

    /// Epoch for owner-side present values
    #[arg(long, value_enum, default_value = "soc")]
    pub valuation_point: ValuationArg,
}

impl ToggleArgs {
    pub fn to_toggles(&self) -> MethodologyToggles {
        MethodologyToggles {
            rab_enabled: self.rab,
            declining_equity_return: self.declining_equity_return,
            turnkey: self.turnkey,
            dual_life: self.dual_life,
            valuation_point: self.valuation_point.into(),
        }
    }
}
