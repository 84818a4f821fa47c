//! Construction-phase cost roll-up.
//!
//! Spreads the overnight cost over the build with a sine-shaped drawdown, accrues interest
//! during construction (IDC), splits it between capitalized and RAB-surcharged parts, and values
//! everything at start of construction (SOC) and at commercial operation (COD).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::time_value::{compound, decimal_sin, mid_year_discount, mid_year_growth, safe_div, PI};
use crate::types::{clamp_unit, Money, ProjectInputs, Rate};
use crate::wacc::compute_wacc;

// ---------------------------------------------------------------------------
// Methodology switches
// ---------------------------------------------------------------------------

/// How the real overnight cost is indexed to nominal drawdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InflationMode {
    /// Whole overnight cost inflated once to COD money, then spread without further indexing.
    /// Overstates early spend; kept as the comparison baseline.
    LumpSum,
    /// Each period's draw indexed to its own mid-period price level.
    Dynamic,
}

/// Which balance carries interest during construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdcAccrualBasis {
    /// All deployed capital accrues at the blended WACC.
    WholeCapital,
    /// Only the debt-financed share accrues, at the nominal cost of debt.
    DebtOnly,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One construction period of the drawdown schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionPeriod {
    /// 1-based construction year
    pub period: u32,
    /// Share of the overnight cost drawn in this period
    pub weight: Decimal,
    /// Nominal capital drawn
    pub draw: Money,
    /// Interest accrued in the period
    pub interest: Money,
    /// Interest added to the balance and the asset cost
    pub capitalized_interest: Money,
    /// Interest levied on consumers under RAB
    pub surcharged_interest: Money,
    /// Interest-bearing balance at period end
    pub balance: Money,
    /// Mid-period discount factor to SOC at the blended WACC
    pub discount_factor: Decimal,
}

/// Construction-phase values. Depends only on the financial inputs and the methodology, so it
/// can be reused while fuel, O&M, load hours or decommissioning vary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionResult {
    /// PV at SOC of the overnight-cost draws
    pub pv_occ_soc: Money,
    /// PV at SOC of capitalized interest
    pub pv_financing_soc: Money,
    /// pv_occ_soc + pv_financing_soc
    pub pv_capex_soc: Money,
    /// Draws compounded to COD at the blended WACC: the developer's break-even recovery
    pub fv_economic_cod: Money,
    /// Draws compounded to COD at inflation only
    pub occ_book_value_cod: Money,
    /// occ_book_value_cod / fv_economic_cod
    pub occ_ratio_cod: Decimal,
    /// PV at SOC of RAB-surcharged interest (memo item)
    pub pv_surcharged_idc_soc: Money,
    /// Surcharged interest compounded to COD: the prepayment the owner later repays
    pub fv_surcharged_cod: Money,
    /// Nominal interest accrued over the build, capitalized plus surcharged
    pub total_idc: Money,
    pub schedule: Vec<ConstructionPeriod>,
}

impl ConstructionResult {
    /// Result for an asset built overnight: no drawdown, no interest.
    pub fn identity(overnight_cost: Money) -> Self {
        ConstructionResult {
            pv_occ_soc: overnight_cost,
            pv_financing_soc: Decimal::ZERO,
            pv_capex_soc: overnight_cost,
            fv_economic_cod: overnight_cost,
            occ_book_value_cod: overnight_cost,
            occ_ratio_cod: Decimal::ONE,
            pv_surcharged_idc_soc: Decimal::ZERO,
            fv_surcharged_cod: Decimal::ZERO,
            total_idc: Decimal::ZERO,
            schedule: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Build the construction-phase roll-up.
///
/// `rab_fraction` is the decimal share of each period's interest surcharged to consumers; it is
/// clamped to [0, 1]. Zero construction time returns [`ConstructionResult::identity`].
pub fn build_construction_phase(
    inputs: &ProjectInputs,
    inflation_mode: InflationMode,
    idc_basis: IdcAccrualBasis,
    rab_fraction: Rate,
) -> ConstructionResult {
    let tc = inputs.construction_time;
    if tc == 0 {
        return ConstructionResult::identity(inputs.overnight_cost);
    }

    let wacc = compute_wacc(inputs);
    let blended = wacc.wacc_nominal_blend;
    let inflation = inputs.inflation();
    let rab = clamp_unit(rab_fraction);
    let weights = drawdown_weights(tc);
    let lump_sum_cost = inputs
        .overnight_cost
        .saturating_mul(compound(Decimal::ONE + inflation, tc));

    let mut schedule = Vec::with_capacity(tc as usize);
    let mut balance = Decimal::ZERO;
    let mut debt_balance = Decimal::ZERO;

    let mut pv_occ = Decimal::ZERO;
    let mut pv_financing = Decimal::ZERO;
    let mut pv_surcharged = Decimal::ZERO;
    let mut fv_economic = Decimal::ZERO;
    let mut occ_book = Decimal::ZERO;
    let mut fv_surcharged = Decimal::ZERO;
    let mut total_idc = Decimal::ZERO;

    // Growth factors saturate at Decimal::MAX on long, high-rate builds; every product and sum
    // below saturates with them.
    for (t, weight) in (0..tc).zip(weights) {
        let draw = match inflation_mode {
            InflationMode::Dynamic => (inputs.overnight_cost * weight)
                .saturating_mul(mid_year_growth(inflation, t)),
            InflationMode::LumpSum => lump_sum_cost.saturating_mul(weight),
        };

        // Half the current draw is outstanding on average through the period.
        let interest = match idc_basis {
            IdcAccrualBasis::WholeCapital => balance
                .saturating_add(draw / dec!(2))
                .saturating_mul(blended),
            IdcAccrualBasis::DebtOnly => debt_balance
                .saturating_add(wacc.gearing * draw / dec!(2))
                .saturating_mul(wacc.cost_of_debt_nominal),
        };
        let surcharged = interest * rab;
        let capitalized = interest - surcharged;

        balance = balance.saturating_add(draw).saturating_add(capitalized);
        debt_balance = debt_balance
            .saturating_add(wacc.gearing * draw)
            .saturating_add(capitalized);
        total_idc = total_idc.saturating_add(interest);

        let discount = mid_year_discount(blended, t);
        pv_occ = pv_occ.saturating_add(draw.saturating_mul(discount));
        pv_financing = pv_financing.saturating_add(capitalized.saturating_mul(discount));
        pv_surcharged = pv_surcharged.saturating_add(surcharged.saturating_mul(discount));

        let periods_to_cod = tc - t - 1;
        let growth_to_cod = mid_year_growth(blended, periods_to_cod);
        fv_economic = fv_economic.saturating_add(draw.saturating_mul(growth_to_cod));
        fv_surcharged = fv_surcharged.saturating_add(surcharged.saturating_mul(growth_to_cod));
        let inflation_to_cod = mid_year_growth(inflation, periods_to_cod);
        occ_book = occ_book.saturating_add(draw.saturating_mul(inflation_to_cod));

        schedule.push(ConstructionPeriod {
            period: t + 1,
            weight,
            draw,
            interest,
            capitalized_interest: capitalized,
            surcharged_interest: surcharged,
            balance: match idc_basis {
                IdcAccrualBasis::WholeCapital => balance,
                IdcAccrualBasis::DebtOnly => debt_balance,
            },
            discount_factor: discount,
        });
    }

    let occ_ratio_cod = if fv_economic.is_zero() {
        Decimal::ONE
    } else {
        safe_div(occ_book, fv_economic)
    };

    ConstructionResult {
        pv_occ_soc: pv_occ,
        pv_financing_soc: pv_financing,
        pv_capex_soc: pv_occ.saturating_add(pv_financing),
        fv_economic_cod: fv_economic,
        occ_book_value_cod: occ_book,
        occ_ratio_cod,
        pv_surcharged_idc_soc: pv_surcharged,
        fv_surcharged_cod: fv_surcharged,
        total_idc,
        schedule,
    }
}

/// Bell-shaped drawdown: weight[t] proportional to sin(pi (t + 0.5) / periods), summing to one.
pub fn drawdown_weights(periods: u32) -> Vec<Decimal> {
    if periods == 0 {
        return Vec::new();
    }
    let span = Decimal::from(periods);
    let raw: Vec<Decimal> = (0..periods)
        .map(|t| decimal_sin(PI * (Decimal::from(t) + dec!(0.5)) / span))
        .collect();
    let total: Decimal = raw.iter().copied().sum();
    if total.is_zero() {
        return vec![Decimal::ONE / span; periods as usize];
    }
    raw.into_iter().map(|w| w / total).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
