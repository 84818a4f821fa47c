//! Owner-side LCOE: PV of lifetime costs over PV of lifetime energy, split by cost bucket.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::discount_factors::DiscountFactorSequence;
use crate::time_value::{compound, fisher_nominal, mid_year_growth, safe_div, sinking_fund_payment};
use crate::types::{Money, ProjectInputs, Rate};

/// Real return earned by the decommissioning sinking fund.
pub const SINKING_FUND_REAL_RATE: Rate = dec!(0.01);

/// Decomposed levelized cost, currency/MWh.
///
/// The primary buckets (overnight cost, financing, fuel, O&M, decommissioning) sum to
/// `total_lcoe`. `surcharged_idc_lcoe` is a memo line outside that sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LcoeResult {
    pub total_lcoe: Money,
    pub occ_lcoe: Money,
    pub financing_lcoe: Money,
    pub fuel_lcoe: Money,
    pub om_lcoe: Money,
    pub decommissioning_lcoe: Money,
    /// Construction interest recovered from consumers under RAB (memo)
    pub surcharged_idc_lcoe: Money,
    /// Dual-life diagnostic: capex plus first-half opex over first-half energy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub half_lcoe_1: Option<Money>,
    /// Dual-life diagnostic: second-half opex over second-half energy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub half_lcoe_2: Option<Money>,
    /// Turnkey price the buyer pays the developer (currency/kW, nominal at COD)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer_sale_price: Option<Money>,
}

impl LcoeResult {
    pub fn zero() -> Self {
        LcoeResult {
            total_lcoe: Decimal::ZERO,
            occ_lcoe: Decimal::ZERO,
            financing_lcoe: Decimal::ZERO,
            fuel_lcoe: Decimal::ZERO,
            om_lcoe: Decimal::ZERO,
            decommissioning_lcoe: Decimal::ZERO,
            surcharged_idc_lcoe: Decimal::ZERO,
            half_lcoe_1: None,
            half_lcoe_2: None,
            developer_sale_price: None,
        }
    }

    /// Sum of the primary buckets; equals `total_lcoe` up to rounding.
    pub fn primary_sum(&self) -> Money {
        self.occ_lcoe
            .saturating_add(self.financing_lcoe)
            .saturating_add(self.fuel_lcoe)
            .saturating_add(self.om_lcoe)
            .saturating_add(self.decommissioning_lcoe)
    }
}

// ---------------------------------------------------------------------------
// Operating-phase present values
// ---------------------------------------------------------------------------

/// Present values of the operating cash flows over a span of operating years.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct OperatingPv {
    pub fuel: Money,
    pub om: Money,
    pub decommissioning: Money,
    pub energy: Decimal,
}

impl OperatingPv {
    pub fn opex(&self) -> Money {
        self.fuel
            .saturating_add(self.om)
            .saturating_add(self.decommissioning)
    }

    fn combined(&self, other: &OperatingPv) -> OperatingPv {
        OperatingPv {
            fuel: self.fuel.saturating_add(other.fuel),
            om: self.om.saturating_add(other.om),
            decommissioning: self.decommissioning.saturating_add(other.decommissioning),
            energy: self.energy.saturating_add(other.energy),
        }
    }
}

/// Level annual deposit (nominal, per kW) that funds decommissioning at end of life.
///
/// The real cost is inflated over construction plus operation; the fund earns
/// [`SINKING_FUND_REAL_RATE`] in real terms.
pub fn decommissioning_payment(inputs: &ProjectInputs) -> Money {
    let inflation = inputs.inflation();
    let years_to_end = inputs.construction_time.saturating_add(inputs.useful_life);
    let target = inputs
        .decommissioning_cost
        .saturating_mul(compound(Decimal::ONE + inflation, years_to_end));
    let fund_rate = fisher_nominal(SINKING_FUND_REAL_RATE, inflation);
    sinking_fund_payment(target, fund_rate, inputs.useful_life)
}

/// Discount fuel, O&M, the decommissioning deposit and energy for zero-based operating years in
/// `years`. Fuel and O&M escalate from SOC prices to the middle of each operating year.
pub(crate) fn operating_pv(
    inputs: &ProjectInputs,
    factors: &DiscountFactorSequence,
    decommissioning_deposit: Money,
    years: Range<usize>,
) -> OperatingPv {
    let inflation = inputs.inflation();
    let energy = inputs.annual_energy();
    let fuel_per_kw = inputs.fuel_cost.saturating_mul(energy);
    let mut pv = OperatingPv::default();

    for year in years {
        let Some(df) = factors.get(year) else {
            break;
        };
        let periods = inputs.construction_time.saturating_add(year as u32);
        let escalated_df = mid_year_growth(inflation, periods).saturating_mul(df);
        pv.fuel = pv.fuel.saturating_add(fuel_per_kw.saturating_mul(escalated_df));
        pv.om = pv.om.saturating_add(inputs.om_cost.saturating_mul(escalated_df));
        pv.decommissioning = pv
            .decommissioning
            .saturating_add(decommissioning_deposit.saturating_mul(df));
        pv.energy = pv.energy.saturating_add(energy.saturating_mul(df));
    }
    pv
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Owner-side LCOE from construction PVs and an operating discount sequence.
///
/// The construction PVs and `factors` must be anchored at the same epoch. With `dual_life`, the
/// operating years split at ceil(life / 2) and two diagnostic half-life figures are added; the
/// primary buckets are still PV(cost) / PV(total energy).
pub fn compute_core_lcoe(
    inputs: &ProjectInputs,
    pv_occ: Money,
    pv_financing: Money,
    pv_surcharged_idc: Money,
    factors: &DiscountFactorSequence,
    dual_life: bool,
) -> LcoeResult {
    let life = inputs.useful_life as usize;
    if inputs.annual_energy() <= Decimal::ZERO || life == 0 {
        return LcoeResult::zero();
    }

    let deposit = decommissioning_payment(inputs);
    let (first, second) = if dual_life {
        let midpoint = life.div_ceil(2);
        (
            operating_pv(inputs, factors, deposit, 0..midpoint),
            operating_pv(inputs, factors, deposit, midpoint..life),
        )
    } else {
        (operating_pv(inputs, factors, deposit, 0..life), OperatingPv::default())
    };

    let whole = first.combined(&second);
    if whole.energy <= Decimal::ZERO {
        return LcoeResult::zero();
    }

    let capex = pv_occ.saturating_add(pv_financing);
    let total = capex.saturating_add(whole.opex());

    let (half_lcoe_1, half_lcoe_2) = if dual_life {
        (
            Some(safe_div(capex.saturating_add(first.opex()), first.energy)),
            Some(safe_div(second.opex(), second.energy)),
        )
    } else {
        (None, None)
    };

    LcoeResult {
        total_lcoe: safe_div(total, whole.energy),
        occ_lcoe: safe_div(pv_occ, whole.energy),
        financing_lcoe: safe_div(pv_financing, whole.energy),
        fuel_lcoe: safe_div(whole.fuel, whole.energy),
        om_lcoe: safe_div(whole.om, whole.energy),
        decommissioning_lcoe: safe_div(whole.decommissioning, whole.energy),
        surcharged_idc_lcoe: safe_div(pv_surcharged_idc, whole.energy),
        half_lcoe_1,
        half_lcoe_2,
        developer_sale_price: None,
    }
}
