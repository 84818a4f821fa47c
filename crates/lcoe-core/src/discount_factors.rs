//! Operating-year discount factors.
//!
//! Each factor values one unit received in the middle of an operating year. The sequence is
//! anchored `construction_offset` years before commercial operation: an offset equal to the
//! construction time values everything at start of construction, an offset of zero at COD.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::time_value::{compound, decimal_sqrt, fisher_nominal, safe_div};
use crate::types::{clamp_unit, ProjectInputs, Rate};
use crate::wacc::{blend, compute_wacc};

/// Discount factors for operating years 1..=n, mid-year timing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscountFactorSequence(Vec<Decimal>);

impl DiscountFactorSequence {
    pub fn new(factors: Vec<Decimal>) -> Self {
        DiscountFactorSequence(factors)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Factor for zero-based operating year `year`.
    pub fn get(&self, year: usize) -> Option<Decimal> {
        self.0.get(year).copied()
    }

    pub fn factors(&self) -> &[Decimal] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Decimal> {
        self.0.iter()
    }

    /// Sum of the first `n` factors (fewer if the sequence is shorter).
    pub fn prefix_sum(&self, n: usize) -> Decimal {
        self.0
            .iter()
            .take(n)
            .fold(Decimal::ZERO, |acc, df| acc.saturating_add(*df))
    }
}

/// Build `useful_life` mid-year discount factors.
///
/// With `declining` set, the operating life splits into three equal tranches and the real cost
/// of equity steps down to 2/3 and then 1/3 of its base value, re-blended each time with the
/// unchanged nominal cost of debt. Lives shorter than three years have no tranches, so the
/// flag is ignored there.
pub fn build_discount_factors(
    cost_of_equity_real: Rate,
    cost_of_debt_nominal: Rate,
    gearing: Rate,
    inflation: Rate,
    useful_life: u32,
    declining: bool,
    construction_offset: u32,
) -> DiscountFactorSequence {
    build_with_length(
        cost_of_equity_real,
        cost_of_debt_nominal,
        gearing,
        inflation,
        useful_life,
        useful_life,
        declining,
        construction_offset,
    )
}

/// [`build_discount_factors`] with the rate arguments taken from `inputs`.
pub fn discount_factors_for(
    inputs: &ProjectInputs,
    declining: bool,
    construction_offset: u32,
) -> DiscountFactorSequence {
    project_factors_with_length(inputs, inputs.useful_life, declining, construction_offset)
}

/// Like [`discount_factors_for`] but `length` factors long. Tranche boundaries still follow the
/// useful life; years past it keep the final tranche's rate.
pub(crate) fn project_factors_with_length(
    inputs: &ProjectInputs,
    length: u32,
    declining: bool,
    construction_offset: u32,
) -> DiscountFactorSequence {
    let wacc = compute_wacc(inputs);
    build_with_length(
        inputs.cost_of_equity_real(),
        wacc.cost_of_debt_nominal,
        wacc.gearing,
        inputs.inflation(),
        inputs.useful_life,
        length,
        declining,
        construction_offset,
    )
}

#[allow(clippy::too_many_arguments)]
fn build_with_length(
    cost_of_equity_real: Rate,
    cost_of_debt_nominal: Rate,
    gearing: Rate,
    inflation: Rate,
    useful_life: u32,
    length: u32,
    declining: bool,
    construction_offset: u32,
) -> DiscountFactorSequence {
    let gearing = clamp_unit(gearing);
    let tranche_len = useful_life / 3;
    let apply_decline = declining && tranche_len > 0;

    let rate_for = |equity_real: Rate| {
        blend(
            gearing,
            cost_of_debt_nominal,
            fisher_nominal(equity_real, inflation),
        )
    };
    let base_rate = rate_for(cost_of_equity_real);
    let tranche_rates = if apply_decline {
        [
            base_rate,
            rate_for(cost_of_equity_real * dec!(2) / dec!(3)),
            rate_for(cost_of_equity_real / dec!(3)),
        ]
    } else {
        [base_rate; 3]
    };

    let mut cumulative = compound(Decimal::ONE + base_rate, construction_offset);
    let mut factors = Vec::with_capacity(length as usize);

    for year in 0..length {
        let rate = if year < tranche_len {
            tranche_rates[0]
        } else if year < 2 * tranche_len {
            tranche_rates[1]
        } else {
            tranche_rates[2]
        };
        let one_plus_w = Decimal::ONE + rate;

        // Discount before advancing: year 1 sits half a year out, not one and a half.
        let denominator = cumulative
            .checked_mul(decimal_sqrt(one_plus_w))
            .unwrap_or(Decimal::MAX);
        factors.push(safe_div(Decimal::ONE, denominator));

        cumulative = cumulative.checked_mul(one_plus_w).unwrap_or(Decimal::MAX);
    }

    DiscountFactorSequence(factors)
}
