//! Buyer-side LCOE for a turnkey sale at commercial operation.
//!
//! The developer sells the finished plant at COD for a price paid in three equal, mid-year,
//! annual instalments, sized so their PV at the buyer's discount rate recovers the developer's
//! economic cost net of RAB surcharges already collected. The buyer's clock starts at COD.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::discount_factors::{project_factors_with_length, DiscountFactorSequence};
use crate::lcoe::{decommissioning_payment, operating_pv, LcoeResult};
use crate::time_value::safe_div;
use crate::types::{Money, ProjectInputs};

/// Number of annual tranches in which the buyer pays the developer.
pub const SALE_INSTALMENTS: u32 = 3;

/// Terms of the developer-to-buyer sale, valued at COD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnkeySale {
    /// Developer economic recovery less surcharged IDC already collected, floored at zero
    pub net_recovery_target: Money,
    /// Nominal amount of each instalment
    pub instalment: Money,
    /// Sum of the instalments
    pub sale_price: Money,
    /// PV at COD of the instalments; equals the recovery target
    pub pv_instalments: Money,
}

/// Size the three sale instalments.
pub fn turnkey_sale(
    inputs: &ProjectInputs,
    fv_economic_cod: Money,
    fv_surcharged_cod: Money,
    declining: bool,
) -> TurnkeySale {
    let buyer_factors = buyer_factors(inputs, declining);
    let annuity = buyer_factors.prefix_sum(SALE_INSTALMENTS as usize);
    sale_from_factors(fv_economic_cod, fv_surcharged_cod, annuity)
}

fn buyer_factors(inputs: &ProjectInputs, declining: bool) -> DiscountFactorSequence {
    // Instalments run for three years even when the plant's life is shorter.
    let length = inputs.useful_life.max(SALE_INSTALMENTS);
    project_factors_with_length(inputs, length, declining, 0)
}

fn sale_from_factors(
    fv_economic_cod: Money,
    fv_surcharged_cod: Money,
    annuity: Decimal,
) -> TurnkeySale {
    let net_recovery_target = fv_economic_cod
        .saturating_sub(fv_surcharged_cod)
        .max(Decimal::ZERO);
    let instalment = safe_div(net_recovery_target, annuity);
    TurnkeySale {
        net_recovery_target,
        instalment,
        sale_price: instalment.saturating_mul(Decimal::from(SALE_INSTALMENTS)),
        pv_instalments: instalment.saturating_mul(annuity),
    }
}

/// Buyer-side LCOE with the sale instalments in place of construction costs.
///
/// Instalment PV is split into overnight-cost and financing buckets by the share of the
/// developer's book OCC in the net recovery target, capped at one, so RAB netting lands entirely
/// on financing. The buyer bore no construction surcharge, so that memo line is zero.
pub fn compute_turnkey_lcoe(
    inputs: &ProjectInputs,
    fv_economic_cod: Money,
    fv_surcharged_cod: Money,
    occ_ratio_cod: Decimal,
    declining: bool,
) -> LcoeResult {
    let life = inputs.useful_life as usize;
    if inputs.annual_energy() <= Decimal::ZERO || life == 0 {
        return LcoeResult::zero();
    }

    let factors = buyer_factors(inputs, declining);
    let sale = sale_from_factors(
        fv_economic_cod,
        fv_surcharged_cod,
        factors.prefix_sum(SALE_INSTALMENTS as usize),
    );

    let operating = operating_pv(inputs, &factors, decommissioning_payment(inputs), 0..life);
    if operating.energy <= Decimal::ZERO {
        return LcoeResult::zero();
    }

    let occ_ratio_net = if sale.net_recovery_target.is_zero() {
        Decimal::ONE
    } else {
        let occ_book = occ_ratio_cod.saturating_mul(fv_economic_cod);
        safe_div(occ_book, sale.net_recovery_target).min(Decimal::ONE)
    };
    let pv_occ = sale.pv_instalments.saturating_mul(occ_ratio_net);
    let pv_financing = sale.pv_instalments - pv_occ;
    let total = sale.pv_instalments.saturating_add(operating.opex());
    let energy = operating.energy;

    LcoeResult {
        total_lcoe: safe_div(total, energy),
        occ_lcoe: safe_div(pv_occ, energy),
        financing_lcoe: safe_div(pv_financing, energy),
        fuel_lcoe: safe_div(operating.fuel, energy),
        om_lcoe: safe_div(operating.om, energy),
        decommissioning_lcoe: safe_div(operating.decommissioning, energy),
        surcharged_idc_lcoe: Decimal::ZERO,
        half_lcoe_1: None,
        half_lcoe_2: None,
        developer_sale_price: Some(sale.sale_price),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_value::mid_year_discount;
    use crate::wacc::compute_wacc;
    use rust_decimal_macros::dec;

    fn rel_close(a: Decimal, b: Decimal, tol: Decimal) -> bool {
        ((a - b) / b).abs() < tol
    }

    #[test]
    fn test_instalments_recover_target_at_wacc() {
        let inputs = ProjectInputs::default();
        let sale = turnkey_sale(&inputs, dec!(12000), dec!(1500), false);
        let wacc = compute_wacc(&inputs).wacc_nominal_blend;
        let pv: Decimal = (0..SALE_INSTALMENTS)
            .map(|k| sale.instalment * mid_year_discount(wacc, k))
            .sum();
        assert_eq!(sale.net_recovery_target, dec!(10500));
        assert!(rel_close(pv, sale.net_recovery_target, dec!(0.0001)), "pv {pv}");
        assert_eq!(sale.sale_price, sale.instalment * dec!(3));
    }

    #[test]
    fn test_surcharge_above_recovery_floors_at_zero() {
        let inputs = ProjectInputs::default();
        let sale = turnkey_sale(&inputs, dec!(1000), dec!(1500), false);
        assert_eq!(sale.net_recovery_target, Decimal::ZERO);
        assert_eq!(sale.sale_price, Decimal::ZERO);
    }

    #[test]
    fn test_turnkey_buckets_sum_and_report_price() {
        let inputs = ProjectInputs::default();
        let out = compute_turnkey_lcoe(&inputs, dec!(12000), Decimal::ZERO, dec!(0.6), false);
        assert!(rel_close(out.primary_sum(), out.total_lcoe, dec!(0.000001)));
        assert_eq!(out.surcharged_idc_lcoe, Decimal::ZERO);
        assert!(out.developer_sale_price.unwrap() > dec!(12000));
        assert!(out.occ_lcoe > Decimal::ZERO && out.financing_lcoe > Decimal::ZERO);
    }

    #[test]
    fn test_occ_bucket_invariant_to_rab_netting() {
        let inputs = ProjectInputs::default();
        let plain = compute_turnkey_lcoe(&inputs, dec!(12000), Decimal::ZERO, dec!(0.6), false);
        let netted = compute_turnkey_lcoe(&inputs, dec!(12000), dec!(2000), dec!(0.6), false);
        assert!(rel_close(netted.occ_lcoe, plain.occ_lcoe, dec!(0.000001)));
        assert!(netted.financing_lcoe < plain.financing_lcoe);
    }

    #[test]
    fn test_short_life_still_pays_three_instalments() {
        let mut inputs = ProjectInputs::default();
        inputs.useful_life = 1;
        let sale = turnkey_sale(&inputs, dec!(12000), Decimal::ZERO, false);
        assert!(sale.instalment > Decimal::ZERO);
        assert!(rel_close(sale.pv_instalments, dec!(12000), dec!(0.000001)));
    }

    #[test]
    fn test_zero_energy_gives_zero() {
        let mut inputs = ProjectInputs::default();
        inputs.load_hours = Decimal::ZERO;
        let out = compute_turnkey_lcoe(&inputs, dec!(12000), Decimal::ZERO, dec!(0.6), false);
        assert_eq!(out, LcoeResult::zero());
    }
}
