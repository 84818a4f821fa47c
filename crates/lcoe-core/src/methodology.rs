//! Step-aware orchestration.
//!
//! Three methodology steps walk from a deliberately biased calculation to the corrected one:
//!
//! 1. lump-sum inflation of the overnight cost, IDC on the whole capital base at WACC;
//! 2. per-period inflation indexing, IDC on the debt-financed share at the cost of debt;
//! 3. step 2 plus any of RAB surcharging, declining cost of equity, dual-life reporting and a
//!    turnkey sale at COD.
//!
//! [`compute_lcoe`] is the pure entry point; [`analyze_lcoe`] wraps it in the standard output
//! envelope with warnings.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::construction::{
    build_construction_phase, ConstructionResult, IdcAccrualBasis, InflationMode,
};
use crate::discount_factors::{discount_factors_for, DiscountFactorSequence};
use crate::error::LcoeError;
use crate::lcoe::{compute_core_lcoe, LcoeResult};
use crate::time_value::compound;
use crate::turnkey::compute_turnkey_lcoe;
use crate::types::{with_metadata, ComputationOutput, Money, ProjectInputs, Rate};
use crate::wacc::{compute_wacc, push_capital_structure_warnings, validate_inputs};
use crate::EngineResult;

// ---------------------------------------------------------------------------
// Selector types
// ---------------------------------------------------------------------------

/// Methodology step, serialised as its number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MethodologyStep {
    /// Lump-sum inflation, whole-capital IDC
    BiasedBaseline,
    /// Dynamic inflation, debt-only IDC
    CorrectedFinancing,
    /// Corrected financing plus optional advanced toggles
    AdvancedOptions,
}

impl MethodologyStep {
    pub const ALL: [MethodologyStep; 3] = [
        MethodologyStep::BiasedBaseline,
        MethodologyStep::CorrectedFinancing,
        MethodologyStep::AdvancedOptions,
    ];

    pub fn number(self) -> u8 {
        match self {
            MethodologyStep::BiasedBaseline => 1,
            MethodologyStep::CorrectedFinancing => 2,
            MethodologyStep::AdvancedOptions => 3,
        }
    }
}

impl TryFrom<u8> for MethodologyStep {
    type Error = LcoeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(MethodologyStep::BiasedBaseline),
            2 => Ok(MethodologyStep::CorrectedFinancing),
            3 => Ok(MethodologyStep::AdvancedOptions),
            other => Err(LcoeError::InvalidInput {
                field: "step".into(),
                reason: format!("Methodology step must be 1, 2 or 3, got {other}"),
            }),
        }
    }
}

impl From<MethodologyStep> for u8 {
    fn from(step: MethodologyStep) -> u8 {
        step.number()
    }
}

/// Epoch at which the owner-side computation expresses present values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationPoint {
    /// Start of construction
    #[default]
    Soc,
    /// Commercial operation date
    Cod,
}

/// Advanced options. Only step 3 honours the first four.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodologyToggles {
    pub rab_enabled: bool,
    pub declining_equity_return: bool,
    pub turnkey: bool,
    pub dual_life: bool,
    pub valuation_point: ValuationPoint,
}

impl MethodologyToggles {
    fn any_advanced(&self) -> bool {
        self.rab_enabled || self.declining_equity_return || self.turnkey || self.dual_life
    }
}

/// Fully resolved methodology parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodologySelection {
    pub inflation_mode: InflationMode,
    pub idc_basis: IdcAccrualBasis,
    /// Decimal share of construction interest surcharged to consumers
    pub rab_fraction: Rate,
    pub declining_equity_return: bool,
    pub dual_life: bool,
    pub turnkey: bool,
    pub valuation_point: ValuationPoint,
}

/// Map a step and toggle set to methodology parameters.
pub fn select_methodology(
    inputs: &ProjectInputs,
    step: MethodologyStep,
    toggles: &MethodologyToggles,
) -> MethodologySelection {
    let corrected = MethodologySelection {
        inflation_mode: InflationMode::Dynamic,
        idc_basis: IdcAccrualBasis::DebtOnly,
        rab_fraction: Decimal::ZERO,
        declining_equity_return: false,
        dual_life: false,
        turnkey: false,
        valuation_point: toggles.valuation_point,
    };

    match step {
        MethodologyStep::BiasedBaseline => MethodologySelection {
            inflation_mode: InflationMode::LumpSum,
            idc_basis: IdcAccrualBasis::WholeCapital,
            ..corrected
        },
        MethodologyStep::CorrectedFinancing => corrected,
        MethodologyStep::AdvancedOptions => MethodologySelection {
            rab_fraction: if toggles.rab_enabled {
                inputs.rab_fraction()
            } else {
                Decimal::ZERO
            },
            declining_equity_return: toggles.declining_equity_return,
            dual_life: toggles.dual_life,
            turnkey: toggles.turnkey,
            ..corrected
        },
    }
}

// ---------------------------------------------------------------------------
// Pure entry points
// ---------------------------------------------------------------------------

/// Construction roll-up and operating discount sequence for one methodology.
///
/// Valid for any inputs with the same financial basis
/// (see [`ProjectInputs::same_financial_basis`]) under the same step and toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecomputedPhase {
    pub construction: ConstructionResult,
    pub discount_factors: DiscountFactorSequence,
}

pub fn build_phase(
    inputs: &ProjectInputs,
    step: MethodologyStep,
    toggles: &MethodologyToggles,
) -> PrecomputedPhase {
    let selection = select_methodology(inputs, step, toggles);
    phase_for(inputs, &selection)
}

fn phase_for(inputs: &ProjectInputs, selection: &MethodologySelection) -> PrecomputedPhase {
    let construction = build_construction_phase(
        inputs,
        selection.inflation_mode,
        selection.idc_basis,
        selection.rab_fraction,
    );
    let offset = match selection.valuation_point {
        ValuationPoint::Soc => inputs.construction_time,
        ValuationPoint::Cod => 0,
    };
    let discount_factors =
        discount_factors_for(inputs, selection.declining_equity_return, offset);
    PrecomputedPhase {
        construction,
        discount_factors,
    }
}

/// Levelized cost for a step and toggle set.
///
/// `precomputed` skips the construction and discount-factor builds. The caller guarantees it was
/// built by [`build_phase`] for the same step, toggles and financial basis.
pub fn compute_lcoe(
    inputs: &ProjectInputs,
    step: MethodologyStep,
    toggles: &MethodologyToggles,
    precomputed: Option<&PrecomputedPhase>,
) -> LcoeResult {
    let selection = select_methodology(inputs, step, toggles);
    let built;
    let phase = match precomputed {
        Some(phase) => phase,
        None => {
            built = phase_for(inputs, &selection);
            &built
        }
    };
    let construction = &phase.construction;

    if selection.turnkey {
        return compute_turnkey_lcoe(
            inputs,
            construction.fv_economic_cod,
            construction.fv_surcharged_cod,
            construction.occ_ratio_cod,
            selection.declining_equity_return,
        );
    }

    let roll_forward = match selection.valuation_point {
        ValuationPoint::Soc => Decimal::ONE,
        ValuationPoint::Cod => compound(
            Decimal::ONE + compute_wacc(inputs).wacc_nominal_blend,
            inputs.construction_time,
        ),
    };

    compute_core_lcoe(
        inputs,
        construction.pv_occ_soc.saturating_mul(roll_forward),
        construction.pv_financing_soc.saturating_mul(roll_forward),
        construction.pv_surcharged_idc_soc.saturating_mul(roll_forward),
        &phase.discount_factors,
        selection.dual_life,
    )
}

// ---------------------------------------------------------------------------
// Envelope layer
// ---------------------------------------------------------------------------

/// Inputs plus methodology for an enveloped LCOE or construction analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LcoeRequest {
    pub inputs: ProjectInputs,
    pub step: MethodologyStep,
    #[serde(default)]
    pub toggles: MethodologyToggles,
}

/// Inputs for a side-by-side run of all three steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRequest {
    pub inputs: ProjectInputs,
    #[serde(default)]
    pub toggles: MethodologyToggles,
}

/// One row of a methodology comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepComparison {
    pub step: MethodologyStep,
    pub methodology: String,
    pub total_lcoe: Money,
    pub occ_lcoe: Money,
    pub financing_lcoe: Money,
    pub fuel_lcoe: Money,
    pub om_lcoe: Money,
    pub decommissioning_lcoe: Money,
    pub surcharged_idc_lcoe: Money,
    /// Change in total LCOE against the previous step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_change: Option<Money>,
    /// Change in financing LCOE against the previous step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financing_change: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodologyComparison {
    pub steps: Vec<StepComparison>,
}

/// [`compute_lcoe`] wrapped in the standard output envelope.
pub fn analyze_lcoe(request: &LcoeRequest) -> EngineResult<ComputationOutput<LcoeResult>> {
    let start = Instant::now();
    let inputs = &request.inputs;
    validate_inputs(inputs)?;

    let selection = select_methodology(inputs, request.step, &request.toggles);
    let mut warnings = Vec::new();
    push_capital_structure_warnings(inputs, &mut warnings);
    push_methodology_warnings(inputs, request.step, &request.toggles, &mut warnings);
    if inputs.annual_energy() <= Decimal::ZERO || inputs.useful_life == 0 {
        warnings.push(
            "No energy is generated (load hours or useful life is zero); LCOE reported as zero"
                .to_string(),
        );
    }

    let output = compute_lcoe(inputs, request.step, &request.toggles, None);
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        &describe(request.step, &selection),
        request,
        warnings,
        elapsed,
        output,
    ))
}

/// Construction roll-up for a step and toggle set, wrapped in the output envelope.
pub fn analyze_construction(
    request: &LcoeRequest,
) -> EngineResult<ComputationOutput<ConstructionResult>> {
    let start = Instant::now();
    let inputs = &request.inputs;
    validate_inputs(inputs)?;

    let selection = select_methodology(inputs, request.step, &request.toggles);
    let mut warnings = Vec::new();
    push_capital_structure_warnings(inputs, &mut warnings);
    push_methodology_warnings(inputs, request.step, &request.toggles, &mut warnings);

    let output = build_construction_phase(
        inputs,
        selection.inflation_mode,
        selection.idc_basis,
        selection.rab_fraction,
    );
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        &describe(request.step, &selection),
        request,
        warnings,
        elapsed,
        output,
    ))
}

/// Run steps 1, 2 and 3 on the same inputs, reporting step-to-step changes.
pub fn compare_methodologies(
    request: &ComparisonRequest,
) -> EngineResult<ComputationOutput<MethodologyComparison>> {
    let start = Instant::now();
    let inputs = &request.inputs;
    validate_inputs(inputs)?;

    let mut warnings = Vec::new();
    push_capital_structure_warnings(inputs, &mut warnings);
    push_methodology_warnings(
        inputs,
        MethodologyStep::AdvancedOptions,
        &request.toggles,
        &mut warnings,
    );

    let mut steps: Vec<StepComparison> = Vec::with_capacity(MethodologyStep::ALL.len());
    for step in MethodologyStep::ALL {
        let selection = select_methodology(inputs, step, &request.toggles);
        let result = compute_lcoe(inputs, step, &request.toggles, None);
        let (total_change, financing_change) = match steps.last() {
            Some(previous) => (
                Some(result.total_lcoe - previous.total_lcoe),
                Some(result.financing_lcoe - previous.financing_lcoe),
            ),
            None => (None, None),
        };
        steps.push(StepComparison {
            step,
            methodology: describe(step, &selection),
            total_change,
            financing_change,
            total_lcoe: result.total_lcoe,
            occ_lcoe: result.occ_lcoe,
            financing_lcoe: result.financing_lcoe,
            fuel_lcoe: result.fuel_lcoe,
            om_lcoe: result.om_lcoe,
            decommissioning_lcoe: result.decommissioning_lcoe,
            surcharged_idc_lcoe: result.surcharged_idc_lcoe,
        });
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Methodology progression: biased baseline, corrected financing, advanced options",
        request,
        warnings,
        elapsed,
        MethodologyComparison { steps },
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn describe(step: MethodologyStep, selection: &MethodologySelection) -> String {
    let inflation = match selection.inflation_mode {
        InflationMode::LumpSum => "lump-sum inflation",
        InflationMode::Dynamic => "dynamic inflation",
    };
    let idc = match selection.idc_basis {
        IdcAccrualBasis::WholeCapital => "whole-capital IDC",
        IdcAccrualBasis::DebtOnly => "debt-only IDC",
    };
    let mut text = format!("Step {}: {inflation}, {idc}", step.number());
    if selection.rab_fraction > Decimal::ZERO {
        text.push_str(&format!(" + RAB {}%", selection.rab_fraction * dec!(100)));
    }
    if selection.declining_equity_return {
        text.push_str(" + declining equity return");
    }
    if selection.dual_life {
        text.push_str(" + dual life");
    }
    if selection.turnkey {
        text.push_str(" + turnkey");
    }
    if selection.valuation_point == ValuationPoint::Cod {
        text.push_str(" (valued at COD)");
    }
    text
}

fn push_methodology_warnings(
    inputs: &ProjectInputs,
    step: MethodologyStep,
    toggles: &MethodologyToggles,
    warnings: &mut Vec<String>,
) {
    if step != MethodologyStep::AdvancedOptions && toggles.any_advanced() {
        warnings.push(format!(
            "Advanced toggles are ignored at step {}; select step 3 to apply them",
            step.number()
        ));
    }
    if inputs.rab_proportion < Decimal::ZERO || inputs.rab_proportion > dec!(100) {
        warnings.push(format!(
            "RAB proportion {}% outside [0, 100]; clamped to {}%",
            inputs.rab_proportion,
            inputs.rab_fraction() * dec!(100)
        ));
    }
    if inputs.construction_time == 0 {
        warnings.push(
            "Zero construction time: overnight cost taken as spent at COD with no IDC".to_string(),
        );
    }
    if step == MethodologyStep::AdvancedOptions {
        if toggles.declining_equity_return && inputs.useful_life < 3 {
            warnings.push(format!(
                "Declining equity return ignored: useful life of {} years is shorter than \
                 three tranches",
                inputs.useful_life
            ));
        }
        if toggles.turnkey && toggles.dual_life {
            warnings.push(
                "Dual-life figures are not reported on the turnkey (buyer-side) computation"
                    .to_string(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_one_is_biased_baseline() {
        let toggles = MethodologyToggles {
            rab_enabled: true,
            turnkey: true,
            ..Default::default()
        };
        let sel = select_methodology(
            &ProjectInputs::default(),
            MethodologyStep::BiasedBaseline,
            &toggles,
        );
        assert_eq!(sel.inflation_mode, InflationMode::LumpSum);
        assert_eq!(sel.idc_basis, IdcAccrualBasis::WholeCapital);
        assert_eq!(sel.rab_fraction, Decimal::ZERO);
        assert!(!sel.turnkey);
    }

    #[test]
    fn test_step_three_applies_toggles() {
        let toggles = MethodologyToggles {
            rab_enabled: true,
            declining_equity_return: true,
            ..Default::default()
        };
        let sel = select_methodology(
            &ProjectInputs::default(),
            MethodologyStep::AdvancedOptions,
            &toggles,
        );
        assert_eq!(sel.inflation_mode, InflationMode::Dynamic);
        assert_eq!(sel.idc_basis, IdcAccrualBasis::DebtOnly);
        assert_eq!(sel.rab_fraction, dec!(0.5));
        assert!(sel.declining_equity_return);
        assert!(!sel.dual_life);
    }

    #[test]
    fn test_step_from_number() {
        assert_eq!(MethodologyStep::try_from(2).unwrap(), MethodologyStep::CorrectedFinancing);
        assert!(MethodologyStep::try_from(4).is_err());
        let json = serde_json::to_string(&MethodologyStep::AdvancedOptions).unwrap();
        assert_eq!(json, "3");
    }

    #[test]
    fn test_describe_lists_toggles() {
        let toggles = MethodologyToggles {
            rab_enabled: true,
            turnkey: true,
            ..Default::default()
        };
        let inputs = ProjectInputs::default();
        let sel = select_methodology(&inputs, MethodologyStep::AdvancedOptions, &toggles);
        let text = describe(MethodologyStep::AdvancedOptions, &sel);
        assert!(text.starts_with("Step 3: dynamic inflation, debt-only IDC"));
        assert!(text.contains("RAB"));
        assert!(text.contains("turnkey"));
    }

    #[test]
    fn test_ignored_toggle_warning() {
        let request = LcoeRequest {
            inputs: ProjectInputs::default(),
            step: MethodologyStep::CorrectedFinancing,
            toggles: MethodologyToggles {
                dual_life: true,
                ..Default::default()
            },
        };
        let out = analyze_lcoe(&request).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("ignored at step 2")));
        assert!(out.result.half_lcoe_1.is_none());
    }
}
