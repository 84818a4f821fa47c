use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use lcoe_core::discount_factors::{discount_factors_for, DiscountFactorSequence};
use lcoe_core::methodology::{self, ComparisonRequest, LcoeRequest, PrecomputedPhase};
use lcoe_core::{wacc, ProjectInputs};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Financing
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_wacc(inputs_json: String) -> NapiResult<String> {
    let inputs: ProjectInputs = serde_json::from_str(&inputs_json).map_err(to_napi_error)?;
    let output = wacc::analyze_wacc(&inputs).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct DiscountFactorRequest {
    inputs: ProjectInputs,
    #[serde(default)]
    declining_equity_return: bool,
    /// Years between the valuation epoch and COD; defaults to the construction time
    offset: Option<u32>,
}

#[derive(Serialize)]
struct DiscountFactorResponse {
    wacc_nominal_blend: Decimal,
    offset: u32,
    sum: Decimal,
    factors: DiscountFactorSequence,
}

#[napi]
pub fn build_discount_factors(request_json: String) -> NapiResult<String> {
    let request: DiscountFactorRequest =
        serde_json::from_str(&request_json).map_err(to_napi_error)?;
    let rates = wacc::analyze_wacc(&request.inputs).map_err(to_napi_error)?;
    let offset = request.offset.unwrap_or(request.inputs.construction_time);
    let factors = discount_factors_for(&request.inputs, request.declining_equity_return, offset);
    let response = DiscountFactorResponse {
        wacc_nominal_blend: rates.result.wacc_nominal_blend,
        offset,
        sum: factors.prefix_sum(factors.len()),
        factors,
    };
    serde_json::to_string(&response).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_construction(request_json: String) -> NapiResult<String> {
    let request: LcoeRequest = serde_json::from_str(&request_json).map_err(to_napi_error)?;
    let output = methodology::analyze_construction(&request).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Construction roll-up and discount sequence for reuse across operational sweeps.
#[napi]
pub fn build_phase(request_json: String) -> NapiResult<String> {
    let request: LcoeRequest = serde_json::from_str(&request_json).map_err(to_napi_error)?;
    let phase = methodology::build_phase(&request.inputs, request.step, &request.toggles);
    serde_json::to_string(&phase).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// LCOE
// ---------------------------------------------------------------------------

/// Bare LCOE result, optionally reusing a phase from `buildPhase`.
///
/// The phase must come from the same step, toggles and financial inputs; only fuel, O&M,
/// load hours and decommissioning may differ.
#[napi]
pub fn compute_lcoe(request_json: String, phase_json: Option<String>) -> NapiResult<String> {
    let request: LcoeRequest = serde_json::from_str(&request_json).map_err(to_napi_error)?;
    let phase: Option<PrecomputedPhase> = phase_json
        .map(|json| serde_json::from_str(&json))
        .transpose()
        .map_err(to_napi_error)?;
    let output = methodology::compute_lcoe(
        &request.inputs,
        request.step,
        &request.toggles,
        phase.as_ref(),
    );
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_lcoe(request_json: String) -> NapiResult<String> {
    let request: LcoeRequest = serde_json::from_str(&request_json).map_err(to_napi_error)?;
    let output = methodology::analyze_lcoe(&request).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_methodologies(request_json: String) -> NapiResult<String> {
    let request: ComparisonRequest =
        serde_json::from_str(&request_json).map_err(to_napi_error)?;
    let output = methodology::compare_methodologies(&request).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
