use lcoe_core::construction::{IdcAccrualBasis, InflationMode};
use lcoe_core::methodology::{
    analyze_construction, analyze_lcoe, build_phase, compare_methodologies, compute_lcoe,
    select_methodology, ComparisonRequest, LcoeRequest, MethodologySelection, MethodologyStep,
    MethodologyToggles, ValuationPoint,
};
use lcoe_core::{LcoeError, ProjectInputs};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn rel_diff(a: Decimal, b: Decimal) -> Decimal {
    ((a - b) / b).abs()
}

fn all_toggles() -> MethodologyToggles {
    MethodologyToggles {
        rab_enabled: true,
        declining_equity_return: true,
        turnkey: true,
        dual_life: true,
        valuation_point: ValuationPoint::Soc,
    }
}

// ===========================================================================
// Dispatch table
// ===========================================================================

#[test]
fn test_dispatch_table() {
    let inputs = ProjectInputs::default();
    let toggles = all_toggles();

    let baseline = MethodologySelection {
        inflation_mode: InflationMode::LumpSum,
        idc_basis: IdcAccrualBasis::WholeCapital,
        rab_fraction: Decimal::ZERO,
        declining_equity_return: false,
        dual_life: false,
        turnkey: false,
        valuation_point: ValuationPoint::Soc,
    };
    assert_eq!(select_methodology(&inputs, MethodologyStep::BiasedBaseline, &toggles), baseline);

    let corrected = MethodologySelection {
        inflation_mode: InflationMode::Dynamic,
        idc_basis: IdcAccrualBasis::DebtOnly,
        ..baseline.clone()
    };
    assert_eq!(
        select_methodology(&inputs, MethodologyStep::CorrectedFinancing, &toggles),
        corrected
    );

    let advanced = MethodologySelection {
        rab_fraction: dec!(0.5),
        declining_equity_return: true,
        dual_life: true,
        turnkey: true,
        ..corrected.clone()
    };
    assert_eq!(
        select_methodology(&inputs, MethodologyStep::AdvancedOptions, &toggles),
        advanced
    );
}

#[test]
fn test_step_three_without_toggles_equals_step_two() {
    let inputs = ProjectInputs::default();
    let toggles = MethodologyToggles::default();
    let two = compute_lcoe(&inputs, MethodologyStep::CorrectedFinancing, &toggles, None);
    let three = compute_lcoe(&inputs, MethodologyStep::AdvancedOptions, &toggles, None);
    assert_eq!(two, three);
}

#[test]
fn test_biased_baseline_costs_more_than_corrected() {
    let inputs = ProjectInputs::default();
    let toggles = MethodologyToggles::default();
    let one = compute_lcoe(&inputs, MethodologyStep::BiasedBaseline, &toggles, None);
    let two = compute_lcoe(&inputs, MethodologyStep::CorrectedFinancing, &toggles, None);
    assert!(one.occ_lcoe > two.occ_lcoe);
    assert!(one.financing_lcoe > two.financing_lcoe);
    assert!(one.total_lcoe > two.total_lcoe);
    // Operating buckets do not depend on the construction methodology.
    assert_eq!(one.fuel_lcoe, two.fuel_lcoe);
}

// ===========================================================================
// Memoization
// ===========================================================================

#[test]
fn test_precomputed_phase_reused_across_operational_changes() {
    let base = ProjectInputs::default();
    let step = MethodologyStep::AdvancedOptions;
    let toggles = MethodologyToggles {
        rab_enabled: true,
        dual_life: true,
        ..Default::default()
    };
    let phase = build_phase(&base, step, &toggles);

    for (fuel, om, hours, decom) in [
        (dec!(5), dec!(100), dec!(7000), dec!(500)),
        (dec!(20), dec!(180), dec!(8000), dec!(1500)),
    ] {
        let swept = ProjectInputs {
            fuel_cost: fuel,
            om_cost: om,
            load_hours: hours,
            decommissioning_cost: decom,
            ..base.clone()
        };
        assert!(base.same_financial_basis(&swept));
        let cached = compute_lcoe(&swept, step, &toggles, Some(&phase));
        let fresh = compute_lcoe(&swept, step, &toggles, None);
        assert_eq!(cached, fresh);
    }
}

#[test]
fn test_precomputed_phase_for_turnkey() {
    let inputs = ProjectInputs::default();
    let toggles = MethodologyToggles {
        turnkey: true,
        ..Default::default()
    };
    let phase = build_phase(&inputs, MethodologyStep::AdvancedOptions, &toggles);
    let cached = compute_lcoe(&inputs, MethodologyStep::AdvancedOptions, &toggles, Some(&phase));
    let fresh = compute_lcoe(&inputs, MethodologyStep::AdvancedOptions, &toggles, None);
    assert_eq!(cached, fresh);
}

// ===========================================================================
// Valuation point
// ===========================================================================

#[test]
fn test_valuation_point_does_not_change_lcoe() {
    let inputs = ProjectInputs::default();
    for step in MethodologyStep::ALL {
        let at_soc = MethodologyToggles {
            rab_enabled: true,
            declining_equity_return: true,
            ..Default::default()
        };
        let at_cod = MethodologyToggles {
            valuation_point: ValuationPoint::Cod,
            ..at_soc.clone()
        };
        let soc = compute_lcoe(&inputs, step, &at_soc, None);
        let cod = compute_lcoe(&inputs, step, &at_cod, None);
        for (name, a, b) in [
            ("total", soc.total_lcoe, cod.total_lcoe),
            ("occ", soc.occ_lcoe, cod.occ_lcoe),
            ("financing", soc.financing_lcoe, cod.financing_lcoe),
            ("fuel", soc.fuel_lcoe, cod.fuel_lcoe),
        ] {
            assert!(
                rel_diff(a, b) < dec!(0.000000001),
                "step {}: {name} {a} vs {b}",
                step.number()
            );
        }
    }
}

// ===========================================================================
// Envelope layer
// ===========================================================================

#[test]
fn test_analyze_lcoe_envelope() {
    let request = LcoeRequest {
        inputs: ProjectInputs::default(),
        step: MethodologyStep::AdvancedOptions,
        toggles: MethodologyToggles {
            rab_enabled: true,
            ..Default::default()
        },
    };
    let out = analyze_lcoe(&request).unwrap();
    assert!(out.methodology.starts_with("Step 3"));
    assert!(out.warnings.is_empty(), "unexpected warnings: {:?}", out.warnings);
    assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    assert!(out.result.surcharged_idc_lcoe > Decimal::ZERO);
}

#[test]
fn test_analyze_lcoe_warns_on_short_life_decline() {
    let mut inputs = ProjectInputs::default();
    inputs.useful_life = 2;
    let request = LcoeRequest {
        inputs,
        step: MethodologyStep::AdvancedOptions,
        toggles: MethodologyToggles {
            declining_equity_return: true,
            ..Default::default()
        },
    };
    let out = analyze_lcoe(&request).unwrap();
    assert!(out.warnings.iter().any(|w| w.contains("Declining equity return ignored")));
}

#[test]
fn test_analyze_lcoe_rejects_impossible_rate() {
    let mut inputs = ProjectInputs::default();
    inputs.cost_of_debt = dec!(-100);
    let request = LcoeRequest {
        inputs,
        step: MethodologyStep::CorrectedFinancing,
        toggles: MethodologyToggles::default(),
    };
    match analyze_lcoe(&request).unwrap_err() {
        LcoeError::InvalidInput { field, .. } => assert_eq!(field, "cost_of_debt"),
        e => panic!("Expected InvalidInput, got {e:?}"),
    }
}

#[test]
fn test_analyze_rejects_horizon_beyond_decimal_range() {
    let mut inputs = ProjectInputs::default();
    inputs.inflation_rate = dec!(100);
    inputs.useful_life = 100;
    for step in [MethodologyStep::CorrectedFinancing, MethodologyStep::AdvancedOptions] {
        let request = LcoeRequest {
            inputs: inputs.clone(),
            step,
            toggles: all_toggles(),
        };
        match analyze_lcoe(&request).unwrap_err() {
            LcoeError::InvalidInput { field, .. } => assert_eq!(field, "useful_life"),
            e => panic!("Expected InvalidInput, got {e:?}"),
        }
        assert!(analyze_construction(&request).is_err());
    }

    let mut long_life = ProjectInputs::default();
    long_life.inflation_rate = dec!(50);
    long_life.useful_life = 150;
    let comparison = ComparisonRequest {
        inputs: long_life,
        toggles: MethodologyToggles::default(),
    };
    assert!(compare_methodologies(&comparison).is_err());
}

#[test]
fn test_request_from_json() {
    let json = r#"{
        "inputs": {
            "useful_life": 40,
            "overnight_cost": "3000",
            "construction_time": 4,
            "inflation_rate": "2.5"
        },
        "step": 3,
        "toggles": { "turnkey": true, "valuation_point": "cod" }
    }"#;
    let request: LcoeRequest = serde_json::from_str(json).unwrap();
    assert_eq!(request.step, MethodologyStep::AdvancedOptions);
    assert_eq!(request.toggles.valuation_point, ValuationPoint::Cod);
    // Omitted inputs fall back to the reference plant.
    assert_eq!(request.inputs.cost_of_equity, dec!(9.0));

    let out = analyze_lcoe(&request).unwrap();
    assert!(out.result.developer_sale_price.is_some());
}

#[test]
fn test_unknown_step_rejected_in_json() {
    let json = r#"{ "inputs": {}, "step": 7 }"#;
    assert!(serde_json::from_str::<LcoeRequest>(json).is_err());
}

#[test]
fn test_analyze_construction_schedule() {
    let request = LcoeRequest {
        inputs: ProjectInputs::default(),
        step: MethodologyStep::BiasedBaseline,
        toggles: MethodologyToggles::default(),
    };
    let out = analyze_construction(&request).unwrap();
    assert_eq!(out.result.schedule.len(), 8);
    assert!(out.methodology.contains("lump-sum inflation"));
}

#[test]
fn test_compare_methodologies_progression() {
    let request = ComparisonRequest {
        inputs: ProjectInputs::default(),
        toggles: MethodologyToggles {
            rab_enabled: true,
            ..Default::default()
        },
    };
    let out = compare_methodologies(&request).unwrap();
    let steps = &out.result.steps;
    assert_eq!(steps.len(), 3);
    assert!(steps[0].total_change.is_none());

    // Each step corrects a bias that inflated the previous one.
    let step2_change = steps[1].total_change.unwrap();
    let step3_change = steps[2].total_change.unwrap();
    assert!(step2_change < Decimal::ZERO);
    assert!(step3_change < Decimal::ZERO);
    assert_eq!(steps[1].total_lcoe - steps[0].total_lcoe, step2_change);
}
