use ai_impact_core::models::baseline::CompanyProfile;
use ai_impact_core::scenarios::ranking::{rank_scenarios, ScenarioScore};
use ai_impact_core::scenarios::resolver::{
    resolve, resolve_named, AdoptionApproach, ScenarioKey, STANDARD_SCENARIOS,
};
use ai_impact_core::ImpactError;
use pretty_assertions::assert_eq;

fn score(name: &str, mean: f64, std: f64) -> ScenarioScore {
    ScenarioScore {
        scenario: name.into(),
        mean_npv: mean,
        std_npv: std,
        coefficient_of_variation: if mean == 0.0 {
            f64::INFINITY
        } else {
            std / mean.abs()
        },
        reward_to_risk: if std == 0.0 { 0.0 } else { mean / std },
    }
}

// ===========================================================================
// Resolver
// ===========================================================================

#[test]
fn test_standard_scenarios_resolve() {
    for name in STANDARD_SCENARIOS {
        let r = resolve_named(name).unwrap();
        assert!(r.months == 24 || r.months == 36, "{name}: {}", r.months);
        assert_eq!(r.key.to_string(), name);
    }
}

#[test]
fn test_horizon_table() {
    let expected = [
        (CompanyProfile::Startup, 24),
        (CompanyProfile::Enterprise, 36),
        (CompanyProfile::Scaleup, 24),
    ];
    for (profile, months) in expected {
        let r = resolve(ScenarioKey::new(AdoptionApproach::Moderate, profile));
        assert_eq!(r.months, months);
    }
}

#[test]
fn test_scale_up_alias() {
    let a = resolve_named("aggressive_scale_up").unwrap();
    let b = resolve_named("aggressive_scaleup").unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_unknown_tags_rejected() {
    for bad in ["", "moderate", "bold_startup", "moderate_megacorp", "startup_moderate"] {
        let err = resolve_named(bad).unwrap_err();
        assert!(
            matches!(err, ImpactError::UnknownScenario { .. }),
            "{bad:?} gave {err}"
        );
    }
}

// ===========================================================================
// Ranking
// ===========================================================================

#[test]
fn test_higher_mean_wins_with_equal_std() {
    let scores = vec![score("first", 2_000_000.0, 400_000.0), score("second", 1_500_000.0, 400_000.0)];
    let ranking = rank_scenarios(&scores).unwrap();
    assert_eq!(ranking.highest_expected_value.scenario, "first");
    assert_eq!(ranking.best_risk_adjusted.scenario, "first");
    assert_eq!(ranking.most_reliable.scenario, "first");
}

#[test]
fn test_ties_keep_input_order() {
    let scores = vec![score("a", 100.0, 10.0), score("b", 100.0, 10.0)];
    let ranking = rank_scenarios(&scores).unwrap();
    assert_eq!(ranking.most_reliable.scenario, "a");
    assert_eq!(ranking.highest_expected_value.scenario, "a");
    assert_eq!(ranking.best_risk_adjusted.scenario, "a");
}

#[test]
fn test_zero_mean_is_never_most_reliable() {
    let scores = vec![score("flat", 0.0, 5.0), score("noisy", 10.0, 50.0)];
    let ranking = rank_scenarios(&scores).unwrap();
    assert_eq!(ranking.most_reliable.scenario, "noisy");
}

#[test]
fn test_empty_ranking_rejected() {
    assert!(matches!(
        rank_scenarios(&[]),
        Err(ImpactError::InsufficientData(_))
    ));
}
