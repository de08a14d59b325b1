use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::error::ImpactError;
use crate::scenarios::ranking::{rank_scenarios, ScenarioRanking};
use crate::scenarios::resolver::{
    resolve_named, ParameterOverrides, ResolvedScenario, STANDARD_SCENARIOS,
};
use crate::time_value::ANNUAL_DISCOUNT_RATE;
use crate::types::{with_metadata, ComputationOutput};
use crate::ImpactResult;

use super::aggregation::{aggregate_trials, AggregatedResult};
use super::perturbation::perturb;
use super::trial::{trace_trial, TrialDrivers, TrialRecord};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Monte Carlo run over a single scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRunInput {
    /// Scenario identifier, `<approach>_<profile>`.
    pub scenario: String,
    #[serde(default = "default_num_trials")]
    pub num_trials: u32,
    /// Optional seed for reproducibility.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Spread trials across threads. Needs the `parallel` feature.
    #[serde(default)]
    pub parallel: bool,
    #[serde(default)]
    pub overrides: Option<ParameterOverrides>,
}

/// Monte Carlo runs over several scenarios followed by ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioComparisonInput {
    #[serde(default = "default_scenarios")]
    pub scenarios: Vec<String>,
    #[serde(default = "default_num_trials")]
    pub num_trials: u32,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub parallel: bool,
}

fn default_num_trials() -> u32 {
    1_000
}

fn default_scenarios() -> Vec<String> {
    STANDARD_SCENARIOS.iter().map(|s| s.to_string()).collect()
}

impl ScenarioRunInput {
    pub fn new(scenario: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            num_trials: default_num_trials(),
            seed: None,
            parallel: false,
            overrides: None,
        }
    }
}

impl Default for ScenarioComparisonInput {
    fn default() -> Self {
        Self {
            scenarios: default_scenarios(),
            num_trials: default_num_trials(),
            seed: None,
            parallel: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// NPV spread of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBand {
    pub scenario: String,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub mean: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioComparisonOutput {
    /// In the order the scenarios were requested.
    pub results: Vec<AggregatedResult>,
    /// Sorted by median NPV, highest first.
    pub confidence_bands: Vec<ConfidenceBand>,
    pub ranking: ScenarioRanking,
}

// ---------------------------------------------------------------------------
// Trial execution
// ---------------------------------------------------------------------------

/// One trial: perturb the scenario's base configurations with `rng` and
/// run the sub-models over its horizon. The multiplier draw and the value
/// and cost totals come back with the outcome.
pub fn run_trial<R: Rng + ?Sized>(
    scenario: &ResolvedScenario,
    rng: &mut R,
) -> ImpactResult<TrialRecord> {
    let p = perturb(&scenario.adoption, &scenario.impact, &scenario.cost, rng)?;
    let (trace, outcome) = trace_trial(
        &scenario.baseline,
        &p.adoption,
        &p.impact,
        &p.cost,
        scenario.months,
    )?;
    Ok(TrialRecord {
        outcome,
        drivers: TrialDrivers {
            multipliers: p.multipliers,
            total_value: trace.total_value(),
            total_cost: trace.total_cost(),
        },
    })
}

/// `n` trials drawing sequentially from a single caller-supplied source.
/// The first failing trial aborts the batch.
pub fn run_trials_with_rng<R: Rng + ?Sized>(
    scenario: &ResolvedScenario,
    n: usize,
    rng: &mut R,
) -> ImpactResult<Vec<TrialRecord>> {
    (0..n).map(|_| run_trial(scenario, &mut *rng)).collect()
}

/// Seed for trial `index` of a run seeded with `seed` (splitmix64 finaliser).
pub fn trial_seed(seed: u64, index: u64) -> u64 {
    let mut z = seed
        .wrapping_add(index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn seeded_trial(
    scenario: &ResolvedScenario,
    seed: u64,
    index: usize,
) -> ImpactResult<TrialRecord> {
    let mut rng = StdRng::seed_from_u64(trial_seed(seed, index as u64));
    run_trial(scenario, &mut rng)
}

/// `n` trials, trial `i` drawing from its own stream derived from
/// `(seed, i)`. Outcomes come back in trial-index order, so the result does
/// not depend on `parallel`.
#[cfg(feature = "parallel")]
pub fn run_trials_seeded(
    scenario: &ResolvedScenario,
    n: usize,
    seed: u64,
    parallel: bool,
) -> ImpactResult<Vec<TrialRecord>> {
    use rayon::prelude::*;

    if parallel {
        (0..n)
            .into_par_iter()
            .map(|i| seeded_trial(scenario, seed, i))
            .collect()
    } else {
        (0..n).map(|i| seeded_trial(scenario, seed, i)).collect()
    }
}

/// `n` trials, trial `i` drawing from its own stream derived from
/// `(seed, i)`. Always sequential in this build.
#[cfg(not(feature = "parallel"))]
pub fn run_trials_seeded(
    scenario: &ResolvedScenario,
    n: usize,
    seed: u64,
    _parallel: bool,
) -> ImpactResult<Vec<TrialRecord>> {
    (0..n).map(|i| seeded_trial(scenario, seed, i)).collect()
}

/// Run and aggregate `n` trials from a single caller-supplied source.
pub fn run_scenario_with_rng<R: Rng + ?Sized>(
    scenario: &ResolvedScenario,
    n: usize,
    rng: &mut R,
) -> ImpactResult<AggregatedResult> {
    let records = run_trials_with_rng(scenario, n, rng)?;
    aggregate_trials(&scenario.key.to_string(), scenario.months, &records)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

fn validate_num_trials(num_trials: u32) -> ImpactResult<()> {
    if num_trials < 1 {
        return Err(ImpactError::InvalidInput {
            field: "num_trials".into(),
            reason: "Must be at least 1".into(),
        });
    }
    Ok(())
}

fn parallel_warning(parallel: bool) -> Option<String> {
    if parallel && !cfg!(feature = "parallel") {
        warn!("parallel execution requested but the `parallel` feature is disabled");
        Some("Parallel execution unavailable in this build; trials ran sequentially".into())
    } else {
        None
    }
}

fn result_warnings(result: &AggregatedResult) -> Vec<String> {
    let mut warnings = Vec::new();
    if result.probabilities.p_no_payback == 1.0 {
        warn!(
            scenario = %result.scenario,
            months = result.months,
            "payback not reached in any trial"
        );
        warnings.push(format!(
            "{}: payback not reached in any trial within {} months",
            result.scenario, result.months
        ));
    }
    if result.num_trials < 100 {
        warnings.push(format!(
            "{}: only {} trials; percentiles are unstable below 100",
            result.scenario, result.num_trials
        ));
    }
    warnings
}

fn run_resolved(
    scenario: &ResolvedScenario,
    num_trials: u32,
    seed: u64,
    parallel: bool,
) -> ImpactResult<AggregatedResult> {
    let start = Instant::now();
    info!(scenario = %scenario.key, num_trials, seed, "starting scenario run");

    let records = run_trials_seeded(scenario, num_trials as usize, seed, parallel)?;
    let result = aggregate_trials(&scenario.key.to_string(), scenario.months, &records)?;

    info!(
        scenario = %scenario.key,
        num_trials,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "finished scenario run"
    );
    debug!(
        scenario = %result.scenario,
        mean_npv = result.npv.mean,
        std_npv = result.npv.std_dev,
        p_npv_positive = result.probabilities.p_npv_positive,
        p_no_payback = result.probabilities.p_no_payback,
        "aggregated result"
    );
    if let Some(top) = result
        .sensitivity
        .as_ref()
        .and_then(|s| s.importance.first())
    {
        debug!(
            scenario = %result.scenario,
            parameter = %top.parameter,
            abs_correlation = top.correlation,
            "strongest NPV driver"
        );
    }
    Ok(result)
}

/// Run the Monte Carlo engine over one scenario.
///
/// Without a seed a fresh one is drawn from entropy and reported in the
/// output assumptions, so any run can be replayed.
pub fn run_scenario(input: &ScenarioRunInput) -> ImpactResult<ComputationOutput<AggregatedResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_num_trials(input.num_trials)?;
    let mut scenario = resolve_named(&input.scenario)?;
    if let Some(overrides) = &input.overrides {
        scenario = scenario.with_overrides(overrides)?;
    }

    let seed = input.seed.unwrap_or_else(|| StdRng::from_entropy().gen());
    warnings.extend(parallel_warning(input.parallel));

    let result = run_resolved(&scenario, input.num_trials, seed, input.parallel)?;
    warnings.extend(result_warnings(&result));

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monte Carlo simulation of AI tool adoption (uniform parameter perturbation, monthly DCF)",
        &serde_json::json!({
            "scenario": scenario.key,
            "months": scenario.months,
            "num_trials": input.num_trials,
            "seed": seed,
            "parallel": input.parallel,
            "annual_discount_rate": ANNUAL_DISCOUNT_RATE,
            "custom_overrides": input.overrides.is_some(),
        }),
        warnings,
        elapsed,
        result,
    ))
}

/// Per-scenario NPV bands, highest median first. Equal medians keep input order.
pub fn confidence_bands(results: &[AggregatedResult]) -> Vec<ConfidenceBand> {
    let mut bands: Vec<ConfidenceBand> = results
        .iter()
        .map(|r| ConfidenceBand {
            scenario: r.scenario.clone(),
            p10: r.npv.percentiles.p10,
            p25: r.npv.percentiles.p25,
            p50: r.npv.percentiles.p50,
            p75: r.npv.percentiles.p75,
            p90: r.npv.percentiles.p90,
            mean: r.npv.mean,
        })
        .collect();
    bands.sort_by(|a, b| b.p50.total_cmp(&a.p50));
    bands
}

/// Run every listed scenario and rank them.
///
/// Scenario `k` in the list is seeded with `trial_seed(seed, k)`, giving each
/// scenario its own stream.
pub fn compare_scenarios(
    input: &ScenarioComparisonInput,
) -> ImpactResult<ComputationOutput<ScenarioComparisonOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_num_trials(input.num_trials)?;
    if input.scenarios.is_empty() {
        return Err(ImpactError::InsufficientData(
            "At least one scenario is required".into(),
        ));
    }
    // Resolve everything up front so a bad name fails before any trial runs.
    let resolved = input
        .scenarios
        .iter()
        .map(|s| resolve_named(s))
        .collect::<ImpactResult<Vec<_>>>()?;

    let seed = input.seed.unwrap_or_else(|| StdRng::from_entropy().gen());
    warnings.extend(parallel_warning(input.parallel));

    let mut results = Vec::with_capacity(resolved.len());
    for (k, scenario) in resolved.iter().enumerate() {
        let result = run_resolved(
            scenario,
            input.num_trials,
            trial_seed(seed, k as u64),
            input.parallel,
        )?;
        warnings.extend(result_warnings(&result));
        results.push(result);
    }

    let scores: Vec<_> = results.iter().map(AggregatedResult::score).collect();
    let ranking = rank_scenarios(&scores)?;
    let bands = confidence_bands(&results);

    let output = ScenarioComparisonOutput {
        results,
        confidence_bands: bands,
        ranking,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monte Carlo comparison of AI tool adoption scenarios ranked by CV, mean NPV and reward-to-risk",
        &serde_json::json!({
            "scenarios": input.scenarios,
            "num_trials": input.num_trials,
            "seed": seed,
            "parallel": input.parallel,
            "annual_discount_rate": ANNUAL_DISCOUNT_RATE,
        }),
        warnings,
        elapsed,
        output,
    ))
}
