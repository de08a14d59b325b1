use serde::{Deserialize, Serialize};

use crate::error::ImpactError;
use crate::types::infinite_as_null;
use crate::ImpactResult;

/// Risk and return figures for one scenario's NPV distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioScore {
    pub scenario: String,
    pub mean_npv: f64,
    pub std_npv: f64,
    /// `std / |mean|`, infinite when the mean is zero. Lower is more reliable.
    #[serde(with = "infinite_as_null")]
    pub coefficient_of_variation: f64,
    /// `mean / std`, zero when the standard deviation is zero.
    pub reward_to_risk: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPick {
    pub scenario: String,
    /// Infinite when every candidate has a zero mean NPV.
    #[serde(with = "infinite_as_null")]
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRanking {
    pub most_reliable: RankedPick,
    pub highest_expected_value: RankedPick,
    pub best_risk_adjusted: RankedPick,
}

/// Best entry under `better`; ties keep the earliest one.
fn select<F>(scores: &[ScenarioScore], metric: F, better: fn(f64, f64) -> bool) -> RankedPick
where
    F: Fn(&ScenarioScore) -> f64,
{
    let mut best = 0;
    for (i, s) in scores.iter().enumerate().skip(1) {
        if better(metric(s), metric(&scores[best])) {
            best = i;
        }
    }
    RankedPick {
        scenario: scores[best].scenario.clone(),
        value: metric(&scores[best]),
    }
}

/// Pick the most reliable, highest expected value and best risk-adjusted
/// scenarios. Input order decides ties, so callers should pass a stable order.
pub fn rank_scenarios(scores: &[ScenarioScore]) -> ImpactResult<ScenarioRanking> {
    if scores.is_empty() {
        return Err(ImpactError::InsufficientData(
            "At least one scenario is required for ranking".into(),
        ));
    }

    Ok(ScenarioRanking {
        most_reliable: select(scores, |s| s.coefficient_of_variation, |a, b| a < b),
        highest_expected_value: select(scores, |s| s.mean_npv, |a, b| a > b),
        best_risk_adjusted: select(scores, |s| s.reward_to_risk, |a, b| a > b),
    })
}
