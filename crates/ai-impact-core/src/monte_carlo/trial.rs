use serde::{Deserialize, Serialize};

use crate::error::ImpactError;
use crate::models::adoption::AdoptionParameters;
use crate::models::baseline::BaselineProfile;
use crate::models::cost::{CostBreakdown, CostParameters};
use crate::models::impact::{total_impact, ImpactParameters};
use crate::time_value::{
    breakeven_month, cumulative, monthly_net_npv, roi_percent, MONTHS_PER_YEAR,
};
use crate::types::{Money, MonthlySeries};
use crate::ImpactResult;

use super::perturbation::Multipliers;

/// Numeric code standing in for "payback not reached" in display output.
pub const PAYBACK_NOT_REACHED_CODE: u32 = 999;

/// Month in which cumulative value first covers cumulative cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "month", rename_all = "snake_case")]
pub enum Payback {
    Reached(u32),
    NotReached,
}

impl Payback {
    pub fn month(&self) -> Option<u32> {
        match self {
            Payback::Reached(m) => Some(*m),
            Payback::NotReached => None,
        }
    }

    pub fn is_reached(&self) -> bool {
        matches!(self, Payback::Reached(_))
    }

    /// Presentation form: the month, or 999 when never reached.
    pub fn display_code(&self) -> u32 {
        self.month().unwrap_or(PAYBACK_NOT_REACHED_CODE)
    }
}

/// Scalar reduction of one trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    pub npv: Money,
    pub roi_percent: f64,
    pub payback: Payback,
    /// Maximum of the raw adoption curve, in [0, 1].
    pub peak_adoption: f64,
}

/// What went into one trial: its multiplier draw and undiscounted totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialDrivers {
    pub multipliers: Multipliers,
    pub total_value: Money,
    pub total_cost: Money,
}

/// One trial's outcome alongside its drivers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub outcome: TrialOutcome,
    pub drivers: TrialDrivers,
}

/// Every monthly series computed for one trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialTrace {
    pub adoption: MonthlySeries,
    pub efficiency: MonthlySeries,
    pub effective_adoption: MonthlySeries,
    pub costs: CostBreakdown,
    pub monthly_value: MonthlySeries,
    pub cumulative_value: MonthlySeries,
}

impl TrialTrace {
    pub fn total_value(&self) -> Money {
        self.monthly_value.iter().sum()
    }

    pub fn total_cost(&self) -> Money {
        self.costs.total.iter().sum()
    }
}

/// Run the three sub-models for one perturbed configuration set and keep
/// the monthly series alongside the outcome.
pub fn trace_trial(
    baseline: &BaselineProfile,
    adoption: &AdoptionParameters,
    impact: &ImpactParameters,
    cost: &CostParameters,
    months: usize,
) -> ImpactResult<(TrialTrace, TrialOutcome)> {
    let adoption_curve = adoption.adoption_curve(months);
    let efficiency = adoption.efficiency_curve(months);
    let effective_adoption: MonthlySeries = adoption_curve
        .iter()
        .zip(&efficiency)
        .map(|(a, e)| a * e)
        .collect();

    let costs = cost.total_costs(baseline, months, &effective_adoption)?;

    let monthly_value = effective_adoption
        .iter()
        .map(|level| -> ImpactResult<Money> {
            let annual = total_impact(baseline, impact, *level)?.total_annual_value;
            Ok(annual / MONTHS_PER_YEAR as f64)
        })
        .collect::<ImpactResult<MonthlySeries>>()?;
    let cumulative_value = cumulative(&monthly_value);

    let outcome = reduce(&monthly_value, &costs.total, &costs.cumulative, &adoption_curve)?;

    let trace = TrialTrace {
        adoption: adoption_curve,
        efficiency,
        effective_adoption,
        costs,
        monthly_value,
        cumulative_value,
    };
    Ok((trace, outcome))
}

/// Outcome of one trial; see [`trace_trial`] for the monthly detail.
pub fn simulate_trial(
    baseline: &BaselineProfile,
    adoption: &AdoptionParameters,
    impact: &ImpactParameters,
    cost: &CostParameters,
    months: usize,
) -> ImpactResult<TrialOutcome> {
    trace_trial(baseline, adoption, impact, cost, months).map(|(_, outcome)| outcome)
}

/// Reduce a trial's monthly series to NPV, ROI, payback and peak adoption.
pub fn reduce(
    monthly_value: &[Money],
    monthly_cost: &[Money],
    cumulative_cost: &[Money],
    adoption_curve: &[f64],
) -> ImpactResult<TrialOutcome> {
    let months = monthly_value.len();
    if monthly_cost.len() != months
        || cumulative_cost.len() != months
        || adoption_curve.len() != months
    {
        return Err(ImpactError::ModelFailure {
            model: "trial".into(),
            reason: format!(
                "series lengths differ: value {}, cost {}, cumulative cost {}, adoption {}",
                months,
                monthly_cost.len(),
                cumulative_cost.len(),
                adoption_curve.len()
            ),
        });
    }

    let npv = monthly_net_npv(monthly_value, monthly_cost)?;

    let total_value: Money = monthly_value.iter().sum();
    let total_cost: Money = monthly_cost.iter().sum();
    let roi = roi_percent(total_value, total_cost);

    let cumulative_value = cumulative(monthly_value);
    let payback = match breakeven_month(&cumulative_value, cumulative_cost) {
        Some(m) => Payback::Reached(m as u32),
        None => Payback::NotReached,
    };

    let peak_adoption = adoption_curve.iter().copied().fold(0.0_f64, f64::max);

    Ok(TrialOutcome {
        npv,
        roi_percent: roi,
        payback,
        peak_adoption,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::resolver::resolve_named;

    #[test]
    fn test_zero_cost_roi_is_zero() {
        let value = [10.0, 20.0, 30.0];
        let cost = [0.0, 0.0, 0.0];
        let out = reduce(&value, &cost, &cost, &[0.1, 0.2, 0.3]).unwrap();
        assert_eq!(out.roi_percent, 0.0);
        assert_eq!(out.payback, Payback::Reached(0));
    }

    #[test]
    fn test_npv_discounts_from_month_zero() {
        let rate: f64 = 0.10 / 12.0;
        let value = [100.0, 100.0];
        let cost = [40.0, 40.0];
        let out = reduce(&value, &cost, &[40.0, 80.0], &[0.5, 0.5]).unwrap();
        let expected = 60.0 + 60.0 / (1.0 + rate);
        assert!((out.npv - expected).abs() < 1e-9, "npv={}", out.npv);
    }

    #[test]
    fn test_payback_not_reached() {
        let value = [1.0, 1.0, 1.0];
        let cost = [5.0, 5.0, 5.0];
        let out = reduce(&value, &cost, &[5.0, 10.0, 15.0], &[0.1, 0.1, 0.1]).unwrap();
        assert_eq!(out.payback, Payback::NotReached);
        assert_eq!(out.payback.display_code(), PAYBACK_NOT_REACHED_CODE);
        assert_eq!(out.payback.month(), None);
    }

    #[test]
    fn test_payback_first_crossing() {
        let value = [0.0, 50.0, 100.0, 100.0];
        let cost = [60.0, 30.0, 30.0, 30.0];
        let cum_cost = cumulative(&cost);
        let out = reduce(&value, &cost, &cum_cost, &[0.0; 4]).unwrap();
        // cumulative value 0, 50, 150; cumulative cost 60, 90, 120
        assert_eq!(out.payback, Payback::Reached(2));
    }

    #[test]
    fn test_peak_uses_raw_adoption() {
        let out = reduce(&[0.0; 3], &[1.0; 3], &[1.0, 2.0, 3.0], &[0.2, 0.7, 0.6]).unwrap();
        assert_eq!(out.peak_adoption, 0.7);
    }

    #[test]
    fn test_mismatched_series_fail() {
        assert!(reduce(&[1.0; 3], &[1.0; 2], &[1.0; 3], &[0.1; 3]).is_err());
    }

    #[test]
    fn test_trace_series_share_length() {
        let s = resolve_named("moderate_enterprise").unwrap();
        let (trace, outcome) =
            trace_trial(&s.baseline, &s.adoption, &s.impact, &s.cost, s.months).unwrap();
        for series in [
            &trace.adoption,
            &trace.efficiency,
            &trace.effective_adoption,
            &trace.costs.total,
            &trace.monthly_value,
            &trace.cumulative_value,
        ] {
            assert_eq!(series.len(), 36);
        }
        assert!((0.0..=1.0).contains(&outcome.peak_adoption));
        let expected_peak = trace.adoption.iter().copied().fold(0.0, f64::max);
        assert_eq!(outcome.peak_adoption, expected_peak);
    }

    #[test]
    fn test_payback_consistent_with_trace() {
        let s = resolve_named("aggressive_startup").unwrap();
        let (trace, outcome) =
            trace_trial(&s.baseline, &s.adoption, &s.impact, &s.cost, s.months).unwrap();
        let first = trace
            .cumulative_value
            .iter()
            .zip(&trace.costs.cumulative)
            .position(|(v, c)| v >= c);
        assert_eq!(outcome.payback.month().map(|m| m as usize), first);
    }

    #[test]
    fn test_payback_serde_shape() {
        let json = serde_json::to_value(Payback::Reached(4)).unwrap();
        assert_eq!(json, serde_json::json!({"status": "reached", "month": 4}));
        let json = serde_json::to_value(Payback::NotReached).unwrap();
        assert_eq!(json, serde_json::json!({"status": "not_reached"}));
    }
}
