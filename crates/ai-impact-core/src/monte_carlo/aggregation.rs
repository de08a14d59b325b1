use serde::{Deserialize, Serialize};

use crate::error::ImpactError;
use crate::scenarios::ranking::ScenarioScore;
use crate::types::{infinite_as_null, Money};
use crate::ImpactResult;

use super::trial::{Payback, TrialOutcome, TrialRecord};

/// Absolute NPV threshold for `p_npv_above_1m`.
pub const NPV_THRESHOLD: Money = 1_000_000.0;
/// ROI threshold, in percent, for `p_roi_above_100`.
pub const ROI_THRESHOLD_PERCENT: f64 = 100.0;
/// Payback must happen strictly before this month for `p_payback_under_6_months`.
pub const FAST_PAYBACK_MONTHS: u32 = 6;

const MAX_HISTOGRAM_BINS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p5: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
}

/// Descriptive statistics for one metric across trials.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub percentiles: Percentiles,
    /// Population skewness, 0 for a constant sample.
    pub skewness: f64,
    /// Population excess kurtosis, 0 for a constant sample.
    pub kurtosis: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u32,
    pub frequency: f64,
}

/// Empirical frequencies over all trials. Each is `count / N`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityMetrics {
    pub p_npv_positive: f64,
    pub p_roi_above_100: f64,
    pub p_payback_under_6_months: f64,
    pub p_npv_above_1m: f64,
    pub p_no_payback: f64,
}

/// Pearson correlation of one sampled multiplier with NPV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterCorrelation {
    pub parameter: String,
    pub correlation: f64,
}

/// Which perturbed inputs move NPV, plus the value and cost totals behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityAnalysis {
    /// In draw order. Multipliers that never varied are left out.
    pub correlations: Vec<ParameterCorrelation>,
    /// Same entries by absolute correlation, strongest first.
    pub importance: Vec<ParameterCorrelation>,
    /// Undiscounted value over the horizon, per trial.
    pub total_value: MetricSummary,
    /// Undiscounted cost over the horizon, per trial.
    pub total_cost: MetricSummary,
}

/// Outcome distribution of one scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub scenario: String,
    pub months: usize,
    pub num_trials: usize,
    pub npvs: Vec<Money>,
    pub rois: Vec<f64>,
    pub paybacks: Vec<Payback>,
    pub peak_adoptions: Vec<f64>,
    pub npv: MetricSummary,
    pub roi: MetricSummary,
    pub peak_adoption: MetricSummary,
    /// Over trials that reached payback; `None` when none did.
    pub payback_months: Option<MetricSummary>,
    pub payback_histogram: Vec<HistogramBin>,
    pub probabilities: ProbabilityMetrics,
    /// Infinite when mean NPV is exactly zero (serialised as `null`).
    #[serde(with = "infinite_as_null")]
    pub coefficient_of_variation: f64,
    pub reward_to_risk: f64,
    /// Present when the trials carried their drivers, see [`aggregate_trials`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<SensitivityAnalysis>,
}

impl AggregatedResult {
    /// Payback months with "not reached" shown as 999.
    pub fn paybacks_display(&self) -> Vec<u32> {
        self.paybacks.iter().map(Payback::display_code).collect()
    }

    /// Per-trial outcomes in trial order.
    pub fn outcomes(&self) -> Vec<TrialOutcome> {
        (0..self.num_trials)
            .map(|i| TrialOutcome {
                npv: self.npvs[i],
                roi_percent: self.rois[i],
                payback: self.paybacks[i],
                peak_adoption: self.peak_adoptions[i],
            })
            .collect()
    }

    pub fn score(&self) -> ScenarioScore {
        ScenarioScore {
            scenario: self.scenario.clone(),
            mean_npv: self.npv.mean,
            std_npv: self.npv.std_dev,
            coefficient_of_variation: self.coefficient_of_variation,
            reward_to_risk: self.reward_to_risk,
        }
    }
}

/// Compute the percentile value from a **sorted** slice using linear interpolation.
pub(crate) fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = rank - lower as f64;
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

/// Build a histogram with `num_bins` equal-width bins over a sorted, non-empty slice.
fn build_histogram(sorted: &[f64], num_bins: usize) -> Vec<HistogramBin> {
    let min_val = sorted[0];
    let max_val = sorted[sorted.len() - 1];

    if (max_val - min_val).abs() < f64::EPSILON {
        return vec![HistogramBin {
            lower: min_val,
            upper: max_val,
            count: sorted.len() as u32,
            frequency: 1.0,
        }];
    }

    let bin_width = (max_val - min_val) / num_bins as f64;
    let n = sorted.len() as f64;

    let mut bins: Vec<HistogramBin> = (0..num_bins)
        .map(|i| {
            let lower = min_val + i as f64 * bin_width;
            let upper = if i == num_bins - 1 {
                max_val
            } else {
                min_val + (i + 1) as f64 * bin_width
            };
            HistogramBin {
                lower,
                upper,
                count: 0,
                frequency: 0.0,
            }
        })
        .collect();

    for &val in sorted {
        let idx = (((val - min_val) / bin_width).floor() as usize).min(num_bins - 1);
        bins[idx].count += 1;
    }

    for bin in &mut bins {
        bin.frequency = bin.count as f64 / n;
    }

    bins
}

/// Histogram of payback months: one `[m, m+1)` bin per month while the span
/// fits in `MAX_HISTOGRAM_BINS`, equal-width bins beyond that.
fn month_histogram(sorted: &[f64]) -> Vec<HistogramBin> {
    let first = sorted[0];
    let span = (sorted[sorted.len() - 1] - first) as usize + 1;
    if span > MAX_HISTOGRAM_BINS {
        return build_histogram(sorted, MAX_HISTOGRAM_BINS);
    }

    let n = sorted.len() as f64;
    let mut counts = vec![0_u32; span];
    for &val in sorted {
        counts[(val - first) as usize] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let lower = first + i as f64;
            HistogramBin {
                lower,
                upper: lower + 1.0,
                count,
                frequency: count as f64 / n,
            }
        })
        .collect()
}

/// Summary statistics; `None` for an empty slice.
pub fn summarize(values: &[f64]) -> Option<MetricSummary> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len() as f64;

    let mean = sorted.iter().sum::<f64>() / n;
    let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    // Population moments
    let (skewness, kurtosis) = if std_dev > f64::EPSILON {
        let moment = |k: i32| {
            sorted
                .iter()
                .map(|v| ((v - mean) / std_dev).powi(k))
                .sum::<f64>()
                / n
        };
        (moment(3), moment(4) - 3.0)
    } else {
        (0.0, 0.0)
    };

    Some(MetricSummary {
        count: sorted.len(),
        mean,
        median: percentile_sorted(&sorted, 50.0),
        std_dev,
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        percentiles: Percentiles {
            p5: percentile_sorted(&sorted, 5.0),
            p10: percentile_sorted(&sorted, 10.0),
            p25: percentile_sorted(&sorted, 25.0),
            p50: percentile_sorted(&sorted, 50.0),
            p75: percentile_sorted(&sorted, 75.0),
            p90: percentile_sorted(&sorted, 90.0),
            p95: percentile_sorted(&sorted, 95.0),
        },
        skewness,
        kurtosis,
    })
}

/// `std / |mean|`, or `+inf` when the mean is exactly zero.
pub fn coefficient_of_variation(mean: f64, std_dev: f64) -> f64 {
    if mean == 0.0 {
        f64::INFINITY
    } else {
        std_dev / mean.abs()
    }
}

/// `mean / std`, or `0` when the standard deviation is exactly zero.
pub fn reward_to_risk(mean: f64, std_dev: f64) -> f64 {
    if std_dev == 0.0 {
        0.0
    } else {
        mean / std_dev
    }
}

/// Pearson correlation, `None` when either series is constant.
pub fn pearson_correlation(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.is_empty() {
        return None;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x <= 0.0 || var_y <= 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

fn fraction<T>(items: &[T], pred: impl Fn(&T) -> bool) -> f64 {
    items.iter().filter(|x| pred(x)).count() as f64 / items.len() as f64
}

/// Reduce an ordered sequence of trial outcomes into an [`AggregatedResult`].
pub fn aggregate(
    scenario: &str,
    months: usize,
    outcomes: &[TrialOutcome],
) -> ImpactResult<AggregatedResult> {
    let insufficient =
        || ImpactError::InsufficientData(format!("No trial outcomes to aggregate for {scenario}"));

    let npvs: Vec<Money> = outcomes.iter().map(|o| o.npv).collect();
    let rois: Vec<f64> = outcomes.iter().map(|o| o.roi_percent).collect();
    let paybacks: Vec<Payback> = outcomes.iter().map(|o| o.payback).collect();
    let peak_adoptions: Vec<f64> = outcomes.iter().map(|o| o.peak_adoption).collect();

    let npv = summarize(&npvs).ok_or_else(insufficient)?;
    let roi = summarize(&rois).ok_or_else(insufficient)?;
    let peak_adoption = summarize(&peak_adoptions).ok_or_else(insufficient)?;

    // Timing statistics only see trials that actually paid back.
    let mut reached: Vec<f64> = paybacks
        .iter()
        .filter_map(Payback::month)
        .map(f64::from)
        .collect();
    let payback_months = summarize(&reached);
    let payback_histogram = if reached.is_empty() {
        Vec::new()
    } else {
        reached.sort_by(|a, b| a.total_cmp(b));
        month_histogram(&reached)
    };

    let probabilities = ProbabilityMetrics {
        p_npv_positive: fraction(&npvs, |v| *v > 0.0),
        p_roi_above_100: fraction(&rois, |v| *v > ROI_THRESHOLD_PERCENT),
        p_payback_under_6_months: fraction(&paybacks, |p| {
            p.month().is_some_and(|m| m < FAST_PAYBACK_MONTHS)
        }),
        p_npv_above_1m: fraction(&npvs, |v| *v > NPV_THRESHOLD),
        p_no_payback: fraction(&paybacks, |p| !p.is_reached()),
    };

    Ok(AggregatedResult {
        scenario: scenario.to_string(),
        months,
        num_trials: outcomes.len(),
        coefficient_of_variation: coefficient_of_variation(npv.mean, npv.std_dev),
        reward_to_risk: reward_to_risk(npv.mean, npv.std_dev),
        npvs,
        rois,
        paybacks,
        peak_adoptions,
        npv,
        roi,
        peak_adoption,
        payback_months,
        payback_histogram,
        probabilities,
        sensitivity: None,
    })
}

/// Sensitivity of NPV to each sampled multiplier, with value and cost totals.
pub fn sensitivity_analysis(records: &[TrialRecord]) -> Option<SensitivityAnalysis> {
    let npvs: Vec<f64> = records.iter().map(|r| r.outcome.npv).collect();
    let values: Vec<f64> = records.iter().map(|r| r.drivers.total_value).collect();
    let costs: Vec<f64> = records.iter().map(|r| r.drivers.total_cost).collect();
    let total_value = summarize(&values)?;
    let total_cost = summarize(&costs)?;

    let draws: Vec<_> = records.iter().map(|r| r.drivers.multipliers.named()).collect();
    let parameters = draws.first().map(|d| d.len()).unwrap_or(0);
    let correlations: Vec<ParameterCorrelation> = (0..parameters)
        .filter_map(|k| {
            let xs: Vec<f64> = draws.iter().map(|d| d[k].1).collect();
            pearson_correlation(&xs, &npvs).map(|correlation| ParameterCorrelation {
                parameter: draws[0][k].0.to_string(),
                correlation,
            })
        })
        .collect();

    let mut importance: Vec<ParameterCorrelation> = correlations
        .iter()
        .map(|c| ParameterCorrelation {
            parameter: c.parameter.clone(),
            correlation: c.correlation.abs(),
        })
        .collect();
    importance.sort_by(|a, b| b.correlation.total_cmp(&a.correlation));

    Some(SensitivityAnalysis {
        correlations,
        importance,
        total_value,
        total_cost,
    })
}

/// [`aggregate`] over full trial records, adding the sensitivity analysis.
pub fn aggregate_trials(
    scenario: &str,
    months: usize,
    records: &[TrialRecord],
) -> ImpactResult<AggregatedResult> {
    let outcomes: Vec<TrialOutcome> = records.iter().map(|r| r.outcome).collect();
    let mut result = aggregate(scenario, months, &outcomes)?;
    result.sensitivity = sensitivity_analysis(records);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monte_carlo::perturbation::Multipliers;
    use crate::monte_carlo::trial::TrialDrivers;

    fn outcome(npv: f64, payback: Payback) -> TrialOutcome {
        TrialOutcome {
            npv,
            roi_percent: npv / 1000.0,
            payback,
            peak_adoption: 0.5,
        }
    }

    #[test]
    fn test_percentile_sorted_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile_sorted(&sorted, 50.0), 3.0);
        assert!((percentile_sorted(&sorted, 10.0) - 1.4).abs() < 1e-12);
        assert!((percentile_sorted(&sorted, 90.0) - 4.6).abs() < 1e-12);
        assert_eq!(percentile_sorted(&[7.0], 25.0), 7.0);
    }

    #[test]
    fn test_three_of_ten_positive() {
        let outcomes: Vec<TrialOutcome> = (0..10)
            .map(|i| {
                let npv = if i < 3 { 100.0 } else { -100.0 };
                outcome(npv, Payback::NotReached)
            })
            .collect();
        let agg = aggregate("moderate_enterprise", 36, &outcomes).unwrap();
        assert_eq!(agg.probabilities.p_npv_positive, 0.3);
        assert_eq!(agg.probabilities.p_npv_above_1m, 0.0);
    }

    #[test]
    fn test_zero_std_gives_zero_reward_to_risk() {
        let outcomes = vec![outcome(5_000.0, Payback::Reached(3)); 4];
        let agg = aggregate("x", 24, &outcomes).unwrap();
        assert_eq!(agg.npv.std_dev, 0.0);
        assert_eq!(agg.reward_to_risk, 0.0);
        assert_eq!(agg.coefficient_of_variation, 0.0);
    }

    #[test]
    fn test_zero_mean_gives_infinite_cv() {
        let outcomes = vec![
            outcome(-10.0, Payback::NotReached),
            outcome(10.0, Payback::NotReached),
        ];
        let agg = aggregate("x", 24, &outcomes).unwrap();
        assert!(agg.coefficient_of_variation.is_infinite());
        assert!(agg.coefficient_of_variation > 0.0);
    }

    #[test]
    fn test_sentinel_excluded_from_payback_stats() {
        let outcomes = vec![
            outcome(1.0, Payback::Reached(2)),
            outcome(1.0, Payback::Reached(8)),
            outcome(1.0, Payback::NotReached),
            outcome(1.0, Payback::NotReached),
        ];
        let agg = aggregate("x", 24, &outcomes).unwrap();
        let pm = agg.payback_months.unwrap();
        assert_eq!(pm.count, 2);
        assert_eq!(pm.max, 8.0);
        assert_eq!(pm.mean, 5.0);
        assert_eq!(agg.probabilities.p_payback_under_6_months, 0.25);
        assert_eq!(agg.probabilities.p_no_payback, 0.5);
        let binned: u32 = agg.payback_histogram.iter().map(|b| b.count).sum();
        assert_eq!(binned, 2);
        assert_eq!(agg.payback_histogram.first().map(|b| b.lower), Some(2.0));
        assert_eq!(agg.payback_histogram.last().map(|b| b.upper), Some(9.0));
        assert_eq!(agg.paybacks_display(), vec![2, 8, 999, 999]);
    }

    #[test]
    fn test_no_payback_anywhere() {
        let outcomes = vec![outcome(-50.0, Payback::NotReached); 5];
        let agg = aggregate("x", 24, &outcomes).unwrap();
        assert!(agg.payback_months.is_none());
        assert!(agg.payback_histogram.is_empty());
        assert_eq!(agg.probabilities.p_payback_under_6_months, 0.0);
        assert_eq!(agg.probabilities.p_no_payback, 1.0);
    }

    #[test]
    fn test_payback_month_five_counts_as_fast() {
        let outcomes = vec![
            outcome(1.0, Payback::Reached(5)),
            outcome(1.0, Payback::Reached(6)),
        ];
        let agg = aggregate("x", 24, &outcomes).unwrap();
        assert_eq!(agg.probabilities.p_payback_under_6_months, 0.5);
    }

    #[test]
    fn test_empty_outcomes_rejected() {
        let err = aggregate("x", 24, &[]).unwrap_err();
        assert!(matches!(err, ImpactError::InsufficientData(_)));
    }

    #[test]
    fn test_outcomes_round_trip_in_order() {
        let outcomes = vec![
            outcome(3.0, Payback::Reached(1)),
            outcome(-2.0, Payback::NotReached),
            outcome(9.0, Payback::Reached(0)),
        ];
        let agg = aggregate("x", 24, &outcomes).unwrap();
        assert_eq!(agg.outcomes(), outcomes);
        assert_eq!(agg.npvs, vec![3.0, -2.0, 9.0]);
    }

    #[test]
    fn test_skewed_sample_moments() {
        // mean 2, population std 2, z-scores -0.5 x4 and 2
        let s = summarize(&[1.0, 1.0, 6.0, 1.0, 1.0]).unwrap();
        assert_eq!(s.mean, 2.0);
        assert_eq!(s.std_dev, 2.0);
        assert!((s.skewness - 1.5).abs() < 1e-12, "skewness={}", s.skewness);
        assert!((s.kurtosis - 0.25).abs() < 1e-12, "kurtosis={}", s.kurtosis);
        assert!((s.percentiles.p5 - 1.0).abs() < 1e-12, "p5={}", s.percentiles.p5);
        assert!((s.percentiles.p95 - 5.0).abs() < 1e-12, "p95={}", s.percentiles.p95);
    }

    #[test]
    fn test_constant_sample_has_zero_moments() {
        let s = summarize(&[3.0; 7]).unwrap();
        assert_eq!(s.skewness, 0.0);
        assert_eq!(s.kurtosis, 0.0);
        assert_eq!(s.percentiles.p5, 3.0);
        assert_eq!(s.percentiles.p95, 3.0);
    }

    #[test]
    fn test_payback_histogram_whole_month_bins() {
        let outcomes: Vec<TrialOutcome> = [2, 3, 3, 5, 8]
            .iter()
            .map(|m| outcome(1.0, Payback::Reached(*m)))
            .collect();
        let agg = aggregate("x", 24, &outcomes).unwrap();
        let bins = &agg.payback_histogram;
        assert_eq!(bins.len(), 7);
        for (i, b) in bins.iter().enumerate() {
            assert_eq!(b.lower, 2.0 + i as f64);
            assert_eq!(b.upper, b.lower + 1.0);
        }
        let counts: Vec<u32> = bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 2, 0, 1, 0, 0, 1]);
        assert_eq!(bins[1].frequency, 0.4);
    }

    #[test]
    fn test_payback_histogram_single_month() {
        let outcomes = vec![outcome(1.0, Payback::Reached(4)); 3];
        let agg = aggregate("x", 24, &outcomes).unwrap();
        assert_eq!(agg.payback_histogram.len(), 1);
        assert_eq!(agg.payback_histogram[0].lower, 4.0);
        assert_eq!(agg.payback_histogram[0].upper, 5.0);
        assert_eq!(agg.payback_histogram[0].count, 3);
    }

    #[test]
    fn test_payback_histogram_wide_span_uses_equal_bins() {
        let outcomes = vec![
            outcome(1.0, Payback::Reached(0)),
            outcome(1.0, Payback::Reached(30)),
        ];
        let agg = aggregate("x", 36, &outcomes).unwrap();
        assert_eq!(agg.payback_histogram.len(), MAX_HISTOGRAM_BINS);
        assert_eq!(agg.payback_histogram[0].count, 1);
        assert_eq!(agg.payback_histogram[MAX_HISTOGRAM_BINS - 1].count, 1);
    }

    #[test]
    fn test_infinite_cv_survives_json() {
        let outcomes = vec![
            outcome(-10.0, Payback::NotReached),
            outcome(10.0, Payback::Reached(1)),
        ];
        let agg = aggregate("x", 24, &outcomes).unwrap();
        let json = serde_json::to_string(&agg).unwrap();
        assert!(json.contains(r#""coefficient_of_variation":null"#));
        let back: AggregatedResult = serde_json::from_str(&json).unwrap();
        assert!(back.coefficient_of_variation.is_infinite());
        assert_eq!(back.npvs, agg.npvs);
        assert_eq!(back.paybacks, agg.paybacks);
    }

    fn record(npv: f64, impact: f64, seat_cost: f64) -> TrialRecord {
        TrialRecord {
            outcome: outcome(npv, Payback::NotReached),
            drivers: TrialDrivers {
                multipliers: Multipliers {
                    dropout_rate: 1.0,
                    learning_rate: 1.0,
                    plateau_efficiency: 1.0,
                    impact,
                    seat_cost,
                    token_price: 1.0,
                },
                total_value: npv + 100.0,
                total_cost: 100.0,
            },
        }
    }

    #[test]
    fn test_sensitivity_ranks_drivers() {
        // NPV rises with impact exactly, and falls weakly with seat cost.
        let records = vec![
            record(80.0, 0.8, 1.0),
            record(90.0, 0.9, 1.2),
            record(100.0, 1.0, 0.9),
            record(110.0, 1.1, 1.1),
            record(120.0, 1.2, 1.0),
        ];
        let agg = aggregate_trials("x", 24, &records).unwrap();
        let sens = agg.sensitivity.unwrap();

        // Constant multipliers carry no correlation.
        let names: Vec<&str> = sens.correlations.iter().map(|c| c.parameter.as_str()).collect();
        assert_eq!(names, vec!["impact", "cost_per_seat_month"]);
        assert!((sens.correlations[0].correlation - 1.0).abs() < 1e-12);
        assert!(sens.correlations[1].correlation.abs() < 1.0);

        assert_eq!(sens.importance[0].parameter, "impact");
        assert!(sens.importance.windows(2).all(|w| w[0].correlation >= w[1].correlation));
        assert!(sens.importance.iter().all(|c| c.correlation >= 0.0));

        assert_eq!(sens.total_value.mean, 200.0);
        assert_eq!(sens.total_cost.std_dev, 0.0);
    }

    #[test]
    fn test_plain_aggregate_has_no_sensitivity() {
        let agg = aggregate("x", 24, &[outcome(1.0, Payback::NotReached)]).unwrap();
        assert!(agg.sensitivity.is_none());
    }

    #[test]
    fn test_pearson_needs_variation() {
        assert_eq!(pearson_correlation(&[1.0, 1.0], &[2.0, 3.0]), None);
        assert_eq!(pearson_correlation(&[], &[]), None);
        let r = pearson_correlation(&[1.0, 2.0, 3.0], &[6.0, 4.0, 2.0]).unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_histogram_frequencies_sum_to_one() {
        let sorted: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let bins = build_histogram(&sorted, 20);
        assert_eq!(bins.len(), 20);
        let total: f64 = bins.iter().map(|b| b.frequency).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }
}
