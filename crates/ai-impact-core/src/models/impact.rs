use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::baseline::BaselineProfile;
use super::{check_non_negative, check_ratio, WORKING_DAYS_PER_YEAR, WORKING_HOURS_PER_YEAR};
use crate::error::ImpactError;
use crate::types::{Money, Rate};
use crate::ImpactResult;

const BUGS_PER_INCIDENT: f64 = 3.0;
const HOURS_PER_DEFECT_FIX: f64 = 10.0;
const KLOC_PER_TEAM_PER_YEAR: f64 = 100.0;
const ANNUAL_TURNOVER: f64 = 0.20;
const TECH_DEBT_MULTIPLIER: f64 = 1.5;
const CONTEXT_SWITCH_SHARE: f64 = 0.05;
const RETENTION_SHARE: f64 = 0.01;
const INNOVATION_SHARE: f64 = 0.10;
const COMPETITIVE_SHARE: f64 = 0.10;
const JUNIOR_EFFECTIVENESS_BOOST: f64 = 0.20;

/// Expected strength of the productivity effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    Conservative,
    Moderate,
    Aggressive,
}

impl ImpactLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactLevel::Conservative => "conservative",
            ImpactLevel::Moderate => "moderate",
            ImpactLevel::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImpactLevel {
    type Err = ImpactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "conservative" => Ok(ImpactLevel::Conservative),
            "moderate" => Ok(ImpactLevel::Moderate),
            "aggressive" => Ok(ImpactLevel::Aggressive),
            other => Err(ImpactError::InvalidInput {
                field: "impact_level".into(),
                reason: format!("'{other}' is not one of conservative, moderate, aggressive"),
            }),
        }
    }
}

/// Improvement factors at full adoption. Reductions are fractions of the
/// baseline value (0.3 = 30% less); capacity gains are percentage points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactParameters {
    pub feature_cycle_reduction: Rate,
    pub bug_fix_reduction: Rate,
    pub onboarding_reduction: Rate,
    pub pr_review_reduction: Rate,

    pub defect_reduction: Rate,
    pub incident_reduction: Rate,
    pub rework_reduction: Rate,

    pub feature_capacity_gain: Rate,
    pub tech_debt_capacity_gain: Rate,

    pub boilerplate_effectiveness: Rate,
    pub test_generation_effectiveness: Rate,
    pub documentation_effectiveness: Rate,
    pub code_review_effectiveness: Rate,
    pub debugging_effectiveness: Rate,

    pub junior_multiplier: f64,
    pub mid_multiplier: f64,
    pub senior_multiplier: f64,
}

/// Annualised value created at one adoption level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactBreakdown {
    pub time_value: Money,
    pub quality_value: Money,
    pub capacity_value: Money,
    pub strategic_value: Money,
    pub total_annual_value: Money,
    pub value_per_developer: Money,
    pub value_as_percent_of_cost: f64,
}

impl ImpactParameters {
    pub fn validate(&self) -> ImpactResult<()> {
        for (field, v) in [
            ("feature_cycle_reduction", self.feature_cycle_reduction),
            ("bug_fix_reduction", self.bug_fix_reduction),
            ("onboarding_reduction", self.onboarding_reduction),
            ("pr_review_reduction", self.pr_review_reduction),
            ("defect_reduction", self.defect_reduction),
            ("incident_reduction", self.incident_reduction),
            ("rework_reduction", self.rework_reduction),
            ("feature_capacity_gain", self.feature_capacity_gain),
            ("tech_debt_capacity_gain", self.tech_debt_capacity_gain),
            ("boilerplate_effectiveness", self.boilerplate_effectiveness),
            ("test_generation_effectiveness", self.test_generation_effectiveness),
            ("documentation_effectiveness", self.documentation_effectiveness),
            ("code_review_effectiveness", self.code_review_effectiveness),
            ("debugging_effectiveness", self.debugging_effectiveness),
        ] {
            check_ratio(field, v)?;
        }
        check_non_negative("junior_multiplier", self.junior_multiplier)?;
        check_non_negative("mid_multiplier", self.mid_multiplier)?;
        check_non_negative("senior_multiplier", self.senior_multiplier)?;
        Ok(())
    }
}

/// Business value of the tool at a given effective adoption level.
///
/// Fails with `ModelFailure` if the adoption level would push the feature
/// cycle time to zero or below, or if any value is not finite.
pub fn total_impact(
    baseline: &BaselineProfile,
    impact: &ImpactParameters,
    adoption_level: f64,
) -> ImpactResult<ImpactBreakdown> {
    let team = baseline.team_size as f64;
    let wflc = baseline.weighted_avg_flc();
    let team_cost = baseline.total_team_cost();

    // Time to value
    let new_cycle_days =
        baseline.avg_feature_cycle_days * (1.0 - impact.feature_cycle_reduction * adoption_level);
    if new_cycle_days <= 0.0 {
        return Err(ImpactError::ModelFailure {
            model: "impact".into(),
            reason: format!(
                "feature cycle time collapses to {new_cycle_days:.3} days at adoption {adoption_level:.3}"
            ),
        });
    }
    let new_features_per_dev =
        WORKING_DAYS_PER_YEAR / new_cycle_days * baseline.new_feature_percentage;
    let additional_features = (new_features_per_dev - baseline.feature_delivery_rate()) * team;
    let feature_value = additional_features * baseline.cost_per_feature();

    let bug_fix_hours_saved =
        baseline.avg_bug_fix_hours * impact.bug_fix_reduction * adoption_level;
    let annual_bugs = baseline.production_incidents_per_month * 12.0 * BUGS_PER_INCIDENT;
    let bug_fix_value = (bug_fix_hours_saved / 8.0) * (baseline.avg_incident_cost / 10.0) * annual_bugs;

    let onboarding_days_saved =
        baseline.onboarding_days * impact.onboarding_reduction * adoption_level;
    let onboarding_value =
        onboarding_days_saved / WORKING_DAYS_PER_YEAR * wflc * team * ANNUAL_TURNOVER;

    let time_value = feature_value + bug_fix_value + onboarding_value;

    // Quality
    let defects_avoided = baseline.defect_escape_rate * impact.defect_reduction * adoption_level;
    let defect_value = defects_avoided
        * HOURS_PER_DEFECT_FIX
        * (wflc / WORKING_HOURS_PER_YEAR)
        * KLOC_PER_TEAM_PER_YEAR;
    let incident_value = baseline.production_incidents_per_month
        * impact.incident_reduction
        * adoption_level
        * 12.0
        * baseline.avg_incident_cost;
    let rework_value =
        team_cost * baseline.rework_percentage * impact.rework_reduction * adoption_level;
    let quality_value = defect_value + incident_value + rework_value;

    // Capacity reallocation
    let capacity_value = impact.feature_capacity_gain * adoption_level * team_cost
        + impact.tech_debt_capacity_gain * adoption_level * team_cost * TECH_DEBT_MULTIPLIER
        + team_cost * CONTEXT_SWITCH_SHARE * adoption_level;

    // Strategic
    let retention_value = wflc * RETENTION_SHARE * adoption_level * team;
    let innovation_hours = baseline.effective_capacity_hours() * INNOVATION_SHARE * adoption_level;
    let innovation_value = innovation_hours / WORKING_HOURS_PER_YEAR * wflc * team;
    let competitive_value = feature_value * COMPETITIVE_SHARE;
    let junior_boost = baseline.junior_ratio
        * team
        * (impact.junior_multiplier - 1.0)
        * adoption_level
        * baseline.junior_flc
        * JUNIOR_EFFECTIVENESS_BOOST;
    let strategic_value = retention_value + innovation_value + competitive_value + junior_boost;

    let total_annual_value = time_value + quality_value + capacity_value + strategic_value;
    if !total_annual_value.is_finite() {
        return Err(ImpactError::ModelFailure {
            model: "impact".into(),
            reason: format!("non-finite annual value at adoption {adoption_level}"),
        });
    }

    Ok(ImpactBreakdown {
        time_value,
        quality_value,
        capacity_value,
        strategic_value,
        total_annual_value,
        value_per_developer: total_annual_value / team,
        value_as_percent_of_cost: total_annual_value / team_cost * 100.0,
    })
}

pub fn create_impact_scenario(level: ImpactLevel) -> ImpactParameters {
    match level {
        ImpactLevel::Conservative => ImpactParameters {
            feature_cycle_reduction: 0.10,
            bug_fix_reduction: 0.15,
            onboarding_reduction: 0.20,
            pr_review_reduction: 0.30,
            defect_reduction: 0.15,
            incident_reduction: 0.10,
            rework_reduction: 0.20,
            feature_capacity_gain: 0.05,
            tech_debt_capacity_gain: 0.02,
            boilerplate_effectiveness: 0.70,
            test_generation_effectiveness: 0.50,
            documentation_effectiveness: 0.60,
            code_review_effectiveness: 0.40,
            debugging_effectiveness: 0.30,
            junior_multiplier: 1.3,
            mid_multiplier: 1.2,
            senior_multiplier: 1.1,
        },
        ImpactLevel::Moderate => ImpactParameters {
            feature_cycle_reduction: 0.25,
            bug_fix_reduction: 0.35,
            onboarding_reduction: 0.40,
            pr_review_reduction: 0.50,
            defect_reduction: 0.30,
            incident_reduction: 0.25,
            rework_reduction: 0.40,
            feature_capacity_gain: 0.10,
            tech_debt_capacity_gain: 0.05,
            boilerplate_effectiveness: 0.85,
            test_generation_effectiveness: 0.70,
            documentation_effectiveness: 0.80,
            code_review_effectiveness: 0.60,
            debugging_effectiveness: 0.50,
            junior_multiplier: 1.5,
            mid_multiplier: 1.3,
            senior_multiplier: 1.2,
        },
        ImpactLevel::Aggressive => ImpactParameters {
            feature_cycle_reduction: 0.40,
            bug_fix_reduction: 0.50,
            onboarding_reduction: 0.60,
            pr_review_reduction: 0.70,
            defect_reduction: 0.45,
            incident_reduction: 0.40,
            rework_reduction: 0.60,
            feature_capacity_gain: 0.15,
            tech_debt_capacity_gain: 0.08,
            boilerplate_effectiveness: 0.95,
            test_generation_effectiveness: 0.85,
            documentation_effectiveness: 0.90,
            code_review_effectiveness: 0.75,
            debugging_effectiveness: 0.70,
            junior_multiplier: 1.8,
            mid_multiplier: 1.5,
            senior_multiplier: 1.3,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::baseline::{create_baseline, CompanyProfile};

    #[test]
    fn test_levels_validate() {
        for level in [
            ImpactLevel::Conservative,
            ImpactLevel::Moderate,
            ImpactLevel::Aggressive,
        ] {
            create_impact_scenario(level).validate().unwrap();
        }
    }

    #[test]
    fn test_zero_adoption_creates_no_value() {
        let baseline = create_baseline(CompanyProfile::Enterprise);
        let impact = create_impact_scenario(ImpactLevel::Moderate);
        let out = total_impact(&baseline, &impact, 0.0).unwrap();
        assert!(out.total_annual_value.abs() < 1e-6, "value={}", out.total_annual_value);
    }

    #[test]
    fn test_value_increases_with_adoption() {
        let baseline = create_baseline(CompanyProfile::Startup);
        let impact = create_impact_scenario(ImpactLevel::Aggressive);
        let low = total_impact(&baseline, &impact, 0.2).unwrap();
        let high = total_impact(&baseline, &impact, 0.8).unwrap();
        assert!(high.total_annual_value > low.total_annual_value);
        assert!(low.total_annual_value > 0.0);
    }

    #[test]
    fn test_components_sum_to_total() {
        let baseline = create_baseline(CompanyProfile::Scaleup);
        let impact = create_impact_scenario(ImpactLevel::Conservative);
        let out = total_impact(&baseline, &impact, 0.5).unwrap();
        let sum = out.time_value + out.quality_value + out.capacity_value + out.strategic_value;
        assert!((sum - out.total_annual_value).abs() < 1e-6);
    }

    #[test]
    fn test_collapsed_cycle_time_is_model_failure() {
        let baseline = create_baseline(CompanyProfile::Startup);
        let mut impact = create_impact_scenario(ImpactLevel::Aggressive);
        impact.feature_cycle_reduction = 1.0;
        let err = total_impact(&baseline, &impact, 1.0).unwrap_err();
        assert!(matches!(err, ImpactError::ModelFailure { .. }));
    }
}
