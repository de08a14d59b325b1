use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{
    check_non_negative, check_positive, check_ratio, check_sums_to_one, WORKING_DAYS_PER_YEAR,
    WORKING_HOURS_PER_YEAR,
};
use crate::error::ImpactError;
use crate::types::{Money, Rate};
use crate::ImpactResult;

/// Organisation size class used to pick a baseline, cost base and horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyProfile {
    Startup,
    Enterprise,
    #[serde(alias = "scale_up")]
    Scaleup,
}

impl CompanyProfile {
    pub const ALL: [CompanyProfile; 3] = [
        CompanyProfile::Startup,
        CompanyProfile::Enterprise,
        CompanyProfile::Scaleup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyProfile::Startup => "startup",
            CompanyProfile::Enterprise => "enterprise",
            CompanyProfile::Scaleup => "scaleup",
        }
    }
}

impl fmt::Display for CompanyProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompanyProfile {
    type Err = ImpactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "startup" => Ok(CompanyProfile::Startup),
            "enterprise" => Ok(CompanyProfile::Enterprise),
            "scaleup" | "scale_up" => Ok(CompanyProfile::Scaleup),
            other => Err(ImpactError::UnknownScenario {
                scenario: other.to_string(),
                available: "startup, enterprise, scaleup".into(),
            }),
        }
    }
}

/// Pre-adoption state of the engineering organisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineProfile {
    pub team_size: u32,
    pub junior_ratio: Rate,
    pub mid_ratio: Rate,
    pub senior_ratio: Rate,

    /// Fully-loaded annual cost per developer, by seniority.
    pub junior_flc: Money,
    pub mid_flc: Money,
    pub senior_flc: Money,

    pub avg_feature_cycle_days: f64,
    pub avg_bug_fix_hours: f64,
    pub onboarding_days: f64,

    /// Escaped defects per 1000 lines of code.
    pub defect_escape_rate: f64,
    pub production_incidents_per_month: f64,
    pub avg_incident_cost: Money,
    pub rework_percentage: Rate,

    pub new_feature_percentage: Rate,
    pub maintenance_percentage: Rate,
    pub tech_debt_percentage: Rate,
    pub meetings_percentage: Rate,

    pub avg_pr_review_hours: f64,
    pub pr_rejection_rate: Rate,
}

impl BaselineProfile {
    pub fn validate(&self) -> ImpactResult<()> {
        if self.team_size == 0 {
            return Err(ImpactError::InvalidInput {
                field: "team_size".into(),
                reason: "Team must have at least one developer".into(),
            });
        }
        for (field, v) in [
            ("junior_ratio", self.junior_ratio),
            ("mid_ratio", self.mid_ratio),
            ("senior_ratio", self.senior_ratio),
            ("new_feature_percentage", self.new_feature_percentage),
            ("maintenance_percentage", self.maintenance_percentage),
            ("tech_debt_percentage", self.tech_debt_percentage),
            ("meetings_percentage", self.meetings_percentage),
        ] {
            check_ratio(field, v)?;
        }
        check_sums_to_one(
            "seniority ratios",
            &[self.junior_ratio, self.mid_ratio, self.senior_ratio],
        )?;
        check_sums_to_one(
            "capacity allocation",
            &[
                self.new_feature_percentage,
                self.maintenance_percentage,
                self.tech_debt_percentage,
                self.meetings_percentage,
            ],
        )?;
        check_positive("avg_feature_cycle_days", self.avg_feature_cycle_days)?;
        check_positive("new_feature_percentage", self.new_feature_percentage)?;
        for (field, v) in [
            ("junior_flc", self.junior_flc),
            ("mid_flc", self.mid_flc),
            ("senior_flc", self.senior_flc),
            ("avg_bug_fix_hours", self.avg_bug_fix_hours),
            ("onboarding_days", self.onboarding_days),
            ("defect_escape_rate", self.defect_escape_rate),
            ("production_incidents_per_month", self.production_incidents_per_month),
            ("avg_incident_cost", self.avg_incident_cost),
            ("avg_pr_review_hours", self.avg_pr_review_hours),
        ] {
            check_non_negative(field, v)?;
        }
        check_ratio("rework_percentage", self.rework_percentage)?;
        check_ratio("pr_rejection_rate", self.pr_rejection_rate)?;
        Ok(())
    }

    pub fn weighted_avg_flc(&self) -> Money {
        self.junior_flc * self.junior_ratio
            + self.mid_flc * self.mid_ratio
            + self.senior_flc * self.senior_ratio
    }

    pub fn total_team_cost(&self) -> Money {
        self.team_size as f64 * self.weighted_avg_flc()
    }

    /// Annual coding hours per developer after meetings.
    pub fn effective_capacity_hours(&self) -> f64 {
        WORKING_HOURS_PER_YEAR * (1.0 - self.meetings_percentage)
    }

    /// Features delivered per developer per year.
    pub fn feature_delivery_rate(&self) -> f64 {
        WORKING_DAYS_PER_YEAR / self.avg_feature_cycle_days * self.new_feature_percentage
    }

    pub fn annual_incident_cost(&self) -> Money {
        self.production_incidents_per_month * 12.0 * self.avg_incident_cost
    }

    pub fn annual_rework_cost(&self) -> Money {
        self.total_team_cost() * (1.0 - self.meetings_percentage) * self.rework_percentage
    }

    pub fn cost_per_feature(&self) -> Money {
        self.total_team_cost() / (self.team_size as f64 * self.feature_delivery_rate())
    }
}

/// Industry benchmark baseline for a company profile.
pub fn create_baseline(profile: CompanyProfile) -> BaselineProfile {
    match profile {
        CompanyProfile::Startup => BaselineProfile {
            team_size: 10,
            junior_ratio: 0.4,
            mid_ratio: 0.4,
            senior_ratio: 0.2,
            junior_flc: 120_000.0,
            mid_flc: 160_000.0,
            senior_flc: 220_000.0,
            avg_feature_cycle_days: 14.0,
            avg_bug_fix_hours: 8.0,
            onboarding_days: 30.0,
            defect_escape_rate: 5.0,
            production_incidents_per_month: 3.0,
            avg_incident_cost: 5_000.0,
            rework_percentage: 0.15,
            new_feature_percentage: 0.60,
            maintenance_percentage: 0.20,
            tech_debt_percentage: 0.05,
            meetings_percentage: 0.15,
            avg_pr_review_hours: 2.0,
            pr_rejection_rate: 0.20,
        },
        CompanyProfile::Enterprise => BaselineProfile {
            team_size: 50,
            junior_ratio: 0.3,
            mid_ratio: 0.5,
            senior_ratio: 0.2,
            junior_flc: 140_000.0,
            mid_flc: 180_000.0,
            senior_flc: 250_000.0,
            avg_feature_cycle_days: 30.0,
            avg_bug_fix_hours: 24.0,
            onboarding_days: 60.0,
            defect_escape_rate: 3.0,
            production_incidents_per_month: 5.0,
            avg_incident_cost: 15_000.0,
            rework_percentage: 0.20,
            new_feature_percentage: 0.40,
            maintenance_percentage: 0.35,
            tech_debt_percentage: 0.10,
            meetings_percentage: 0.15,
            avg_pr_review_hours: 4.0,
            pr_rejection_rate: 0.25,
        },
        CompanyProfile::Scaleup => BaselineProfile {
            team_size: 25,
            junior_ratio: 0.35,
            mid_ratio: 0.45,
            senior_ratio: 0.2,
            junior_flc: 130_000.0,
            mid_flc: 170_000.0,
            senior_flc: 230_000.0,
            avg_feature_cycle_days: 21.0,
            avg_bug_fix_hours: 12.0,
            onboarding_days: 45.0,
            defect_escape_rate: 4.0,
            production_incidents_per_month: 4.0,
            avg_incident_cost: 10_000.0,
            rework_percentage: 0.18,
            new_feature_percentage: 0.50,
            maintenance_percentage: 0.28,
            tech_debt_percentage: 0.07,
            meetings_percentage: 0.15,
            avg_pr_review_hours: 3.0,
            pr_rejection_rate: 0.22,
        },
    }
}
