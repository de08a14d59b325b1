use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::baseline::BaselineProfile;
use super::{
    check_non_negative, check_positive, check_ratio, DEV_HOURS_PER_MONTH, WORKING_HOURS_PER_YEAR,
};
use crate::error::ImpactError;
use crate::time_value::{cumulative, MONTHS_PER_YEAR};
use crate::types::{Money, MonthlySeries, Rate};
use crate::ImpactResult;

/// Teams at or above this size receive the enterprise licence discount.
pub const ENTERPRISE_TEAM_SIZE_THRESHOLD: u32 = 50;

/// Developers per trainer during the initial training burst.
const TRAINING_GROUP_SIZE: f64 = 10.0;

/// Months of initial training before switching to quarterly sessions.
const INITIAL_TRAINING_MONTHS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostProfile {
    Startup,
    Enterprise,
    Aggressive,
}

impl CostProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            CostProfile::Startup => "startup",
            CostProfile::Enterprise => "enterprise",
            CostProfile::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for CostProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CostProfile {
    type Err = ImpactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "startup" => Ok(CostProfile::Startup),
            "enterprise" => Ok(CostProfile::Enterprise),
            "aggressive" => Ok(CostProfile::Aggressive),
            other => Err(ImpactError::InvalidInput {
                field: "cost_profile".into(),
                reason: format!("'{other}' is not one of startup, enterprise, aggressive"),
            }),
        }
    }
}

/// Cost structure of the AI tooling programme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostParameters {
    pub cost_per_seat_month: Money,
    pub enterprise_discount: Rate,

    pub initial_tokens_per_dev_month: f64,
    pub token_price_per_million: Money,
    pub token_price_decline_annual: Rate,
    pub token_growth_rate_monthly: Rate,
    pub token_plateau_month: u32,

    pub initial_training_cost_per_dev: Money,
    pub ongoing_training_cost_annual: Money,
    pub trainer_cost_per_day: Money,
    pub training_days_initial: f64,
    pub training_days_ongoing_annual: f64,

    pub infrastructure_setup: Money,
    pub infrastructure_monthly: Money,
    pub admin_overhead_percentage: Rate,

    /// Per adopted developer, per month.
    pub context_switch_cost_month: Money,
    pub bad_code_cleanup_percentage: Rate,
    /// Extra security review hours per adopted developer per month.
    pub security_review_overhead: f64,

    pub pilot_budget: Money,
    pub ongoing_experimentation: Money,
}

/// Monthly cost schedule broken down by category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub licensing: MonthlySeries,
    pub tokens: MonthlySeries,
    pub training: MonthlySeries,
    pub hidden: MonthlySeries,
    pub infrastructure: MonthlySeries,
    pub admin: MonthlySeries,
    pub experimentation: MonthlySeries,
    pub total: MonthlySeries,
    pub cumulative: MonthlySeries,
}

impl CostParameters {
    pub fn validate(&self) -> ImpactResult<()> {
        check_positive("cost_per_seat_month", self.cost_per_seat_month)?;
        check_positive("initial_tokens_per_dev_month", self.initial_tokens_per_dev_month)?;
        check_positive("token_price_per_million", self.token_price_per_million)?;
        check_positive("trainer_cost_per_day", self.trainer_cost_per_day)?;
        check_non_negative("token_growth_rate_monthly", self.token_growth_rate_monthly)?;
        for (field, v) in [
            ("initial_training_cost_per_dev", self.initial_training_cost_per_dev),
            ("ongoing_training_cost_annual", self.ongoing_training_cost_annual),
            ("training_days_initial", self.training_days_initial),
            ("training_days_ongoing_annual", self.training_days_ongoing_annual),
            ("infrastructure_setup", self.infrastructure_setup),
            ("infrastructure_monthly", self.infrastructure_monthly),
            ("context_switch_cost_month", self.context_switch_cost_month),
            ("security_review_overhead", self.security_review_overhead),
            ("pilot_budget", self.pilot_budget),
            ("ongoing_experimentation", self.ongoing_experimentation),
        ] {
            check_non_negative(field, v)?;
        }
        check_ratio("enterprise_discount", self.enterprise_discount)?;
        check_ratio("token_price_decline_annual", self.token_price_decline_annual)?;
        check_ratio("admin_overhead_percentage", self.admin_overhead_percentage)?;
        check_ratio("bad_code_cleanup_percentage", self.bad_code_cleanup_percentage)?;
        if self.token_plateau_month < 1 {
            return Err(ImpactError::InvalidInput {
                field: "token_plateau_month".into(),
                reason: "Must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Compute every cost category for `months` months, scaled by the
    /// fraction of the team using the tool in each month.
    pub fn total_costs(
        &self,
        baseline: &BaselineProfile,
        months: usize,
        adoption: &[f64],
    ) -> ImpactResult<CostBreakdown> {
        if adoption.len() != months {
            return Err(ImpactError::ModelFailure {
                model: "cost".into(),
                reason: format!(
                    "adoption curve has {} months, expected {months}",
                    adoption.len()
                ),
            });
        }
        let team = baseline.team_size as f64;

        let licensing = self.licensing_costs(baseline, adoption);
        let tokens = self.token_costs(team, adoption);
        let training = self.training_costs(team, adoption);
        let hidden = self.hidden_costs(baseline, adoption);

        let mut infrastructure = vec![self.infrastructure_monthly; months];
        if let Some(first) = infrastructure.first_mut() {
            *first += self.infrastructure_setup;
        }

        let admin_monthly =
            self.admin_overhead_percentage * baseline.weighted_avg_flc() / MONTHS_PER_YEAR as f64;
        let admin = vec![admin_monthly; months];

        let experimentation: MonthlySeries = (0..months)
            .map(|m| {
                if m == 0 {
                    self.pilot_budget
                } else if m % MONTHS_PER_YEAR == 0 {
                    self.ongoing_experimentation
                } else {
                    0.0
                }
            })
            .collect();

        let total: MonthlySeries = (0..months)
            .map(|m| {
                licensing[m]
                    + tokens[m]
                    + training[m]
                    + hidden[m]
                    + infrastructure[m]
                    + admin[m]
                    + experimentation[m]
            })
            .collect();

        if let Some(bad) = total.iter().position(|c| !c.is_finite()) {
            return Err(ImpactError::ModelFailure {
                model: "cost".into(),
                reason: format!("non-finite total cost in month {bad}"),
            });
        }

        let cumulative = cumulative(&total);

        Ok(CostBreakdown {
            licensing,
            tokens,
            training,
            hidden,
            infrastructure,
            admin,
            experimentation,
            total,
            cumulative,
        })
    }

    fn licensing_costs(&self, baseline: &BaselineProfile, adoption: &[f64]) -> MonthlySeries {
        let discount = if baseline.team_size >= ENTERPRISE_TEAM_SIZE_THRESHOLD {
            1.0 - self.enterprise_discount
        } else {
            1.0
        };
        adoption
            .iter()
            .map(|a| baseline.team_size as f64 * a * self.cost_per_seat_month * discount)
            .collect()
    }

    fn token_costs(&self, team: f64, adoption: &[f64]) -> MonthlySeries {
        let plateau = self.token_plateau_month as usize;
        adoption
            .iter()
            .enumerate()
            .map(|(month, a)| {
                let years_elapsed = month as f64 / MONTHS_PER_YEAR as f64;
                let price = self.token_price_per_million
                    * (1.0 - self.token_price_decline_annual).powf(years_elapsed);
                // Linear growth in usage until the plateau month.
                let growth_months = month.min(plateau) as f64;
                let tokens_per_dev = self.initial_tokens_per_dev_month
                    * (1.0 + self.token_growth_rate_monthly * growth_months);
                team * a * tokens_per_dev / 1_000_000.0 * price
            })
            .collect()
    }

    fn training_costs(&self, team: f64, adoption: &[f64]) -> MonthlySeries {
        let mut costs = vec![0.0_f64; adoption.len()];
        for (month, cost) in costs.iter_mut().enumerate() {
            if month < INITIAL_TRAINING_MONTHS {
                let previous = if month > 0 { adoption[month - 1] } else { 0.0 };
                let new_adopters = team * (adoption[month] - previous);
                *cost = new_adopters * self.initial_training_cost_per_dev;
                if new_adopters > 0.0 {
                    let trainer_days =
                        self.training_days_initial * (new_adopters / TRAINING_GROUP_SIZE);
                    *cost += trainer_days * self.trainer_cost_per_day;
                }
            } else if month % 3 == 0 {
                *cost = self.ongoing_training_cost_annual / 4.0 * adoption[month];
            }
        }
        costs
    }

    fn hidden_costs(&self, baseline: &BaselineProfile, adoption: &[f64]) -> MonthlySeries {
        let hourly_rate = baseline.weighted_avg_flc() / WORKING_HOURS_PER_YEAR;
        adoption
            .iter()
            .enumerate()
            .map(|(month, a)| {
                let adopted_devs = baseline.team_size as f64 * a;
                // Context switching is heaviest early on, then settles at half.
                let context_factor = if month < 6 {
                    1.0 - month as f64 / 12.0
                } else {
                    0.5
                };
                let context = self.context_switch_cost_month * adopted_devs * context_factor;
                let cleanup = DEV_HOURS_PER_MONTH
                    * self.bad_code_cleanup_percentage
                    * adopted_devs
                    * hourly_rate;
                let security = adopted_devs * self.security_review_overhead * hourly_rate;
                context + cleanup + security
            })
            .collect()
    }
}

pub fn create_cost_scenario(profile: CostProfile) -> CostParameters {
    match profile {
        CostProfile::Startup => CostParameters {
            cost_per_seat_month: 30.0,
            enterprise_discount: 0.0,
            initial_tokens_per_dev_month: 200_000.0,
            token_price_per_million: 10.0,
            token_price_decline_annual: 0.3,
            token_growth_rate_monthly: 0.15,
            token_plateau_month: 9,
            initial_training_cost_per_dev: 500.0,
            ongoing_training_cost_annual: 200.0,
            trainer_cost_per_day: 1_500.0,
            training_days_initial: 2.0,
            training_days_ongoing_annual: 1.0,
            infrastructure_setup: 5_000.0,
            infrastructure_monthly: 500.0,
            admin_overhead_percentage: 0.02,
            context_switch_cost_month: 500.0,
            bad_code_cleanup_percentage: 0.05,
            security_review_overhead: 2.0,
            pilot_budget: 10_000.0,
            ongoing_experimentation: 5_000.0,
        },
        CostProfile::Enterprise => CostParameters {
            cost_per_seat_month: 50.0,
            enterprise_discount: 0.3,
            initial_tokens_per_dev_month: 500_000.0,
            token_price_per_million: 8.0,
            token_price_decline_annual: 0.25,
            token_growth_rate_monthly: 0.10,
            token_plateau_month: 12,
            initial_training_cost_per_dev: 2_000.0,
            ongoing_training_cost_annual: 500.0,
            trainer_cost_per_day: 2_000.0,
            training_days_initial: 5.0,
            training_days_ongoing_annual: 2.0,
            infrastructure_setup: 50_000.0,
            infrastructure_monthly: 5_000.0,
            admin_overhead_percentage: 0.05,
            context_switch_cost_month: 1_000.0,
            bad_code_cleanup_percentage: 0.08,
            security_review_overhead: 4.0,
            pilot_budget: 100_000.0,
            ongoing_experimentation: 50_000.0,
        },
        CostProfile::Aggressive => CostParameters {
            cost_per_seat_month: 100.0,
            enterprise_discount: 0.2,
            initial_tokens_per_dev_month: 1_000_000.0,
            token_price_per_million: 6.0,
            token_price_decline_annual: 0.35,
            token_growth_rate_monthly: 0.20,
            token_plateau_month: 6,
            initial_training_cost_per_dev: 3_000.0,
            ongoing_training_cost_annual: 1_000.0,
            trainer_cost_per_day: 2_500.0,
            training_days_initial: 7.0,
            training_days_ongoing_annual: 4.0,
            infrastructure_setup: 20_000.0,
            infrastructure_monthly: 2_000.0,
            admin_overhead_percentage: 0.03,
            context_switch_cost_month: 2_000.0,
            bad_code_cleanup_percentage: 0.10,
            security_review_overhead: 3.0,
            pilot_budget: 50_000.0,
            ongoing_experimentation: 25_000.0,
        },
    }
}
