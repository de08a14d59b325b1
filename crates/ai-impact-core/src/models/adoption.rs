use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{check_non_negative, check_positive, check_ratio, check_sums_to_one};
use crate::error::ImpactError;
use crate::types::{MonthlySeries, Rate};
use crate::ImpactResult;

/// Bass diffusion coefficient of innovation.
const BASS_P: f64 = 0.03;
/// Bass diffusion coefficient of imitation.
const BASS_Q: f64 = 0.38;

/// How the tool is rolled out across the organisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdoptionArchetype {
    Organic,
    Grassroots,
    Mandated,
}

impl AdoptionArchetype {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdoptionArchetype::Organic => "organic",
            AdoptionArchetype::Grassroots => "grassroots",
            AdoptionArchetype::Mandated => "mandated",
        }
    }
}

impl fmt::Display for AdoptionArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdoptionArchetype {
    type Err = ImpactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "organic" => Ok(AdoptionArchetype::Organic),
            "grassroots" => Ok(AdoptionArchetype::Grassroots),
            "mandated" => Ok(AdoptionArchetype::Mandated),
            other => Err(ImpactError::InvalidInput {
                field: "adoption_archetype".into(),
                reason: format!("'{other}' is not one of organic, grassroots, mandated"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdoptionParameters {
    // Population segments, must sum to one.
    pub initial_adopters: Rate,
    pub early_adopters: Rate,
    pub early_majority: Rate,
    pub late_majority: Rate,
    pub laggards: Rate,

    pub training_effectiveness: Rate,
    pub peer_influence: Rate,
    pub management_mandate: Rate,

    pub initial_resistance: Rate,
    pub dropout_rate_month: Rate,
    pub re_engagement_rate: Rate,

    pub initial_efficiency: Rate,
    pub learning_rate: f64,
    pub plateau_efficiency: Rate,

    pub junior_adoption_multiplier: f64,
    pub mid_adoption_multiplier: f64,
    pub senior_adoption_multiplier: f64,
}

impl AdoptionParameters {
    pub fn validate(&self) -> ImpactResult<()> {
        for (field, v) in [
            ("initial_adopters", self.initial_adopters),
            ("early_adopters", self.early_adopters),
            ("early_majority", self.early_majority),
            ("late_majority", self.late_majority),
            ("laggards", self.laggards),
            ("training_effectiveness", self.training_effectiveness),
            ("peer_influence", self.peer_influence),
            ("management_mandate", self.management_mandate),
            ("initial_resistance", self.initial_resistance),
            ("initial_efficiency", self.initial_efficiency),
            ("plateau_efficiency", self.plateau_efficiency),
        ] {
            check_ratio(field, v)?;
        }
        check_sums_to_one(
            "adoption segments",
            &[
                self.initial_adopters,
                self.early_adopters,
                self.early_majority,
                self.late_majority,
                self.laggards,
            ],
        )?;
        check_non_negative("dropout_rate_month", self.dropout_rate_month)?;
        check_non_negative("re_engagement_rate", self.re_engagement_rate)?;
        check_positive("learning_rate", self.learning_rate)?;
        check_positive("junior_adoption_multiplier", self.junior_adoption_multiplier)?;
        check_positive("mid_adoption_multiplier", self.mid_adoption_multiplier)?;
        check_positive("senior_adoption_multiplier", self.senior_adoption_multiplier)?;
        if self.initial_efficiency >= self.plateau_efficiency {
            return Err(ImpactError::InvalidInput {
                field: "initial_efficiency".into(),
                reason: format!(
                    "Initial efficiency {} must be below plateau efficiency {}",
                    self.initial_efficiency, self.plateau_efficiency
                ),
            });
        }
        Ok(())
    }

    /// Cumulative Bass diffusion, scaled to the adoptable population.
    fn bass_diffusion(&self, month: usize) -> f64 {
        if month == 0 {
            return 0.0;
        }
        let f = 1.0 - (-(BASS_P + BASS_Q) * month as f64).exp();
        f * (1.0 - self.laggards)
    }

    /// Fraction of the team actively using the tool in each month.
    ///
    /// Month 0 starts with the innovators; later months add the Bass
    /// increment, lose `dropout_rate_month` of last month's users and win
    /// back a share of everyone who dropped out so far. Clamped into [0, 1].
    pub fn adoption_curve(&self, months: usize) -> MonthlySeries {
        let mut active = vec![0.0_f64; months];
        let mut dropouts = vec![0.0_f64; months];

        for month in 0..months {
            if month == 0 {
                active[0] = self.initial_adopters;
                continue;
            }
            let new_adopters = self.bass_diffusion(month) - self.bass_diffusion(month - 1);
            let lost = active[month - 1] * self.dropout_rate_month;
            dropouts[month] = lost;
            let previously_dropped: f64 = dropouts[..month].iter().sum();
            let re_engaged = previously_dropped * self.re_engagement_rate / month as f64;
            active[month] = active[month - 1] + new_adopters - lost + re_engaged;
        }

        active.into_iter().map(|a| a.clamp(0.0, 1.0)).collect()
    }

    /// Average per-user efficiency along an exponential learning curve.
    pub fn efficiency_curve(&self, months: usize) -> MonthlySeries {
        (0..months)
            .map(|m| {
                self.initial_efficiency
                    + (self.plateau_efficiency - self.initial_efficiency)
                        * (1.0 - (-self.learning_rate * m as f64).exp())
            })
            .collect()
    }

    /// Elementwise product of adoption and efficiency.
    pub fn effective_adoption(&self, months: usize) -> MonthlySeries {
        self.adoption_curve(months)
            .iter()
            .zip(self.efficiency_curve(months))
            .map(|(a, e)| a * e)
            .collect()
    }
}

pub fn create_adoption_scenario(archetype: AdoptionArchetype) -> AdoptionParameters {
    match archetype {
        AdoptionArchetype::Organic => AdoptionParameters {
            initial_adopters: 0.05,
            early_adopters: 0.15,
            early_majority: 0.35,
            late_majority: 0.30,
            laggards: 0.15,
            training_effectiveness: 0.5,
            peer_influence: 0.7,
            management_mandate: 0.3,
            initial_resistance: 0.4,
            dropout_rate_month: 0.02,
            re_engagement_rate: 0.03,
            initial_efficiency: 0.3,
            learning_rate: 0.3,
            plateau_efficiency: 0.85,
            junior_adoption_multiplier: 1.3,
            mid_adoption_multiplier: 1.0,
            senior_adoption_multiplier: 0.7,
        },
        AdoptionArchetype::Grassroots => AdoptionParameters {
            initial_adopters: 0.10,
            early_adopters: 0.20,
            early_majority: 0.30,
            late_majority: 0.25,
            laggards: 0.15,
            training_effectiveness: 0.4,
            peer_influence: 0.9,
            management_mandate: 0.1,
            initial_resistance: 0.3,
            dropout_rate_month: 0.015,
            re_engagement_rate: 0.04,
            initial_efficiency: 0.4,
            learning_rate: 0.4,
            plateau_efficiency: 0.90,
            junior_adoption_multiplier: 1.5,
            mid_adoption_multiplier: 1.2,
            senior_adoption_multiplier: 0.6,
        },
        AdoptionArchetype::Mandated => AdoptionParameters {
            initial_adopters: 0.20,
            early_adopters: 0.30,
            early_majority: 0.30,
            late_majority: 0.15,
            laggards: 0.05,
            training_effectiveness: 0.7,
            peer_influence: 0.5,
            management_mandate: 0.9,
            initial_resistance: 0.2,
            dropout_rate_month: 0.03,
            re_engagement_rate: 0.05,
            initial_efficiency: 0.25,
            learning_rate: 0.25,
            plateau_efficiency: 0.80,
            junior_adoption_multiplier: 1.1,
            mid_adoption_multiplier: 1.0,
            senior_adoption_multiplier: 0.9,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARCHETYPES: [AdoptionArchetype; 3] = [
        AdoptionArchetype::Organic,
        AdoptionArchetype::Grassroots,
        AdoptionArchetype::Mandated,
    ];

    #[test]
    fn test_archetypes_validate() {
        for a in ARCHETYPES {
            create_adoption_scenario(a).validate().unwrap();
        }
    }

    #[test]
    fn test_curve_lengths_match_horizon() {
        let p = create_adoption_scenario(AdoptionArchetype::Grassroots);
        assert_eq!(p.adoption_curve(36).len(), 36);
        assert_eq!(p.efficiency_curve(36).len(), 36);
        assert_eq!(p.effective_adoption(36).len(), 36);
        assert!(p.adoption_curve(0).is_empty());
    }

    #[test]
    fn test_first_month_is_initial_adopters() {
        let p = create_adoption_scenario(AdoptionArchetype::Mandated);
        assert_eq!(p.adoption_curve(24)[0], 0.20);
    }

    #[test]
    fn test_adoption_stays_in_unit_interval() {
        for a in ARCHETYPES {
            let mut p = create_adoption_scenario(a);
            p.re_engagement_rate = 5.0;
            for v in p.adoption_curve(48) {
                assert!((0.0..=1.0).contains(&v), "{a}: adoption={v}");
            }
        }
    }

    #[test]
    fn test_adoption_grows_over_horizon() {
        let p = create_adoption_scenario(AdoptionArchetype::Organic);
        let curve = p.adoption_curve(24);
        assert!(curve[23] > curve[0], "start={} end={}", curve[0], curve[23]);
    }

    #[test]
    fn test_efficiency_approaches_plateau() {
        let p = create_adoption_scenario(AdoptionArchetype::Organic);
        let eff = p.efficiency_curve(60);
        assert_eq!(eff[0], p.initial_efficiency);
        assert!((eff[59] - p.plateau_efficiency).abs() < 1e-6);
        assert!(eff.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn test_initial_efficiency_above_plateau_rejected() {
        let mut p = create_adoption_scenario(AdoptionArchetype::Organic);
        p.initial_efficiency = 0.9;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_unknown_archetype() {
        assert!("viral".parse::<AdoptionArchetype>().is_err());
        assert_eq!(
            "grassroots".parse::<AdoptionArchetype>().unwrap(),
            AdoptionArchetype::Grassroots
        );
    }
}
