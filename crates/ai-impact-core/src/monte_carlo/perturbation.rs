use rand::Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Uniform;

use crate::error::ImpactError;
use crate::models::adoption::AdoptionParameters;
use crate::models::cost::CostParameters;
use crate::models::impact::ImpactParameters;
use crate::ImpactResult;

// Multiplier ranges. All lower bounds are positive so no perturbed field can
// change sign.
pub const DROPOUT_RATE_RANGE: (f64, f64) = (0.5, 1.5);
pub const LEARNING_RATE_RANGE: (f64, f64) = (0.7, 1.3);
pub const PLATEAU_EFFICIENCY_RANGE: (f64, f64) = (0.9, 1.05);
pub const IMPACT_RANGE: (f64, f64) = (0.8, 1.2);
pub const SEAT_COST_RANGE: (f64, f64) = (0.9, 1.3);
pub const TOKEN_PRICE_RANGE: (f64, f64) = (0.7, 1.5);

/// Multipliers drawn for one trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Multipliers {
    pub dropout_rate: f64,
    pub learning_rate: f64,
    pub plateau_efficiency: f64,
    /// Shared by feature-cycle, defect and incident reduction.
    pub impact: f64,
    pub seat_cost: f64,
    pub token_price: f64,
}

impl Multipliers {
    /// Each multiplier with the field it scales, in draw order.
    pub fn named(&self) -> [(&'static str, f64); 6] {
        [
            ("dropout_rate_month", self.dropout_rate),
            ("learning_rate", self.learning_rate),
            ("plateau_efficiency", self.plateau_efficiency),
            ("impact", self.impact),
            ("cost_per_seat_month", self.seat_cost),
            ("token_price_per_million", self.token_price),
        ]
    }
}

/// Trial-local copies of the base configurations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerturbedParameters {
    pub adoption: AdoptionParameters,
    pub impact: ImpactParameters,
    pub cost: CostParameters,
    pub multipliers: Multipliers,
}

fn draw<R: Rng + ?Sized>(rng: &mut R, (min, max): (f64, f64), field: &str) -> ImpactResult<f64> {
    let u = Uniform::new(min, max).map_err(|e| ImpactError::InvalidInput {
        field: field.into(),
        reason: format!("Invalid Uniform parameters: {e}"),
    })?;
    Ok(rng.sample(u))
}

/// Draw the six multipliers, always in the same order so a seeded source
/// reproduces the same trial.
pub fn draw_multipliers<R: Rng + ?Sized>(rng: &mut R) -> ImpactResult<Multipliers> {
    Ok(Multipliers {
        dropout_rate: draw(rng, DROPOUT_RATE_RANGE, "dropout_rate_month")?,
        learning_rate: draw(rng, LEARNING_RATE_RANGE, "learning_rate")?,
        plateau_efficiency: draw(rng, PLATEAU_EFFICIENCY_RANGE, "plateau_efficiency")?,
        impact: draw(rng, IMPACT_RANGE, "impact")?,
        seat_cost: draw(rng, SEAT_COST_RANGE, "cost_per_seat_month")?,
        token_price: draw(rng, TOKEN_PRICE_RANGE, "token_price_per_million")?,
    })
}

/// Apply a set of multipliers to copies of the base configurations.
pub fn apply_multipliers(
    adoption: &AdoptionParameters,
    impact: &ImpactParameters,
    cost: &CostParameters,
    m: Multipliers,
) -> PerturbedParameters {
    let mut adoption = adoption.clone();
    adoption.dropout_rate_month *= m.dropout_rate;
    adoption.learning_rate *= m.learning_rate;
    adoption.plateau_efficiency *= m.plateau_efficiency;

    let mut impact = impact.clone();
    impact.feature_cycle_reduction *= m.impact;
    impact.defect_reduction *= m.impact;
    impact.incident_reduction *= m.impact;

    let mut cost = cost.clone();
    cost.cost_per_seat_month *= m.seat_cost;
    cost.token_price_per_million *= m.token_price;

    PerturbedParameters {
        adoption,
        impact,
        cost,
        multipliers: m,
    }
}

/// Perturbed copy of the base configurations using fresh draws from `rng`.
/// The bases are left untouched.
pub fn perturb<R: Rng + ?Sized>(
    adoption: &AdoptionParameters,
    impact: &ImpactParameters,
    cost: &CostParameters,
    rng: &mut R,
) -> ImpactResult<PerturbedParameters> {
    let m = draw_multipliers(rng)?;
    Ok(apply_multipliers(adoption, impact, cost, m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::adoption::{create_adoption_scenario, AdoptionArchetype};
    use crate::models::cost::{create_cost_scenario, CostProfile};
    use crate::models::impact::{create_impact_scenario, ImpactLevel};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SEED: u64 = 42;

    fn bases() -> (AdoptionParameters, ImpactParameters, CostParameters) {
        (
            create_adoption_scenario(AdoptionArchetype::Grassroots),
            create_impact_scenario(ImpactLevel::Moderate),
            create_cost_scenario(CostProfile::Enterprise),
        )
    }

    fn within(v: f64, (lo, hi): (f64, f64)) -> bool {
        v >= lo && v <= hi
    }

    #[test]
    fn test_multipliers_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(SEED);
        for _ in 0..2_000 {
            let m = draw_multipliers(&mut rng).unwrap();
            assert!(within(m.dropout_rate, DROPOUT_RATE_RANGE), "{m:?}");
            assert!(within(m.learning_rate, LEARNING_RATE_RANGE), "{m:?}");
            assert!(within(m.plateau_efficiency, PLATEAU_EFFICIENCY_RANGE), "{m:?}");
            assert!(within(m.impact, IMPACT_RANGE), "{m:?}");
            assert!(within(m.seat_cost, SEAT_COST_RANGE), "{m:?}");
            assert!(within(m.token_price, TOKEN_PRICE_RANGE), "{m:?}");
        }
    }

    #[test]
    fn test_base_is_not_mutated() {
        let (a, i, c) = bases();
        let (a0, i0, c0) = (a.clone(), i.clone(), c.clone());
        let mut rng = StdRng::seed_from_u64(SEED);
        let _ = perturb(&a, &i, &c, &mut rng).unwrap();
        assert_eq!(a, a0);
        assert_eq!(i, i0);
        assert_eq!(c, c0);
    }

    #[test]
    fn test_impact_fields_share_one_multiplier() {
        let (a, i, c) = bases();
        let mut rng = StdRng::seed_from_u64(SEED);
        for _ in 0..100 {
            let p = perturb(&a, &i, &c, &mut rng).unwrap();
            let k1 = p.impact.feature_cycle_reduction / i.feature_cycle_reduction;
            let k2 = p.impact.defect_reduction / i.defect_reduction;
            let k3 = p.impact.incident_reduction / i.incident_reduction;
            assert!((k1 - k2).abs() < 1e-12 && (k2 - k3).abs() < 1e-12);
            // Fields outside the perturbed subset are untouched.
            assert_eq!(p.impact.rework_reduction, i.rework_reduction);
        }
    }

    #[test]
    fn test_cost_multipliers_are_independent() {
        let (a, i, c) = bases();
        let mut rng = StdRng::seed_from_u64(SEED);
        let differing = (0..100)
            .map(|_| perturb(&a, &i, &c, &mut rng).unwrap().multipliers)
            .filter(|m| (m.seat_cost - m.token_price).abs() > 1e-9)
            .count();
        assert_eq!(differing, 100);
    }

    #[test]
    fn test_apply_multipliers_scales_named_fields() {
        let (a, i, c) = bases();
        let m = Multipliers {
            dropout_rate: 1.5,
            learning_rate: 0.7,
            plateau_efficiency: 1.0,
            impact: 1.2,
            seat_cost: 1.3,
            token_price: 0.7,
        };
        let p = apply_multipliers(&a, &i, &c, m);
        assert!((p.adoption.dropout_rate_month - a.dropout_rate_month * 1.5).abs() < 1e-12);
        assert!((p.adoption.learning_rate - a.learning_rate * 0.7).abs() < 1e-12);
        assert_eq!(p.adoption.plateau_efficiency, a.plateau_efficiency);
        assert!((p.impact.defect_reduction - i.defect_reduction * 1.2).abs() < 1e-12);
        assert!((p.cost.cost_per_seat_month - c.cost_per_seat_month * 1.3).abs() < 1e-12);
        assert!((p.cost.token_price_per_million - c.token_price_per_million * 0.7).abs() < 1e-12);
        assert_eq!(p.cost.infrastructure_monthly, c.infrastructure_monthly);
    }

    #[test]
    fn test_same_seed_same_draws() {
        let (a, i, c) = bases();
        let p1 = perturb(&a, &i, &c, &mut StdRng::seed_from_u64(7)).unwrap();
        let p2 = perturb(&a, &i, &c, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(p1, p2);
    }
}
