use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ImpactError;
use crate::models::adoption::{create_adoption_scenario, AdoptionArchetype, AdoptionParameters};
use crate::models::baseline::{create_baseline, BaselineProfile, CompanyProfile};
use crate::models::cost::{create_cost_scenario, CostParameters, CostProfile};
use crate::models::impact::{create_impact_scenario, ImpactLevel, ImpactParameters};
use crate::ImpactResult;

/// Scenarios analysed when no explicit list is given.
pub const STANDARD_SCENARIOS: [&str; 8] = [
    "conservative_startup",
    "moderate_startup",
    "aggressive_startup",
    "conservative_enterprise",
    "moderate_enterprise",
    "aggressive_enterprise",
    "moderate_scaleup",
    "aggressive_scaleup",
];

/// Overall posture of the rollout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdoptionApproach {
    Conservative,
    Moderate,
    Aggressive,
}

impl AdoptionApproach {
    pub const ALL: [AdoptionApproach; 3] = [
        AdoptionApproach::Conservative,
        AdoptionApproach::Moderate,
        AdoptionApproach::Aggressive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdoptionApproach::Conservative => "conservative",
            AdoptionApproach::Moderate => "moderate",
            AdoptionApproach::Aggressive => "aggressive",
        }
    }

    pub fn adoption_archetype(&self) -> AdoptionArchetype {
        match self {
            AdoptionApproach::Conservative => AdoptionArchetype::Organic,
            AdoptionApproach::Moderate => AdoptionArchetype::Grassroots,
            AdoptionApproach::Aggressive => AdoptionArchetype::Mandated,
        }
    }

    pub fn impact_level(&self) -> ImpactLevel {
        match self {
            AdoptionApproach::Conservative => ImpactLevel::Conservative,
            AdoptionApproach::Moderate => ImpactLevel::Moderate,
            AdoptionApproach::Aggressive => ImpactLevel::Aggressive,
        }
    }
}

impl FromStr for AdoptionApproach {
    type Err = ImpactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "conservative" => Ok(AdoptionApproach::Conservative),
            "moderate" => Ok(AdoptionApproach::Moderate),
            "aggressive" => Ok(AdoptionApproach::Aggressive),
            other => Err(ImpactError::UnknownScenario {
                scenario: other.to_string(),
                available: "conservative, moderate, aggressive".into(),
            }),
        }
    }
}

/// Cost base and horizon attached to a company profile.
pub fn cost_profile(profile: CompanyProfile) -> CostProfile {
    match profile {
        CompanyProfile::Startup => CostProfile::Startup,
        CompanyProfile::Enterprise => CostProfile::Enterprise,
        CompanyProfile::Scaleup => CostProfile::Aggressive,
    }
}

pub fn horizon_months(profile: CompanyProfile) -> usize {
    match profile {
        CompanyProfile::Startup => 24,
        CompanyProfile::Enterprise => 36,
        CompanyProfile::Scaleup => 24,
    }
}

/// Adoption approach crossed with company profile, e.g. `moderate_enterprise`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScenarioKey {
    pub approach: AdoptionApproach,
    pub profile: CompanyProfile,
}

impl ScenarioKey {
    pub fn new(approach: AdoptionApproach, profile: CompanyProfile) -> Self {
        Self { approach, profile }
    }

    /// Every valid approach/profile combination.
    pub fn all() -> Vec<ScenarioKey> {
        AdoptionApproach::ALL
            .iter()
            .flat_map(|a| CompanyProfile::ALL.iter().map(move |p| ScenarioKey::new(*a, *p)))
            .collect()
    }

    pub fn months(&self) -> usize {
        horizon_months(self.profile)
    }
}

impl fmt::Display for ScenarioKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.approach.as_str(), self.profile.as_str())
    }
}

impl FromStr for ScenarioKey {
    type Err = ImpactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ImpactError::UnknownScenario {
            scenario: s.to_string(),
            available: ScenarioKey::all()
                .iter()
                .map(|k| k.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        };
        // Approach tags never contain '_', profile tags may ("scale_up").
        let (approach, profile) = s.trim().split_once('_').ok_or_else(unknown)?;
        let approach = approach.parse().map_err(|_| unknown())?;
        let profile = profile.parse().map_err(|_| unknown())?;
        Ok(ScenarioKey::new(approach, profile))
    }
}

impl Serialize for ScenarioKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ScenarioKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Replacement base configurations supplied by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<BaselineProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adoption: Option<AdoptionParameters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<ImpactParameters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<CostParameters>,
}

/// Base configurations and horizon for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedScenario {
    pub key: ScenarioKey,
    pub baseline: BaselineProfile,
    pub adoption: AdoptionParameters,
    pub impact: ImpactParameters,
    pub cost: CostParameters,
    pub months: usize,
}

impl ResolvedScenario {
    /// Swap in any caller-supplied configurations, validating each.
    pub fn with_overrides(mut self, overrides: &ParameterOverrides) -> ImpactResult<Self> {
        if let Some(baseline) = &overrides.baseline {
            baseline.validate()?;
            self.baseline = baseline.clone();
        }
        if let Some(adoption) = &overrides.adoption {
            adoption.validate()?;
            self.adoption = adoption.clone();
        }
        if let Some(impact) = &overrides.impact {
            impact.validate()?;
            self.impact = impact.clone();
        }
        if let Some(cost) = &overrides.cost {
            cost.validate()?;
            self.cost = cost.clone();
        }
        Ok(self)
    }
}

pub fn resolve(key: ScenarioKey) -> ResolvedScenario {
    ResolvedScenario {
        key,
        baseline: create_baseline(key.profile),
        adoption: create_adoption_scenario(key.approach.adoption_archetype()),
        impact: create_impact_scenario(key.approach.impact_level()),
        cost: create_cost_scenario(cost_profile(key.profile)),
        months: key.months(),
    }
}

/// Parse a scenario identifier and resolve it.
pub fn resolve_named(scenario: &str) -> ImpactResult<ResolvedScenario> {
    Ok(resolve(scenario.parse()?))
}
