use clap::Args;
use serde_json::{json, Value};

use ai_impact_core::scenarios::resolver::{cost_profile, ScenarioKey, STANDARD_SCENARIOS};

/// Arguments for listing scenarios
#[derive(Args)]
pub struct ScenariosArgs {
    /// Only list the eight standard scenarios
    #[arg(long)]
    pub standard: bool,
}

pub fn run_scenarios(args: ScenariosArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rows: Vec<Value> = ScenarioKey::all()
        .into_iter()
        .filter_map(|key| {
            let name = key.to_string();
            let standard = STANDARD_SCENARIOS.contains(&name.as_str());
            if args.standard && !standard {
                return None;
            }
            Some(json!({
                "scenario": name,
                "months": key.months(),
                "adoption": key.approach.adoption_archetype().as_str(),
                "impact": key.approach.impact_level().as_str(),
                "cost": cost_profile(key.profile).as_str(),
                "standard": standard,
            }))
        })
        .collect();
    Ok(Value::Array(rows))
}
