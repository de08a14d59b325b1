use clap::Args;
use serde_json::Value;

use ai_impact_core::monte_carlo::simulation::{self, ScenarioComparisonInput};

use crate::input;

/// Arguments for a multi-scenario comparison
#[derive(Args)]
pub struct CompareArgs {
    /// Path to JSON or YAML input file
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated scenario identifiers (default: the eight standard scenarios)
    #[arg(long, value_delimiter = ',')]
    pub scenarios: Vec<String>,

    /// Number of Monte Carlo trials per scenario
    #[arg(long)]
    pub trials: Option<u32>,

    /// Seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Run trials across threads
    #[arg(long)]
    pub parallel: bool,

    /// Include the per-trial outcome series of every scenario
    #[arg(long)]
    pub full: bool,
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut cmp_input: ScenarioComparisonInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        ScenarioComparisonInput::default()
    };

    if !args.scenarios.is_empty() {
        cmp_input.scenarios = args.scenarios;
    }
    if let Some(trials) = args.trials {
        cmp_input.num_trials = trials;
    }
    if args.seed.is_some() {
        cmp_input.seed = args.seed;
    }
    cmp_input.parallel |= args.parallel;

    let output = simulation::compare_scenarios(&cmp_input)?;
    let paybacks: Vec<Vec<u32>> = output
        .result
        .results
        .iter()
        .map(|r| r.paybacks_display())
        .collect();
    let mut value = serde_json::to_value(output)?;
    if let Some(Value::Array(results)) = value.pointer_mut("/result/results") {
        for (result, codes) in results.iter_mut().zip(paybacks) {
            super::present_result(result, codes, !args.full);
        }
    }
    Ok(value)
}
