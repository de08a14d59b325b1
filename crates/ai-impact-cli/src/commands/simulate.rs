use clap::Args;
use serde_json::Value;

use ai_impact_core::monte_carlo::simulation::{self, ScenarioRunInput};

use crate::input;

/// Arguments for a single-scenario Monte Carlo run
#[derive(Args)]
pub struct SimulateArgs {
    /// Path to JSON or YAML input file
    #[arg(long)]
    pub input: Option<String>,

    /// Scenario identifier, e.g. moderate_enterprise
    #[arg(long)]
    pub scenario: Option<String>,

    /// Number of Monte Carlo trials
    #[arg(long)]
    pub trials: Option<u32>,

    /// Seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Run trials across threads
    #[arg(long)]
    pub parallel: bool,

    /// Omit the per-trial outcome series
    #[arg(long)]
    pub summary: bool,
}

pub fn run_simulate(args: SimulateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut run_input: ScenarioRunInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(ref scenario) = args.scenario {
        ScenarioRunInput::new(scenario.clone())
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--scenario <name>, --input <file> or stdin required for simulate".into());
    };

    // Flags win over file contents.
    if let Some(scenario) = args.scenario {
        run_input.scenario = scenario;
    }
    if let Some(trials) = args.trials {
        run_input.num_trials = trials;
    }
    if args.seed.is_some() {
        run_input.seed = args.seed;
    }
    run_input.parallel |= args.parallel;

    let output = simulation::run_scenario(&run_input)?;
    let paybacks = output.result.paybacks_display();
    let mut value = serde_json::to_value(output)?;
    if let Some(result) = value.get_mut("result") {
        super::present_result(result, paybacks, args.summary);
    }
    Ok(value)
}
