//! Monte Carlo engine: perturb the base configurations per trial, run the
//! sub-models over the horizon, reduce each trial to scalar outcomes and
//! aggregate the outcome distribution.

pub mod aggregation;
pub mod perturbation;
pub mod simulation;
pub mod trial;
