pub mod error;
pub mod models;
pub mod time_value;
pub mod types;

#[cfg(feature = "scenarios")]
pub mod scenarios;

#[cfg(feature = "monte_carlo")]
pub mod monte_carlo;

pub use error::ImpactError;
pub use types::*;

/// Standard result type for all ai-impact operations
pub type ImpactResult<T> = Result<T, ImpactError>;
