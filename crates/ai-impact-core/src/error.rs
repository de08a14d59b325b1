use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImpactError {
    #[error("Unknown scenario '{scenario}' (available: {available})")]
    UnknownScenario { scenario: String, available: String },

    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Model failure in {model}: {reason}")]
    ModelFailure { model: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for ImpactError {
    fn from(e: serde_json::Error) -> Self {
        ImpactError::SerializationError(e.to_string())
    }
}
