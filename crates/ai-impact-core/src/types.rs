use serde::{Deserialize, Serialize};

/// All monetary values, in whole currency units.
pub type Money = f64;

/// Rates and fractions expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = f64;

/// One value per calendar month, index 0 is the first month of the horizon.
pub type MonthlySeries = Vec<f64>;

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "ieee754_f64".to_string(),
        },
    }
}

/// Serde adapter for `f64` fields that may be infinite: written as `null`
/// (as `serde_json` does anyway) and read back from `null` as `+inf`.
pub mod infinite_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    struct Ratio {
        #[serde(with = "infinite_as_null")]
        value: f64,
    }

    #[test]
    fn test_infinite_written_as_null_and_read_back() {
        let json = serde_json::to_string(&Ratio { value: f64::INFINITY }).unwrap();
        assert_eq!(json, r#"{"value":null}"#);
        let back: Ratio = serde_json::from_str(&json).unwrap();
        assert!(back.value.is_infinite() && back.value > 0.0);
    }

    #[test]
    fn test_finite_round_trips() {
        let back: Ratio = serde_json::from_str(r#"{"value":0.25}"#).unwrap();
        assert_eq!(back.value, 0.25);
        let json = serde_json::to_string(&Ratio { value: 1.5 }).unwrap();
        assert_eq!(json, r#"{"value":1.5}"#);
    }
}
