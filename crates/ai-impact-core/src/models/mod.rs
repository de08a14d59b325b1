//! Deterministic sub-models driven by a single parameter set: the
//! organisation baseline, adoption dynamics, cost accrual and business impact.

pub mod adoption;
pub mod baseline;
pub mod cost;
pub mod impact;

use crate::error::ImpactError;
use crate::ImpactResult;

pub const WORKING_DAYS_PER_YEAR: f64 = 260.0;
pub const WORKING_HOURS_PER_YEAR: f64 = 2080.0;
pub const DEV_HOURS_PER_MONTH: f64 = 173.0;

/// Tolerance when checking that a set of ratios sums to one.
pub const RATIO_SUM_TOLERANCE: f64 = 0.01;

pub(crate) fn check_ratio(field: &str, value: f64) -> ImpactResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ImpactError::InvalidInput {
            field: field.into(),
            reason: format!("Must be between 0 and 1 (got {value})"),
        });
    }
    Ok(())
}

pub(crate) fn check_non_negative(field: &str, value: f64) -> ImpactResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ImpactError::InvalidInput {
            field: field.into(),
            reason: format!("Must be a non-negative number (got {value})"),
        });
    }
    Ok(())
}

pub(crate) fn check_positive(field: &str, value: f64) -> ImpactResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ImpactError::InvalidInput {
            field: field.into(),
            reason: format!("Must be positive (got {value})"),
        });
    }
    Ok(())
}

pub(crate) fn check_sums_to_one(label: &str, parts: &[f64]) -> ImpactResult<()> {
    let total: f64 = parts.iter().sum();
    if (total - 1.0).abs() > RATIO_SUM_TOLERANCE {
        return Err(ImpactError::InvalidInput {
            field: label.into(),
            reason: format!("Ratios must sum to 1.0 (got {total:.4})"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_ratio_bounds() {
        assert!(check_ratio("x", 0.0).is_ok());
        assert!(check_ratio("x", 1.0).is_ok());
        assert!(check_ratio("x", 1.01).is_err());
        assert!(check_ratio("x", -0.01).is_err());
    }

    #[test]
    fn test_check_sums_to_one_tolerance() {
        assert!(check_sums_to_one("mix", &[0.3, 0.5, 0.205]).is_ok());
        assert!(check_sums_to_one("mix", &[0.3, 0.5, 0.3]).is_err());
    }

    #[test]
    fn test_check_positive_rejects_nan() {
        assert!(check_positive("x", f64::NAN).is_err());
        assert!(check_non_negative("x", 0.0).is_ok());
        assert!(check_positive("x", 0.0).is_err());
    }
}
