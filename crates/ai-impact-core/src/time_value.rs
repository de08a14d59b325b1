use crate::error::ImpactError;
use crate::types::{Money, MonthlySeries, Rate};
use crate::ImpactResult;

/// Annual discount rate applied to every trial's monthly cash flows.
pub const ANNUAL_DISCOUNT_RATE: Rate = 0.10;

pub const MONTHS_PER_YEAR: usize = 12;

/// Simple (non-compounded) conversion of an annual rate to a monthly rate.
pub fn monthly_rate(annual: Rate) -> Rate {
    annual / MONTHS_PER_YEAR as f64
}

/// Net Present Value of a series of periodic cash flows.
///
/// The first flow is undiscounted: flow `t` is weighted by `(1 + rate)^(-t)`.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> ImpactResult<Money> {
    if rate <= -1.0 {
        return Err(ImpactError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let one_plus_r = 1.0 + rate;
    let mut discount = 1.0_f64;
    let mut result = 0.0_f64;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount /= one_plus_r;
        }
        result += cf * discount;
    }

    Ok(result)
}

/// NPV of `value[m] - cost[m]` at the standard monthly rate.
pub fn monthly_net_npv(value: &[Money], cost: &[Money]) -> ImpactResult<Money> {
    if value.len() != cost.len() {
        return Err(ImpactError::InvalidInput {
            field: "cash_flows".into(),
            reason: format!(
                "value series has {} months but cost series has {}",
                value.len(),
                cost.len()
            ),
        });
    }
    let net: Vec<Money> = value.iter().zip(cost).map(|(v, c)| v - c).collect();
    npv(monthly_rate(ANNUAL_DISCOUNT_RATE), &net)
}

/// Running sum of a monthly series.
pub fn cumulative(series: &[f64]) -> MonthlySeries {
    series
        .iter()
        .scan(0.0_f64, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

/// Return on investment in percent. Zero total cost yields exactly 0.
pub fn roi_percent(total_value: Money, total_cost: Money) -> f64 {
    if total_cost == 0.0 {
        0.0
    } else {
        (total_value - total_cost) / total_cost * 100.0
    }
}

/// First month index at which cumulative value covers cumulative cost.
pub fn breakeven_month(cumulative_value: &[Money], cumulative_cost: &[Money]) -> Option<usize> {
    cumulative_value
        .iter()
        .zip(cumulative_cost)
        .position(|(v, c)| v >= c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_npv_zero_rate_is_plain_sum() {
        let result = npv(0.0, &[-100.0, 50.0, 50.0, 50.0]).unwrap();
        assert!((result - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_npv_first_period_undiscounted() {
        let result = npv(0.5, &[100.0]).unwrap();
        assert_eq!(result, 100.0);
    }

    #[test]
    fn test_npv_discounts_later_periods() {
        // 100 + 110 / 1.1 = 200
        let result = npv(0.10, &[100.0, 110.0]).unwrap();
        assert!((result - 200.0).abs() < 1e-9, "npv={result}");
    }

    #[test]
    fn test_npv_rate_below_minus_one_rejected() {
        assert!(npv(-1.5, &[-100.0, 200.0]).is_err());
    }

    #[test]
    fn test_monthly_net_npv_length_mismatch() {
        assert!(monthly_net_npv(&[1.0, 2.0], &[1.0]).is_err());
    }

    #[test]
    fn test_cumulative() {
        assert_eq!(cumulative(&[1.0, 2.0, 3.0]), vec![1.0, 3.0, 6.0]);
        assert!(cumulative(&[]).is_empty());
    }

    #[test]
    fn test_roi_zero_cost_is_zero() {
        assert_eq!(roi_percent(1_000_000.0, 0.0), 0.0);
        assert_eq!(roi_percent(-5.0, 0.0), 0.0);
    }

    #[test]
    fn test_roi_basic() {
        assert!((roi_percent(300.0, 100.0) - 200.0).abs() < 1e-12);
    }

    #[test]
    fn test_breakeven_month() {
        let value = [0.0, 50.0, 150.0, 300.0];
        let cost = [100.0, 150.0, 150.0, 160.0];
        assert_eq!(breakeven_month(&value, &cost), Some(2));
        assert_eq!(breakeven_month(&[0.0, 1.0], &[5.0, 5.0]), None);
    }
}
