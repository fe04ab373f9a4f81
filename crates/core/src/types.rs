//! Validated value types shared by the calculators.

use crate::error::{ForecastError, ForecastResult};
use nutype::nutype;
#[allow(unused_imports)] // used by the nutype derives
use serde::{Deserialize, Serialize};

// ─── Fraction ───────────────────────────────────────────────────────────────

/// A rate in the closed interval `[0, 1]` (conversion, retention, ...).
///
/// NaN, infinities and out-of-range values are rejected by `try_new` and by
/// deserialization alike.
#[nutype(
    const_fn,
    validate(finite, greater_or_equal = 0.0, less_or_equal = 1.0),
    derive(Debug, Display, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)
)]
pub struct Fraction(f64);

impl Fraction {
    pub const ZERO: Fraction = match Fraction::try_new(0.0) {
        Ok(f) => f,
        Err(_) => panic!("0.0 is a valid fraction"),
    };
    pub const ONE: Fraction = match Fraction::try_new(1.0) {
        Ok(f) => f,
        Err(_) => panic!("1.0 is a valid fraction"),
    };
}

impl From<FractionError> for ForecastError {
    fn from(err: FractionError) -> Self {
        ForecastError::Validation(format!("rate must be within [0, 1]: {err}"))
    }
}

// ─── Amounts ────────────────────────────────────────────────────────────────

/// A finite, non-negative quantity (currency, months, multipliers).
#[nutype(
    validate(finite, greater_or_equal = 0.0),
    derive(Debug, Display, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)
)]
pub struct NonNegativeAmount(f64);

/// Validate `value` as a [`NonNegativeAmount`] and hand back the raw number.
/// `field` names the offending input in the error message.
pub fn ensure_non_negative(field: &str, value: f64) -> ForecastResult<f64> {
    NonNegativeAmount::try_new(value)
        .map(NonNegativeAmount::into_inner)
        .map_err(|err| {
            ForecastError::Validation(format!(
                "{field} must be a non-negative finite number, got {value}: {err}"
            ))
        })
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// `numerator / denominator`, or `0.0` when the denominator is zero.
///
/// Every ratio in the forecast models goes through this so a zero
/// denominator resolves to the same sentinel everywhere.
pub fn guarded_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
