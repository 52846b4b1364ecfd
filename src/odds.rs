use serde::{Deserialize, Serialize};

use crate::error::{EvError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OddsFormat {
    #[default]
    American,
    Decimal,
}

pub fn american_to_decimal(american: f64) -> Result<f64> {
    if !american.is_finite() {
        return Err(EvError::InvalidOdds {
            value: american,
            reason: "not a finite number",
        });
    }
    if american == 0.0 {
        return Err(EvError::InvalidOdds {
            value: american,
            reason: "american odds of 0 are undefined",
        });
    }
    if american > 0.0 {
        Ok(american / 100.0 + 1.0)
    } else {
        Ok(100.0 / american.abs() + 1.0)
    }
}

/// Inverse of [`american_to_decimal`] for the usual convention: prices at or
/// above evens are quoted positive, shorter prices negative.
pub fn decimal_to_american(decimal: f64) -> Result<f64> {
    let decimal = validate_decimal(decimal)?;
    if decimal >= 2.0 {
        Ok((decimal - 1.0) * 100.0)
    } else {
        Ok(-100.0 / (decimal - 1.0))
    }
}

pub fn implied_probability(decimal: f64) -> Result<f64> {
    Ok(1.0 / validate_decimal(decimal)?)
}

pub fn to_decimal(odds: f64, format: OddsFormat) -> Result<f64> {
    match format {
        OddsFormat::American => american_to_decimal(odds),
        OddsFormat::Decimal => validate_decimal(odds),
    }
}

fn validate_decimal(decimal: f64) -> Result<f64> {
    if !decimal.is_finite() {
        return Err(EvError::InvalidOdds {
            value: decimal,
            reason: "not a finite number",
        });
    }
    if decimal <= 1.0 {
        return Err(EvError::InvalidOdds {
            value: decimal,
            reason: "decimal odds must be greater than 1",
        });
    }
    Ok(decimal)
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    // Ties go to even; + 0.0 folds -0.0 into 0.0
    (value * factor).round_ties_even() / factor + 0.0
}
