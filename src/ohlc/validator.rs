use crate::Row;

use chrono::{NaiveDate, Utc};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("high price ({high:.2}) must be greater than or equal to low price ({low:.2})")]
    HighBelowLow { high: f64, low: f64 },

    #[error("open price ({open:.2}) must be between low ({low:.2}) and high ({high:.2})")]
    OpenOutOfRange { open: f64, low: f64, high: f64 },

    #[error("close price ({close:.2}) must be between low ({low:.2}) and high ({high:.2})")]
    CloseOutOfRange { close: f64, low: f64, high: f64 },

    #[error("all prices must be positive")]
    NonPositivePrice,

    #[error("date ({}) cannot be in the future", .0.format("%Y-%m-%d"))]
    FutureDate(NaiveDate),
}

/// Checks OHLC ordering, positivity and that the date is not after today (UTC)
pub fn validate(row: &Row) -> Result<(), ValidationError> {
    validate_as_of(row, Utc::now().date_naive())
}

pub fn validate_as_of(row: &Row, today: NaiveDate) -> Result<(), ValidationError> {
    let Row {
        open,
        high,
        low,
        close,
        date,
        ..
    } = *row;

    if low > high {
        Err(ValidationError::HighBelowLow { high, low })?
    }

    if open < low || open > high {
        Err(ValidationError::OpenOutOfRange { open, low, high })?
    }

    if close < low || close > high {
        Err(ValidationError::CloseOutOfRange { close, low, high })?
    }

    if [open, high, low, close].iter().any(|price| *price <= 0.0) {
        Err(ValidationError::NonPositivePrice)?
    }

    if date > today {
        Err(ValidationError::FutureDate(date))?
    }

    return Ok(());
}
