use chrono::NaiveDate;

use thiserror::Error;

/// Accepted date layouts, tried in order. `01-02-2024` is day-first because
/// `DD-MM-YYYY` comes before `MM-DD-YYYY`. The label is also the exact shape a
/// cell must have: four-digit year, two-digit month and day.
pub const DATE_FORMATS: [(&str, &str); 5] = [
    ("%Y-%m-%d", "YYYY-MM-DD"),
    ("%m/%d/%Y", "MM/DD/YYYY"),
    ("%d-%m-%Y", "DD-MM-YYYY"),
    ("%Y/%m/%d", "YYYY/MM/DD"),
    ("%m-%d-%Y", "MM-DD-YYYY"),
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("invalid date format, supported formats: {}", supported_date_formats())]
    InvalidDate,

    #[error("value cannot be empty")]
    Empty,

    #[error("negative value not allowed")]
    Negative,

    #[error("must be a valid number")]
    InvalidNumber,

    #[error("must be a valid non-negative integer")]
    InvalidInteger,
}

pub fn supported_date_formats() -> String {
    return DATE_FORMATS
        .iter()
        .map(|(_, label)| *label)
        .collect::<Vec<_>>()
        .join(", ");
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, FieldError> {
    let raw = raw.trim();

    DATE_FORMATS
        .iter()
        .filter(|(_, label)| has_shape(raw, label))
        .find_map(|(format, _)| NaiveDate::parse_from_str(raw, format).ok())
        .ok_or(FieldError::InvalidDate)
}

/// `Y`, `M` and `D` in the label stand for one ASCII digit each, anything else
/// must appear literally. chrono alone would take `24-01-02` as the year 24.
fn has_shape(raw: &str, label: &str) -> bool {
    if raw.len() != label.len() {
        return false;
    }

    return raw.bytes().zip(label.bytes()).all(|(got, want)| match want {
        b'Y' | b'M' | b'D' => got.is_ascii_digit(),
        _ => got == want,
    });
}

/// Parses a price cell, tolerating thousands separators and a leading `$`
pub fn parse_decimal(raw: &str) -> Result<f64, FieldError> {
    let cleaned = strip_noise(raw);

    if cleaned.is_empty() {
        Err(FieldError::Empty)?
    }

    let value: f64 = cleaned.parse().map_err(|_| FieldError::InvalidNumber)?;

    if !value.is_finite() {
        Err(FieldError::InvalidNumber)?
    }

    if value < 0.0 {
        Err(FieldError::Negative)?
    }

    return Ok(value);
}

/// Parses a volume cell. Blank means zero.
pub fn parse_integer(raw: &str) -> Result<u64, FieldError> {
    let cleaned = raw.trim().replace(',', "");

    if cleaned.is_empty() {
        return Ok(0);
    }

    if cleaned.starts_with('-') {
        Err(FieldError::Negative)?
    }

    let value: u64 = cleaned.parse().map_err(|_| FieldError::InvalidInteger)?;

    return Ok(value);
}

fn strip_noise(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed);

    trimmed.trim_start().replace(',', "")
}
