use crate::fields::{self, FieldError};
use crate::tokenizer::{Column, HeaderIndex, RawRow};
use crate::Row;

use thiserror::Error;

/// A single cell that could not be decoded, with enough context to fix the file
#[derive(Error, Debug, Clone, PartialEq)]
#[error("line {line}, field '{field}', value '{value}': {message}")]
pub struct ParseError {
    pub line: usize,
    pub field: Column,
    pub value: String,
    pub message: String,
}

impl ParseError {
    fn new(raw: &RawRow, field: Column, value: &str, message: impl ToString) -> Self {
        return Self {
            line: raw.line,
            field,
            value: value.to_string(),
            message: message.to_string(),
        };
    }
}

/// Maps raw records onto typed rows using the positions from the header
pub struct RowDecoder<'a> {
    header: &'a HeaderIndex,
}

impl<'a> RowDecoder<'a> {
    pub fn new(header: &'a HeaderIndex) -> Self {
        return Self { header };
    }

    /// Decodes fields in `Column::ALL` order and stops at the first bad one
    pub fn decode(&self, raw: &RawRow) -> Result<Row, ParseError> {
        let symbol_raw = self.cell(raw, Column::Symbol);
        let symbol = symbol_raw.trim().to_uppercase();

        if symbol.is_empty() {
            Err(ParseError::new(raw, Column::Symbol, symbol_raw, "symbol cannot be empty"))?
        }

        let date = self.field(raw, Column::Date, fields::parse_date)?;
        let open = self.field(raw, Column::Open, fields::parse_decimal)?;
        let high = self.field(raw, Column::High, fields::parse_decimal)?;
        let low = self.field(raw, Column::Low, fields::parse_decimal)?;
        let close = self.field(raw, Column::Close, fields::parse_decimal)?;
        let volume = self.field(raw, Column::Volume, fields::parse_integer)?;

        return Ok(Row {
            symbol,
            date,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    fn field<T>(
        &self,
        raw: &RawRow,
        column: Column,
        parse: fn(&str) -> Result<T, FieldError>,
    ) -> Result<T, ParseError> {
        let value = self.cell(raw, column);

        parse(value).map_err(|e| ParseError::new(raw, column, value, e))
    }

    fn cell<'r>(&self, raw: &'r RawRow, column: Column) -> &'r str {
        self.header
            .position(column)
            .and_then(|idx| raw.record.get(idx))
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use csv::StringRecord;

    fn header() -> HeaderIndex {
        let record = StringRecord::from(vec!["date", "symbol", "open", "high", "low", "close", "volume", "note"]);
        HeaderIndex::from_record(&record).unwrap()
    }

    fn raw(line: usize, fields: Vec<&str>) -> RawRow {
        RawRow {
            line,
            record: StringRecord::from(fields),
        }
    }

    #[test]
    fn decodes_a_clean_row_regardless_of_column_order() {
        let header = header();
        let decoder = RowDecoder::new(&header);

        let row = decoder
            .decode(&raw(2, vec!["01/31/2024", " msft ", "$1,000.25", "1010", "990", "1005", "12,345", "x"]))
            .unwrap();

        assert_eq!(row.symbol, "MSFT");
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(row.open, 1000.25);
        assert_eq!(row.high, 1010.0);
        assert_eq!(row.low, 990.0);
        assert_eq!(row.close, 1005.0);
        assert_eq!(row.volume, 12_345);
    }

    #[test]
    fn blank_volume_decodes_as_zero() {
        let header = header();
        let decoder = RowDecoder::new(&header);

        let row = decoder
            .decode(&raw(2, vec!["2024-01-02", "AAPL", "1", "2", "1", "2", "", ""]))
            .unwrap();

        assert_eq!(row.volume, 0);
    }

    #[test]
    fn empty_symbol_is_a_parse_error() {
        let header = header();
        let decoder = RowDecoder::new(&header);

        let err = decoder
            .decode(&raw(4, vec!["2024-01-02", "  ", "1", "2", "1", "2", "5", ""]))
            .unwrap_err();

        assert_eq!(err.line, 4);
        assert_eq!(err.field, Column::Symbol);
        assert_eq!(err.message, "symbol cannot be empty");
    }

    #[test]
    fn first_bad_field_is_reported() {
        let header = header();
        let decoder = RowDecoder::new(&header);

        let err = decoder
            .decode(&raw(7, vec!["2024-01-02", "AAPL", "1", "abc", "-1", "2", "5", ""]))
            .unwrap_err();

        assert_eq!(err.field, Column::High);
        assert_eq!(err.value, "abc");
        assert_eq!(
            err.to_string(),
            "line 7, field 'high', value 'abc': must be a valid number"
        );
    }

    #[test]
    fn negative_volume_names_the_volume_column() {
        let header = header();
        let decoder = RowDecoder::new(&header);

        let err = decoder
            .decode(&raw(3, vec!["2024-01-02", "AAPL", "1", "2", "1", "2", "-10", ""]))
            .unwrap_err();

        assert_eq!(err.field, Column::Volume);
        assert_eq!(err.message, "negative value not allowed");
    }

    #[test]
    fn bad_date_lists_formats() {
        let header = header();
        let decoder = RowDecoder::new(&header);

        let err = decoder
            .decode(&raw(2, vec!["yesterday", "AAPL", "1", "2", "1", "2", "5", ""]))
            .unwrap_err();

        assert_eq!(err.field, Column::Date);
        assert!(err.message.starts_with("invalid date format, supported formats: YYYY-MM-DD"));
    }
}
