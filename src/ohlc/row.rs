use chrono::NaiveDate;

use serde::Serialize;

/// One decoded line of daily price data, keyed by `(symbol, date)`
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Row {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Row {
    pub fn key(&self) -> (String, NaiveDate) {
        return (self.symbol.clone(), self.date);
    }
}
