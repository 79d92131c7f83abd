mod memory_store;
mod query;

pub use memory_store::{Clock, MemoryStore, StoreError, MAX_SYMBOL_LEN};
pub use query::{Page, PageMeta, PageRequest, QueryError, RecordFilter, RecordQuery};

use crate::ids::RecordId;
use crate::{Result, Row};

use chrono::{DateTime, NaiveDate, Utc};

use serde::Serialize;

/// Write side consumed by the ingestor.
///
/// Implementations key rows on `(symbol, date)`: an existing key has its prices,
/// volume and `updated_at` overwritten, anything else is inserted. A call either
/// commits every row or none of them.
pub trait UpsertPort {
    fn upsert(&mut self, rows: &[Row], batch_size_hint: usize) -> Result;
}

impl<T: UpsertPort + ?Sized> UpsertPort for &mut T {
    fn upsert(&mut self, rows: &[Row], batch_size_hint: usize) -> Result {
        (**self).upsert(rows, batch_size_hint)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PersistedRecord {
    pub id: RecordId,
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

