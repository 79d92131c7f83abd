use super::{Page, PageRequest, PersistedRecord, QueryError, RecordFilter, RecordQuery, UpsertPort};

use crate::ids::RecordId;
use crate::{Result, Row};

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};

use thiserror::Error;

/// Widest symbol the store accepts
pub const MAX_SYMBOL_LEN: usize = 20;

pub type Clock = Box<dyn Fn() -> DateTime<Utc> + Send>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("symbol '{0}' exceeds {} characters", MAX_SYMBOL_LEN)]
    SymbolTooLong(String),
}

/// Process-local store with `(symbol, date)` uniqueness
pub struct MemoryStore {
    records: BTreeMap<RecordId, PersistedRecord>,
    keys: HashMap<(String, NaiveDate), RecordId>,
    last_id: RecordId,
    clock: Clock,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        return Self::with_clock(Box::new(Utc::now));
    }

    pub fn with_clock(clock: Clock) -> Self {
        return Self {
            records: BTreeMap::new(),
            keys: HashMap::new(),
            last_id: RecordId(0),
            clock,
        };
    }

    pub fn len(&self) -> usize {
        return self.records.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.records.is_empty();
    }

    /// All records ordered by symbol, then date
    pub fn records(&self) -> Vec<&PersistedRecord> {
        let mut records = self.records.values().collect::<Vec<_>>();
        records.sort_by(|a, b| a.symbol.cmp(&b.symbol).then(a.date.cmp(&b.date)));

        records
    }

    fn check(&self, rows: &[Row]) -> Result {
        if let Some(row) = rows.iter().find(|r| r.symbol.chars().count() > MAX_SYMBOL_LEN) {
            Err(StoreError::SymbolTooLong(row.symbol.clone()))?
        }

        return Ok(());
    }

    fn apply(&mut self, row: &Row, now: DateTime<Utc>) {
        if let Some(id) = self.keys.get(&row.key()) {
            if let Some(record) = self.records.get_mut(id) {
                record.open = row.open;
                record.high = row.high;
                record.low = row.low;
                record.close = row.close;
                record.volume = row.volume;
                record.updated_at = now;
                return;
            }
        }

        let id = self.last_id.next();
        self.last_id = id;

        self.keys.insert(row.key(), id);
        self.records.insert(
            id,
            PersistedRecord {
                id,
                symbol: row.symbol.clone(),
                date: row.date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
                created_at: now,
                updated_at: now,
            },
        );
    }

    fn filtered(&self, filter: &RecordFilter) -> impl Iterator<Item = &PersistedRecord> {
        let filter = filter.clone();
        self.records.values().filter(move |r| filter.matches(r))
    }
}

impl UpsertPort for MemoryStore {
    /// Every row is checked before anything is written, so a rejected batch leaves no trace
    fn upsert(&mut self, rows: &[Row], batch_size_hint: usize) -> Result {
        if rows.is_empty() {
            return Ok(());
        }

        self.check(rows)?;

        let now = (self.clock)();

        for chunk in rows.chunks(batch_size_hint.max(1)) {
            log::debug!("Upserting chunk of {} rows", chunk.len());
            for row in chunk {
                self.apply(row, now);
            }
        }

        return Ok(());
    }
}

impl RecordQuery for MemoryStore {
    fn find_by_id(&self, id: RecordId) -> Option<PersistedRecord> {
        self.records.get(&id).cloned()
    }

    fn find_by_symbol(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Vec<PersistedRecord> {
        let filter = RecordFilter {
            symbol: Some(symbol.to_string()),
            start_date: start,
            end_date: end,
        };

        let mut records = self.filtered(&filter).cloned().collect::<Vec<_>>();
        records.sort_by_key(|r| r.date);

        records
    }

    fn find_all(
        &self,
        filter: &RecordFilter,
        page: &PageRequest,
    ) -> std::result::Result<Page<PersistedRecord>, QueryError> {
        filter.validate()?;

        let mut matching = self.filtered(filter).collect::<Vec<_>>();
        matching.sort_by(|a, b| b.date.cmp(&a.date).then(a.id.cmp(&b.id)));

        let total = matching.len();
        let data = matching
            .into_iter()
            .skip(page.offset())
            .take(page.limit)
            .cloned()
            .collect();

        return Ok(Page::new(data, page, total));
    }

    fn count(&self, filter: &RecordFilter) -> usize {
        self.filtered(filter).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    use chrono::{Duration, TimeZone};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn row(symbol: &str, day: &str, close: f64, volume: u64) -> Row {
        Row {
            symbol: symbol.to_string(),
            date: date(day),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume,
        }
    }

    /// Each call advances one second
    fn ticking_store() -> MemoryStore {
        let ticks = Arc::new(AtomicI64::new(0));
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        MemoryStore::with_clock(Box::new(move || {
            start + Duration::seconds(ticks.fetch_add(1, Ordering::SeqCst))
        }))
    }

    #[test]
    fn upsert_twice_keeps_one_record_with_latest_values() {
        let mut store = ticking_store();

        store.upsert(&[row("AAPL", "2024-01-02", 10.0, 100)], 1000).unwrap();
        let first = store.find_by_id(RecordId(1)).unwrap();

        store.upsert(&[row("AAPL", "2024-01-02", 20.0, 200)], 1000).unwrap();
        let second = store.find_by_id(RecordId(1)).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(second.close, 20.0);
        assert_eq!(second.volume, 200);
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at > first.updated_at);
    }

    #[test]
    fn conflict_does_not_disturb_other_rows_in_the_batch() {
        let mut store = ticking_store();
        store.upsert(&[row("AAPL", "2024-01-02", 10.0, 1)], 10).unwrap();

        store
            .upsert(
                &[row("AAPL", "2024-01-02", 11.0, 2), row("MSFT", "2024-01-02", 30.0, 3)],
                10,
            )
            .unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.find_by_symbol("MSFT", None, None)[0].close, 30.0);
        assert_eq!(store.find_by_symbol("aapl", None, None)[0].close, 11.0);
    }

    #[test]
    fn rejected_batch_writes_nothing() {
        let mut store = ticking_store();

        let err = store
            .upsert(
                &[row("AAPL", "2024-01-02", 10.0, 1), row("THISSYMBOLISFARTOOLONG", "2024-01-02", 1.0, 1)],
                1,
            )
            .unwrap_err();

        assert!(err.to_string().contains("exceeds 20 characters"));
        assert!(store.is_empty());
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let mut store = ticking_store();

        store.upsert(&[], 1000).unwrap();

        assert!(store.is_empty());
    }

    #[test]
    fn find_by_symbol_is_date_ascending_and_bounded() {
        let mut store = ticking_store();
        store
            .upsert(
                &[
                    row("AAPL", "2024-01-04", 1.0, 1),
                    row("AAPL", "2024-01-02", 1.0, 1),
                    row("AAPL", "2024-01-03", 1.0, 1),
                    row("MSFT", "2024-01-03", 1.0, 1),
                ],
                1000,
            )
            .unwrap();

        let dates = store
            .find_by_symbol("AAPL", Some(date("2024-01-03")), None)
            .into_iter()
            .map(|r| r.date)
            .collect::<Vec<_>>();

        assert_eq!(dates, vec![date("2024-01-03"), date("2024-01-04")]);
    }

    #[test]
    fn find_all_pages_newest_first() {
        let mut store = ticking_store();
        let rows = (1..=5)
            .map(|d| row("AAPL", &format!("2024-01-0{d}"), 1.0, 1))
            .collect::<Vec<_>>();
        store.upsert(&rows, 2).unwrap();

        let page = store
            .find_all(&RecordFilter::default(), &PageRequest::new(2, 2).unwrap())
            .unwrap();

        assert_eq!(page.pagination.total_items, 5);
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(
            page.data.iter().map(|r| r.date).collect::<Vec<_>>(),
            vec![date("2024-01-03"), date("2024-01-02")]
        );
    }

    #[test]
    fn find_all_rejects_reversed_range() {
        let store = ticking_store();
        let filter = RecordFilter {
            symbol: None,
            start_date: Some(date("2024-02-01")),
            end_date: Some(date("2024-01-01")),
        };

        assert_eq!(
            store.find_all(&filter, &PageRequest::default()).unwrap_err(),
            QueryError::InvalidDateRange
        );
    }

    #[test]
    fn count_applies_filter() {
        let mut store = ticking_store();
        store
            .upsert(
                &[row("AAPL", "2024-01-02", 1.0, 1), row("MSFT", "2024-01-02", 1.0, 1)],
                1000,
            )
            .unwrap();

        let filter = RecordFilter {
            symbol: Some("msft".to_string()),
            ..RecordFilter::default()
        };

        assert_eq!(store.count(&filter), 1);
        assert_eq!(store.count(&RecordFilter::default()), 2);
    }
}
