use super::PersistedRecord;

use crate::ids::RecordId;

use chrono::NaiveDate;

use serde::Serialize;

use thiserror::Error;

pub const DEFAULT_PAGE_LIMIT: usize = 100;
pub const MAX_PAGE_LIMIT: usize = 1000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("start_date must be before or equal to end_date")]
    InvalidDateRange,

    #[error("page must be at least 1")]
    InvalidPage,

    #[error("limit must be between 1 and {}", MAX_PAGE_LIMIT)]
    InvalidLimit,
}

/// Read side used by request handling, kept apart from `UpsertPort`
pub trait RecordQuery {
    fn find_by_id(&self, id: RecordId) -> Option<PersistedRecord>;

    /// Records for one symbol in ascending date order, bounds inclusive
    fn find_by_symbol(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Vec<PersistedRecord>;

    /// Matching records, newest date first
    fn find_all(
        &self,
        filter: &RecordFilter,
        page: &PageRequest,
    ) -> Result<Page<PersistedRecord>, QueryError>;

    fn count(&self, filter: &RecordFilter) -> usize;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub symbol: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl RecordFilter {
    pub fn validate(&self) -> Result<(), QueryError> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                Err(QueryError::InvalidDateRange)?
            }
        }

        return Ok(());
    }

    pub fn matches(&self, record: &PersistedRecord) -> bool {
        let symbol_ok = match &self.symbol {
            Some(symbol) if !symbol.trim().is_empty() => {
                record.symbol == symbol.trim().to_uppercase()
            }
            _ => true,
        };

        symbol_ok
            && self.start_date.map_or(true, |start| record.date >= start)
            && self.end_date.map_or(true, |end| record.date <= end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        return Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        };
    }
}

impl PageRequest {
    pub fn new(page: usize, limit: usize) -> Result<Self, QueryError> {
        if page == 0 {
            Err(QueryError::InvalidPage)?
        }

        if limit == 0 || limit > MAX_PAGE_LIMIT {
            Err(QueryError::InvalidLimit)?
        }

        return Ok(Self { page, limit });
    }

    pub fn offset(&self) -> usize {
        return (self.page - 1) * self.limit;
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    pub page: usize,
    pub limit: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: PageMeta,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, request: &PageRequest, total_items: usize) -> Self {
        return Self {
            data,
            pagination: PageMeta {
                page: request.page,
                limit: request.limit,
                total_items,
                total_pages: total_items.div_ceil(request.limit),
            },
        };
    }
}
