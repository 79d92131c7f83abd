pub mod decoder;
pub mod fields;
pub mod ids;
pub mod ingest;
pub mod report;
mod result;
mod row;
pub mod store;
pub mod tokenizer;
pub mod validator;

pub use ingest::{ingest, BatchIngestor, CancelFlag, IngestConfig, IngestError};
pub use report::{IngestionReport, UploadStatus};
pub use result::Result;
pub use row::Row;
pub use store::{MemoryStore, PersistedRecord, RecordQuery, UpsertPort};
