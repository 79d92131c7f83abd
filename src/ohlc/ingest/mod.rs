mod cancel;
mod config;

pub use cancel::CancelFlag;
pub use config::{ConfigError, IngestConfig, DEFAULT_BATCH_SIZE, DEFAULT_MAX_ERRORS};

use crate::decoder::RowDecoder;
use crate::report::{summary_message, ErrorLog, IngestionReport};
use crate::store::UpsertPort;
use crate::tokenizer::{HeaderError, HeaderReadError, RowError, RowTokenizer, StreamError};
use crate::validator;
use crate::Row;

use std::io;

use thiserror::Error;

/// Aborts the whole upload. No report is produced.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("invalid CSV header: {0}")]
    Header(#[from] HeaderError),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error("ingestion cancelled after line {0}")]
    Cancelled(usize),
}

impl From<HeaderReadError> for IngestError {
    fn from(e: HeaderReadError) -> Self {
        match e {
            HeaderReadError::Header(e) => IngestError::Header(e),
            HeaderReadError::Stream(e) => IngestError::Stream(e),
        }
    }
}

/// A whole batch was rejected by storage. Reported once, not per row.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchPersistError {
    #[error("batch insert error: {0}")]
    Batch(String),

    #[error("final batch insert error: {0}")]
    FinalBatch(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlushKind {
    Full,
    Final,
}

/// Counters and pending rows for a single upload
struct Upload {
    batch: Vec<Row>,
    total_rows: usize,
    success_count: usize,
    failed_count: usize,
    errors: ErrorLog,
}

impl Upload {
    fn new(config: &IngestConfig) -> Self {
        return Self {
            batch: Vec::with_capacity(config.batch_size()),
            total_rows: 0,
            success_count: 0,
            failed_count: 0,
            errors: ErrorLog::new(config.max_errors()),
        };
    }

    fn reject(&mut self, message: String) {
        log::warn!("{message}");
        self.failed_count += 1;
        self.errors.push(message);
    }

    fn flush<P: UpsertPort>(&mut self, port: &mut P, batch_size: usize, kind: FlushKind) {
        let count = self.batch.len();

        log::debug!("Flushing {kind:?} batch of {count} rows");

        match port.upsert(&self.batch, batch_size) {
            Ok(()) => {
                self.success_count += count;
            }
            Err(e) => {
                let cause = format!("{e:#}");
                let err = match kind {
                    FlushKind::Full => BatchPersistError::Batch(cause),
                    FlushKind::Final => BatchPersistError::FinalBatch(cause),
                };

                log::warn!("{err} ({count} rows)");
                self.failed_count += count;
                self.errors.push(err.to_string());
            }
        }

        self.batch.clear();
    }

    fn finish(self, processed_bytes: u64) -> IngestionReport {
        return IngestionReport {
            total_rows: self.total_rows,
            success_count: self.success_count,
            failed_count: self.failed_count,
            processed_bytes,
            errors: self.errors.into_entries(),
            message: summary_message(self.failed_count),
        };
    }
}

/// Streams rows from a delimited source into storage in fixed-size batches
pub struct BatchIngestor<P: UpsertPort> {
    port: P,
    config: IngestConfig,
    cancel: Option<CancelFlag>,
}

impl<P: UpsertPort> BatchIngestor<P> {
    pub fn new(port: P, config: IngestConfig) -> Self {
        return Self {
            port,
            config,
            cancel: None,
        };
    }

    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn port(&self) -> &P {
        return &self.port;
    }

    pub fn into_port(self) -> P {
        return self.port;
    }

    /// Reads `source` to the end and returns what happened to every row.
    ///
    /// Bad rows and failed batches end up in the report. Only an unusable
    /// header, a broken stream or cancellation return `Err`.
    /// `processed_bytes` is echoed back as given.
    pub fn ingest<R: io::Read>(
        &mut self,
        source: R,
        processed_bytes: u64,
    ) -> Result<IngestionReport, IngestError> {
        let batch_size = self.config.batch_size();
        let mut tokenizer = RowTokenizer::open(source);

        let header = tokenizer.read_header()?;
        let decoder = RowDecoder::new(&header);

        log::debug!("Header accepted, reading rows in batches of {batch_size}");

        let mut upload = Upload::new(&self.config);

        loop {
            self.check_cancelled(tokenizer.current_line())?;

            let raw = match tokenizer.read_row() {
                None => break,
                Some(Err(RowError::Stream(e))) => Err(e)?,
                Some(Err(e)) => {
                    upload.total_rows += 1;
                    upload.reject(e.to_string());
                    continue;
                }
                Some(Ok(raw)) => raw,
            };

            upload.total_rows += 1;

            let row = match decoder.decode(&raw) {
                Ok(row) => row,
                Err(e) => {
                    upload.reject(e.to_string());
                    continue;
                }
            };

            if let Err(e) = validator::validate(&row) {
                upload.reject(format!("line {}: {e}", raw.line));
                continue;
            }

            upload.batch.push(row);

            if upload.batch.len() >= batch_size {
                self.check_cancelled(raw.line)?;
                upload.flush(&mut self.port, batch_size, FlushKind::Full);
            }
        }

        if !upload.batch.is_empty() {
            self.check_cancelled(tokenizer.current_line())?;
            upload.flush(&mut self.port, batch_size, FlushKind::Final);
        }

        let report = upload.finish(processed_bytes);

        log::info!(
            "{}: {} rows, {} stored, {} failed",
            report.message,
            report.total_rows,
            report.success_count,
            report.failed_count
        );

        return Ok(report);
    }

    fn check_cancelled(&self, line: usize) -> Result<(), IngestError> {
        match &self.cancel {
            Some(flag) if flag.is_cancelled() => Err(IngestError::Cancelled(line)),
            _ => Ok(()),
        }
    }
}

/// One-shot ingestion into `port` with the given config
pub fn ingest<P: UpsertPort, R: io::Read>(
    port: P,
    source: R,
    processed_bytes: u64,
    config: IngestConfig,
) -> Result<IngestionReport, IngestError> {
    BatchIngestor::new(port, config).ingest(source, processed_bytes)
}
