use thiserror::Error;

pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_MAX_ERRORS: usize = 100;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("batch size must be at least 1")]
    ZeroBatchSize,

    #[error("error cap must be at least 1")]
    ZeroMaxErrors,
}

/// Tunables for one ingestion run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestConfig {
    batch_size: usize,
    max_errors: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        return Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_errors: DEFAULT_MAX_ERRORS,
        };
    }
}

impl IngestConfig {
    pub fn new(batch_size: usize, max_errors: usize) -> Result<Self, ConfigError> {
        if batch_size == 0 {
            Err(ConfigError::ZeroBatchSize)?
        }

        if max_errors == 0 {
            Err(ConfigError::ZeroMaxErrors)?
        }

        return Ok(Self {
            batch_size,
            max_errors,
        });
    }

    pub fn batch_size(&self) -> usize {
        return self.batch_size;
    }

    pub fn max_errors(&self) -> usize {
        return self.max_errors;
    }
}
