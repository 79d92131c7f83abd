use ohlc::{IngestConfig, Result};

use std::env;

use anyhow::Context;
use log::LevelFilter;
use simple_logger::SimpleLogger;

pub const BATCH_SIZE_VAR: &str = "OHLCV_BATCH_SIZE";
pub const MAX_ERRORS_VAR: &str = "OHLCV_MAX_ERRORS";

pub fn configure_app() -> Result {
    SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .env()
        .init()?;

    return Ok(());
}

pub fn ingest_config_from_env() -> Result<IngestConfig> {
    ingest_config_from(|name| env::var(name).ok())
}

fn ingest_config_from(lookup: impl Fn(&str) -> Option<String>) -> Result<IngestConfig> {
    let defaults = IngestConfig::default();

    let batch_size = read_usize(&lookup, BATCH_SIZE_VAR)?.unwrap_or(defaults.batch_size());
    let max_errors = read_usize(&lookup, MAX_ERRORS_VAR)?.unwrap_or(defaults.max_errors());

    let config = IngestConfig::new(batch_size, max_errors)?;

    log::debug!("Using {config:?}");

    return Ok(config);
}

fn read_usize(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<usize>> {
    let value = match lookup(name) {
        Some(value) => value,
        None => return Ok(None),
    };

    let parsed = value
        .trim()
        .parse::<usize>()
        .with_context(|| format!("{name} must be a positive integer, got {value:?}"))?;

    return Ok(Some(parsed));
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();

        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn falls_back_to_defaults() {
        let config = ingest_config_from(lookup(&[])).unwrap();

        assert_eq!(config, IngestConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let config = ingest_config_from(lookup(&[(BATCH_SIZE_VAR, "250"), (MAX_ERRORS_VAR, " 5 ")])).unwrap();

        assert_eq!(config.batch_size(), 250);
        assert_eq!(config.max_errors(), 5);
    }

    #[test]
    fn malformed_values_fail_startup() {
        assert!(ingest_config_from(lookup(&[(BATCH_SIZE_VAR, "lots")])).is_err());
        assert!(ingest_config_from(lookup(&[(BATCH_SIZE_VAR, "0")])).is_err());
    }
}
