mod args;
mod config;
mod reader;
mod writer;

use ohlc::{BatchIngestor, MemoryStore, Result};

fn main() -> Result {
    config::configure_app()?;

    log::debug!("Application configured. Beginning ingestion...");

    let input_args = args::parse_input_args()?;
    log::debug!("Found input args: {input_args:?}");

    let ingest_config = config::ingest_config_from_env()?;

    let input = reader::open_input_file(&input_args.path)?;
    log::debug!("Opened input of {} bytes", input.size);

    let mut ingestor = BatchIngestor::new(MemoryStore::new(), ingest_config);
    let report = ingestor.ingest(input.file, input.size)?;

    log::debug!("Ingestion complete with status {:?}. Writing report...", report.status());

    println!("{}", writer::report_to_json(&report)?);

    if input_args.print_records {
        let store = ingestor.into_port();
        log::debug!("Writing {} stored records", store.len());

        print!("{}", writer::records_to_csv(store.records())?);
    }

    log::debug!("Application finished successfully!");

    Ok(())
}
