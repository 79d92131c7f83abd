use ohlc::{IngestionReport, PersistedRecord, Result};

use csv::Writer;

pub fn report_to_json(report: &IngestionReport) -> Result<String> {
    let json = serde_json::to_string_pretty(report)?;
    return Ok(json);
}

pub fn build_csv_writer() -> Writer<Vec<u8>> {
    return Writer::from_writer(vec![]);
}

pub fn records_to_csv<'a>(records: impl IntoIterator<Item = &'a PersistedRecord>) -> Result<String> {
    let mut wtr = build_csv_writer();

    for record in records {
        wtr.serialize(record)?;
    }

    write_to_string(wtr)
}

pub fn write_to_string(writer: Writer<Vec<u8>>) -> Result<String> {
    let utf8 = writer.into_inner()?;
    let string = String::from_utf8(utf8)?;
    return Ok(string);
}
