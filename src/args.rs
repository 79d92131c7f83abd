use ohlc::Result;

use std::{
    env,
    fs,
    path::PathBuf,
};

use anyhow::Context;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputArgsError {
    #[error("Couldn't parse input arguments: {0}")]
    Parse(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Only CSV files are allowed: {0}")]
    NotCsv(String),
}

#[derive(Debug, PartialEq)]
pub struct InputArgs {
    pub path: PathBuf,
    pub print_records: bool,
}

/// Parses `<file.csv> [--records]`. The file must exist and carry a `.csv` extension.
pub fn parse_input_args() -> Result<InputArgs> {
    parse_from(env::args().skip(1))
}

fn parse_from(args: impl Iterator<Item = String>) -> Result<InputArgs> {
    let mut filename: Option<String> = None;
    let mut print_records = false;

    for arg in args {
        if arg == "--records" {
            print_records = true;
        } else if arg.starts_with("--") {
            Err(InputArgsError::Parse(format!("Unknown flag: {arg}")))?
        } else if filename.is_some() {
            Err(InputArgsError::Parse("Only one input file is supported.".to_string()))?
        } else {
            filename = Some(arg);
        }
    }

    let filename = filename
        .ok_or_else(|| InputArgsError::Parse("First argument must be the input file.".to_string()))?;

    let is_csv = filename.to_lowercase().ends_with(".csv");
    if !is_csv {
        Err(InputArgsError::NotCsv(filename.clone()))?
    }

    let path = fs::canonicalize(filename.clone())
        .with_context(|| InputArgsError::FileNotFound(filename))?;

    return Ok(InputArgs {
        path,
        print_records,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn requires_a_file() {
        let err = parse_from(args(&[])).unwrap_err();

        assert!(err.to_string().contains("First argument must be the input file."));
    }

    #[test]
    fn rejects_non_csv_extension() {
        let err = parse_from(args(&["prices.xlsx"])).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<InputArgsError>(),
            Some(InputArgsError::NotCsv(_))
        ));
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(parse_from(args(&["--verbose", "a.csv"])).is_err());
    }

    #[test]
    fn missing_file_is_reported() {
        let err = parse_from(args(&["does/not/exist.csv"])).unwrap_err();

        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn accepts_existing_csv_with_records_flag() {
        let parsed = parse_from(args(&[
            "--records",
            "./resources/test-examples/inputs/upload_1.csv",
        ]))
        .unwrap();

        assert!(parsed.print_records);
        assert!(parsed.path.ends_with("upload_1.csv"));
    }
}
