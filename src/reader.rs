use ohlc::Result;

use std::{
    fs::File,
    path::Path,
};

use anyhow::Context;

/// An opened upload together with the size the filesystem advertises for it
pub struct InputFile {
    pub file: File,
    pub size: u64,
}

pub fn open_input_file(path: &Path) -> Result<InputFile> {
    let file = File::open(path).with_context(|| format!("Couldn't open {path:?}"))?;
    let size = file.metadata()?.len();

    return Ok(InputFile { file, size });
}
