use std::collections::HashMap;
use std::fmt;
use std::io;

use csv::{Position, Reader, ReaderBuilder, StringRecord, Trim};

use thiserror::Error;

/// The seven columns every upload must carry, in decode order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Symbol,
    Date,
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::Symbol,
        Column::Date,
        Column::Open,
        Column::High,
        Column::Low,
        Column::Close,
        Column::Volume,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Column::Symbol => "symbol",
            Column::Date => "date",
            Column::Open => "open",
            Column::High => "high",
            Column::Low => "low",
            Column::Close => "close",
            Column::Volume => "volume",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        return write!(f, "{}", self.name());
    }
}

#[derive(Error, Debug)]
pub enum HeaderError {
    #[error("failed to read header: {0}")]
    Unreadable(#[source] csv::Error),

    #[error("input is empty, expected a header row")]
    Empty,

    #[error("missing required header: {0}")]
    MissingColumn(Column),
}

/// Underlying I/O failed before a clean end of input
#[derive(Error, Debug)]
#[error("failed to read input stream after line {line}: {source}")]
pub struct StreamError {
    pub line: usize,

    #[source]
    pub source: csv::Error,
}

#[derive(Error, Debug)]
pub enum HeaderReadError {
    #[error(transparent)]
    Header(#[from] HeaderError),

    #[error(transparent)]
    Stream(#[from] StreamError),
}

#[derive(Error, Debug)]
pub enum RowError {
    #[error("line {line}: malformed row: {cause}")]
    Malformed { line: usize, cause: String },

    #[error(transparent)]
    Stream(#[from] StreamError),
}

/// Normalized header names mapped to their position in each record
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn from_record(header: &StringRecord) -> Result<Self, HeaderError> {
        let positions = header
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.trim().to_lowercase(), idx))
            .collect::<HashMap<_, _>>();

        let index = Self { positions };

        if let Some(missing) = Column::ALL.iter().find(|c| index.position(**c).is_none()) {
            Err(HeaderError::MissingColumn(*missing))?
        }

        return Ok(index);
    }

    pub fn position(&self, column: Column) -> Option<usize> {
        return self.positions.get(column.name()).copied();
    }
}

/// A record as it came off the wire, tagged with the 1-based physical line it starts on
#[derive(Debug, Clone)]
pub struct RawRow {
    pub line: usize,
    pub record: StringRecord,
}

/// Pull-based reader over a delimited byte stream. Owns the stream until dropped.
pub struct RowTokenizer<R: io::Read> {
    reader: Reader<R>,
    line: usize,
    /// The reader stops on `\r` and counts the `\n` with the next record
    crlf: bool,
    finished: bool,
}

impl<R: io::Read> RowTokenizer<R> {
    pub fn open(source: R) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .trim(Trim::All)
            .from_reader(source);

        return Self {
            reader,
            line: 0,
            crlf: false,
            finished: false,
        };
    }

    pub fn read_header(&mut self) -> Result<HeaderIndex, HeaderReadError> {
        let mut record = StringRecord::new();

        let found = match self.reader.read_record(&mut record) {
            Ok(found) => found,
            Err(e) if e.is_io_error() => {
                self.finished = true;
                Err(StreamError {
                    line: self.line,
                    source: e,
                })?
            }
            Err(e) => Err(HeaderError::Unreadable(e))?,
        };

        if !found {
            self.finished = true;
            Err(HeaderError::Empty)?
        }

        self.line = record.position().map_or(1, |pos| pos.line() as usize);
        self.crlf = self.reader.position().line() as usize == self.line;

        log::debug!("Read header at line {}: {record:?}", self.line);

        let index = HeaderIndex::from_record(&record)?;

        return Ok(index);
    }

    /// Line the last record started on, 0 before the header
    pub fn current_line(&self) -> usize {
        return self.line;
    }

    /// Physical line a record starts on. Never behind the previous record.
    fn start_line(&self, pos: Option<&Position>) -> usize {
        let reported = pos.map_or(0, |pos| pos.line() as usize + usize::from(self.crlf));

        return reported.max(self.line + 1);
    }

    /// Returns `None` once the stream is exhausted or has failed
    pub fn read_row(&mut self) -> Option<Result<RawRow, RowError>> {
        if self.finished {
            return None;
        }

        let mut record = StringRecord::new();

        match self.reader.read_record(&mut record) {
            Ok(false) => {
                self.finished = true;
                None
            }
            Ok(true) => {
                self.line = self.start_line(record.position());
                Some(Ok(RawRow {
                    line: self.line,
                    record,
                }))
            }
            Err(e) if e.is_io_error() => {
                self.finished = true;
                Some(Err(StreamError {
                    line: self.line,
                    source: e,
                }
                .into()))
            }
            Err(e) => {
                self.line = self.start_line(error_position(&e));
                Some(Err(RowError::Malformed {
                    line: self.line,
                    cause: e.to_string(),
                }))
            }
        }
    }
}

/// Where a record the reader refused started, when it knows
fn error_position(e: &csv::Error) -> Option<&Position> {
    match e.kind() {
        csv::ErrorKind::UnequalLengths { pos, .. } => pos.as_ref(),
        csv::ErrorKind::Utf8 { pos, .. } => pos.as_ref(),
        _ => None,
    }
}

impl<R: io::Read> Iterator for RowTokenizer<R> {
    type Item = Result<RawRow, RowError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_row()
    }
}
