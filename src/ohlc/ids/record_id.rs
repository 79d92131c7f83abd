use std::fmt;

use serde::Serialize;

/// Surrogate key assigned by storage when a `(symbol, date)` is first written
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(pub u64);

impl RecordId {
    pub fn next(&self) -> Self {
        return Self(self.0 + 1);
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        return write!(f, "{}", self.0);
    }
}
