use serde::Serialize;

/// Keeps the first `cap` messages and only counts the rest
#[derive(Debug, Clone)]
pub struct ErrorLog {
    cap: usize,
    kept: Vec<String>,
    dropped: usize,
}

impl ErrorLog {
    pub fn new(cap: usize) -> Self {
        return Self {
            cap,
            kept: Vec::new(),
            dropped: 0,
        };
    }

    pub fn push(&mut self, message: String) {
        if self.kept.len() < self.cap {
            self.kept.push(message);
        } else {
            self.dropped += 1;
        }
    }

    /// Retained messages, followed by a summary entry when anything was dropped
    pub fn into_entries(self) -> Vec<String> {
        let mut entries = self.kept;

        if self.dropped > 0 {
            entries.push(format!("...and {} more errors", self.dropped));
        }

        entries
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Success,
    Partial,
    Failed,
}

/// Outcome of one upload. `total_rows == success_count + failed_count` always holds.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct IngestionReport {
    pub total_rows: usize,
    pub success_count: usize,
    pub failed_count: usize,
    pub processed_bytes: u64,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,

    pub message: String,
}

impl IngestionReport {
    pub fn status(&self) -> UploadStatus {
        match (self.success_count, self.failed_count) {
            (_, 0) => UploadStatus::Success,
            (0, _) => UploadStatus::Failed,
            _ => UploadStatus::Partial,
        }
    }
}

pub fn summary_message(failed_count: usize) -> String {
    if failed_count == 0 {
        return "CSV file processed successfully".to_string();
    }

    format!("CSV file processed with {failed_count} errors")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn under_the_cap_nothing_is_summarized() {
        let mut log = ErrorLog::new(3);
        log.push("a".to_string());
        log.push("b".to_string());

        assert_eq!(log.into_entries(), vec!["a", "b"]);
    }

    #[test]
    fn exactly_at_the_cap_nothing_is_summarized() {
        let mut log = ErrorLog::new(2);
        log.push("a".to_string());
        log.push("b".to_string());

        assert_eq!(log.into_entries(), vec!["a", "b"]);
    }

    #[test]
    fn overflow_is_counted_in_a_trailing_entry() {
        let mut log = ErrorLog::new(100);
        for i in 0..150 {
            log.push(format!("error {i}"));
        }

        let entries = log.into_entries();
        assert_eq!(entries.len(), 101);
        assert_eq!(entries[99], "error 99");
        assert_eq!(entries[100], "...and 50 more errors");
    }

    fn report(success_count: usize, failed_count: usize) -> IngestionReport {
        IngestionReport {
            total_rows: success_count + failed_count,
            success_count,
            failed_count,
            processed_bytes: 0,
            errors: vec![],
            message: summary_message(failed_count),
        }
    }

    #[test]
    fn status_reflects_counts() {
        assert_eq!(report(10, 0).status(), UploadStatus::Success);
        assert_eq!(report(0, 0).status(), UploadStatus::Success);
        assert_eq!(report(3, 2).status(), UploadStatus::Partial);
        assert_eq!(report(0, 2).status(), UploadStatus::Failed);
    }

    #[test]
    fn messages() {
        assert_eq!(report(1, 0).message, "CSV file processed successfully");
        assert_eq!(report(1, 4).message, "CSV file processed with 4 errors");
    }

    #[test]
    fn empty_errors_are_omitted_from_json() {
        let json = serde_json::to_value(report(1, 0)).unwrap();

        assert!(json.get("errors").is_none());
        assert_eq!(json["total_rows"], 1);
        assert_eq!(json["message"], "CSV file processed successfully");
    }
}
