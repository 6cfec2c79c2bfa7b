//! Append-only log of per-stage results on a generation job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One stage's outcome, recorded when the stage finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    /// Stage name (e.g. "web_research", "content_writing")
    pub stage: String,
    /// Outcome label ("completed" or "failed")
    pub status: String,
    /// Minimal stage summary for observers; shape varies per stage
    pub summary: serde_json::Value,
    /// When the record was appended
    pub recorded_at: DateTime<Utc>,
}

/// Ordered, append-only log of stage records.
///
/// Records are never removed or rewritten; a re-run stage appends a second
/// record under the same name and lookups return the most recent one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StageLog {
    records: Vec<StageRecord>,
}

impl StageLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record for a completed stage.
    pub fn record(&mut self, stage: impl Into<String>, summary: serde_json::Value) {
        self.records.push(StageRecord {
            stage: stage.into(),
            status: "completed".to_string(),
            summary,
            recorded_at: Utc::now(),
        });
    }

    /// Append a record for a failed stage.
    pub fn record_failure(&mut self, stage: impl Into<String>, summary: serde_json::Value) {
        self.records.push(StageRecord {
            stage: stage.into(),
            status: "failed".to_string(),
            summary,
            recorded_at: Utc::now(),
        });
    }

    /// Most recent record for a stage name, if any.
    pub fn get(&self, stage: &str) -> Option<&StageRecord> {
        self.records.iter().rev().find(|r| r.stage == stage)
    }

    /// All records in append order.
    pub fn iter(&self) -> impl Iterator<Item = &StageRecord> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_records_append_in_order() {
        let mut log = StageLog::new();
        log.record("web_research", json!({"findings": 4}));
        log.record("outline_generation", json!({"sections": 7}));

        let stages: Vec<&str> = log.iter().map(|r| r.stage.as_str()).collect();
        assert_eq!(stages, vec!["web_research", "outline_generation"]);
    }

    #[test]
    fn test_get_returns_latest_record_for_stage() {
        let mut log = StageLog::new();
        log.record_failure("web_research", json!({"attempt": 1}));
        log.record("web_research", json!({"attempt": 2}));

        let record = log.get("web_research").unwrap();
        assert_eq!(record.status, "completed");
        assert_eq!(record.summary["attempt"], 2);
        // Both records remain in the log
        assert_eq!(log.len(), 2);
    }
}
