//! Invocation history - append-only execution records

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::Path;
use toolstore::{JsonStore, StoreError};
use uuid::Uuid;

use crate::runner::RunStatus;
use crate::tool::{ExecutionRequest, ToolDefinition};

/// Maximum preview length before truncation
const PREVIEW_MAX: usize = 100;

/// One past invocation, immutable once appended
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HistoryRecord {
    pub history_id: String,

    /// Denormalized tool snapshot - survives tool deletion
    pub tool_id: String,
    pub tool_name: String,

    /// ISO-8601 creation time
    pub timestamp: String,

    pub inputs: ExecutionRequest,

    /// Artifact leaf name inside the output directory
    pub output_file: String,

    pub status: RunStatus,

    /// First output line, truncated for list views
    pub preview: String,
}

impl HistoryRecord {
    pub fn new(
        tool: &ToolDefinition,
        inputs: ExecutionRequest,
        output_file: impl Into<String>,
        status: RunStatus,
        output_text: &str,
    ) -> Self {
        Self {
            history_id: Uuid::new_v4().to_string(),
            tool_id: tool.id.clone(),
            tool_name: tool.name.clone(),
            timestamp: Local::now().to_rfc3339(),
            inputs,
            output_file: output_file.into(),
            status,
            preview: preview(output_text),
        }
    }
}

/// First line of the output, truncated to [`PREVIEW_MAX`] chars plus ellipsis
fn preview(text: &str) -> String {
    let first = text.lines().next().unwrap_or("");
    if first.chars().count() > PREVIEW_MAX {
        let truncated: String = first.chars().take(PREVIEW_MAX).collect();
        format!("{}...", truncated)
    } else {
        first.to_string()
    }
}

/// The execution history, backed by one JSON file
///
/// Records are prepended, so the file and every query are newest-first.
pub struct HistoryLog {
    store: JsonStore<HistoryRecord>,
}

impl HistoryLog {
    /// Open the history log at the given file path
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self {
            store: JsonStore::open(path)?,
        })
    }

    /// Append a record (stored newest-first)
    pub fn append(&self, record: HistoryRecord) -> Result<(), StoreError> {
        self.store.update(|records| records.insert(0, record))
    }

    /// Records for one tool, newest-first
    pub fn list_by_tool(&self, tool_id: &str) -> Result<Vec<HistoryRecord>, StoreError> {
        Ok(self
            .store
            .read_all()?
            .into_iter()
            .filter(|r| r.tool_id == tool_id)
            .collect())
    }

    /// All records, newest-first
    pub fn all(&self) -> Result<Vec<HistoryRecord>, StoreError> {
        self.store.read_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(tool: &ToolDefinition, text: &str) -> HistoryRecord {
        HistoryRecord::new(tool, ExecutionRequest::new(), "out.txt", RunStatus::Success, text)
    }

    #[test]
    fn test_preview_is_first_line() {
        let tool = ToolDefinition::new("T", "true");
        let rec = record(&tool, "first line\nsecond line");
        assert_eq!(rec.preview, "first line");
    }

    #[test]
    fn test_preview_truncates_long_line() {
        let tool = ToolDefinition::new("T", "true");
        let rec = record(&tool, &"x".repeat(150));

        assert_eq!(rec.preview.chars().count(), 103);
        assert!(rec.preview.ends_with("..."));
    }

    #[test]
    fn test_preview_of_empty_output() {
        let tool = ToolDefinition::new("T", "true");
        let rec = record(&tool, "");
        assert_eq!(rec.preview, "");
    }

    #[test]
    fn test_list_by_tool_newest_first() {
        let temp = TempDir::new().unwrap();
        let log = HistoryLog::open(temp.path().join("history.json")).unwrap();

        let tool = ToolDefinition::new("T", "true");
        let other = ToolDefinition::new("Other", "true");

        log.append(record(&tool, "oldest")).unwrap();
        log.append(record(&other, "unrelated")).unwrap();
        log.append(record(&tool, "newest")).unwrap();

        let records = log.list_by_tool(&tool.id).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].preview, "newest");
        assert_eq!(records[1].preview, "oldest");
    }

    #[test]
    fn test_records_snapshot_tool_name() {
        let temp = TempDir::new().unwrap();
        let log = HistoryLog::open(temp.path().join("history.json")).unwrap();

        let tool = ToolDefinition::new("Snapshot Me", "true");
        log.append(record(&tool, "out")).unwrap();

        let records = log.all().unwrap();
        assert_eq!(records[0].tool_name, "Snapshot Me");
        assert_eq!(records[0].tool_id, tool.id);
    }

    #[test]
    fn test_record_serde_roundtrip() {
        let tool = ToolDefinition::new("T", "true");
        let mut inputs = ExecutionRequest::new();
        inputs.insert("domain".to_string(), "example.com".to_string());

        let rec = HistoryRecord::new(&tool, inputs, "out.txt", RunStatus::Error, "boom");
        let json = serde_json::to_string(&rec).unwrap();

        assert!(json.contains("\"status\":\"error\""));
        let back: HistoryRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.history_id, rec.history_id);
        assert_eq!(back.inputs.get("domain").unwrap(), "example.com");
    }
}
