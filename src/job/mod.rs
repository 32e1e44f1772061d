//! The transfer job aggregate and its lifecycle.
//!
//! A [`TransferJob`] is the long-lived record owned exclusively by the
//! orchestrator while running and persisted by the job store between steps
//! so that progress survives process restarts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mapping::ColumnMapping;
use crate::remote::types::{SheetRef, SourceRef};

// Submodule declarations
pub mod progress;

// Re-exports
pub use progress::{
    TransferError, TransferErrorKind, TransferProgress, TransferWarning, TransferWarningKind,
};

/// Unique identifier of a transfer job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        JobId(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        JobId::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle state of a job.
///
/// `pending → running → {completed | failed | cancelled}`. Completion means
/// "no more work", not "zero errors": callers must inspect progress counts,
/// not just status, to judge transfer quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Whether the job has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

/// Severity of a job log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// One entry of a job's append-only log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        LogEntry {
            at: Utc::now(),
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        LogEntry::new(LogLevel::Info, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        LogEntry::new(LogLevel::Warn, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        LogEntry::new(LogLevel::Error, message)
    }
}

/// Result of a dry-run execution: scope estimates, no destination writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DryRunSummary {
    pub total_rows: usize,
    pub total_images: usize,
    /// Extrapolated from a bounded accessibility sample.
    pub inaccessible_images_estimate: usize,
    pub estimated_seconds: u64,
    pub warnings: Vec<TransferWarning>,
    pub column_mappings: Vec<ColumnMapping>,
}

/// The long-lived transfer job aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferJob {
    pub id: JobId,
    pub source: SourceRef,
    pub destination: SheetRef,
    pub mappings: Vec<ColumnMapping>,
    pub status: JobStatus,
    /// Estimate scope without writing to the destination.
    pub dry_run: bool,
    /// Explicit header row index; skips detection when set.
    pub header_row_override: Option<usize>,
    /// Restrict conversion to these source column indices.
    pub selected_columns: Option<Vec<usize>>,
    pub progress: TransferProgress,
    /// Append-only execution log.
    pub logs: Vec<LogEntry>,
    /// Present after a dry-run execution completes.
    pub dry_run_summary: Option<DryRunSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TransferJob {
    /// A freshly created, pending job.
    pub fn new(
        source: SourceRef,
        destination: SheetRef,
        mappings: Vec<ColumnMapping>,
        dry_run: bool,
    ) -> Self {
        let now = Utc::now();
        TransferJob {
            id: JobId::new(),
            source,
            destination,
            mappings,
            status: JobStatus::Pending,
            dry_run,
            header_row_override: None,
            selected_columns: None,
            progress: TransferProgress::default(),
            logs: Vec::new(),
            dry_run_summary: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job_is_pending() {
        let job = TransferJob::new(
            SourceRef {
                spreadsheet_id: "sheet-1".to_string(),
                tabs: vec!["Tab 1".to_string()],
            },
            SheetRef { sheet_id: 99 },
            vec![],
            false,
        );
        assert_eq!(job.status, JobStatus::Pending);
        assert!(!job.status.is_terminal());
        assert!(job.logs.is_empty());
    }

    #[test]
    fn test_terminal_states() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
    }
}
