//! Progress, error, and warning records attached to a transfer job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification of a hard failure recorded against a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferErrorKind {
    ImageAccessDenied,
    ImageUploadFailed,
    RowInsertFailed,
    GeneralError,
}

/// Classification of a soft degradation recorded against a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferWarningKind {
    ImageFallback,
    DataTruncation,
    TypeConversion,
    GenericColumnName,
}

/// A hard failure. Append-only, never deduplicated; multiplicity is a
/// diagnostic signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferError {
    pub kind: TransferErrorKind,
    pub message: String,
    /// Zero-based data-row index within the tab, when the failure is
    /// row-scoped.
    pub row_index: Option<usize>,
    pub at: DateTime<Utc>,
}

impl TransferError {
    pub fn new(kind: TransferErrorKind, message: impl Into<String>) -> Self {
        TransferError {
            kind,
            message: message.into(),
            row_index: None,
            at: Utc::now(),
        }
    }

    pub fn for_row(kind: TransferErrorKind, row_index: usize, message: impl Into<String>) -> Self {
        TransferError {
            row_index: Some(row_index),
            ..TransferError::new(kind, message)
        }
    }
}

/// A soft degradation. Append-only, never deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferWarning {
    pub kind: TransferWarningKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl TransferWarning {
    pub fn new(kind: TransferWarningKind, message: impl Into<String>) -> Self {
        TransferWarning {
            kind,
            message: message.into(),
            at: Utc::now(),
        }
    }
}

/// Mutable progress record for one job execution.
///
/// Counters are monotonically non-decreasing within one execution; they are
/// never rewound except by job recreation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TransferProgress {
    pub total_rows: usize,
    pub processed_rows: usize,
    pub total_images: usize,
    pub processed_images: usize,
    pub successful_images: usize,
    pub fallback_images: usize,
    pub failed_images: usize,
    pub current_batch: usize,
    pub total_batches: usize,
    pub errors: Vec<TransferError>,
    pub warnings: Vec<TransferWarning>,
}

impl TransferProgress {
    pub fn record_error(&mut self, error: TransferError) {
        self.errors.push(error);
    }

    pub fn record_warning(&mut self, warning: TransferWarning) {
        self.warnings.push(warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_never_deduplicated() {
        let mut progress = TransferProgress::default();
        for _ in 0..3 {
            progress.record_error(TransferError::new(
                TransferErrorKind::RowInsertFailed,
                "row rejected",
            ));
        }
        assert_eq!(progress.errors.len(), 3);
    }
}
