//! Batched row insertion into the destination sheet.
//!
//! Rows go to the destination in fixed-size batches, one call per batch.
//! A whole-batch failure marks every row in the batch failed and moves on;
//! automatic whole-batch retry is deliberately absent because re-inserting
//! possibly-already-inserted rows is worse than surfacing the failure. A
//! separate single-row path retries with exponential backoff for narrower
//! recovery.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::common::{Error, Result};
use crate::remote::types::{RowId, SheetRef};
use crate::remote::DestinationClient;

use super::config::TransferConfig;
use super::convert::{ConvertedRow, RowToken};

/// Outcome of one row within a batch submission.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Inserted(RowId),
    Failed { message: String },
}

/// Result of submitting one batch.
#[derive(Debug, Default)]
pub struct BatchInsertResult {
    /// Per-row outcomes, in submission order.
    pub outcomes: Vec<(RowToken, RowOutcome)>,
    /// Correlation-token resolution for successfully inserted rows.
    pub row_ids: HashMap<RowToken, RowId>,
}

impl BatchInsertResult {
    pub fn inserted_count(&self) -> usize {
        self.row_ids.len()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.row_ids.len()
    }
}

/// Inserts converted rows into one destination sheet.
pub struct BatchInserter<'a, D: DestinationClient> {
    destination: &'a D,
    sheet: SheetRef,
    config: &'a TransferConfig,
}

impl<'a, D: DestinationClient> BatchInserter<'a, D> {
    pub fn new(destination: &'a D, sheet: SheetRef, config: &'a TransferConfig) -> Self {
        BatchInserter {
            destination,
            sheet,
            config,
        }
    }

    /// Submit one batch in a single call.
    ///
    /// On success the destination returns row ids in submission order; they
    /// are resolved against each row's correlation token here, and the
    /// positional contract is asserted exactly once (a count mismatch marks
    /// the whole batch failed). Fatal errors propagate; any other failure
    /// is absorbed into per-row outcomes.
    pub async fn insert_batch(&self, rows: &[ConvertedRow]) -> Result<BatchInsertResult> {
        let payload: Vec<_> = rows.iter().map(|r| r.row.clone()).collect();
        match self.destination.insert_rows(&self.sheet, &payload).await {
            Ok(ids) if ids.len() == rows.len() => {
                debug!(rows = rows.len(), "batch inserted");
                let mut result = BatchInsertResult::default();
                for (row, id) in rows.iter().zip(ids) {
                    result.outcomes.push((row.token, RowOutcome::Inserted(id)));
                    result.row_ids.insert(row.token, id);
                }
                Ok(result)
            }
            Ok(ids) => {
                // The destination broke its ordering/count contract; treat
                // the batch as failed rather than guess at correlation.
                warn!(
                    expected = rows.len(),
                    returned = ids.len(),
                    "row id count mismatch from destination"
                );
                Ok(Self::all_failed(
                    rows,
                    format!(
                        "destination returned {} row ids for {} rows",
                        ids.len(),
                        rows.len()
                    ),
                ))
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(error = %e, rows = rows.len(), "batch insert failed");
                Ok(Self::all_failed(rows, e.to_string()))
            }
        }
    }

    fn all_failed(rows: &[ConvertedRow], message: String) -> BatchInsertResult {
        BatchInsertResult {
            outcomes: rows
                .iter()
                .map(|r| {
                    (
                        r.token,
                        RowOutcome::Failed {
                            message: message.clone(),
                        },
                    )
                })
                .collect(),
            row_ids: HashMap::new(),
        }
    }

    /// Insert a single row, retrying with exponential backoff (base delay
    /// doubling per attempt) before giving up.
    pub async fn insert_row_with_retry(&self, row: &ConvertedRow) -> Result<RowId> {
        let mut delay = self.config.retry_backoff;
        let mut last_error: Option<Error> = None;

        for attempt in 0..=self.config.row_retries {
            if attempt > 0 {
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            match self
                .destination
                .insert_rows(&self.sheet, std::slice::from_ref(&row.row))
                .await
            {
                Ok(ids) if ids.len() == 1 => return Ok(ids[0]),
                Ok(ids) => {
                    return Err(Error::Other(format!(
                        "destination returned {} row ids for a single row",
                        ids.len()
                    )));
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    debug!(attempt, error = %e, "single row insert failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::Other("row insert failed".into())))
    }
}
