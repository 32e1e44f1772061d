//! Deferred image attachment with hyperlink fallback.
//!
//! After a batch's rows are inserted, every queued image is resolved to its
//! destination row and pushed through download → upload. Any failure on
//! that path degrades to rewriting the cell as a hyperlink back to the
//! original source; if even that write fails, a hard error is recorded and
//! the placeholder text stays. Every image lands in exactly one of three
//! buckets (successful, fallback, failed), and the three always sum to
//! the number of queued images.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::common::{Error, Result};
use crate::job::{
    TransferError, TransferErrorKind, TransferProgress, TransferWarning, TransferWarningKind,
};
use crate::remote::types::{RowId, SheetRef, SourceRef};
use crate::remote::{DestinationClient, SourceClient};

use super::convert::{ImageQueueEntry, RowToken};

/// Disjoint outcome buckets for one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageOutcomes {
    pub successful: usize,
    pub fallback: usize,
    pub failed: usize,
}

impl ImageOutcomes {
    pub fn total(&self) -> usize {
        self.successful + self.fallback + self.failed
    }
}

/// Resolves queued images against a freshly inserted batch.
pub struct ImageFallbackPipeline<'a, S: SourceClient, D: DestinationClient> {
    source_client: &'a S,
    destination: &'a D,
    source: &'a SourceRef,
    sheet: SheetRef,
}

impl<'a, S: SourceClient, D: DestinationClient> ImageFallbackPipeline<'a, S, D> {
    pub fn new(
        source_client: &'a S,
        destination: &'a D,
        source: &'a SourceRef,
        sheet: SheetRef,
    ) -> Self {
        ImageFallbackPipeline {
            source_client,
            destination,
            source,
            sheet,
        }
    }

    /// Process every queued entry for one batch. Fatal errors (credential
    /// revocation) propagate; every other failure is absorbed into the
    /// outcome buckets and the progress record.
    pub async fn process(
        &self,
        queue: &[ImageQueueEntry],
        row_ids: &HashMap<RowToken, RowId>,
        progress: &mut TransferProgress,
    ) -> Result<ImageOutcomes> {
        let mut outcomes = ImageOutcomes::default();

        for entry in queue {
            let Some(&row) = row_ids.get(&entry.token) else {
                // The owning row never made it into the destination; there
                // is no cell to attach to or rewrite.
                outcomes.failed += 1;
                progress.failed_images += 1;
                progress.processed_images += 1;
                progress.record_error(TransferError::new(
                    TransferErrorKind::ImageUploadFailed,
                    format!("image {} skipped: its row was not inserted", entry.image.url),
                ));
                continue;
            };

            match self.transfer_image(entry, row).await {
                Ok(()) => {
                    outcomes.successful += 1;
                    progress.successful_images += 1;
                }
                Err(cause) if cause.is_fatal() => return Err(cause),
                Err(cause) => {
                    debug!(url = %entry.image.url, error = %cause, "image transfer failed, trying hyperlink fallback");
                    match self.fallback_hyperlink(entry, row).await {
                        Ok(()) => {
                            outcomes.fallback += 1;
                            progress.fallback_images += 1;
                            progress.record_warning(TransferWarning::new(
                                TransferWarningKind::ImageFallback,
                                format!(
                                    "image {} could not be transferred ({cause}); cell linked to the original instead",
                                    entry.image.url
                                ),
                            ));
                        }
                        Err(fallback_error) if fallback_error.is_fatal() => {
                            return Err(fallback_error);
                        }
                        Err(fallback_error) => {
                            warn!(url = %entry.image.url, error = %fallback_error, "hyperlink fallback failed");
                            outcomes.failed += 1;
                            progress.failed_images += 1;
                            progress.record_error(TransferError::new(
                                error_kind(&cause),
                                format!(
                                    "image {} failed: {cause}; fallback failed: {fallback_error}",
                                    entry.image.url
                                ),
                            ));
                        }
                    }
                }
            }
            progress.processed_images += 1;
        }

        debug_assert_eq!(outcomes.total(), queue.len());
        Ok(outcomes)
    }

    async fn transfer_image(&self, entry: &ImageQueueEntry, row: RowId) -> Result<()> {
        let download = self
            .source_client
            .download_image(self.source, &entry.image)
            .await?;
        self.destination
            .attach_image_to_cell(&self.sheet, row, entry.column_id, &download)
            .await?;
        Ok(())
    }

    async fn fallback_hyperlink(&self, entry: &ImageQueueEntry, row: RowId) -> Result<()> {
        self.destination
            .update_cell_as_hyperlink(&self.sheet, row, entry.column_id, &entry.image.url)
            .await
    }
}

fn error_kind(cause: &Error) -> TransferErrorKind {
    match cause {
        Error::AccessDenied(_) | Error::NotFound(_) => TransferErrorKind::ImageAccessDenied,
        _ => TransferErrorKind::ImageUploadFailed,
    }
}
