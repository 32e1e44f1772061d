//! Structured execution events.
//!
//! Instead of firing log lines from inside business logic, the engine
//! emits one structured event per notable transition to an injected sink.
//! The production sink forwards to `tracing`; test doubles capture events
//! for assertion.

use parking_lot::Mutex;
use tracing::{error, info, warn};

use crate::job::{JobId, JobStatus};

/// One notable transition during a transfer execution.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferEvent {
    ExecutionStarted,
    HeaderResolved {
        tab: String,
        row_index: usize,
        synthetic: bool,
    },
    SchemaReconciled {
        columns: usize,
    },
    BatchFinished {
        tab: String,
        batch: usize,
        total_batches: usize,
        inserted_rows: usize,
        failed_rows: usize,
    },
    ImagesResolved {
        tab: String,
        batch: usize,
        successful: usize,
        fallback: usize,
        failed: usize,
    },
    DryRunFinished {
        total_rows: usize,
        total_images: usize,
        inaccessible_estimate: usize,
    },
    ExecutionFinished {
        status: JobStatus,
    },
}

/// Receives execution events. Implementations must be cheap and must not
/// fail; diagnostics never block the transfer.
pub trait EventSink: Send + Sync {
    fn emit(&self, job: JobId, event: &TransferEvent);
}

/// Production sink: forwards every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, job: JobId, event: &TransferEvent) {
        match event {
            TransferEvent::ExecutionStarted => info!(%job, "transfer started"),
            TransferEvent::HeaderResolved {
                tab,
                row_index,
                synthetic,
            } => info!(%job, tab, row_index, synthetic, "header row resolved"),
            TransferEvent::SchemaReconciled { columns } => {
                info!(%job, columns, "column mappings reconciled")
            }
            TransferEvent::BatchFinished {
                tab,
                batch,
                total_batches,
                inserted_rows,
                failed_rows,
            } => {
                if *failed_rows > 0 {
                    warn!(%job, tab, batch, total_batches, inserted_rows, failed_rows, "batch finished with failures")
                } else {
                    info!(%job, tab, batch, total_batches, inserted_rows, "batch inserted")
                }
            }
            TransferEvent::ImagesResolved {
                tab,
                batch,
                successful,
                fallback,
                failed,
            } => info!(%job, tab, batch, successful, fallback, failed, "images resolved"),
            TransferEvent::DryRunFinished {
                total_rows,
                total_images,
                inaccessible_estimate,
            } => info!(%job, total_rows, total_images, inaccessible_estimate, "dry run finished"),
            TransferEvent::ExecutionFinished { status } => match status {
                JobStatus::Failed => error!(%job, ?status, "transfer failed"),
                _ => info!(%job, ?status, "transfer finished"),
            },
        }
    }
}

/// Sink that records every event in memory. Used by tests and embedders
/// that want to inspect the event stream.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(JobId, TransferEvent)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        RecordingSink::default()
    }

    pub fn events(&self) -> Vec<(JobId, TransferEvent)> {
        self.events.lock().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, job: JobId, event: &TransferEvent) {
        self.events.lock().push((job, event.clone()));
    }
}
