//! Public surface for the orchestrating application layer.
//!
//! [`TransferService`] owns the capability clients, the job store, and the
//! event sink, and exposes the create/execute/poll/cancel operations. One
//! job executes as a single sequential flow; distinct jobs are fully
//! independent and may run concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::common::{Error, Result};
use crate::job::{DryRunSummary, JobId, JobStatus, TransferJob};
use crate::mapping::{self, ColumnMapping};
use crate::remote::types::{SheetRef, SourceRef};
use crate::remote::{DestinationClient, SourceClient};
use crate::store::JobStore;

use super::config::TransferConfig;
use super::events::{EventSink, TracingSink};
use super::orchestrator::{ExecutionContext, Orchestrator};

/// Everything needed to create a job.
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub source: SourceRef,
    pub destination: SheetRef,
    pub mappings: Vec<ColumnMapping>,
    pub dry_run: bool,
    pub header_row_override: Option<usize>,
    pub selected_columns: Option<Vec<usize>>,
}

/// The transfer engine's exposed surface.
pub struct TransferService<S, D, J> {
    source_client: S,
    destination: D,
    store: J,
    events: Arc<dyn EventSink>,
    config: TransferConfig,
    running: Mutex<HashMap<JobId, CancellationToken>>,
}

impl<S, D, J> TransferService<S, D, J>
where
    S: SourceClient,
    D: DestinationClient,
    J: JobStore,
{
    pub fn new(source_client: S, destination: D, store: J) -> Self {
        TransferService {
            source_client,
            destination,
            store,
            events: Arc::new(TracingSink),
            config: TransferConfig::default(),
            running: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn with_config(mut self, config: TransferConfig) -> Self {
        self.config = config;
        self
    }

    /// Create and persist a new pending job.
    pub fn create_job(&self, spec: JobSpec) -> Result<JobId> {
        mapping::validate_mappings(&spec.mappings)?;
        if spec.source.tabs.is_empty() {
            return Err(Error::InvalidJob("no source tabs declared".into()));
        }
        let mut job = TransferJob::new(spec.source, spec.destination, spec.mappings, spec.dry_run);
        job.header_row_override = spec.header_row_override;
        job.selected_columns = spec.selected_columns;
        let id = job.id;
        self.store.create(job)?;
        info!(%id, "job created");
        Ok(id)
    }

    /// Run a pending job to a terminal state. Exactly one execution can own
    /// a job: re-invoking on a non-pending or already-executing job is
    /// rejected.
    pub async fn execute_job(&self, id: JobId) -> Result<JobStatus> {
        let cancel = CancellationToken::new();
        // Status check and token registration happen under one lock so two
        // concurrent calls cannot both claim the same pending job.
        let job = {
            let mut running = self.running.lock();
            if running.contains_key(&id) {
                return Err(Error::InvalidJob(format!("job {id} is already executing")));
            }
            let job = self.store.get(id)?;
            if job.status != JobStatus::Pending {
                return Err(Error::InvalidJob(format!(
                    "job {id} is {:?}, only pending jobs can be executed",
                    job.status
                )));
            }
            running.insert(id, cancel.clone());
            job
        };

        let ctx = ExecutionContext {
            source_client: &self.source_client,
            destination: &self.destination,
            store: &self.store,
            events: self.events.as_ref(),
            config: &self.config,
            cancel,
        };
        let result = Orchestrator::new(ctx, job).run().await;

        self.running.lock().remove(&id);
        result
    }

    /// Fetch the job record, for progress polling.
    pub fn get_job(&self, id: JobId) -> Result<TransferJob> {
        self.store.get(id)
    }

    /// Request cooperative cancellation. A running job stops at the next
    /// batch boundary; a pending job is cancelled immediately.
    pub fn cancel_job(&self, id: JobId) -> Result<()> {
        if let Some(token) = self.running.lock().get(&id) {
            token.cancel();
            return Ok(());
        }
        let job = self.store.get(id)?;
        match job.status {
            JobStatus::Pending => self.store.update_status(id, JobStatus::Cancelled),
            status => Err(Error::InvalidJob(format!(
                "job {id} is {status:?} and cannot be cancelled"
            ))),
        }
    }

    /// Summary produced by a completed dry-run execution.
    pub fn dry_run_summary(&self, id: JobId) -> Result<DryRunSummary> {
        let job = self.store.get(id)?;
        job.dry_run_summary.ok_or_else(|| {
            Error::InvalidJob(format!("job {id} has no dry run summary (not a finished dry run)"))
        })
    }
}
