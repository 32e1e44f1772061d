//! The transfer state machine.
//!
//! Execution is modelled as an explicit [`Phase`] enum driven by an outer
//! loop: each step reads the current phase, performs one unit of work, and
//! returns the next phase. Cancellation is cooperative and takes effect at
//! phase boundaries, which puts it exactly between batches. Progress is
//! persisted after every batch; a failed progress write is logged and does
//! not abort the job.

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::classify::{ImageRef, SourceCell, classify_row};
use crate::common::{Error, Result};
use crate::detect::{self, DetectedHeader};
use crate::job::{
    DryRunSummary, JobStatus, LogEntry, TransferError, TransferErrorKind, TransferJob,
    TransferWarning, TransferWarningKind,
};
use crate::mapping;
use crate::remote::{DestinationClient, SourceClient};
use crate::store::JobStore;

use super::batch::{BatchInserter, RowOutcome};
use super::config::TransferConfig;
use super::convert::{RowTokenGen, convert_batch};
use super::dry_run;
use super::events::{EventSink, TransferEvent};
use super::images::ImageFallbackPipeline;

/// Everything an execution needs from the outside world.
pub struct ExecutionContext<'a, S, D, J> {
    pub source_client: &'a S,
    pub destination: &'a D,
    pub store: &'a J,
    pub events: &'a dyn EventSink,
    pub config: &'a TransferConfig,
    pub cancel: CancellationToken,
}

/// One fully extracted and classified tab, ready for batching.
struct TabPlan {
    name: String,
    data_rows: Vec<Vec<SourceCell>>,
    images: Vec<ImageRef>,
}

impl TabPlan {
    fn batch_count(&self, batch_size: usize) -> usize {
        self.data_rows.len().div_ceil(batch_size)
    }
}

/// Current position in the execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Fetch and classify one source tab.
    Extract { tab: usize },
    /// Rewrite column mappings against the real destination schema.
    Reconcile,
    /// Insert one batch of one tab and resolve its images.
    Transfer { tab: usize, batch: usize },
    /// Probe an image sample and produce estimates instead of writing.
    DryRunReport,
    /// All work attempted.
    Complete,
}

pub(crate) struct Orchestrator<'a, S, D, J> {
    ctx: ExecutionContext<'a, S, D, J>,
    job: TransferJob,
    plans: Vec<TabPlan>,
    tokens: RowTokenGen,
}

impl<'a, S, D, J> Orchestrator<'a, S, D, J>
where
    S: SourceClient,
    D: DestinationClient,
    J: JobStore,
{
    pub(crate) fn new(ctx: ExecutionContext<'a, S, D, J>, job: TransferJob) -> Self {
        Orchestrator {
            ctx,
            job,
            plans: Vec::new(),
            tokens: RowTokenGen::default(),
        }
    }

    /// Drive the job from `running` to a terminal state. Returns the final
    /// status; run-time failures land on the job record rather than in the
    /// returned error.
    pub(crate) async fn run(mut self) -> Result<JobStatus> {
        self.set_status(JobStatus::Running)?;
        self.ctx
            .events
            .emit(self.job.id, &TransferEvent::ExecutionStarted);
        self.log(LogEntry::info("transfer started"));

        let mut phase = Phase::Extract { tab: 0 };
        loop {
            if self.ctx.cancel.is_cancelled() {
                return self.cancelled();
            }
            phase = match self.step(phase).await {
                Ok(Phase::Complete) => break,
                Ok(next) => next,
                Err(e) => return self.failed(e),
            };
        }

        self.finish(JobStatus::Completed, LogEntry::info("transfer completed"))
    }

    /// Perform one unit of work and return the next phase.
    async fn step(&mut self, phase: Phase) -> Result<Phase> {
        match phase {
            Phase::Extract { tab } => {
                if tab < self.job.source.tabs.len() {
                    self.extract_tab(tab).await?;
                    return Ok(Phase::Extract { tab: tab + 1 });
                }
                self.record_totals();
                if self.job.dry_run {
                    Ok(Phase::DryRunReport)
                } else {
                    Ok(Phase::Reconcile)
                }
            }
            Phase::Reconcile => {
                self.reconcile().await?;
                self.preview_images().await?;
                Ok(Phase::Transfer { tab: 0, batch: 0 })
            }
            Phase::Transfer { tab, batch } => {
                if tab >= self.plans.len() {
                    return Ok(Phase::Complete);
                }
                if batch >= self.plans[tab].batch_count(self.ctx.config.batch_size) {
                    return Ok(Phase::Transfer {
                        tab: tab + 1,
                        batch: 0,
                    });
                }
                self.transfer_batch(tab, batch).await?;
                Ok(Phase::Transfer {
                    tab,
                    batch: batch + 1,
                })
            }
            Phase::DryRunReport => {
                self.dry_run_report().await?;
                Ok(Phase::Complete)
            }
            Phase::Complete => Ok(Phase::Complete),
        }
    }

    /// Fetch one tab, resolve its header row, and classify every cell.
    async fn extract_tab(&mut self, tab_index: usize) -> Result<()> {
        let tab_name = self.job.source.tabs[tab_index].clone();
        let raw = self
            .ctx
            .source_client
            .fetch_tab_data(&self.job.source, &tab_name, 0)
            .await?;

        let text_grid: Vec<Vec<String>> = raw
            .iter()
            .map(|row| row.iter().map(|cell| cell.value.clone()).collect())
            .collect();

        let header = match self.job.header_row_override {
            Some(index) if index < raw.len() => {
                let (headers, generic_labels) = detect::headers_from_row(&text_grid[index]);
                DetectedHeader {
                    headers,
                    row_index: index,
                    synthetic: false,
                    generic_labels,
                }
            }
            Some(index) => {
                return Err(Error::InvalidJob(format!(
                    "header row override {index} is beyond tab '{tab_name}' ({} rows)",
                    raw.len()
                )));
            }
            None => detect::detect_header_row(&text_grid),
        };

        if header.generic_labels > 0 {
            self.job.progress.record_warning(TransferWarning::new(
                TransferWarningKind::GenericColumnName,
                format!(
                    "tab '{tab_name}': {} column(s) got generic names",
                    header.generic_labels
                ),
            ));
        }

        let data_start = if header.synthetic {
            header.row_index
        } else {
            header.row_index + 1
        };
        let width = header.headers.len();
        let data_rows: Vec<Vec<SourceCell>> = raw[data_start.min(raw.len())..]
            .iter()
            .map(|row| classify_row(row, width))
            .collect();

        let images: Vec<ImageRef> = data_rows
            .iter()
            .flatten()
            .filter_map(|cell| cell.image_ref.clone())
            .collect();

        self.ctx.events.emit(
            self.job.id,
            &TransferEvent::HeaderResolved {
                tab: tab_name.clone(),
                row_index: header.row_index,
                synthetic: header.synthetic,
            },
        );
        self.log(LogEntry::info(format!(
            "tab '{tab_name}': header row {} ({} data rows, {} images)",
            header.row_index,
            data_rows.len(),
            images.len()
        )));

        self.plans.push(TabPlan {
            name: tab_name,
            data_rows,
            images,
        });
        Ok(())
    }

    /// Record total row/image/batch counts once extraction is complete.
    fn record_totals(&mut self) {
        let batch_size = self.ctx.config.batch_size;
        let progress = &mut self.job.progress;
        progress.total_rows = self.plans.iter().map(|p| p.data_rows.len()).sum();
        progress.total_images = self.plans.iter().map(|p| p.images.len()).sum();
        progress.total_batches = self.plans.iter().map(|p| p.batch_count(batch_size)).sum();
        self.persist_progress();
    }

    /// Read the destination schema and rewrite mappings against it. A
    /// failure here aborts before any row is written.
    async fn reconcile(&mut self) -> Result<()> {
        let schema = self
            .ctx
            .destination
            .fetch_schema(&self.job.destination)
            .await?;
        mapping::reconcile_mappings(&mut self.job.mappings, &schema)?;
        self.ctx.events.emit(
            self.job.id,
            &TransferEvent::SchemaReconciled {
                columns: schema.columns.len(),
            },
        );
        self.log(LogEntry::info(format!(
            "column mappings reconciled against {} destination columns",
            schema.columns.len()
        )));
        Ok(())
    }

    /// Probe a small image sample before the first live batch so broken
    /// image access shows up in the log ahead of any fallback churn.
    async fn preview_images(&mut self) -> Result<()> {
        let images: Vec<ImageRef> = self
            .plans
            .iter()
            .flat_map(|p| p.images.iter().cloned())
            .collect();
        if images.is_empty() {
            return Ok(());
        }
        let stats = dry_run::probe_images(
            self.ctx.source_client,
            &self.job.source,
            &images,
            self.ctx.config.preview_image_sample,
        )
        .await?;
        if stats.inaccessible > 0 {
            self.log(LogEntry::warn(format!(
                "image preview: {} of {} sampled images look inaccessible",
                stats.inaccessible, stats.sampled
            )));
        }
        Ok(())
    }

    /// Convert, insert, and image-resolve one batch, then persist progress.
    async fn transfer_batch(&mut self, tab_index: usize, batch_index: usize) -> Result<()> {
        let batch_size = self.ctx.config.batch_size;
        let plan = &self.plans[tab_index];
        let tab_name = plan.name.clone();
        let start = batch_index * batch_size;
        let end = (start + batch_size).min(plan.data_rows.len());

        let conversion = convert_batch(
            &plan.data_rows[start..end],
            &self.job.mappings,
            self.job.selected_columns.as_deref(),
            start,
            self.ctx.config,
            &mut self.tokens,
        );

        // Token -> source row index, for row-scoped error records.
        let row_indices: std::collections::HashMap<_, _> = conversion
            .rows
            .iter()
            .map(|r| (r.token, r.source_row_index))
            .collect();

        for warning in conversion.warnings {
            self.job.progress.record_warning(warning);
        }

        let inserter = BatchInserter::new(self.ctx.destination, self.job.destination, self.ctx.config);
        let inserted = inserter.insert_batch(&conversion.rows).await?;

        for (token, outcome) in &inserted.outcomes {
            if let RowOutcome::Failed { message } = outcome {
                let row_index = row_indices.get(token).copied().unwrap_or_default();
                self.job.progress.record_error(TransferError::for_row(
                    TransferErrorKind::RowInsertFailed,
                    row_index,
                    format!("tab '{tab_name}': {message}"),
                ));
            }
        }
        self.job.progress.processed_rows += conversion.rows.len();
        self.job.progress.current_batch += 1;

        self.ctx.events.emit(
            self.job.id,
            &TransferEvent::BatchFinished {
                tab: tab_name.clone(),
                batch: batch_index + 1,
                total_batches: self.job.progress.total_batches,
                inserted_rows: inserted.inserted_count(),
                failed_rows: inserted.failed_count(),
            },
        );

        if !conversion.images.is_empty() {
            let pipeline = ImageFallbackPipeline::new(
                self.ctx.source_client,
                self.ctx.destination,
                &self.job.source,
                self.job.destination,
            );
            let outcomes = pipeline
                .process(&conversion.images, &inserted.row_ids, &mut self.job.progress)
                .await?;
            self.ctx.events.emit(
                self.job.id,
                &TransferEvent::ImagesResolved {
                    tab: tab_name.clone(),
                    batch: batch_index + 1,
                    successful: outcomes.successful,
                    fallback: outcomes.fallback,
                    failed: outcomes.failed,
                },
            );
        }

        self.log(LogEntry::info(format!(
            "tab '{tab_name}': batch {}/{} done ({} rows)",
            self.job.progress.current_batch,
            self.job.progress.total_batches,
            conversion.rows.len()
        )));
        self.persist_progress();
        Ok(())
    }

    /// Probe an image sample and store scope estimates; writes nothing to
    /// the destination.
    async fn dry_run_report(&mut self) -> Result<()> {
        let images: Vec<ImageRef> = self
            .plans
            .iter()
            .flat_map(|p| p.images.iter().cloned())
            .collect();
        let stats = dry_run::probe_images(
            self.ctx.source_client,
            &self.job.source,
            &images,
            self.ctx.config.dry_run_image_sample,
        )
        .await?;

        let progress = &self.job.progress;
        let summary = DryRunSummary {
            total_rows: progress.total_rows,
            total_images: progress.total_images,
            inaccessible_images_estimate: dry_run::extrapolate_inaccessible(
                stats,
                progress.total_images,
            ),
            estimated_seconds: dry_run::estimate_seconds(
                progress.total_batches,
                progress.total_images,
            ),
            warnings: progress.warnings.clone(),
            column_mappings: self.job.mappings.clone(),
        };

        self.ctx.events.emit(
            self.job.id,
            &TransferEvent::DryRunFinished {
                total_rows: summary.total_rows,
                total_images: summary.total_images,
                inaccessible_estimate: summary.inaccessible_images_estimate,
            },
        );
        self.log(LogEntry::info(format!(
            "dry run: {} rows, {} images, ~{} inaccessible, ~{}s",
            summary.total_rows,
            summary.total_images,
            summary.inaccessible_images_estimate,
            summary.estimated_seconds
        )));

        if let Err(e) = self.ctx.store.set_dry_run_summary(self.job.id, &summary) {
            warn!(job = %self.job.id, error = %e, "failed to store dry run summary");
        }
        self.job.dry_run_summary = Some(summary);
        Ok(())
    }

    fn cancelled(mut self) -> Result<JobStatus> {
        self.finish(
            JobStatus::Cancelled,
            LogEntry::warn("transfer cancelled by request"),
        )
    }

    fn failed(mut self, error: Error) -> Result<JobStatus> {
        self.job.progress.record_error(TransferError::new(
            TransferErrorKind::GeneralError,
            error.to_string(),
        ));
        self.finish(
            JobStatus::Failed,
            LogEntry::error(format!("transfer aborted: {error}")),
        )
    }

    fn finish(&mut self, status: JobStatus, entry: LogEntry) -> Result<JobStatus> {
        self.persist_progress();
        self.log(entry);
        self.set_status(status)?;
        self.ctx
            .events
            .emit(self.job.id, &TransferEvent::ExecutionFinished { status });
        Ok(status)
    }

    fn set_status(&mut self, status: JobStatus) -> Result<()> {
        self.job.status = status;
        self.ctx
            .store
            .update_status(self.job.id, status)
            .map_err(|e| Error::Store(format!("status update failed: {e}")))
    }

    /// Best-effort progress checkpoint.
    fn persist_progress(&self) {
        if let Err(e) = self
            .ctx
            .store
            .update_progress(self.job.id, &self.job.progress)
        {
            warn!(job = %self.job.id, error = %e, "progress write failed");
        }
    }

    /// Best-effort log append.
    fn log(&self, entry: LogEntry) {
        if let Err(e) = self.ctx.store.append_log(self.job.id, entry) {
            warn!(job = %self.job.id, error = %e, "log append failed");
        }
    }
}
