//! Durable job record storage.
//!
//! The engine persists job status, progress, and logs through this seam so
//! that polling clients see incremental updates and progress survives
//! process restarts. Updates are expected to be eventually consistent but
//! monotonic. [`MemoryJobStore`] backs tests and single-process embedding;
//! production deployments implement [`JobStore`] over their own storage.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::common::{Error, Result};
use crate::job::{DryRunSummary, JobId, JobStatus, LogEntry, TransferJob, TransferProgress};

/// Durable job store keyed by job id.
pub trait JobStore: Send + Sync {
    /// Persist a newly created job.
    fn create(&self, job: TransferJob) -> Result<()>;

    /// Fetch a job by id.
    fn get(&self, id: JobId) -> Result<TransferJob>;

    /// Update a job's lifecycle status.
    fn update_status(&self, id: JobId, status: JobStatus) -> Result<()>;

    /// Replace a job's progress record.
    fn update_progress(&self, id: JobId, progress: &TransferProgress) -> Result<()>;

    /// Append one entry to a job's log.
    fn append_log(&self, id: JobId, entry: LogEntry) -> Result<()>;

    /// Store the summary produced by a dry-run execution.
    fn set_dry_run_summary(&self, id: JobId, summary: &DryRunSummary) -> Result<()>;
}

/// In-memory job store. Records are held as serialized JSON so that every
/// job goes through the same serialization path a durable implementation
/// would use.
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<JobId, String>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        MemoryJobStore::default()
    }

    fn with_job<T>(&self, id: JobId, f: impl FnOnce(&mut TransferJob) -> T) -> Result<T> {
        let mut jobs = self.jobs.write();
        let raw = jobs
            .get_mut(&id)
            .ok_or_else(|| Error::JobNotFound(id.to_string()))?;
        let mut job: TransferJob = serde_json::from_str(raw)?;
        let out = f(&mut job);
        job.updated_at = chrono::Utc::now();
        *raw = serde_json::to_string(&job)?;
        Ok(out)
    }
}

impl JobStore for MemoryJobStore {
    fn create(&self, job: TransferJob) -> Result<()> {
        let mut jobs = self.jobs.write();
        if jobs.contains_key(&job.id) {
            return Err(Error::Store(format!("job {} already exists", job.id)));
        }
        let raw = serde_json::to_string(&job)?;
        jobs.insert(job.id, raw);
        Ok(())
    }

    fn get(&self, id: JobId) -> Result<TransferJob> {
        let jobs = self.jobs.read();
        let raw = jobs
            .get(&id)
            .ok_or_else(|| Error::JobNotFound(id.to_string()))?;
        Ok(serde_json::from_str(raw)?)
    }

    fn update_status(&self, id: JobId, status: JobStatus) -> Result<()> {
        self.with_job(id, |job| job.status = status)
    }

    fn update_progress(&self, id: JobId, progress: &TransferProgress) -> Result<()> {
        self.with_job(id, |job| job.progress = progress.clone())
    }

    fn append_log(&self, id: JobId, entry: LogEntry) -> Result<()> {
        self.with_job(id, |job| job.logs.push(entry))
    }

    fn set_dry_run_summary(&self, id: JobId, summary: &DryRunSummary) -> Result<()> {
        self.with_job(id, |job| job.dry_run_summary = Some(summary.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::types::{SheetRef, SourceRef};

    fn job() -> TransferJob {
        TransferJob::new(
            SourceRef {
                spreadsheet_id: "s".to_string(),
                tabs: vec!["t".to_string()],
            },
            SheetRef { sheet_id: 1 },
            vec![],
            false,
        )
    }

    #[test]
    fn test_create_and_get() {
        let store = MemoryJobStore::new();
        let created = job();
        let id = created.id;
        store.create(created.clone()).unwrap();
        assert_eq!(store.get(id).unwrap().id, id);
        assert!(matches!(
            store.create(created),
            Err(Error::Store(_))
        ));
    }

    #[test]
    fn test_update_status_and_log() {
        let store = MemoryJobStore::new();
        let created = job();
        let id = created.id;
        store.create(created).unwrap();
        store.update_status(id, JobStatus::Running).unwrap();
        store.append_log(id, LogEntry::info("started")).unwrap();
        let fetched = store.get(id).unwrap();
        assert_eq!(fetched.status, JobStatus::Running);
        assert_eq!(fetched.logs.len(), 1);
    }

    #[test]
    fn test_json_roundtrip_preserves_job() {
        let store = MemoryJobStore::new();
        let mut created = job();
        created.header_row_override = Some(3);
        created.selected_columns = Some(vec![0, 2]);
        let id = created.id;
        store.create(created).unwrap();
        store
            .update_progress(
                id,
                &TransferProgress {
                    total_rows: 7,
                    processed_rows: 7,
                    ..Default::default()
                },
            )
            .unwrap();
        let fetched = store.get(id).unwrap();
        assert_eq!(fetched.header_row_override, Some(3));
        assert_eq!(fetched.selected_columns, Some(vec![0, 2]));
        assert_eq!(fetched.progress.total_rows, 7);
        assert_eq!(fetched.progress.processed_rows, 7);
    }

    #[test]
    fn test_missing_job() {
        let store = MemoryJobStore::new();
        assert!(matches!(
            store.get(JobId::new()),
            Err(Error::JobNotFound(_))
        ));
    }
}
