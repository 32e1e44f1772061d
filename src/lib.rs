//! Gridshift - a transfer engine for migrating spreadsheet data into
//! grid-based sheet services.
//!
//! Gridshift moves tabular data, embedded images, and hyperlinks from a
//! spreadsheet source into a destination sheet service, preserving column
//! semantics and degrading gracefully on partial failure.
//!
//! # Features
//!
//! - **Header detection**: finds the real column-header row inside noisy
//!   sheets (title banners, notes, blank padding) with a deterministic
//!   scoring heuristic
//! - **Cell classification**: tells image formulas, storage file links,
//!   hyperlinks, and plain values apart, one classification per cell
//! - **Batched insertion**: fixed-size batches with per-row failure
//!   isolation and a single-row retry path with exponential backoff
//! - **Image fallback**: download → upload per image, degrading to a
//!   hyperlink back to the original, with three disjoint outcome buckets
//! - **Dry runs**: scope estimates (rows, images, accessibility) without
//!   writing to the destination
//!
//! # Example
//!
//! ```no_run
//! use gridshift::mapping::{ColumnDataType, ColumnMapping};
//! use gridshift::remote::http::{HttpDestinationClient, HttpSourceClient};
//! use gridshift::remote::{SheetRef, SourceRef};
//! use gridshift::store::MemoryJobStore;
//! use gridshift::transfer::{JobSpec, TransferService};
//! # use gridshift::remote::TokenProvider;
//! # #[derive(Clone)] struct Tokens;
//! # impl TokenProvider for Tokens {
//! #     async fn bearer_token(&self) -> gridshift::common::Result<String> {
//! #         Ok("token".to_string())
//! #     }
//! # }
//!
//! # async fn run() -> gridshift::common::Result<()> {
//! let service = TransferService::new(
//!     HttpSourceClient::new("https://source.example", Tokens),
//!     HttpDestinationClient::new("https://dest.example", Tokens),
//!     MemoryJobStore::new(),
//! );
//!
//! let job_id = service.create_job(JobSpec {
//!     source: SourceRef {
//!         spreadsheet_id: "abc".to_string(),
//!         tabs: vec!["Sheet1".to_string()],
//!     },
//!     destination: SheetRef { sheet_id: 42 },
//!     mappings: vec![
//!         ColumnMapping::new(0, ColumnDataType::Text),
//!         ColumnMapping::new(1, ColumnDataType::Number),
//!     ],
//!     dry_run: false,
//!     header_row_override: None,
//!     selected_columns: None,
//! })?;
//!
//! let status = service.execute_job(job_id).await?;
//! let job = service.get_job(job_id)?;
//! println!("{status:?}: {} rows", job.progress.processed_rows);
//! # Ok(())
//! # }
//! ```

// Module declarations
pub mod classify;
pub mod common;
pub mod detect;
pub mod job;
pub mod mapping;
pub mod remote;
pub mod store;
pub mod transfer;

// Re-export commonly used types for convenience
pub use common::{Error, Result};
pub use job::{JobId, JobStatus, TransferJob, TransferProgress};
pub use transfer::{JobSpec, TransferConfig, TransferService};
