//! The transfer orchestration engine.
//!
//! Sequences header detection, cell classification, column reconciliation,
//! batched row insertion, and deferred image attachment for one job, with
//! progress checkpointed after every batch.
//!
//! # Flow
//!
//! ```text
//! extract tabs ──► record totals ──► reconcile mappings
//!                                          │
//!            ┌─ dry run ─► probe sample ──►│
//!            │                             ▼
//!            └──────────────── per tab, per batch:
//!                              convert ► insert ► images ► checkpoint
//! ```
//!
//! Cancellation is cooperative and takes effect between batches; a batch
//! already in flight finishes first.

// Submodule declarations
pub mod batch;
pub mod config;
pub mod convert;
pub mod dry_run;
pub mod events;
pub mod images;
mod orchestrator;
mod service;


// Re-exports
pub use batch::{BatchInsertResult, BatchInserter, RowOutcome};
pub use config::TransferConfig;
pub use convert::{BatchConversion, ConvertedRow, ImageQueueEntry, RowToken, RowTokenGen};
pub use events::{EventSink, RecordingSink, TracingSink, TransferEvent};
pub use images::{ImageFallbackPipeline, ImageOutcomes};
pub use orchestrator::ExecutionContext;
pub use service::{JobSpec, TransferService};
