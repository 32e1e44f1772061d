//! Capability seams to the source spreadsheet and destination sheet
//! services.
//!
//! The engine never talks to a provider directly; it drives these traits.
//! [`http`] contains reqwest-backed implementations speaking a JSON wire
//! shape; tests substitute in-memory doubles. Futures are required to be
//! `Send` so executions can be spawned onto a runtime.

use std::future::Future;

// Submodule declarations
pub mod http;
pub mod types;

// Re-exports
pub use types::{
    AttachmentId, CellPayload, ColumnId, DestinationColumn, ImageDownload, NewCell, NewRow, RowId,
    SheetRef, SheetSchema, SourceRef,
};

use crate::classify::{ImageRef, RawCell};
use crate::common::Result;

/// Supplies a valid bearer credential on demand.
///
/// Token acquisition and refresh happen behind this seam; the engine only
/// requires that an expired-beyond-refresh credential surfaces as
/// [`crate::common::Error::AccessRevoked`].
pub trait TokenProvider: Send + Sync {
    fn bearer_token(&self) -> impl Future<Output = Result<String>> + Send;
}

/// Read access to the source spreadsheet service and its file storage.
pub trait SourceClient: Send + Sync {
    /// Fetch a tab's cell grid starting at `start_row` (zero-based).
    ///
    /// Fails with [`crate::common::Error::AccessRevoked`] when source
    /// access has been revoked.
    fn fetch_tab_data(
        &self,
        source: &SourceRef,
        tab: &str,
        start_row: usize,
    ) -> impl Future<Output = Result<Vec<Vec<RawCell>>>> + Send;

    /// Download an image by storage file id or direct URL.
    ///
    /// Access and existence failures surface as
    /// [`crate::common::Error::AccessDenied`] /
    /// [`crate::common::Error::NotFound`] so callers can distinguish them.
    fn download_image(
        &self,
        source: &SourceRef,
        image: &ImageRef,
    ) -> impl Future<Output = Result<ImageDownload>> + Send;

    /// Cheaply check whether an image is accessible without downloading it.
    fn probe_image(
        &self,
        source: &SourceRef,
        image: &ImageRef,
    ) -> impl Future<Output = Result<bool>> + Send;
}

/// Write access to the destination sheet service.
pub trait DestinationClient: Send + Sync {
    /// Read the destination sheet's ordered column schema.
    fn fetch_schema(
        &self,
        destination: &SheetRef,
    ) -> impl Future<Output = Result<SheetSchema>> + Send;

    /// Insert rows in one call. All-or-nothing per call; on success the
    /// returned row ids correspond positionally to the submitted rows.
    fn insert_rows(
        &self,
        destination: &SheetRef,
        rows: &[NewRow],
    ) -> impl Future<Output = Result<Vec<RowId>>> + Send;

    /// Attach an image to a specific destination cell.
    fn attach_image_to_cell(
        &self,
        destination: &SheetRef,
        row: RowId,
        column: ColumnId,
        image: &ImageDownload,
    ) -> impl Future<Output = Result<AttachmentId>> + Send;

    /// Rewrite a cell as a plain hyperlink pointing at `url`.
    fn update_cell_as_hyperlink(
        &self,
        destination: &SheetRef,
        row: RowId,
        column: ColumnId,
        url: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}
