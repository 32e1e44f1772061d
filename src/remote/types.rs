//! Types exchanged with the source and destination services.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Opaque identifier of a destination sheet column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct ColumnId(pub u64);

/// Identifier assigned by the destination to an inserted row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub u64);

/// Reference to the source spreadsheet and the tabs to transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Provider-side spreadsheet identifier.
    pub spreadsheet_id: String,
    /// Tab names, processed strictly in order.
    pub tabs: Vec<String>,
}

/// Reference to the destination sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRef {
    /// Destination-side sheet identifier.
    pub sheet_id: u64,
}

/// One column of the destination sheet schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationColumn {
    pub id: ColumnId,
    pub title: String,
    /// Destination-native column type name, kept verbatim.
    pub column_type: String,
}

/// The destination sheet's column schema, in display order.
///
/// Read once per execution and treated as immutable for that execution's
/// lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SheetSchema {
    pub columns: Vec<DestinationColumn>,
}

/// Value written into one destination cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellPayload {
    Text { text: String },
    Number { number: f64 },
    Hyperlink { url: String, display: String },
}

/// One cell of a row to insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCell {
    pub column_id: ColumnId,
    #[serde(flatten)]
    pub payload: CellPayload,
}

/// One row to insert into the destination sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NewRow {
    pub cells: Vec<NewCell>,
}

/// Identifier of an attachment created on a destination cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentId(pub String);

/// A downloaded image ready for upload.
#[derive(Debug, Clone)]
pub struct ImageDownload {
    pub bytes: Bytes,
    pub mime_type: String,
    pub filename: String,
}
