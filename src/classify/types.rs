//! Types produced and consumed by cell classification.

use serde::{Deserialize, Serialize};

/// A hyperlink attached to a cell through rich-cell metadata rather than a
/// formula (covers directly-embedded links and images).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichLink {
    /// Link target.
    pub url: String,
    /// Display text override, if the source exposes one.
    pub label: Option<String>,
}

/// A raw cell as read from the source spreadsheet, before classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCell {
    /// Formatted value as the source renders it.
    pub value: String,
    /// The cell's formula string, when present (including the leading `=`).
    pub formula: Option<String>,
    /// Rich-cell hyperlink metadata, when present.
    pub link: Option<RichLink>,
}

impl RawCell {
    /// A plain-value cell with no formula or rich metadata.
    pub fn text(value: impl Into<String>) -> Self {
        RawCell {
            value: value.into(),
            ..Default::default()
        }
    }
}

/// Reference to an image stored with the source provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// URL the image can be fetched from.
    pub url: String,
    /// Stable file identifier extracted from a storage URL, when the URL
    /// has a recognizable file shape.
    pub source_id: Option<String>,
}

/// A classified source cell. Produced once per cell; immutable afterwards.
///
/// Exactly one classification applies: an image reference, a hyperlink, or
/// a plain value. `is_image` and `hyperlink` are never both set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCell {
    /// Formatted value (empty string for missing cells).
    pub value: String,
    /// Original formula, kept for diagnostics.
    pub formula: Option<String>,
    /// Whether the cell represents an image.
    pub is_image: bool,
    /// Image payload, set only when `is_image` is true.
    pub image_ref: Option<ImageRef>,
    /// Hyperlink target, set only for non-image link cells.
    pub hyperlink: Option<String>,
}

impl SourceCell {
    /// An empty plain-value cell. Used to pad short rows to header width.
    pub fn empty() -> Self {
        SourceCell::default()
    }

    /// A plain-value cell.
    pub fn plain(value: impl Into<String>) -> Self {
        SourceCell {
            value: value.into(),
            ..Default::default()
        }
    }
}
