//! Cell classification for source spreadsheet data.
//!
//! Every cell read from the source is classified exactly once as an image
//! reference, a hyperlink, or a plain value, based on its formula, its
//! rich-cell metadata, and its raw value. Classification is a pure function
//! of the input and never fails.

// Submodule declarations
mod classifier;
pub mod patterns;
pub mod types;

// Re-exports
pub use classifier::{classify_cell, classify_row};
pub use types::{ImageRef, RawCell, RichLink, SourceCell};
