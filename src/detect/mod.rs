//! Header-row detection for noisy spreadsheet tabs.
//!
//! Real-world sheets rarely start with their column labels on row 0: title
//! banners, notes, and blank padding rows come first. This module scores
//! each leading row as a header candidate and returns the best guess, or
//! synthesizes generic labels when nothing looks like a header.

// Submodule declarations
mod functions;
pub mod vocabulary;

// Re-exports
pub use functions::{CANDIDATE_ROWS, DetectedHeader, detect_header_row, headers_from_row};
