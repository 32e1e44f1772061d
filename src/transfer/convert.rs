//! Conversion of classified source rows into destination row payloads.
//!
//! Image cells become placeholder text plus a queued [`ImageQueueEntry`];
//! the actual attachment happens after the batch is inserted. Each
//! converted row carries a [`RowToken`] assigned here and resolved to a
//! destination row id after insertion, so image-to-row correlation never
//! depends on array positions.

use crate::classify::{ImageRef, SourceCell};
use crate::job::{TransferWarning, TransferWarningKind};
use crate::mapping::{ColumnDataType, ColumnMapping};
use crate::remote::types::{CellPayload, ColumnId, NewCell, NewRow};

use super::config::TransferConfig;

/// Correlation token tying a converted row to its eventual destination row
/// id. Unique within one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowToken(u64);

/// Monotonic token generator for one execution.
#[derive(Debug, Default)]
pub struct RowTokenGen(u64);

impl RowTokenGen {
    pub fn next_token(&mut self) -> RowToken {
        self.0 += 1;
        RowToken(self.0)
    }
}

/// One row ready for insertion, tagged with its correlation token and the
/// absolute index of the source data row it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedRow {
    pub token: RowToken,
    pub source_row_index: usize,
    pub row: NewRow,
}

/// A deferred image attachment, queued while converting a batch and
/// consumed right after that batch's rows are inserted. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageQueueEntry {
    pub token: RowToken,
    pub column_id: ColumnId,
    pub image: ImageRef,
}

/// Output of converting one batch of source rows.
#[derive(Debug, Default)]
pub struct BatchConversion {
    pub rows: Vec<ConvertedRow>,
    pub images: Vec<ImageQueueEntry>,
    pub warnings: Vec<TransferWarning>,
}

/// Placeholder text written into an image cell until the attachment lands.
fn image_placeholder(cell: &SourceCell) -> String {
    if cell.value.trim().is_empty() {
        "[image]".to_string()
    } else {
        cell.value.clone()
    }
}

fn truncated(text: &str, max_len: usize) -> Option<String> {
    if text.chars().count() <= max_len {
        return None;
    }
    Some(text.chars().take(max_len).collect())
}

/// Parse a number out of formatted source text (currency symbols, digit
/// separators, and percent signs stripped).
fn parse_number(value: &str) -> Option<f64> {
    let stripped: String = value
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%' | ' '))
        .collect();
    if stripped.is_empty() {
        return None;
    }
    stripped.parse().ok()
}

fn convert_cell(
    cell: &SourceCell,
    mapping: &ColumnMapping,
    row_index: usize,
    config: &TransferConfig,
    out: &mut BatchConversion,
    token: RowToken,
) -> CellPayload {
    // An image classification wins regardless of the declared column type:
    // the placeholder goes in now, the attachment is deferred.
    if cell.is_image {
        if let Some(image) = &cell.image_ref {
            out.images.push(ImageQueueEntry {
                token,
                column_id: mapping.destination_column_id,
                image: image.clone(),
            });
        }
        return CellPayload::Text {
            text: image_placeholder(cell),
        };
    }

    if let Some(url) = &cell.hyperlink {
        let display = if cell.value.trim().is_empty() {
            url.clone()
        } else {
            cell.value.clone()
        };
        return CellPayload::Hyperlink {
            url: url.clone(),
            display,
        };
    }

    match mapping.data_type {
        ColumnDataType::Number => {
            if cell.value.trim().is_empty() {
                CellPayload::Text {
                    text: String::new(),
                }
            } else if let Some(number) = parse_number(&cell.value) {
                CellPayload::Number { number }
            } else {
                out.warnings.push(TransferWarning::new(
                    TransferWarningKind::TypeConversion,
                    format!(
                        "row {}: '{}' is not numeric, kept as text",
                        row_index, cell.value
                    ),
                ));
                CellPayload::Text {
                    text: cell.value.clone(),
                }
            }
        }
        // Dates pass through as text; the destination parses its own
        // date formats.
        _ => match truncated(&cell.value, config.max_cell_text_len) {
            Some(text) => {
                out.warnings.push(TransferWarning::new(
                    TransferWarningKind::DataTruncation,
                    format!(
                        "row {}: cell truncated to {} characters",
                        row_index, config.max_cell_text_len
                    ),
                ));
                CellPayload::Text { text }
            }
            None => CellPayload::Text {
                text: cell.value.clone(),
            },
        },
    }
}

/// Convert one batch of classified rows into destination payloads.
///
/// `row_offset` is the absolute index of the first data row in the batch,
/// used for row-scoped diagnostics. `selected` restricts which source
/// columns are converted; `None` converts every mapped column.
pub fn convert_batch(
    rows: &[Vec<SourceCell>],
    mappings: &[ColumnMapping],
    selected: Option<&[usize]>,
    row_offset: usize,
    config: &TransferConfig,
    tokens: &mut RowTokenGen,
) -> BatchConversion {
    let mut out = BatchConversion::default();
    let empty = SourceCell::empty();

    for (offset, source_row) in rows.iter().enumerate() {
        let row_index = row_offset + offset;
        let token = tokens.next_token();
        let mut row = NewRow::default();

        for mapping in mappings {
            if let Some(selected) = selected
                && !selected.contains(&mapping.source_column_index)
            {
                continue;
            }
            let cell = source_row.get(mapping.source_column_index).unwrap_or(&empty);
            let payload = convert_cell(cell, mapping, row_index, config, &mut out, token);
            row.cells.push(NewCell {
                column_id: mapping.destination_column_id,
                payload,
            });
        }

        out.rows.push(ConvertedRow {
            token,
            source_row_index: row_index,
            row,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ImageRef;
    use crate::remote::types::ColumnId;

    fn mapping(index: usize, id: u64, data_type: ColumnDataType) -> ColumnMapping {
        ColumnMapping {
            source_column_index: index,
            destination_column_id: ColumnId(id),
            data_type,
        }
    }

    fn image_cell(url: &str, id: &str) -> SourceCell {
        SourceCell {
            is_image: true,
            image_ref: Some(ImageRef {
                url: url.to_string(),
                source_id: Some(id.to_string()),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_plain_conversion() {
        let rows = vec![vec![SourceCell::plain("Widget"), SourceCell::plain("12")]];
        let mappings = vec![
            mapping(0, 1, ColumnDataType::Text),
            mapping(1, 2, ColumnDataType::Number),
        ];
        let mut tokens = RowTokenGen::default();
        let out = convert_batch(
            &rows,
            &mappings,
            None,
            0,
            &TransferConfig::default(),
            &mut tokens,
        );
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].row.cells.len(), 2);
        assert_eq!(
            out.rows[0].row.cells[1].payload,
            CellPayload::Number { number: 12.0 }
        );
        assert!(out.images.is_empty());
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_image_cell_queues_and_placeholders() {
        let rows = vec![vec![image_cell("https://storage.example/file/d/ABC123", "ABC123")]];
        let mappings = vec![mapping(0, 7, ColumnDataType::Image)];
        let mut tokens = RowTokenGen::default();
        let out = convert_batch(
            &rows,
            &mappings,
            None,
            0,
            &TransferConfig::default(),
            &mut tokens,
        );
        assert_eq!(out.images.len(), 1);
        assert_eq!(out.images[0].column_id, ColumnId(7));
        assert_eq!(out.images[0].token, out.rows[0].token);
        assert_eq!(
            out.rows[0].row.cells[0].payload,
            CellPayload::Text {
                text: "[image]".to_string()
            }
        );
    }

    #[test]
    fn test_numeric_fallback_warns() {
        let rows = vec![vec![SourceCell::plain("twelve")]];
        let mappings = vec![mapping(0, 1, ColumnDataType::Number)];
        let mut tokens = RowTokenGen::default();
        let out = convert_batch(
            &rows,
            &mappings,
            None,
            4,
            &TransferConfig::default(),
            &mut tokens,
        );
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(
            out.warnings[0].kind,
            crate::job::TransferWarningKind::TypeConversion
        );
        assert!(out.warnings[0].message.contains("row 4"));
    }

    #[test]
    fn test_currency_parses() {
        let rows = vec![vec![SourceCell::plain("$1,234.50")]];
        let mappings = vec![mapping(0, 1, ColumnDataType::Number)];
        let mut tokens = RowTokenGen::default();
        let out = convert_batch(
            &rows,
            &mappings,
            None,
            0,
            &TransferConfig::default(),
            &mut tokens,
        );
        assert_eq!(
            out.rows[0].row.cells[0].payload,
            CellPayload::Number { number: 1234.5 }
        );
    }

    #[test]
    fn test_truncation_warns() {
        let config = TransferConfig {
            max_cell_text_len: 5,
            ..Default::default()
        };
        let rows = vec![vec![SourceCell::plain("abcdefghij")]];
        let mappings = vec![mapping(0, 1, ColumnDataType::Text)];
        let mut tokens = RowTokenGen::default();
        let out = convert_batch(&rows, &mappings, None, 0, &config, &mut tokens);
        assert_eq!(
            out.rows[0].row.cells[0].payload,
            CellPayload::Text {
                text: "abcde".to_string()
            }
        );
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_selected_columns_filter() {
        let rows = vec![vec![SourceCell::plain("a"), SourceCell::plain("b")]];
        let mappings = vec![
            mapping(0, 1, ColumnDataType::Text),
            mapping(1, 2, ColumnDataType::Text),
        ];
        let mut tokens = RowTokenGen::default();
        let out = convert_batch(
            &rows,
            &mappings,
            Some(&[1]),
            0,
            &TransferConfig::default(),
            &mut tokens,
        );
        assert_eq!(out.rows[0].row.cells.len(), 1);
        assert_eq!(out.rows[0].row.cells[0].column_id, ColumnId(2));
    }

    #[test]
    fn test_hyperlink_cell() {
        let rows = vec![vec![SourceCell {
            value: "docs".to_string(),
            hyperlink: Some("https://example.com".to_string()),
            ..Default::default()
        }]];
        let mappings = vec![mapping(0, 1, ColumnDataType::Hyperlink)];
        let mut tokens = RowTokenGen::default();
        let out = convert_batch(
            &rows,
            &mappings,
            None,
            0,
            &TransferConfig::default(),
            &mut tokens,
        );
        assert_eq!(
            out.rows[0].row.cells[0].payload,
            CellPayload::Hyperlink {
                url: "https://example.com".to_string(),
                display: "docs".to_string()
            }
        );
    }

    #[test]
    fn test_tokens_unique_across_batches() {
        let mut tokens = RowTokenGen::default();
        let rows = vec![vec![SourceCell::plain("x")]; 3];
        let mappings = vec![mapping(0, 1, ColumnDataType::Text)];
        let config = TransferConfig::default();
        let a = convert_batch(&rows, &mappings, None, 0, &config, &mut tokens);
        let b = convert_batch(&rows, &mappings, None, 3, &config, &mut tokens);
        let mut all: Vec<RowToken> = a
            .rows
            .iter()
            .chain(b.rows.iter())
            .map(|r| r.token)
            .collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 6);
    }
}
