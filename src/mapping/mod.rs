//! Column mappings and their reconciliation against the destination schema.
//!
//! A job declares one mapping per source column, in source-column order.
//! Destination column ids in declared mappings are provisional: the real
//! ids may not exist until the destination sheet is created. Reconciliation
//! rewrites each mapping to the actual id at the same ordinal position, and
//! fails fast on a count mismatch: silent column loss is worse than an
//! aborted job.

use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};
use crate::remote::types::{ColumnId, SheetSchema};

/// Intended data type of a mapped column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ColumnDataType {
    #[default]
    Text,
    Number,
    Date,
    Image,
    Hyperlink,
}

/// Association between one source column and one destination column.
/// Many-to-one is disallowed; each source column maps to exactly one
/// destination column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Zero-based index of the column in the source tab.
    pub source_column_index: usize,
    /// Destination column id; provisional until reconciled.
    pub destination_column_id: ColumnId,
    /// Intended data type for conversion.
    pub data_type: ColumnDataType,
}

impl ColumnMapping {
    pub fn new(source_column_index: usize, data_type: ColumnDataType) -> Self {
        ColumnMapping {
            source_column_index,
            destination_column_id: ColumnId::default(),
            data_type,
        }
    }
}

/// Validate a declared mapping list at job creation: source columns must be
/// unique (many-to-one is disallowed).
pub fn validate_mappings(mappings: &[ColumnMapping]) -> Result<()> {
    if mappings.is_empty() {
        return Err(Error::InvalidJob("no column mappings declared".into()));
    }
    let mut seen = std::collections::HashSet::new();
    for mapping in mappings {
        if !seen.insert(mapping.source_column_index) {
            return Err(Error::InvalidJob(format!(
                "source column {} mapped more than once",
                mapping.source_column_index
            )));
        }
    }
    Ok(())
}

/// Rewrite every mapping's destination id to the real column id at the same
/// ordinal position of the destination schema.
///
/// Fails fast with a count-mismatch error when the destination has fewer
/// columns than declared mappings. Idempotent: reconciling an
/// already-correct list is a no-op.
pub fn reconcile_mappings(mappings: &mut [ColumnMapping], schema: &SheetSchema) -> Result<()> {
    if schema.columns.len() < mappings.len() {
        return Err(Error::SchemaMismatch(format!(
            "destination has {} columns but {} mappings are declared",
            schema.columns.len(),
            mappings.len()
        )));
    }
    for (mapping, column) in mappings.iter_mut().zip(&schema.columns) {
        mapping.destination_column_id = column.id;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::types::DestinationColumn;

    fn schema(ids: &[u64]) -> SheetSchema {
        SheetSchema {
            columns: ids
                .iter()
                .map(|&id| DestinationColumn {
                    id: ColumnId(id),
                    title: format!("col{id}"),
                    column_type: "TEXT_NUMBER".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_reconcile_rewrites_ordinally() {
        let mut mappings = vec![
            ColumnMapping::new(0, ColumnDataType::Text),
            ColumnMapping::new(1, ColumnDataType::Number),
        ];
        reconcile_mappings(&mut mappings, &schema(&[11, 22, 33])).unwrap();
        assert_eq!(mappings[0].destination_column_id, ColumnId(11));
        assert_eq!(mappings[1].destination_column_id, ColumnId(22));
    }

    #[test]
    fn test_reconcile_idempotent() {
        let mut mappings = vec![
            ColumnMapping::new(0, ColumnDataType::Text),
            ColumnMapping::new(1, ColumnDataType::Image),
        ];
        let sheet = schema(&[5, 6]);
        reconcile_mappings(&mut mappings, &sheet).unwrap();
        let once = mappings.clone();
        reconcile_mappings(&mut mappings, &sheet).unwrap();
        assert_eq!(mappings, once);
    }

    #[test]
    fn test_reconcile_count_mismatch_fails_fast() {
        let mut mappings: Vec<ColumnMapping> = (0..5)
            .map(|i| ColumnMapping::new(i, ColumnDataType::Text))
            .collect();
        let err = reconcile_mappings(&mut mappings, &schema(&[1, 2, 3])).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch(_)));
    }

    #[test]
    fn test_validate_rejects_duplicate_source_columns() {
        let mappings = vec![
            ColumnMapping::new(2, ColumnDataType::Text),
            ColumnMapping::new(2, ColumnDataType::Number),
        ];
        assert!(matches!(
            validate_mappings(&mappings),
            Err(Error::InvalidJob(_))
        ));
    }
}
