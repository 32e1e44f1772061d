//! Header-row detection heuristic.
//!
//! Scores each of the first candidate rows of a tab and picks the most
//! header-like one. Detection is deterministic and side-effect-free:
//! identical input always yields identical output, which the job replay
//! and retry paths rely on.

use once_cell::sync::Lazy;
use regex::Regex;

use super::vocabulary::matches_vocabulary;

/// How many leading rows are considered as header candidates.
pub const CANDIDATE_ROWS: usize = 10;

/// A bare cell reference like `A1` or `BC23`.
static CELL_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]{1,3}[0-9]{1,7}$").unwrap());

/// A date-shaped value like `2024-01-05`, `1/5/24`, or `01.2024`.
static DATE_SHAPED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,4}[-/.]\d{1,2}([-/.]\d{1,4})?$").unwrap());

/// Note/summary prefixes that mark a cell as narrative rather than a label.
static NOTE_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(note|notes|summary|total|totals|subtotal|n/?a$|see |as of |updated )")
        .unwrap()
});

/// The detected (or synthesized) header row of a tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedHeader {
    /// Final column labels, deduplicated, with generic `Column N`
    /// placeholders where no usable label was found.
    pub headers: Vec<String>,
    /// Index of the header row within the scanned rows.
    pub row_index: usize,
    /// True when no row scored above zero and the headers were synthesized;
    /// every scanned row is then data.
    pub synthetic: bool,
    /// Number of generic placeholders substituted into `headers`.
    pub generic_labels: usize,
}

fn is_numeric_like(value: &str) -> bool {
    let stripped: String = value
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%' | ' '))
        .collect();
    !stripped.is_empty() && stripped.parse::<f64>().is_ok()
}

fn is_date_shaped(value: &str) -> bool {
    DATE_SHAPED.is_match(value)
}

/// Clean one cell into a candidate label. Numeric-looking cells, bare cell
/// references, and note/summary text are rejected (they become generic
/// `Column N` placeholders in the final header list).
fn clean_label(cell: &str) -> Option<&str> {
    let trimmed = cell.trim();
    if trimmed.is_empty()
        || is_numeric_like(trimmed)
        || CELL_REF.is_match(trimmed)
        || NOTE_LIKE.is_match(trimmed)
    {
        None
    } else {
        Some(trimmed)
    }
}

/// Score one candidate row. Higher is more header-like.
fn score_row(rows: &[Vec<String>], index: usize) -> i32 {
    let row = &rows[index];
    if row.is_empty() {
        return 0;
    }
    let cleaned: Vec<Option<&str>> = row.iter().map(|c| clean_label(c)).collect();
    let labels: Vec<&str> = cleaned.iter().filter_map(|l| *l).collect();

    let mut score = 2 * labels.len() as i32;

    for label in &labels {
        let len = label.chars().count();
        if (2..=30).contains(&len) {
            score += 1;
        } else if len > 50 {
            score -= 2;
        }
        if matches_vocabulary(label) {
            score += 3;
        }
    }

    // Textual label with a numeric cell directly below: the classic
    // header/data boundary signal. Counted once per row.
    if let Some(below) = rows.get(index + 1) {
        let shift = cleaned.iter().enumerate().any(|(col, label)| {
            label.is_some()
                && below
                    .get(col)
                    .is_some_and(|cell| is_numeric_like(cell.trim()))
        });
        if shift {
            score += 3;
        }
    }

    // Mostly-filled rows are more header-like than sparse rows.
    if labels.len() as f64 / row.len() as f64 >= 0.7 {
        score += 3;
    }

    if (3..=50).contains(&row.len()) {
        score += 2;
    }

    // A row whose surviving labels are all date-shaped or numeric is data,
    // not a header.
    if !labels.is_empty()
        && labels
            .iter()
            .all(|l| is_numeric_like(l) || is_date_shaped(l))
    {
        score -= 10;
    }

    score
}

/// Build header labels from a row: generic placeholders for rejected
/// cells, duplicates suffixed with a counter. Returns the labels and the
/// number of generic substitutions. Used for the winning candidate row and
/// for explicit header-row overrides.
pub fn headers_from_row(row: &[String]) -> (Vec<String>, usize) {
    let mut generic = 0usize;
    let mut counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    let mut used: std::collections::HashSet<String> = std::collections::HashSet::new();
    let headers = row
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let base = match clean_label(cell) {
                Some(label) => label.to_string(),
                None => {
                    generic += 1;
                    format!("Column {}", i + 1)
                }
            };
            let count = counts.entry(base.to_ascii_lowercase()).or_insert(0);
            *count += 1;
            let mut label = if *count > 1 {
                format!("{} {}", base, count)
            } else {
                base.clone()
            };
            // A suffixed label can collide with a literal cell elsewhere in
            // the row; keep bumping until the label is unused.
            while !used.insert(label.to_ascii_lowercase()) {
                *count += 1;
                label = format!("{} {}", base, count);
            }
            label
        })
        .collect();
    (headers, generic)
}

/// Detect the header row among (up to) the first ten rows of a tab.
///
/// The highest-scoring candidate wins; ties keep the lowest index. When no
/// row scores above zero, generic `Column 1..N` headers are synthesized
/// from the widest row and every scanned row is treated as data.
pub fn detect_header_row(rows: &[Vec<String>]) -> DetectedHeader {
    let candidates = rows.len().min(CANDIDATE_ROWS);
    let mut best: Option<(usize, i32)> = None;
    for index in 0..candidates {
        let score = score_row(rows, index);
        if best.is_none_or(|(_, b)| score > b) {
            best = Some((index, score));
        }
    }

    match best {
        Some((index, score)) if score > 0 => {
            let (headers, generic_labels) = headers_from_row(&rows[index]);
            DetectedHeader {
                headers,
                row_index: index,
                synthetic: false,
                generic_labels,
            }
        }
        _ => {
            let width = rows.iter().map(Vec::len).max().unwrap_or(0);
            let headers: Vec<String> = (1..=width).map(|i| format!("Column {i}")).collect();
            DetectedHeader {
                generic_labels: headers.len(),
                headers,
                row_index: 0,
                synthetic: true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_simple_header_detected() {
        let rows = grid(&[&["Name", "Qty"], &["Widget", "12"], &["Gadget", "7"]]);
        let detected = detect_header_row(&rows);
        assert_eq!(detected.row_index, 0);
        assert!(!detected.synthetic);
        assert_eq!(detected.headers, vec!["Name", "Qty"]);
    }

    #[test]
    fn test_header_below_noise_rows() {
        let rows = grid(&[
            &["Summary for Q3", ""],
            &["", ""],
            &["Item Name", "Unit Cost", "Status"],
            &["Bolt", "0.12", "active"],
        ]);
        let detected = detect_header_row(&rows);
        assert_eq!(detected.row_index, 2);
        assert_eq!(detected.headers[0], "Item Name");
    }

    #[test]
    fn test_type_shift_breaks_tie() {
        // Identical label rows, but only the first has numeric data below.
        let with_shift = grid(&[&["Alpha", "Beta"], &["1", "2"]]);
        let without_shift = grid(&[&["Alpha", "Beta"], &["x", "y"]]);
        let a = score_row(&with_shift, 0);
        let b = score_row(&without_shift, 0);
        assert!(a > b, "type-shift bonus missing: {a} <= {b}");
    }

    #[test]
    fn test_all_numeric_grid_synthesizes() {
        let rows = grid(&[&["1", "2"], &["3", "4"], &["5", "6", "7"]]);
        let detected = detect_header_row(&rows);
        assert!(detected.synthetic);
        assert_eq!(detected.headers, vec!["Column 1", "Column 2", "Column 3"]);
        assert_eq!(detected.row_index, 0);
    }

    #[test]
    fn test_empty_input_synthesizes_empty() {
        let detected = detect_header_row(&[]);
        assert!(detected.synthetic);
        assert!(detected.headers.is_empty());
    }

    #[test]
    fn test_generic_and_duplicate_labels() {
        let rows = grid(&[&["Name", "42", "Name", ""], &["a", "b", "c", "d"]]);
        let detected = detect_header_row(&rows);
        assert_eq!(
            detected.headers,
            vec!["Name", "Column 2", "Name 2", "Column 4"]
        );
        assert_eq!(detected.generic_labels, 2);
    }

    #[test]
    fn test_duplicate_collides_with_literal_suffix() {
        // The second "Name" would normally become "Name 2", but that label
        // is already taken by a literal cell.
        let row: Vec<String> = ["Name", "Name 2", "Name"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        let (headers, generic) = headers_from_row(&row);
        assert_eq!(headers, vec!["Name", "Name 2", "Name 3"]);
        assert_eq!(generic, 0);
    }

    #[test]
    fn test_date_row_penalized() {
        let rows = grid(&[
            &["2024-01-01", "2024-02-01", "2024-03-01"],
            &["Name", "Qty", "Status"],
            &["Widget", "12", "ok"],
        ]);
        let detected = detect_header_row(&rows);
        assert_eq!(detected.row_index, 1);
    }

    #[test]
    fn test_deterministic() {
        let rows = grid(&[
            &["Summary", ""],
            &["Name", "Amount", "Due Date"],
            &["Widget", "12.50", "2024-05-01"],
        ]);
        let first = detect_header_row(&rows);
        for _ in 0..10 {
            assert_eq!(detect_header_row(&rows), first);
        }
    }
}
