//! Cell classification: image reference, hyperlink, or plain value.
//!
//! Classification never fails; upstream spreadsheet data is inherently
//! messy and a cell that matches nothing is simply a plain value.

use super::patterns;
use super::types::{ImageRef, RawCell, SourceCell};

/// Build an [`ImageRef`] from a URL, extracting the stable file identifier
/// when the URL has a recognizable storage shape.
fn image_ref(url: &str) -> ImageRef {
    ImageRef {
        url: url.to_string(),
        source_id: patterns::storage_file_id(url).map(str::to_string),
    }
}

/// Classify one raw cell into a [`SourceCell`].
///
/// Rules apply in priority order; only the first match takes effect, so a
/// cell is exactly one of image, hyperlink, or plain value:
///
/// 1. An image-producing formula (optionally wrapped in a hyperlink
///    function) is an image.
/// 2. A hyperlink formula targeting a storage file URL is an image:
///    storage providers often represent inserted images as file links.
/// 3. Any other hyperlink formula records its target as a hyperlink.
/// 4. Rich-cell metadata linking to a recognizable image URL is promoted
///    to an image (directly-embedded, non-formula images).
/// 5. A raw value containing a storage file URL, or consisting of a bare
///    storage file identifier, is an image.
/// 6. Everything else is a plain value.
pub fn classify_cell(cell: &RawCell) -> SourceCell {
    let mut out = SourceCell {
        value: cell.value.clone(),
        formula: cell.formula.clone(),
        ..Default::default()
    };

    if let Some(formula) = cell.formula.as_deref() {
        if let Some(url) = patterns::image_formula_url(formula) {
            out.is_image = true;
            out.image_ref = Some(image_ref(url));
            return out;
        }
        if let Some(target) = patterns::hyperlink_formula_url(formula) {
            if patterns::is_storage_file_url(target) {
                out.is_image = true;
                out.image_ref = Some(image_ref(target));
            } else {
                out.hyperlink = Some(target.to_string());
            }
            return out;
        }
    }

    if let Some(link) = &cell.link {
        if patterns::is_image_url(&link.url) {
            out.is_image = true;
            out.image_ref = Some(image_ref(&link.url));
        } else {
            out.hyperlink = Some(link.url.clone());
        }
        return out;
    }

    let trimmed = cell.value.trim();
    if let Some(url) = patterns::embedded_url(trimmed) {
        if patterns::is_storage_file_url(url) {
            out.is_image = true;
            out.image_ref = Some(image_ref(url));
            return out;
        }
    } else if patterns::is_bare_file_id(trimmed) {
        out.is_image = true;
        out.image_ref = Some(ImageRef {
            url: trimmed.to_string(),
            source_id: Some(trimmed.to_string()),
        });
        return out;
    }

    out
}

/// Classify a whole row, padding or truncating to `width` so that row width
/// always equals the declared header width. Missing cells become empty
/// plain-value cells rather than being omitted.
pub fn classify_row(cells: &[RawCell], width: usize) -> Vec<SourceCell> {
    (0..width)
        .map(|i| match cells.get(i) {
            Some(cell) => classify_cell(cell),
            None => SourceCell::empty(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::types::RichLink;

    fn formula_cell(value: &str, formula: &str) -> RawCell {
        RawCell {
            value: value.to_string(),
            formula: Some(formula.to_string()),
            link: None,
        }
    }

    #[test]
    fn test_image_formula_with_storage_id() {
        let cell = formula_cell("", r#"=IMAGE("https://storage.example/file/d/ABC123")"#);
        let out = classify_cell(&cell);
        assert!(out.is_image);
        let image = out.image_ref.unwrap();
        assert_eq!(image.source_id.as_deref(), Some("ABC123"));
        assert!(out.hyperlink.is_none());
    }

    #[test]
    fn test_image_formula_plain_url_keeps_url_only() {
        let cell = formula_cell("", r#"=IMAGE("https://cdn.example/pic.png")"#);
        let out = classify_cell(&cell);
        assert!(out.is_image);
        let image = out.image_ref.unwrap();
        assert_eq!(image.url, "https://cdn.example/pic.png");
        assert!(image.source_id.is_none());
    }

    #[test]
    fn test_hyperlink_to_storage_file_is_image() {
        let cell = formula_cell(
            "photo",
            r#"=HYPERLINK("https://storage.example/file/d/XYZ99123/view", "photo")"#,
        );
        let out = classify_cell(&cell);
        assert!(out.is_image);
        assert_eq!(
            out.image_ref.unwrap().source_id.as_deref(),
            Some("XYZ99123")
        );
    }

    #[test]
    fn test_plain_hyperlink_formula() {
        let cell = formula_cell("site", r#"=HYPERLINK("https://example.com", "site")"#);
        let out = classify_cell(&cell);
        assert!(!out.is_image);
        assert_eq!(out.hyperlink.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_rich_link_image_promotion() {
        let cell = RawCell {
            value: "pic".to_string(),
            formula: None,
            link: Some(RichLink {
                url: "https://cdn.example/shot.jpeg".to_string(),
                label: None,
            }),
        };
        let out = classify_cell(&cell);
        assert!(out.is_image);
    }

    #[test]
    fn test_rich_link_non_image_stays_hyperlink() {
        let cell = RawCell {
            value: "docs".to_string(),
            formula: None,
            link: Some(RichLink {
                url: "https://example.com/docs".to_string(),
                label: Some("docs".to_string()),
            }),
        };
        let out = classify_cell(&cell);
        assert!(!out.is_image);
        assert_eq!(out.hyperlink.as_deref(), Some("https://example.com/docs"));
    }

    #[test]
    fn test_bare_file_id_value() {
        let cell = RawCell::text("1a2B3c4D5e6F7g8H9i0J1k2L3");
        let out = classify_cell(&cell);
        assert!(out.is_image);
        assert_eq!(
            out.image_ref.unwrap().source_id.as_deref(),
            Some("1a2B3c4D5e6F7g8H9i0J1k2L3")
        );
    }

    #[test]
    fn test_plain_value() {
        let out = classify_cell(&RawCell::text("Widget"));
        assert!(!out.is_image);
        assert!(out.hyperlink.is_none());
        assert_eq!(out.value, "Widget");
    }

    #[test]
    fn test_exactly_one_classification() {
        // A formula that is both an image function and carries a rich link:
        // the image rule wins and the hyperlink stays unset.
        let cell = RawCell {
            value: "".to_string(),
            formula: Some(r#"=IMAGE("https://storage.example/file/d/AAA111")"#.to_string()),
            link: Some(RichLink {
                url: "https://example.com".to_string(),
                label: None,
            }),
        };
        let out = classify_cell(&cell);
        assert!(out.is_image);
        assert!(out.hyperlink.is_none());
    }

    #[test]
    fn test_row_padded_to_width() {
        let row = classify_row(&[RawCell::text("a")], 3);
        assert_eq!(row.len(), 3);
        assert_eq!(row[1], SourceCell::empty());
        assert_eq!(row[2], SourceCell::empty());
    }
}
