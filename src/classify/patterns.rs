//! Compiled patterns for formula and storage-URL recognition.

use once_cell::sync::Lazy;
use regex::Regex;

/// `IMAGE("...")` anywhere in a formula. Also matches an image function
/// wrapped in a hyperlink function, e.g. `=HYPERLINK("x", IMAGE("y"))`.
static IMAGE_FN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bIMAGE\s*\(\s*"([^"]+)""#).unwrap());

/// `=HYPERLINK("target", ...)` at the start of a formula.
static HYPERLINK_FN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)^\s*=\s*HYPERLINK\s*\(\s*"([^"]+)""#).unwrap());

/// Storage-provider file URL shapes that carry a stable file identifier:
/// a `/file/d/<id>` path segment or an `id=<id>` query parameter.
static STORAGE_FILE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:/file/d/|[?&]id=)([A-Za-z0-9_-]{6,})").unwrap());

/// A bare storage file identifier: a fixed-length opaque token with no URL
/// around it.
static BARE_FILE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{25,44}$").unwrap());

/// First `http(s)` URL embedded in arbitrary text.
static EMBEDDED_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s"'<>)]+"#).unwrap());

/// Common raster-image file extensions.
const IMAGE_EXTENSIONS: [&str; 6] = [".png", ".jpg", ".jpeg", ".gif", ".webp", ".bmp"];

/// Extract the URL argument of an image function, if the formula contains one.
pub fn image_formula_url(formula: &str) -> Option<&str> {
    IMAGE_FN
        .captures(formula)
        .map(|c| c.get(1).unwrap().as_str())
}

/// Extract the target of a hyperlink formula, if the formula is one.
pub fn hyperlink_formula_url(formula: &str) -> Option<&str> {
    HYPERLINK_FN
        .captures(formula)
        .map(|c| c.get(1).unwrap().as_str())
}

/// Extract the stable file identifier from a storage file URL.
pub fn storage_file_id(url: &str) -> Option<&str> {
    STORAGE_FILE_ID
        .captures(url)
        .map(|c| c.get(1).unwrap().as_str())
}

/// Whether the URL points at a storage-provider file.
pub fn is_storage_file_url(url: &str) -> bool {
    storage_file_id(url).is_some()
}

/// Whether the URL is recognizable as an image: a storage file URL, or a
/// direct link with an image file extension.
pub fn is_image_url(url: &str) -> bool {
    if is_storage_file_url(url) {
        return true;
    }
    let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Whether a raw value is a bare storage file identifier.
pub fn is_bare_file_id(value: &str) -> bool {
    BARE_FILE_ID.is_match(value)
}

/// First URL embedded in a raw value, if any.
pub fn embedded_url(value: &str) -> Option<&str> {
    EMBEDDED_URL.find(value).map(|m| m.as_str())
}
