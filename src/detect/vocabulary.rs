//! Domain vocabulary for header-row scoring.
//!
//! Labels that contain one of these tokens are strong header signals.
//! Grouped by domain; extend freely, a miss only costs the +3 bonus.

use phf::phf_set;

static VOCABULARY: phf::Set<&'static str> = phf_set! {
    // Identity
    "id", "name", "title", "code", "sku", "number", "no", "ref",
    // Time
    "date", "created", "updated", "start", "end", "due", "deadline",
    "month", "year", "week", "time",
    // Workflow
    "status", "state", "stage", "priority", "owner", "assignee",
    "assigned", "approver", "progress", "phase", "task", "project",
    // Commerce
    "amount", "quantity", "qty", "cost", "price", "total", "subtotal",
    "budget", "invoice", "order", "vendor", "customer", "client",
    "currency", "tax", "discount", "payment",
    // Contact
    "email", "phone", "address", "city", "country", "zip", "contact",
    "company",
    // Content
    "description", "notes", "comment", "comments", "category", "type",
    "tags", "label", "department", "location", "url", "link", "image",
    "photo", "file", "attachment",
};

/// Whether any word of the label (split on non-alphanumeric boundaries)
/// appears in the vocabulary.
pub fn matches_vocabulary(label: &str) -> bool {
    label
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .any(|w| VOCABULARY.contains(w.to_ascii_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_word_match() {
        assert!(matches_vocabulary("Customer Name"));
        assert!(matches_vocabulary("unit_cost"));
        assert!(matches_vocabulary("Due Date"));
        assert!(matches_vocabulary("QTY"));
        assert!(!matches_vocabulary("Banana"));
        assert!(!matches_vocabulary(""));
    }
}
