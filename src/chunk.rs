//! Page-level chunker.
//!
//! Converts extracted pages into retrievable units: one unit per page whose
//! whitespace-collapsed, trimmed text is non-empty. Pages with no
//! extractable text contribute no unit and cannot be cited.
//!
//! One-unit-per-page is a policy choice, not a hard requirement. A finer
//! chunker may split within pages later, but must keep the page attribution
//! that citation validation relies on, which is why [`PendingUnit`] carries
//! the page number rather than deriving it from the id.

use crate::models::{Page, PendingUnit};

/// Build pre-embedding units from extracted pages.
///
/// Unit ids are `p{page_number}`, unique within a document. Unit text is the
/// page text with every whitespace run collapsed to a single space and the
/// result trimmed. Ordering mirrors the input page order.
pub fn build_units(pages: &[Page]) -> Vec<PendingUnit> {
    pages
        .iter()
        .filter_map(|page| {
            let text = collapse_whitespace(&page.text);
            if text.is_empty() {
                return None;
            }
            Some(PendingUnit {
                id: format!("p{}", page.page_number),
                page: page.page_number,
                text,
            })
        })
        .collect()
}

/// Collapse whitespace runs to single spaces and trim.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
