//! Quote-to-fragment mapping for on-screen highlighting.
//!
//! The render collaborator supplies each page's text as an ordered sequence
//! of positioned fragments. To highlight a validated citation, the quote is
//! located inside the concatenation of those fragment texts, and every
//! fragment whose occupied range overlaps the match range is flagged.
//!
//! The render-time concatenation is allowed to diverge slightly from the
//! extraction-time page text (different whitespace heuristics), which is why
//! the same whitespace-tolerant locator runs here as in the validator. A
//! quote that cannot be located produces an empty set: the page renders with
//! no highlight rather than failing.

use std::collections::BTreeSet;

use crate::locate::locate;
use crate::models::{Citation, TextFragment};

/// Indexes of the fragments a single quote overlaps.
///
/// Fragment `i` occupies the half-open byte range
/// `[offset_i, offset_i + text_i.len())` in the concatenation of fragment
/// texts; it is highlighted iff that range overlaps the located match range.
pub fn highlighted_indexes(fragments: &[TextFragment], quote: &str) -> BTreeSet<usize> {
    let mut indexes = BTreeSet::new();

    let concatenated: String = fragments.iter().map(|f| f.text.as_str()).collect();
    let Some(matched) = locate(&concatenated, quote) else {
        return indexes;
    };

    let mut offset = 0usize;
    for (index, fragment) in fragments.iter().enumerate() {
        let start = offset;
        let end = offset + fragment.text.len();
        if start < matched.end && end > matched.start {
            indexes.insert(index);
        }
        offset = end;
    }

    indexes
}

/// Union of highlighted fragment indexes for every citation on a page.
///
/// Multiple citations on the same page accumulate into one set; citations
/// for other pages are ignored.
pub fn highlights_for_page(
    fragments: &[TextFragment],
    citations: &[Citation],
    page_number: u32,
) -> BTreeSet<usize> {
    let mut indexes = BTreeSet::new();
    for citation in citations.iter().filter(|c| c.page == page_number) {
        indexes.extend(highlighted_indexes(fragments, &citation.quote));
    }
    indexes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(text: &str) -> TextFragment {
        TextFragment {
            text: text.to_string(),
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 12.0,
        }
    }

    fn citation(page: u32, quote: &str) -> Citation {
        Citation {
            page,
            quote: quote.to_string(),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_quote_within_single_fragment() {
        let fragments = vec![fragment("Patient has "), fragment("type 2 diabetes.")];
        let indexes = highlighted_indexes(&fragments, "type 2 diabetes");
        assert_eq!(indexes, BTreeSet::from([1]));
    }

    #[test]
    fn test_quote_spanning_fragments() {
        let fragments = vec![
            fragment("Blood pres"),
            fragment("sure: 120/80"),
            fragment(" mmHg"),
        ];
        let indexes = highlighted_indexes(&fragments, "blood pressure: 120/80 mmhg");
        assert_eq!(indexes, BTreeSet::from([0, 1, 2]));
    }

    #[test]
    fn test_spacing_divergence_between_fragments() {
        // The extractor joined these without a space; the quote has one.
        let fragments = vec![fragment("Follow up in"), fragment("3 months.")];
        let indexes = highlighted_indexes(&fragments, "Follow up in 3 months");
        assert_eq!(indexes, BTreeSet::from([0, 1]));
    }

    #[test]
    fn test_unlocatable_quote_yields_empty_set() {
        let fragments = vec![fragment("Some page text.")];
        assert!(highlighted_indexes(&fragments, "not present").is_empty());
        assert!(highlighted_indexes(&fragments, "").is_empty());
    }

    #[test]
    fn test_no_fragments_yields_empty_set() {
        assert!(highlighted_indexes(&[], "anything").is_empty());
    }

    #[test]
    fn test_multiple_citations_union() {
        let fragments = vec![
            fragment("Alpha section. "),
            fragment("Middle filler. "),
            fragment("Omega section."),
        ];
        let citations = vec![citation(1, "Alpha section"), citation(1, "Omega section")];

        let union = highlights_for_page(&fragments, &citations, 1);

        let mut expected = highlighted_indexes(&fragments, "Alpha section");
        expected.extend(highlighted_indexes(&fragments, "Omega section"));
        assert_eq!(union, expected);
        assert_eq!(union, BTreeSet::from([0, 2]));
    }

    #[test]
    fn test_citations_for_other_pages_ignored() {
        let fragments = vec![fragment("Alpha section.")];
        let citations = vec![citation(2, "Alpha section")];
        assert!(highlights_for_page(&fragments, &citations, 1).is_empty());
    }
}
