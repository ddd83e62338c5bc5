//! Citation validation: the trust boundary against fabricated quotes.
//!
//! The answering engine's output is treated as untrusted. A citation
//! survives only if its quote is actually locatable (under the fuzzy
//! locator's loose normalization) in the text of the page it cites.
//! Everything else is dropped quietly; the answer body is never altered.
//! Filtering all citations away is a valid outcome, distinct from a hard
//! error.

use std::collections::HashMap;

use tracing::debug;

use crate::locate::locate;
use crate::models::{Answer, Page};

/// Filter a raw answer's citations to those backed by a locatable quote.
///
/// For each citation: look up the page record matching `citation.page`
/// (absent page → drop), then probe that page's text with the fuzzy locator
/// (no match → drop). Surviving citations are kept unchanged, including
/// their confidence values.
pub fn validate_citations(answer: Answer, pages: &[Page]) -> Answer {
    let by_page: HashMap<u32, &str> = pages
        .iter()
        .map(|p| (p.page_number, p.text.as_str()))
        .collect();

    let citations = answer
        .citations
        .into_iter()
        .filter(|citation| {
            let Some(page_text) = by_page.get(&citation.page) else {
                debug!(page = citation.page, "dropping citation: page not in index");
                return false;
            };
            if locate(page_text, &citation.quote).is_some() {
                true
            } else {
                debug!(
                    page = citation.page,
                    quote = %citation.quote,
                    "dropping citation: quote not locatable on page"
                );
                false
            }
        })
        .collect();

    Answer {
        text: answer.text,
        citations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Citation;

    fn page(number: u32, text: &str) -> Page {
        Page {
            page_number: number,
            text: text.to_string(),
            fragments: Vec::new(),
        }
    }

    fn citation(page: u32, quote: &str, confidence: f32) -> Citation {
        Citation {
            page,
            quote: quote.to_string(),
            confidence,
        }
    }

    #[test]
    fn test_verbatim_quote_is_kept_unchanged() {
        let pages = vec![page(1, "Patient has type 2 diabetes.")];
        let answer = Answer {
            text: "The patient has diabetes.".to_string(),
            citations: vec![citation(1, "type 2 diabetes", 0.9)],
        };
        let validated = validate_citations(answer, &pages);
        assert_eq!(validated.citations.len(), 1);
        assert_eq!(validated.citations[0].quote, "type 2 diabetes");
        assert_eq!(validated.citations[0].confidence, 0.9);
    }

    #[test]
    fn test_fabricated_quote_is_dropped() {
        let pages = vec![page(1, "Patient has type 2 diabetes.")];
        let answer = Answer {
            text: "answer".to_string(),
            citations: vec![citation(1, "type 1 diabetes", 0.9)],
        };
        let validated = validate_citations(answer, &pages);
        assert!(validated.citations.is_empty());
    }

    #[test]
    fn test_unknown_page_is_dropped() {
        let pages = vec![page(1, "Some text.")];
        let answer = Answer {
            text: "answer".to_string(),
            citations: vec![citation(7, "Some text", 0.5)],
        };
        let validated = validate_citations(answer, &pages);
        assert!(validated.citations.is_empty());
    }

    #[test]
    fn test_loose_match_survives() {
        let pages = vec![page(2, "Blood pressure: 120/80 mmHg recorded.")];
        let answer = Answer {
            text: "answer".to_string(),
            citations: vec![citation(2, "blood   pressure:120/80 MMHG", 0.8)],
        };
        let validated = validate_citations(answer, &pages);
        assert_eq!(validated.citations.len(), 1);
    }

    #[test]
    fn test_answer_body_never_altered() {
        let pages = vec![page(1, "text")];
        let answer = Answer {
            text: "Body stays intact.".to_string(),
            citations: vec![citation(1, "missing quote", 1.0)],
        };
        let validated = validate_citations(answer, &pages);
        assert_eq!(validated.text, "Body stays intact.");
        assert!(validated.citations.is_empty());
    }

    #[test]
    fn test_mixed_citations_filtered_independently() {
        let pages = vec![
            page(1, "Patient has type 2 diabetes."),
            page(2, "Follow up in 3 months."),
        ];
        let answer = Answer {
            text: "answer".to_string(),
            citations: vec![
                citation(1, "type 2 diabetes", 0.9),
                citation(2, "follow up in 6 months", 0.9),
                citation(2, "Follow up in 3 months", 0.7),
            ],
        };
        let validated = validate_citations(answer, &pages);
        let quotes: Vec<&str> = validated
            .citations
            .iter()
            .map(|c| c.quote.as_str())
            .collect();
        assert_eq!(quotes, vec!["type 2 diabetes", "Follow up in 3 months"]);
    }
}
