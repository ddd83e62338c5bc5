//! Two-phase fuzzy substring location.
//!
//! Finds where a model-produced quote sits inside a haystack (page text or
//! fragment-concatenated text), tolerating case, punctuation, and whitespace
//! variation while recovering exact byte offsets in the original haystack.
//!
//! # Algorithm
//!
//! 1. Normalize haystack and quote with whitespace collapsed to single
//!    spaces; trim the normalized quote; search for it as a literal
//!    substring (leftmost occurrence).
//! 2. If phase 1 misses, re-normalize both with whitespace removed entirely
//!    and search again. This recovers matches where the extractor inserted
//!    or dropped spaces inconsistently across fragment boundaries, a known
//!    characteristic of text extracted from layout-based documents.
//!
//! Not-found is a normal outcome, never an error: fabricated or malformed
//! quotes must fail quietly so the validator can drop them.
//!
//! When a quote legitimately occurs more than once, the leftmost occurrence
//! is authoritative; no disambiguation is attempted.

use std::ops::Range;

use crate::normalize::normalize;

/// Locate `quote` inside `haystack`, returning the half-open byte range of
/// the best match in the haystack's original coordinates.
///
/// Returns `None` when the quote is empty, whitespace-only, or simply not
/// present under either normalization phase.
pub fn locate(haystack: &str, quote: &str) -> Option<Range<usize>> {
    if haystack.is_empty() {
        return None;
    }

    // Phase 1: whitespace-collapsing normalization.
    let hay = normalize(haystack, false);
    let needle_full = normalize(quote, false);
    let needle = needle_full.normalized.trim();
    if needle.is_empty() {
        return None;
    }
    if let Some(start) = hay.normalized.find(needle) {
        return Some(hay.original_range(haystack, start..start + needle.len()));
    }

    // Phase 2: whitespace-insensitive pass.
    let hay = normalize(haystack, true);
    let needle = normalize(quote, true);
    if needle.normalized.is_empty() {
        return None;
    }
    hay.normalized
        .find(&needle.normalized)
        .map(|start| hay.original_range(haystack, start..start + needle.normalized.len()))
}
