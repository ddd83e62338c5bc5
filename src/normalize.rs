//! Text canonicalization with exact offset recovery.
//!
//! Normalization makes page text and model-produced quotes comparable:
//! typographic quotes and dashes become their ASCII equivalents, everything
//! else is lower-cased, and whitespace runs either collapse to a single
//! space or disappear entirely. The offset map records, for every byte of
//! the normalized string, the byte offset of the original character that
//! produced it, so a substring match in normalized space maps back to exact
//! bounds in the original text.
//!
//! Used identically by the fuzzy locator whether the haystack is a page's
//! extraction text (citation validation) or a page's fragment-concatenated
//! text (highlighting). Single implementation, two call sites.

use std::ops::Range;

/// A normalized string plus its mapping back to original byte offsets.
///
/// Ephemeral: recomputed on demand, never persisted. `offset_map[i]` is the
/// byte offset in the original input of the character that produced
/// normalized byte `i`.
#[derive(Debug, Clone)]
pub struct NormalizedText {
    pub normalized: String,
    offset_map: Vec<usize>,
}

impl NormalizedText {
    /// Map a half-open byte range of the normalized string back to the
    /// half-open byte range it occupies in `original`.
    ///
    /// The end bound is recovered from the last mapped character: its
    /// original offset plus that character's UTF-8 width. An empty input
    /// range maps to an empty range.
    pub fn original_range(&self, original: &str, norm_range: Range<usize>) -> Range<usize> {
        if norm_range.is_empty() {
            let start = self
                .offset_map
                .get(norm_range.start)
                .copied()
                .unwrap_or(original.len());
            return start..start;
        }
        let start = self.offset_map[norm_range.start];
        let last = self.offset_map[norm_range.end - 1];
        let end = last
            + original[last..]
                .chars()
                .next()
                .map_or(0, |c| c.len_utf8());
        start..end
    }
}

/// Replace typographic quotes and dash-like characters with ASCII
/// equivalents; lower-case everything else.
fn canonicalize(c: char) -> CanonChar {
    match c {
        '\u{2018}' | '\u{2019}' => CanonChar::One('\''),
        '\u{201c}' | '\u{201d}' => CanonChar::One('"'),
        // Hyphen, non-breaking hyphen, figure dash, en dash, em dash,
        // horizontal bar.
        '\u{2010}'..='\u{2015}' => CanonChar::One('-'),
        _ => CanonChar::Lower(c),
    }
}

enum CanonChar {
    One(char),
    Lower(char),
}

/// Normalize `input` for robust comparison, recording an offset map.
///
/// Rules, applied per character left to right:
/// - typographic single quotes → `'`, double quotes → `"`, dash-like
///   characters → `-`, everything else case-folded to lower case;
/// - a run of whitespace collapses to one ASCII space mapped to the run's
///   first character, or is dropped entirely when `remove_whitespace` is
///   true (no offset recorded for it).
pub fn normalize(input: &str, remove_whitespace: bool) -> NormalizedText {
    let mut normalized = String::with_capacity(input.len());
    let mut offset_map = Vec::with_capacity(input.len());
    let mut last_was_space = false;

    let push = |normalized: &mut String, offset_map: &mut Vec<usize>, c: char, src: usize| {
        normalized.push(c);
        for _ in 0..c.len_utf8() {
            offset_map.push(src);
        }
    };

    for (i, c) in input.char_indices() {
        if c.is_whitespace() {
            if remove_whitespace {
                continue;
            }
            if !last_was_space {
                push(&mut normalized, &mut offset_map, ' ', i);
            }
            last_was_space = true;
        } else {
            last_was_space = false;
            match canonicalize(c) {
                CanonChar::One(out) => push(&mut normalized, &mut offset_map, out, i),
                CanonChar::Lower(orig) => {
                    for lc in orig.to_lowercase() {
                        push(&mut normalized, &mut offset_map, lc, i);
                    }
                }
            }
        }
    }

    NormalizedText {
        normalized,
        offset_map,
    }
}
