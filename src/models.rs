//! Core data models used throughout Groundcite.
//!
//! These types represent the pages, retrievable units, and citations that
//! flow through the ingestion and question-answering pipeline. Everything
//! that is persisted or crosses the provider boundary derives serde traits;
//! the document index is serialized as a single JSON record per document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A positioned piece of text on a rendered page.
///
/// Produced by the extraction/render collaborator. Geometry is page-relative.
/// Many fragments compose one page's visible text in reading order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextFragment {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One extracted page: its number, concatenated text, and positioned fragments.
///
/// Page numbers are 1-indexed and contiguous. `text` is the concatenation of
/// the fragment texts in reading order, as produced by the extraction
/// collaborator. Immutable after ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub page_number: u32,
    pub text: String,
    #[serde(default)]
    pub fragments: Vec<TextFragment>,
}

/// A unit of text awaiting its embedding, produced by the chunker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUnit {
    pub id: String,
    pub page: u32,
    pub text: String,
}

/// The smallest text granule eligible for similarity ranking and citation.
///
/// One per non-empty page in the current chunking policy. The embedding is
/// filled in by the embedding provider during ingestion; immutable after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievableUnit {
    pub id: String,
    pub page: u32,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// The persisted index for one ingested document.
///
/// Owns the pages and units. Read-mostly after creation; re-ingestion of the
/// same document id replaces the whole record at the store
/// (last-writer-wins), never a partial update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentIndex {
    pub document_id: String,
    pub filename: String,
    pub created_at: DateTime<Utc>,
    pub pages: Vec<Page>,
    pub units: Vec<RetrievableUnit>,
}

/// A quote claim produced by the answering engine.
///
/// Untrusted until it survives [`validate_citations`](crate::validate::validate_citations):
/// only then is `quote` guaranteed to be locatable, under loose
/// normalization, in the text of page `page`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    pub page: u32,
    pub quote: String,
    pub confidence: f32,
}

/// An answer with its citation list.
///
/// Produced raw by the answering provider, then filtered by the citation
/// validator. An answer with zero citations is a valid outcome
/// ("insufficient grounding"), not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub citations: Vec<Citation>,
}
