//! Ingestion and question-answering orchestration.
//!
//! Ties the pure core (chunking, retrieval, validation) to the async
//! collaborators (embedding provider, answering provider, index store):
//!
//! ```text
//! pages ──▶ build_units ──▶ embed ──▶ DocumentIndex ──▶ store.put
//!
//! question ──▶ embed ──▶ top_k ──▶ answerer ──▶ validate ──▶ Answer
//! ```
//!
//! Collaborator failures (HTTP, storage, missing index) propagate to the
//! caller; an answer that survives with zero citations is returned as-is,
//! not treated as a failure.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tracing::info;

use crate::chunk::build_units;
use crate::models::{Answer, DocumentIndex, Page, RetrievableUnit};
use crate::provider::{AnswerProvider, EmbeddingProvider};
use crate::retrieve::top_k;
use crate::store::IndexStore;
use crate::validate::validate_citations;

/// Build and persist the index for one ingested document.
///
/// Chunks the pages into units, embeds all unit texts in a single batch,
/// and stores the assembled [`DocumentIndex`]. Re-ingesting an existing
/// document id replaces its whole record.
///
/// # Errors
///
/// Fails if the embedding call fails or returns a different number of
/// vectors than units (the index is never persisted partially embedded).
pub async fn build_index(
    document_id: &str,
    filename: &str,
    pages: Vec<Page>,
    embedder: &dyn EmbeddingProvider,
    store: &dyn IndexStore,
) -> Result<DocumentIndex> {
    let pending = build_units(&pages);
    let texts: Vec<String> = pending.iter().map(|u| u.text.clone()).collect();

    let embeddings = embedder
        .embed(&texts)
        .await
        .context("failed to embed document units")?;
    if embeddings.len() != pending.len() {
        bail!(
            "embedding count mismatch: {} units, {} vectors",
            pending.len(),
            embeddings.len()
        );
    }

    let units: Vec<RetrievableUnit> = pending
        .into_iter()
        .zip(embeddings)
        .map(|(unit, embedding)| RetrievableUnit {
            id: unit.id,
            page: unit.page,
            text: unit.text,
            embedding,
        })
        .collect();

    let index = DocumentIndex {
        document_id: document_id.to_string(),
        filename: filename.to_string(),
        created_at: Utc::now(),
        pages,
        units,
    };

    store.put(&index).await.context("failed to persist index")?;
    info!(
        document_id,
        pages = index.pages.len(),
        units = index.units.len(),
        "indexed document"
    );

    Ok(index)
}

/// Answer a question against a previously ingested document.
///
/// Loads the index (a missing index is a hard error: the pipeline cannot
/// answer without one), embeds the question, ranks the top `k` units, asks
/// the answering provider, and filters its citations through the validator.
///
/// The returned answer may have zero citations; that is the expected
/// "insufficient grounding" outcome, not an error.
pub async fn answer_question(
    document_id: &str,
    question: &str,
    embedder: &dyn EmbeddingProvider,
    answerer: &dyn AnswerProvider,
    store: &dyn IndexStore,
    k: usize,
) -> Result<Answer> {
    let index = store
        .get(document_id)
        .await?
        .with_context(|| format!("no index found for document {}", document_id))?;

    let query_vec = embedder
        .embed(&[question.to_string()])
        .await
        .context("failed to embed question")?
        .into_iter()
        .next()
        .context("embedding provider returned no vector for the question")?;

    let context_units = top_k(&index.units, &query_vec, k);
    info!(
        document_id,
        retrieved = context_units.len(),
        "retrieved context units"
    );

    let raw = answerer.answer(question, &context_units).await?;
    let kept_before = raw.citations.len();
    let validated = validate_citations(raw, &index.pages);
    info!(
        document_id,
        raw_citations = kept_before,
        validated_citations = validated.citations.len(),
        "validated answer citations"
    );

    Ok(validated)
}
