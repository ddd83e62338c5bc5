//! Embedding and answering provider abstractions and the OpenAI backend.
//!
//! The pipeline talks to two collaborators through traits:
//! - [`EmbeddingProvider`] turns a batch of texts into equal-length vectors,
//!   same order, same count; empty input yields empty output.
//! - [`AnswerProvider`] produces a raw [`Answer`] candidate for a question
//!   plus retrieved context. Its output is **untrusted**: structurally
//!   malformed citations are dropped here at the boundary, and the
//!   grounding check happens later in the citation validator.
//!
//! [`OpenAiProvider`] implements both against the OpenAI API.
//!
//! # Retry Strategy
//!
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use crate::config::ProviderConfig;
use crate::models::{Answer, Citation, RetrievableUnit};

/// Trait for embedding providers.
///
/// `embed` must return one vector per input text, in input order. Empty
/// input yields empty output without any network call.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"text-embedding-3-small"`).
    fn model_name(&self) -> &str;

    /// Embed a batch of texts.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Trait for answering providers.
///
/// Given a question and the retrieved context units, returns a raw answer
/// candidate. Implementations must enforce the structural contract (page is
/// a positive integer, quote non-empty, confidence in `[0, 1]`) by dropping
/// offending citations, but are not expected to verify grounding; that is
/// the citation validator's job.
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    /// Answer a question from the given context units.
    async fn answer(&self, question: &str, context: &[&RetrievableUnit]) -> Result<Answer>;
}

/// Provider backed by the OpenAI embeddings and chat completions APIs.
///
/// Requires the `OPENAI_API_KEY` environment variable.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    embedding_model: String,
    answer_model: String,
    max_retries: u32,
}

impl OpenAiProvider {
    /// Create a provider from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `OPENAI_API_KEY` is not set or the HTTP client
    /// cannot be built.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            embedding_model: config.embedding_model.clone(),
            answer_model: config.answer_model.clone(),
            max_retries: config.max_retries,
        })
    }

    /// POST a JSON body with exponential-backoff retry.
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<serde_json::Value> {
        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s, 8s, ...
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return Ok(response.json().await?);
                    }

                    // Rate limited or server error — retry
                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err =
                            Some(anyhow::anyhow!("OpenAI API error {}: {}", status, body_text));
                        continue;
                    }

                    // Client error (not 429) — don't retry
                    let body_text = response.text().await.unwrap_or_default();
                    bail!("OpenAI API error {}: {}", status, body_text);
                }
                Err(e) => {
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Request failed after retries")))
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiProvider {
    fn model_name(&self) -> &str {
        &self.embedding_model
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = serde_json::json!({
            "model": self.embedding_model,
            "input": texts,
        });

        let json = self
            .post_json("https://api.openai.com/v1/embeddings", &body)
            .await?;
        let embeddings = parse_embedding_response(&json)?;

        if embeddings.len() != texts.len() {
            bail!(
                "embedding count mismatch: sent {} texts, got {} vectors",
                texts.len(),
                embeddings.len()
            );
        }

        Ok(embeddings)
    }
}

#[async_trait]
impl AnswerProvider for OpenAiProvider {
    async fn answer(&self, question: &str, context: &[&RetrievableUnit]) -> Result<Answer> {
        let system = [
            "You answer document questions using only provided context.",
            "Return STRICT JSON only matching schema:",
            r#"{"answer":"string","citations":[{"page":number,"quote":"string","confidence":0-1}]}."#,
            "Quote must be verbatim and present on cited page.",
            "If context is insufficient, say so and return empty citations.",
        ]
        .join(" ");

        let user = format!(
            "Question: {}\n\nContext:\n{}",
            question,
            build_context(context)
        );

        let body = serde_json::json!({
            "model": self.answer_model,
            "temperature": 0,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
        });

        let json = self
            .post_json("https://api.openai.com/v1/chat/completions", &body)
            .await?;

        let content = json
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .filter(|c| !c.is_empty())
            .context("model returned empty response")?;

        parse_raw_answer(content)
    }
}

/// Format context units as `Page N:` blocks for the prompt.
fn build_context(units: &[&RetrievableUnit]) -> String {
    units
        .iter()
        .map(|unit| format!("Page {}:\n{}", unit.page, unit.text))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

#[derive(Deserialize)]
struct RawAnswer {
    answer: String,
    #[serde(default)]
    citations: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct RawCitation {
    page: i64,
    quote: String,
    confidence: f32,
}

/// Parse the model's JSON content into an [`Answer`], applying structural
/// shape checks.
///
/// An unparseable body or empty answer text is a hard error. Individual
/// citations failing the shape contract (page < 1, empty quote, confidence
/// outside `[0, 1]`, or missing fields) are dropped with a warning rather
/// than failing the whole answer.
pub fn parse_raw_answer(content: &str) -> Result<Answer> {
    let raw: RawAnswer =
        serde_json::from_str(content).context("model response is not valid answer JSON")?;

    if raw.answer.trim().is_empty() {
        bail!("model returned an empty answer");
    }

    let citations = raw
        .citations
        .into_iter()
        .filter_map(|value| {
            let parsed: RawCitation = match serde_json::from_value(value) {
                Ok(c) => c,
                Err(e) => {
                    warn!(error = %e, "dropping structurally malformed citation");
                    return None;
                }
            };
            if parsed.page < 1
                || parsed.page > i64::from(u32::MAX)
                || parsed.quote.is_empty()
                || !(0.0..=1.0).contains(&parsed.confidence)
            {
                warn!(
                    page = parsed.page,
                    confidence = parsed.confidence,
                    "dropping citation failing shape checks"
                );
                return None;
            }
            Some(Citation {
                page: parsed.page as u32,
                quote: parsed.quote,
                confidence: parsed.confidence,
            })
        })
        .collect();

    Ok(Answer {
        text: raw.answer,
        citations,
    })
}

/// Parse the OpenAI embeddings API response JSON.
///
/// Extracts the `data[].embedding` arrays and returns them in order.
fn parse_embedding_response(json: &serde_json::Value) -> Result<Vec<Vec<f32>>> {
    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .context("invalid embeddings response: missing data array")?;

    let mut embeddings = Vec::with_capacity(data.len());

    for item in data {
        let embedding = item
            .get("embedding")
            .and_then(|e| e.as_array())
            .context("invalid embeddings response: missing embedding array")?;
        let vector: Vec<f32> = embedding
            .iter()
            .map(|v| {
                v.as_f64()
                    .map(|f| f as f32)
                    .context("invalid embeddings response: non-numeric value")
            })
            .collect::<Result<_>>()?;
        embeddings.push(vector);
    }

    Ok(embeddings)
}
