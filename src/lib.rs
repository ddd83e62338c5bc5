//! # Groundcite
//!
//! Grounded document Q&A: upload a document's extracted pages, ask
//! natural-language questions, and get answers whose claims are backed by
//! verbatim quotes from specific pages, ready for in-place highlighting.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌─────────┐   ┌───────────────┐
//! │ Extraction │──▶│ Chunker │──▶│ DocumentIndex │
//! │ (external) │   │ + Embed │   │  (IndexStore) │
//! └────────────┘   └─────────┘   └──────┬────────┘
//!                                       │ question
//!                      ┌────────────────┤
//!                      ▼                ▼
//!                ┌──────────┐    ┌───────────┐    ┌───────────┐
//!                │ Retriever│───▶│ Answering │───▶│ Citation  │
//!                │ (top-K)  │    │ provider  │    │ validator │
//!                └──────────┘    └───────────┘    └─────┬─────┘
//!                                                       ▼
//!                                                 ┌───────────┐
//!                                                 │ Highlight │
//!                                                 └───────────┘
//! ```
//!
//! The answering provider's citations are untrusted until the validator
//! confirms each quote is genuinely locatable on its cited page; the
//! highlighter then maps validated quotes onto the rendered page's
//! positioned text fragments. Both rely on the same whitespace-tolerant
//! fuzzy locator, because extraction-time and render-time page text are
//! allowed to diverge in spacing.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`normalize`] | Text canonicalization with offset map |
//! | [`locate`] | Two-phase fuzzy substring location |
//! | [`chunk`] | Pages → retrievable units |
//! | [`retrieve`] | Cosine top-K ranking |
//! | [`validate`] | Citation trust boundary |
//! | [`highlight`] | Quote → fragment index mapping |
//! | [`provider`] | Embedding/answering provider traits + OpenAI backend |
//! | [`store`] | Index persistence (memory, JSON files) |
//! | [`pipeline`] | Ingestion and question answering |

pub mod chunk;
pub mod config;
pub mod highlight;
pub mod locate;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod provider;
pub mod retrieve;
pub mod store;
pub mod validate;
