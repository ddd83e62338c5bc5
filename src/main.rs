//! # Groundcite CLI (`gcite`)
//!
//! The `gcite` binary drives the grounding pipeline from the command line.
//! Extraction of positioned page text from binary documents is an external
//! collaborator; `gcite` consumes its output as a JSON file of pages.
//!
//! ## Usage
//!
//! ```bash
//! gcite --config ./config/gcite.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `gcite ingest <pages.json>` | Build and persist the index for a document |
//! | `gcite ask <id> "<question>"` | Answer a question with validated citations |
//! | `gcite highlight <pages.json> --page N "<quote>"` | Print highlighted fragment indexes |
//!
//! ## Examples
//!
//! ```bash
//! # Ingest extracted pages
//! gcite ingest ./report-pages.json --filename report.pdf
//!
//! # Ask a question against the ingested document
//! gcite ask 2f9c… "What was the blood pressure reading?"
//!
//! # Debug where a quote lands inside a page's fragments
//! gcite highlight ./report-pages.json --page 2 "120/80 mmHg"
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use groundcite::config::Config;
use groundcite::highlight::highlighted_indexes;
use groundcite::models::Page;
use groundcite::pipeline::{answer_question, build_index};
use groundcite::provider::OpenAiProvider;
use groundcite::store::JsonFileStore;

/// Groundcite CLI — grounded document Q&A with validated citations.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file with the store directory, provider models, and retrieval settings.
#[derive(Parser)]
#[command(
    name = "gcite",
    about = "Groundcite — grounded document Q&A with validated citations",
    version,
    long_about = "Groundcite converts extracted page text into retrievable units, ranks them \
    against a question embedding, validates that every quote the answering engine cites is \
    genuinely present on the cited page, and maps validated quotes onto positioned text \
    fragments for highlighting."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/gcite.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Build and persist the index for one document.
    ///
    /// Reads the extraction collaborator's output (a JSON array of pages
    /// with their positioned fragments), chunks it into per-page units,
    /// embeds them, and writes the index to the configured store.
    Ingest {
        /// Path to the extracted pages JSON file.
        pages: PathBuf,

        /// Document id. Defaults to a freshly generated UUID.
        #[arg(long)]
        id: Option<String>,

        /// Original filename to record in the index.
        #[arg(long)]
        filename: Option<String>,
    },

    /// Answer a question against an ingested document.
    ///
    /// Embeds the question, retrieves the top-K units, asks the answering
    /// provider, and prints the answer with only the citations that
    /// survived validation. Zero citations means the answer could not be
    /// grounded, not that the command failed.
    Ask {
        /// Document id returned by `ingest`.
        id: String,

        /// The question to answer.
        question: String,

        /// Number of context units to retrieve (overrides config).
        #[arg(long)]
        k: Option<usize>,
    },

    /// Locate a quote inside a page's positioned fragments.
    ///
    /// Prints the indexes of the fragments the quote overlaps, the same set
    /// a viewer would highlight. Useful for debugging extraction spacing
    /// divergence.
    Highlight {
        /// Path to the extracted pages JSON file.
        pages: PathBuf,

        /// 1-indexed page number to search.
        #[arg(long)]
        page: u32,

        /// The quote to locate.
        quote: String,
    },
}

/// Load and shape-check the extraction collaborator's pages file.
///
/// Page numbers must be 1-indexed and contiguous; anything else is rejected
/// here, at the boundary where external output first enters the pipeline.
fn load_pages(path: &Path) -> Result<Vec<Page>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read pages file {}", path.display()))?;
    let pages: Vec<Page> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse pages file {}", path.display()))?;

    for (i, page) in pages.iter().enumerate() {
        let expected = (i + 1) as u32;
        if page.page_number != expected {
            bail!(
                "pages file is not 1-indexed and contiguous: position {} has page_number {}",
                i,
                page.page_number
            );
        }
    }

    Ok(pages)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("groundcite=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest {
            pages,
            id,
            filename,
        } => {
            let config = Config::load(&cli.config)?;
            let page_records = load_pages(&pages)?;
            let document_id = id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let filename = filename.unwrap_or_else(|| {
                pages
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "unknown".to_string())
            });

            let provider = OpenAiProvider::new(&config.provider)?;
            let store = JsonFileStore::new(&config.store.path)?;

            let index =
                build_index(&document_id, &filename, page_records, &provider, &store).await?;

            println!("indexed document {}", index.document_id);
            println!("  filename: {}", index.filename);
            println!("  pages: {}", index.pages.len());
            println!("  units: {}", index.units.len());
        }

        Commands::Ask { id, question, k } => {
            let config = Config::load(&cli.config)?;
            let provider = OpenAiProvider::new(&config.provider)?;
            let store = JsonFileStore::new(&config.store.path)?;
            let k = k.unwrap_or(config.retrieval.top_k);

            let answer = answer_question(&id, &question, &provider, &provider, &store, k).await?;

            println!("{}", answer.text);
            if answer.citations.is_empty() {
                println!("\n(no citations survived validation)");
            } else {
                println!("\nCitations:");
                for citation in &answer.citations {
                    println!(
                        "  page {} (confidence {:.2}): \"{}\"",
                        citation.page, citation.confidence, citation.quote
                    );
                }
            }
        }

        Commands::Highlight { pages, page, quote } => {
            let page_records = load_pages(&pages)?;
            let record = page_records
                .iter()
                .find(|p| p.page_number == page)
                .with_context(|| format!("page {} not found in pages file", page))?;

            let indexes = highlighted_indexes(&record.fragments, &quote);
            if indexes.is_empty() {
                println!("quote not locatable on page {}", page);
            } else {
                let list: Vec<String> = indexes.iter().map(|i| i.to_string()).collect();
                println!("highlighted fragment indexes: {}", list.join(", "));
            }
        }
    }

    Ok(())
}
