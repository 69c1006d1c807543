//! # AI News Crawler
//!
//! Crawls AI news sites, blogs and paper listings into newline-delimited JSON records of
//! `url`, `title`, `date` and body text with inline image URLs.
//!
//! ## Features
//!
//! - Eight sources: AI Weekly, Hugging Face blog and papers, TechCrunch AI, 量子位, Synced Review,
//!   机器之心 and 新智元
//! - Escalating fetch strategies (direct, browser-like client, optional headless Chrome) for
//!   bot-protected pages
//! - Ranked selector fallbacks for listings, titles, dates and content roots
//! - Per-item retry with randomized pacing; failed items are skipped, never fatal
//!
//! ## Usage
//!
//! ```sh
//! ai_news_crawler hf-blog --limit 10 --out data/hf-blog.jsonl
//! ```
//!
//! ## Architecture
//!
//! One run crawls one source:
//! 1. **Discovery**: collect an ordered, deduplicated candidate list
//! 2. **Fetching**: download each candidate, escalating strategies when blocked
//! 3. **Extraction**: title, date and normalized body from the page or API payload
//! 4. **Output**: append each record to the JSONL file as soon as it exists

use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod crawl;
mod discovery;
mod errors;
mod extract;
mod fetch;
mod models;
mod outputs;
mod scrapers;
mod utils;

use cli::Cli;
use config::CrawlConfig;
use crawl::CrawlContext;
use outputs::jsonl::JsonlWriter;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();

    // Parse CLI
    let args = Cli::parse();
    debug!(source = args.source.as_str(), ?args.limit, ?args.out, "Parsed CLI arguments");

    // ---- Config & context ----
    let config = CrawlConfig::load(args.config.as_deref())?;
    let ctx = CrawlContext::from_config(&config)?;

    let source = args.source.build();
    let limit = args.limit.unwrap_or_else(|| source.default_limit());
    let out = args.out.unwrap_or_else(|| args.source.default_out());
    info!(source = source.name(), limit, out = %out, "ai_news_crawler starting up");

    // ---- Crawl ----
    let mut sink = JsonlWriter::create(Path::new(&out)).await?;
    let summary = crawl::run(source.as_ref(), &ctx, limit, &mut sink).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        saved = summary.saved,
        attempted = summary.attempted,
        "Execution complete"
    );

    Ok(())
}
