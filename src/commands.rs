use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use console::style;
use dialoguer::Input;
use tracing::{info, warn};

use crate::config::Config;
use crate::corpus::load_corpus;
use crate::crawler::{CrawlerConfig, SiteCrawler};
use crate::engine::RetrievalEngine;
use crate::server::run_server;

/// Crawl a documentation site into the corpus directory.
#[inline]
pub async fn crawl_site(
    start_url: &str,
    outdir: Option<PathBuf>,
    max_pages: Option<usize>,
    delay_ms: Option<u64>,
) -> Result<()> {
    let config = Config::load()?;
    let outdir = outdir.unwrap_or_else(|| config.corpus_dir.clone());

    let mut crawler_config = CrawlerConfig {
        user_agent: config.crawler.user_agent.clone(),
        timeout_seconds: config.crawler.timeout_seconds,
        delay_ms: config.crawler.delay_ms,
        max_retries: config.crawler.max_retries,
        max_pages: config.crawler.max_pages,
        ..CrawlerConfig::default()
    };
    if let Some(max_pages) = max_pages {
        crawler_config.max_pages = max_pages;
    }
    if let Some(delay_ms) = delay_ms {
        crawler_config.delay_ms = delay_ms;
    }

    info!("Starting crawl of {} into {}", start_url, outdir.display());

    let mut crawler = SiteCrawler::new(crawler_config);
    let stats = crawler.crawl(start_url, &outdir).await?;

    println!("Crawl completed!");
    println!("  Pages saved: {}", stats.pages_crawled);
    println!("  Failed fetches: {}", stats.pages_failed);
    println!("  URLs discovered: {}", stats.urls_discovered);
    println!("  Duration: {:?}", stats.duration);
    println!("  Output: {}", outdir.display());

    Ok(())
}

/// Load the corpus and build the retrieval engine both front ends share.
fn build_engine(config: &Config, corpus_dir: Option<PathBuf>) -> Result<RetrievalEngine> {
    let corpus_dir = corpus_dir.unwrap_or_else(|| config.corpus_dir.clone());

    let corpus = load_corpus(&corpus_dir)
        .with_context(|| format!("Failed to load corpus from {}", corpus_dir.display()))?;

    if corpus.skipped_records > 0 {
        warn!(
            "Skipped {} unusable records while loading the corpus",
            corpus.skipped_records
        );
    }

    let engine = RetrievalEngine::build(corpus.documents, config.retrieval.score_threshold)
        .with_context(|| {
            format!(
                "Failed to build retrieval index from {}",
                corpus_dir.display()
            )
        })?;

    Ok(engine)
}

/// Interactive question/answer loop on the terminal.
#[inline]
pub fn run_chat(corpus_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::load()?;
    let engine = build_engine(&config, corpus_dir)?;

    println!(
        "Docs chatbot ready ({} documents indexed).",
        engine.document_count()
    );
    println!("Type 'exit' to quit.");
    println!();

    loop {
        let line: String = Input::new()
            .with_prompt("You")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read input")?;

        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if matches!(query.to_lowercase().as_str(), "exit" | "quit" | "bye") {
            println!("{} Goodbye!", style("Chatbot:").bold().cyan());
            break;
        }

        let reply = engine
            .answer(query, config.retrieval.chat_excerpt_chars)
            .into_reply();
        println!("{} {}", style("Chatbot:").bold().cyan(), reply);
        println!();
    }

    Ok(())
}

/// Build the engine once, then serve the HTTP question endpoint.
#[inline]
pub async fn serve(corpus_dir: Option<PathBuf>, bind: Option<String>) -> Result<()> {
    let config = Config::load()?;
    let engine = Arc::new(build_engine(&config, corpus_dir)?);
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());

    println!(
        "Ready to answer questions ({} documents indexed).",
        engine.document_count()
    );

    run_server(
        engine,
        &bind,
        config.retrieval.answer_excerpt_chars,
    )
    .await
}
