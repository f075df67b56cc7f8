pub mod extractor;


use std::collections::{HashSet, VecDeque};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use ureq::Agent;
use url::Url;

use self::extractor::extract_content;

/// Configuration for the web crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// User agent string to use for requests
    pub user_agent: String,
    /// Timeout for HTTP requests in seconds
    pub timeout_seconds: u64,
    /// Politeness delay between page fetches in milliseconds
    pub delay_ms: u64,
    /// Maximum number of retry attempts for retryable errors
    pub max_retries: u32,
    /// Delay between retry attempts in seconds
    pub retry_delay_seconds: u64,
    /// Maximum number of pages to crawl in one session
    pub max_pages: usize,
}

impl Default for CrawlerConfig {
    #[inline]
    fn default() -> Self {
        Self {
            user_agent: "docs-chat/0.0.1 (Documentation Crawler)".to_string(),
            timeout_seconds: 10,
            delay_ms: 1000,
            max_retries: 3,
            retry_delay_seconds: 5,
            max_pages: 50,
        }
    }
}

/// HTTP client wrapper with rate limiting and retry logic
#[derive(Debug)]
pub struct HttpClient {
    agent: Agent,
    config: CrawlerConfig,
    last_request_time: Option<Instant>,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    #[inline]
    pub fn new(config: CrawlerConfig) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_seconds)))
            .user_agent(&config.user_agent)
            .build()
            .into();

        Self {
            agent,
            config,
            last_request_time: None,
        }
    }

    /// Perform an HTTP GET request with rate limiting and retry logic
    #[inline]
    pub async fn get(&mut self, url: &str) -> Result<String> {
        self.apply_rate_limit().await;

        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                debug!("Retrying request to {} (attempt {})", url, attempt + 1);
                sleep(Duration::from_secs(self.config.retry_delay_seconds)).await;
            }

            match self.try_get(url) {
                Ok(response) => {
                    debug!("Successfully fetched {} (attempt {})", url, attempt + 1);
                    return Ok(response);
                }
                Err(e) if is_retryable_error(&e) && attempt < self.config.max_retries => {
                    warn!("Retryable error for {}: {}", url, e);
                    last_error = Some(e);
                }
                Err(e) => {
                    error!("Non-retryable error for {}: {}", url, e);
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow!("All retry attempts failed")))
    }

    /// Apply rate limiting by sleeping if necessary
    async fn apply_rate_limit(&mut self) {
        if let Some(last_time) = self.last_request_time {
            let elapsed = last_time.elapsed();
            let rate_limit_duration = Duration::from_millis(self.config.delay_ms);

            if elapsed < rate_limit_duration {
                let sleep_duration = rate_limit_duration - elapsed;
                debug!("Rate limiting: sleeping for {:?}", sleep_duration);
                sleep(sleep_duration).await;
            }
        }

        self.last_request_time = Some(Instant::now());
    }

    /// Attempt a single HTTP GET request without retry logic
    fn try_get(&self, url: &str) -> Result<String> {
        debug!("Making HTTP GET request to: {}", url);

        match self.agent.get(url).call() {
            Ok(mut response) => {
                let text = response
                    .body_mut()
                    .read_to_string()
                    .with_context(|| format!("Failed to read response body from {}", url))?;
                debug!("Successfully read {} bytes from {}", text.len(), url);
                Ok(text)
            }
            Err(ureq::Error::StatusCode(code)) => {
                debug!("HTTP request failed with status {}: {}", code, url);
                Err(anyhow!("HTTP error {}", code))
            }
            Err(e) => {
                debug!("HTTP request failed with transport error: {}", e);
                Err(anyhow::Error::from(e))
                    .with_context(|| format!("Failed to make HTTP request to {}", url))
            }
        }
    }
}

impl Default for HttpClient {
    /// Create a new HTTP client with default configuration
    #[inline]
    fn default() -> Self {
        Self::new(CrawlerConfig::default())
    }
}

/// Check if an error is retryable (network timeouts, 5xx errors)
fn is_retryable_error(error: &anyhow::Error) -> bool {
    let error_str = error.to_string().to_lowercase();

    // Network timeouts and connection errors
    if error_str.contains("timeout")
        || error_str.contains("connection")
        || error_str.contains("network")
    {
        return true;
    }

    // HTTP 5xx server errors are retryable
    if error_str.contains("http error 5") {
        return true;
    }

    // HTTP 429 (rate limiting) is retryable
    if error_str.contains("http error 429") {
        return true;
    }

    false
}

/// Validate and normalize a URL
#[inline]
pub fn validate_url(url_str: &str) -> Result<Url> {
    let url = Url::parse(url_str).with_context(|| format!("Invalid URL format: {}", url_str))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(anyhow!("URL must use HTTP or HTTPS scheme: {}", url_str));
    }

    if url.host_str().is_none() {
        return Err(anyhow!("URL must have a valid host: {}", url_str));
    }

    Ok(url)
}

/// Check whether a discovered link stays on the site being crawled.
#[inline]
pub fn should_crawl_url(url: &Url, start_url: &Url) -> bool {
    url.scheme() == start_url.scheme() && url.host() == start_url.host()
}

/// Extract all same-site links from HTML content using proper HTML parsing
#[inline]
pub fn extract_links(html: &str, source_url: &Url, start_url: &Url) -> Result<Vec<Url>> {
    let document = Html::parse_document(html);
    let link_selector = Selector::parse("a[href]")
        .map_err(|e| anyhow!("Failed to create CSS selector: {:?}", e))?;

    let mut links = Vec::new();

    for element in document.select(&link_selector) {
        if let Some(href) = element.value().attr("href") {
            // Skip non-HTTP(S) links
            if href.starts_with("mailto:")
                || href.starts_with("javascript:")
                || href.starts_with("#")
                || href.starts_with("\\#")
            {
                continue;
            }

            match source_url.join(href) {
                Ok(absolute_url) => {
                    if should_crawl_url(&absolute_url, start_url) {
                        links.push(absolute_url);
                    }
                }
                Err(e) => {
                    debug!(
                        "Failed to resolve URL '{}' relative to '{}': {}",
                        href, source_url, e
                    );
                }
            }
        }
    }

    // Remove duplicates
    links.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    links.dedup();

    debug!("Extracted {} valid links from {}", links.len(), source_url);
    Ok(links)
}

/// One crawled page, serialized as JSON. `url`, `title`, `paragraphs`,
/// `code_blocks`, and `links` form the record contract the corpus loader
/// reads back; `crawled_at` is informational.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: Url,
    pub title: String,
    pub paragraphs: Vec<String>,
    pub code_blocks: Vec<String>,
    pub links: Vec<Url>,
    pub crawled_at: DateTime<Utc>,
}

/// Statistics about a crawl session
#[derive(Debug, Clone, Copy)]
pub struct CrawlStats {
    /// URLs discovered (queued) during the session, including the start URL
    pub urls_discovered: usize,
    /// Pages successfully fetched and saved
    pub pages_crawled: usize,
    /// Pages that failed to fetch
    pub pages_failed: usize,
    /// Duration of crawl session
    pub duration: Duration,
}

/// Breadth-first crawler that harvests a documentation site into JSON
/// records on disk: one pretty-printed file per page under `pages/`, plus
/// a combined line-delimited `docs.jsonl` the retrieval corpus is loaded
/// from.
pub struct SiteCrawler {
    http_client: HttpClient,
    config: CrawlerConfig,
}

impl SiteCrawler {
    /// Create a new site crawler
    #[inline]
    pub fn new(config: CrawlerConfig) -> Self {
        let http_client = HttpClient::new(config.clone());
        Self {
            http_client,
            config,
        }
    }

    /// Crawl a documentation site breadth-first from `start_url`, writing
    /// records under `outdir`. Individual page failures are logged and
    /// skipped; only an invalid start URL or an unwritable output
    /// directory fails the whole crawl.
    #[inline]
    pub async fn crawl(&mut self, start_url: &str, outdir: &Path) -> Result<CrawlStats> {
        let start_time = Instant::now();
        let mut start_url = validate_url(start_url)?;
        start_url.set_fragment(None);

        let pages_dir = outdir.join("pages");
        fs::create_dir_all(&pages_dir).with_context(|| {
            format!("Failed to create output directory: {}", pages_dir.display())
        })?;

        info!(
            "Starting crawl at {} (max {} pages)",
            start_url, self.config.max_pages
        );

        // Track discovered URLs to avoid queueing duplicates
        let mut discovered: HashSet<String> = HashSet::new();
        discovered.insert(start_url.as_str().to_string());
        let mut queue: VecDeque<Url> = VecDeque::new();
        queue.push_back(start_url.clone());

        let mut stats = CrawlStats {
            urls_discovered: 1,
            pages_crawled: 0,
            pages_failed: 0,
            duration: Duration::default(),
        };
        let mut records: Vec<PageRecord> = Vec::new();

        let bar = if console::user_attended_stderr() {
            ProgressBar::new_spinner().with_style(
                ProgressStyle::with_template("{spinner} [{pos}/{len}] Crawling {msg}")
                    .expect("style template is valid"),
            )
        } else {
            ProgressBar::hidden()
        };
        bar.set_position(0);
        bar.set_length(self.config.max_pages as u64);

        while stats.pages_crawled < self.config.max_pages {
            let Some(url) = queue.pop_front() else {
                info!("No more URLs in queue, crawl complete");
                break;
            };

            bar.set_message(url.to_string());
            let html = match self.http_client.get(url.as_str()).await {
                Ok(html) => html,
                Err(e) => {
                    error!("Failed to fetch {}: {}", url, e);
                    stats.pages_failed += 1;
                    continue;
                }
            };

            let content = extract_content(&html);
            let links = match extract_links(&html, &url, &start_url) {
                Ok(links) => links,
                Err(e) => {
                    warn!("Failed to extract links from {}: {}", url, e);
                    Vec::new() // Continue without links if extraction fails
                }
            };

            // Queue newly discovered same-site links
            for mut link in links.iter().cloned() {
                link.set_fragment(None);
                if discovered.insert(link.as_str().to_string()) {
                    stats.urls_discovered += 1;
                    queue.push_back(link);
                }
            }

            let record = PageRecord {
                url: url.clone(),
                title: content.title,
                paragraphs: content.paragraphs,
                code_blocks: content.code_blocks,
                links,
                crawled_at: Utc::now(),
            };

            stats.pages_crawled += 1;
            bar.set_position(stats.pages_crawled as u64);

            let page_path = pages_dir.join(format!("{}.json", stats.pages_crawled));
            write_page_record(&record, &page_path)?;
            records.push(record);

            debug!("Saved page {} as {}", url, page_path.display());
        }

        write_combined_records(&records, &outdir.join("docs.jsonl"))?;

        stats.duration = start_time.elapsed();
        bar.finish_and_clear();

        info!(
            "Crawl completed: {} pages saved, {} failed, {} URLs discovered, took {:?}",
            stats.pages_crawled, stats.pages_failed, stats.urls_discovered, stats.duration
        );

        Ok(stats)
    }
}

fn write_page_record(record: &PageRecord, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(record)
        .with_context(|| format!("Failed to serialize page record for {}", record.url))?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write page record: {}", path.display()))?;
    Ok(())
}

fn write_combined_records(records: &[PageRecord], path: &Path) -> Result<()> {
    let mut file = fs::File::create(path)
        .with_context(|| format!("Failed to create combined record file: {}", path.display()))?;

    for record in records {
        let line = serde_json::to_string(record)
            .with_context(|| format!("Failed to serialize page record for {}", record.url))?;
        writeln!(file, "{}", line)
            .with_context(|| format!("Failed to write combined record file: {}", path.display()))?;
    }

    Ok(())
}
