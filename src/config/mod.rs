
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Relevance threshold below which a query is answered with the no-match
/// reply.
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.1;
/// Default excerpt length for the HTTP front end.
pub const DEFAULT_ANSWER_EXCERPT_CHARS: usize = 1000;
/// Default excerpt length for the interactive chat loop.
pub const DEFAULT_CHAT_EXCERPT_CHARS: usize = 800;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Directory holding the crawled JSON/JSONL document records.
    pub corpus_dir: PathBuf,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub crawler: CrawlerSettings,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalConfig {
    pub score_threshold: f64,
    pub answer_excerpt_chars: usize,
    pub chat_excerpt_chars: usize,
}

impl Default for RetrievalConfig {
    #[inline]
    fn default() -> Self {
        Self {
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            answer_excerpt_chars: DEFAULT_ANSWER_EXCERPT_CHARS,
            chat_excerpt_chars: DEFAULT_CHAT_EXCERPT_CHARS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CrawlerSettings {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub delay_ms: u64,
    pub max_retries: u32,
    pub max_pages: usize,
}

impl Default for CrawlerSettings {
    #[inline]
    fn default() -> Self {
        Self {
            user_agent: format!("docs-chat/{} (Documentation Crawler)", env!("CARGO_PKG_VERSION")),
            timeout_seconds: 10,
            delay_ms: 1000,
            max_retries: 3,
            max_pages: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    #[inline]
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found or could not be created")]
    DirectoryError,
    #[error("Invalid score threshold: {0} (must be between 0.0 and 1.0)")]
    InvalidScoreThreshold(f64),
    #[error("Invalid excerpt length: {0} (must be at least 1 character)")]
    InvalidExcerptLength(usize),
    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),
    #[error("Invalid user agent (cannot be empty)")]
    InvalidUserAgent,
    #[error("Invalid request timeout: {0} (must be between 1 and 300 seconds)")]
    InvalidTimeout(u64),
    #[error("Invalid page limit: {0} (must be at least 1)")]
    InvalidMaxPages(usize),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Get the configuration directory path
#[inline]
pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
    let base = dirs::config_dir().ok_or(ConfigError::DirectoryError)?;
    Ok(base.join("docs-chat"))
}

impl Default for Config {
    #[inline]
    fn default() -> Self {
        let base_dir = get_config_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            corpus_dir: base_dir.join("scraped_docs"),
            retrieval: RetrievalConfig::default(),
            crawler: CrawlerSettings::default(),
            server: ServerConfig::default(),
            base_dir,
        }
    }
}

impl Config {
    /// Load from the default config directory, falling back to defaults
    /// when no config file has been written yet.
    #[inline]
    pub fn load() -> Result<Self> {
        Self::load_from(get_config_dir()?)
    }

    #[inline]
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join("config.toml");

        if !config_path.exists() {
            let mut config = Self::default();
            config.base_dir = config_dir.as_ref().to_path_buf();
            return Ok(config);
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
        config.base_dir = config_dir.as_ref().to_path_buf();

        config
            .validate()
            .with_context(|| "Configuration validation failed")?;

        Ok(config)
    }

    #[inline]
    pub fn save(&self) -> Result<()> {
        self.validate()
            .context("Configuration validation failed before saving")?;

        fs::create_dir_all(&self.base_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                self.base_dir.display()
            )
        })?;

        let config_path = self.config_file_path();
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.retrieval.score_threshold) {
            return Err(ConfigError::InvalidScoreThreshold(
                self.retrieval.score_threshold,
            ));
        }

        if self.retrieval.answer_excerpt_chars == 0 {
            return Err(ConfigError::InvalidExcerptLength(
                self.retrieval.answer_excerpt_chars,
            ));
        }

        if self.retrieval.chat_excerpt_chars == 0 {
            return Err(ConfigError::InvalidExcerptLength(
                self.retrieval.chat_excerpt_chars,
            ));
        }

        if self.crawler.user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidUserAgent);
        }

        if !(1..=300).contains(&self.crawler.timeout_seconds) {
            return Err(ConfigError::InvalidTimeout(self.crawler.timeout_seconds));
        }

        if self.crawler.max_pages == 0 {
            return Err(ConfigError::InvalidMaxPages(self.crawler.max_pages));
        }

        self.server
            .bind
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidBindAddress(self.server.bind.clone()))?;

        Ok(())
    }

    #[inline]
    pub fn config_file_path(&self) -> PathBuf {
        self.base_dir.join("config.toml")
    }
}

/// Walk through the configuration interactively and offer to save it.
#[inline]
pub fn run_interactive_config() -> Result<()> {
    eprintln!("{}", style("Docs Chat Configuration Setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config()?;

    let corpus_dir: String = Input::new()
        .with_prompt("Corpus directory")
        .default(config.corpus_dir.display().to_string())
        .interact_text()?;
    config.corpus_dir = PathBuf::from(corpus_dir);

    let score_threshold: f64 = Input::new()
        .with_prompt("Relevance score threshold")
        .default(config.retrieval.score_threshold)
        .validate_with(|input: &f64| -> Result<(), ConfigError> {
            if (0.0..=1.0).contains(input) {
                Ok(())
            } else {
                Err(ConfigError::InvalidScoreThreshold(*input))
            }
        })
        .interact_text()?;
    config.retrieval.score_threshold = score_threshold;

    config.retrieval.answer_excerpt_chars = prompt_excerpt_length(
        "Answer excerpt length (HTTP)",
        config.retrieval.answer_excerpt_chars,
    )?;
    config.retrieval.chat_excerpt_chars = prompt_excerpt_length(
        "Answer excerpt length (chat)",
        config.retrieval.chat_excerpt_chars,
    )?;

    let bind: String = Input::new()
        .with_prompt("Server bind address")
        .default(config.server.bind.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            input
                .parse::<SocketAddr>()
                .map(|_| ())
                .map_err(|_| ConfigError::InvalidBindAddress(input.clone()))
        })
        .interact_text()?;
    config.server.bind = bind;

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

fn prompt_excerpt_length(prompt: &str, default: usize) -> Result<usize> {
    let length: usize = Input::new()
        .with_prompt(prompt)
        .default(default)
        .validate_with(|input: &usize| -> Result<(), ConfigError> {
            if *input == 0 {
                Err(ConfigError::InvalidExcerptLength(*input))
            } else {
                Ok(())
            }
        })
        .interact_text()?;
    Ok(length)
}

fn load_existing_config() -> Result<Config> {
    Config::load().map_or_else(
        |_| {
            eprintln!(
                "{}",
                style("No existing configuration found. Using defaults.").yellow()
            );
            Ok(Config::default())
        },
        |config| {
            eprintln!("{}", style("Found existing configuration.").green());
            Ok(config)
        },
    )
}

/// Print the effective configuration for `docs-chat config --show`.
#[inline]
pub fn show_config() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    eprintln!("{}", style("Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Corpus:").bold().yellow());
    eprintln!("  Directory: {}", style(config.corpus_dir.display()).cyan());

    eprintln!();
    eprintln!("{}", style("Retrieval:").bold().yellow());
    eprintln!(
        "  Score Threshold: {}",
        style(config.retrieval.score_threshold).cyan()
    );
    eprintln!(
        "  Answer Excerpt Chars: {}",
        style(config.retrieval.answer_excerpt_chars).cyan()
    );
    eprintln!(
        "  Chat Excerpt Chars: {}",
        style(config.retrieval.chat_excerpt_chars).cyan()
    );

    eprintln!();
    eprintln!("{}", style("Crawler:").bold().yellow());
    eprintln!("  User Agent: {}", style(&config.crawler.user_agent).cyan());
    eprintln!(
        "  Request Timeout: {}s",
        style(config.crawler.timeout_seconds).cyan()
    );
    eprintln!("  Delay: {}ms", style(config.crawler.delay_ms).cyan());
    eprintln!("  Max Pages: {}", style(config.crawler.max_pages).cyan());

    eprintln!();
    eprintln!("{}", style("Server:").bold().yellow());
    eprintln!("  Bind Address: {}", style(&config.server.bind).cyan());

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );

    Ok(())
}
