use std::path::PathBuf;

use clap::{Parser, Subcommand};
use docs_chat::Result;
use docs_chat::commands::{crawl_site, run_chat, serve};
use docs_chat::config::{run_interactive_config, show_config};

#[derive(Parser)]
#[command(name = "docs-chat")]
#[command(about = "Crawl a documentation site and answer questions about it")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl a documentation site into the local corpus
    Crawl {
        /// Starting URL; only pages on the same host are followed
        start_url: String,
        /// Output directory for the harvested JSON records
        #[arg(long)]
        outdir: Option<PathBuf>,
        /// Maximum number of pages to crawl
        #[arg(long)]
        max_pages: Option<usize>,
        /// Politeness delay between page fetches, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
    },
    /// Ask questions interactively on the terminal
    Chat {
        /// Corpus directory to answer from (defaults to the configured one)
        #[arg(long)]
        corpus: Option<PathBuf>,
    },
    /// Serve the HTTP question endpoint
    Serve {
        /// Corpus directory to answer from (defaults to the configured one)
        #[arg(long)]
        corpus: Option<PathBuf>,
        /// Address to bind, e.g. 127.0.0.1:5000
        #[arg(long)]
        bind: Option<String>,
    },
    /// Configure corpus location and retrieval settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl {
            start_url,
            outdir,
            max_pages,
            delay_ms,
        } => {
            crawl_site(&start_url, outdir, max_pages, delay_ms).await?;
        }
        Commands::Chat { corpus } => {
            run_chat(corpus)?;
        }
        Commands::Serve { corpus, bind } => {
            serve(corpus, bind).await?;
        }
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
    }

    Ok(())
}
