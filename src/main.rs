//! # docask CLI
//!
//! Command-line front end for the docask pipeline: point it at a PDF,
//! ask questions, get answers grounded in the document.
//!
//! ## Usage
//!
//! ```bash
//! docask [--config ./config/docask.toml] [--api-key sk-...] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docask ask "<question>" --document <pdf>` | One-shot question |
//! | `docask chat --document <pdf>` | Multi-turn REPL with history |
//! | `docask index --document <pdf>` | Pre-build and persist the index |
//! | `docask cache path --document <pdf>` | Show a document's cache directory |
//! | `docask cache clear [--document <pdf> \| --all]` | Drop cached indexes |
//!
//! The API key comes from `--api-key` or the `OPENAI_API_KEY`
//! environment variable (a local `.env` file is honored). It is
//! validated with one cheap provider round-trip before any pipeline
//! work and is never printed.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use docask::cache;
use docask::config::{self, Config};
use docask::credential;
use docask::index::ScoredChunk;
use docask::pipeline::{IndexSource, Pipeline};
use docask::session::ChatHistory;

/// docask — ask questions about a PDF, answered from the document's own
/// content.
///
/// All commands accept `--config` pointing to a TOML configuration
/// file; every setting has a default, so the file is optional.
#[derive(Parser)]
#[command(
    name = "docask",
    about = "Ask questions about a PDF, answered from the document's own content",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Optional; defaults apply
    /// when the file does not exist.
    #[arg(long, global = true, default_value = "./config/docask.toml")]
    config: PathBuf,

    /// OpenAI API key. Falls back to the OPENAI_API_KEY environment
    /// variable.
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Ask a single question about a document.
    ///
    /// Builds the document's index on first use (or loads it from the
    /// cache), retrieves the most relevant chunks, and prints an answer
    /// grounded in them along with the source pages.
    Ask {
        /// The question to ask.
        question: String,

        /// Path to the PDF to ask about.
        #[arg(long)]
        document: PathBuf,
    },

    /// Start an interactive multi-turn session over one document.
    ///
    /// Each exchange is appended to the session's chat history, so
    /// follow-up questions may refer back to earlier answers. Type
    /// `exit` (or press Ctrl-D) to leave.
    Chat {
        /// Path to the PDF to chat about.
        #[arg(long)]
        document: PathBuf,
    },

    /// Build and persist a document's index without asking anything.
    ///
    /// Useful for paying the embedding cost up front. With `--force`
    /// any existing cached index is discarded first.
    Index {
        /// Path to the PDF to index.
        #[arg(long)]
        document: PathBuf,

        /// Discard any cached index and rebuild from scratch.
        #[arg(long)]
        force: bool,
    },

    /// Inspect or clear the on-disk index cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

/// Cache management subcommands.
#[derive(Subcommand)]
enum CacheAction {
    /// Print the cache directory a document's index lives in.
    Path {
        /// Path to the PDF.
        #[arg(long)]
        document: PathBuf,
    },

    /// Remove cached indexes.
    Clear {
        /// Remove only this document's cached index.
        #[arg(long)]
        document: Option<PathBuf>,

        /// Remove every cached index under the cache root.
        #[arg(long)]
        all: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up OPENAI_API_KEY from a local .env if present.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let cfg = config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Ask { question, document } => {
            let pipeline = connect(cfg, cli.api_key).await?;
            let result = pipeline.ask(&question, &document, &ChatHistory::new()).await?;
            println!("{}", result.answer);
            print_sources(&result.sources);
        }
        Commands::Chat { document } => {
            let pipeline = connect(cfg, cli.api_key).await?;
            run_chat(&pipeline, &document).await?;
        }
        Commands::Index { document, force } => {
            let pipeline = connect(cfg, cli.api_key).await?;
            if force {
                let identity = document.to_string_lossy();
                let dir = cache::index_dir(&pipeline.config().cache, &identity)?;
                if dir.exists() {
                    std::fs::remove_dir_all(&dir)
                        .with_context(|| format!("Failed to remove {}", dir.display()))?;
                }
            }
            let (index, source) = pipeline.ensure_index(&document).await?;
            match source {
                IndexSource::Built => {
                    println!("index built");
                    println!("  chunks embedded: {}", index.len());
                }
                IndexSource::Cache => {
                    println!("index already cached ({} chunks); use --force to rebuild", index.len());
                }
            }
        }
        Commands::Cache { action } => run_cache(&cfg, action)?,
    }

    Ok(())
}

/// Resolve the API key, validate it against the provider, and wire up
/// the pipeline.
async fn connect(cfg: Config, api_key_flag: Option<String>) -> Result<Pipeline> {
    let api_key = match api_key_flag {
        Some(key) => key,
        None => std::env::var("OPENAI_API_KEY")
            .context("No API key: pass --api-key or set OPENAI_API_KEY")?,
    };

    credential::validate(&api_key, cfg.generation.timeout_secs).await?;
    Pipeline::new(cfg, &api_key)
}

async fn run_chat(pipeline: &Pipeline, document: &Path) -> Result<()> {
    println!("chatting about {} (type 'exit' to leave)", document.display());

    let mut history = ChatHistory::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("you> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        let line = line?;
        let question = line.trim();

        if question.is_empty() {
            continue;
        }
        if question == "exit" || question == "quit" {
            break;
        }

        match pipeline.ask(question, document, &history).await {
            Ok(result) => {
                println!("{}", result.answer);
                print_sources(&result.sources);
                history.push_human(question);
                history.push_assistant(&result.answer);
            }
            // The session survives a failed exchange; the turn is
            // simply not recorded.
            Err(e) => eprintln!("error: {}", e),
        }
    }

    Ok(())
}

fn run_cache(cfg: &Config, action: CacheAction) -> Result<()> {
    match action {
        CacheAction::Path { document } => {
            let dir = cache::index_dir(&cfg.cache, &document.to_string_lossy())?;
            println!("{}", dir.display());
        }
        CacheAction::Clear { document, all } => match (document, all) {
            (Some(document), false) => {
                let dir = cache::index_dir(&cfg.cache, &document.to_string_lossy())?;
                if dir.exists() {
                    std::fs::remove_dir_all(&dir)
                        .with_context(|| format!("Failed to remove {}", dir.display()))?;
                    println!("removed {}", dir.display());
                } else {
                    println!("no cached index for {}", document.display());
                }
            }
            (None, true) => {
                if cfg.cache.dir.exists() {
                    std::fs::remove_dir_all(&cfg.cache.dir).with_context(|| {
                        format!("Failed to remove {}", cfg.cache.dir.display())
                    })?;
                }
                println!("cleared {}", cfg.cache.dir.display());
            }
            _ => bail!("cache clear needs exactly one of --document or --all"),
        },
    }

    Ok(())
}

fn print_sources(sources: &[ScoredChunk]) {
    for s in sources {
        let excerpt: String = s.chunk.text.chars().take(120).collect();
        println!(
            "  [page {}] \"{}\"",
            s.chunk.page + 1,
            excerpt.replace('\n', " ").trim()
        );
    }
}
