//! lexicard CLI: work with the word sets and the enrichment pipeline offline.

use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use lexicard::config::{Config, ENV_STORE_PATH};
use lexicard::context::RequestContext;
use lexicard::filter::prepare_candidates;
use lexicard::markup::{IGNORED_WORDS_VALUE, KNOWN_WORDS_VALUE, Markup};
use lexicard::paths::LexiPaths;
use lexicard::pipeline::EnrichmentPipeline;
use lexicard::store::{DurableWordStore, WordStore};
use lexicard::tokenize::extract_words;

#[derive(Parser)]
#[command(name = "lexicard", version, about = "Vocabulary flashcards from text")]
struct Cli {
    /// Word store directory.
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// TOML config file (defaults to the XDG config file, then the environment).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the candidate words of a text, one per line.
    Candidates {
        /// Read the text from this file instead of stdin.
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Add words to the known or ignored set.
    Mark {
        /// Comma-separated words the user knows.
        #[arg(long, value_delimiter = ',')]
        known: Vec<String>,

        /// Comma-separated words to ignore.
        #[arg(long, value_delimiter = ',')]
        ignored: Vec<String>,
    },

    /// Show how many words each set holds.
    Stats,

    /// Build cards for the given words and upload them.
    Enrich {
        /// Words to look up.
        #[arg(required = true)]
        words: Vec<String>,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = RequestContext::background();

    match &cli.command {
        Commands::Candidates { file } => {
            let text = match file {
                Some(path) => std::fs::read_to_string(path).into_diagnostic()?,
                None => {
                    let mut text = String::new();
                    std::io::stdin().read_to_string(&mut text).into_diagnostic()?;
                    text
                }
            };
            let store = open_store(&cli)?;
            for word in prepare_candidates(&store, &ctx, &text)? {
                println!("{word}");
            }
        }

        Commands::Mark { known, ignored } => {
            let pairs = known
                .iter()
                .map(|w| (w.as_str(), KNOWN_WORDS_VALUE))
                .chain(ignored.iter().map(|w| (w.as_str(), IGNORED_WORDS_VALUE)));
            let markup = Markup::from_pairs(pairs);
            let (known, ignored) = (markup.known.len(), markup.ignored.len());

            let store = open_store(&cli)?;
            markup.save(&store, &ctx)?;
            println!("Marked {known} known, {ignored} ignored");
        }

        Commands::Stats => {
            let store = open_store(&cli)?;
            println!("Known:   {}", store.count_known()?);
            println!("Ignored: {}", store.count_ignored()?);
        }

        Commands::Enrich { words } => {
            let config = load_config(&cli)?;
            let words = extract_words(&words.join(" "));
            let pipeline = EnrichmentPipeline::from_config(&config);
            let ctx = RequestContext::with_timeout(config.server.request_timeout());

            for card in pipeline.run(&ctx, &words)? {
                println!(
                    "{}: {} definitions, {} examples",
                    card.word(),
                    card.definitions().len(),
                    card.examples().len()
                );
            }
        }
    }

    Ok(())
}

/// `--store`, then `LEXICARD_STORE_PATH`, then `--config`'s `store_path`,
/// then the XDG data directory.
fn store_dir(cli: &Cli) -> Result<PathBuf> {
    if let Some(dir) = &cli.store {
        return Ok(dir.clone());
    }
    if let Some(dir) = std::env::var_os(ENV_STORE_PATH).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    if let Some(path) = &cli.config {
        return Ok(Config::from_toml_file(path)?.store_path);
    }
    Ok(LexiPaths::resolve()?.store_dir())
}

fn open_store(cli: &Cli) -> Result<DurableWordStore> {
    let dir = store_dir(cli)?;
    tracing::debug!(dir = %dir.display(), "opening word store");
    Ok(DurableWordStore::open(&dir)?)
}

/// `--config`, then the XDG config file if present, then the environment.
/// `--store` overrides the store location either way.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_toml_file(path)?,
        None => {
            let default = LexiPaths::resolve().ok().map(|p| p.config_file());
            match default.filter(|p| p.is_file()) {
                Some(path) => Config::from_toml_file(&path)?,
                None => Config::from_env()?,
            }
        }
    };
    if let Some(dir) = &cli.store {
        config.store_path = dir.clone();
    }
    Ok(config)
}
