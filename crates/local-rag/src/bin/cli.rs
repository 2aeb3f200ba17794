//! Interactive RAG over a local folder
//!
//! Run with: cargo run -p local-rag -- --data-dir ./data

use anyhow::Context;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use local_rag::config::{QueryErrorPolicy, RagConfig};
use local_rag::index::{SentenceSplitter, VectorStoreIndex};
use local_rag::loader::DirectoryReader;
use local_rag::providers::{EmbeddingProvider, OllamaProvider};
use local_rag::repl::{exit_on_interrupt, LoopExit, Repl, TerminalReader};

#[derive(Debug, Parser)]
#[command(name = "local-rag", version, about = "Ask questions about local documents using Ollama models")]
struct Cli {
    /// TOML config file (defaults to the user config dir if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of documents to index
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Descend into subdirectories of the data directory
    #[arg(long)]
    recursive: bool,

    /// Ollama base URL
    #[arg(long)]
    ollama_url: Option<String>,

    /// Embedding model
    #[arg(long)]
    embed_model: Option<String>,

    /// Generation model
    #[arg(short, long)]
    model: Option<String>,

    /// Number of chunks retrieved per question
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// What to do when a query fails
    #[arg(long, value_enum)]
    on_error: Option<QueryErrorPolicy>,

    /// Print retrieved sources after each answer
    #[arg(long)]
    show_sources: bool,

    /// Verbose logging (debug level)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Defaults < config file < flags
    fn load_config(&self) -> anyhow::Result<RagConfig> {
        let path = self
            .config
            .clone()
            .or_else(|| RagConfig::default_path().filter(|p| p.is_file()));

        let mut config = match path {
            Some(path) => {
                tracing::info!("Loading config from {}", path.display());
                RagConfig::from_file(&path)
                    .with_context(|| format!("failed to read config {}", path.display()))?
            }
            None => RagConfig::default(),
        };

        if let Some(dir) = &self.data_dir {
            config.data.dir = dir.clone();
        }
        if self.recursive {
            config.data.recursive = true;
        }
        if let Some(url) = &self.ollama_url {
            config.ollama.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = &self.embed_model {
            config.ollama.embed_model = model.clone();
        }
        if let Some(model) = &self.model {
            config.ollama.generate_model = model.clone();
        }
        if let Some(top_k) = self.top_k {
            config.query.similarity_top_k = top_k;
        }
        if let Some(policy) = self.on_error {
            config.repl.on_error = policy;
        }
        if self.show_sources {
            config.repl.show_sources = true;
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "local_rag=debug" } else { "local_rag=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.load_config()?;
    exit_on_interrupt().context("failed to install Ctrl-C handler")?;

    eprintln!(
        "{} {}",
        style("local-rag").bold().cyan(),
        style(format!(
            "({} + {} via {})",
            config.ollama.generate_model, config.ollama.embed_model, config.ollama.base_url
        ))
        .dim()
    );

    // 1. Load documents
    let documents = DirectoryReader::from_config(&config.data)
        .load_data()
        .context("failed to load documents")?;
    tracing::info!("Loaded {} documents", documents.len());

    // 2. Model clients
    let provider = OllamaProvider::new(&config.ollama).context("failed to create Ollama client")?;
    if !provider.embedder().health_check()? {
        tracing::warn!("Ollama not available at {}", config.ollama.base_url);
        tracing::warn!("Please start Ollama and pull the models:");
        tracing::warn!("  1. Start: ollama serve");
        tracing::warn!(
            "  2. Pull models: ollama pull {} && ollama pull {}",
            config.ollama.embed_model,
            config.ollama.generate_model
        );
    }

    // 3. Build the index
    let splitter = SentenceSplitter::from_config(&config.chunking)?;
    let progress = ProgressBar::new(0).with_style(
        ProgressStyle::with_template("{spinner} Embedding [{bar:40}] {pos}/{len} nodes")?
            .progress_chars("=> "),
    );
    let index = VectorStoreIndex::from_documents(
        &documents,
        &splitter,
        provider.embedder(),
        config.chunking.embed_batch_size,
        &progress,
    )
    .context("failed to build index")?;
    tracing::info!("Index ready: {} nodes", index.node_count());

    // 4. Query loop
    let engine = index.as_query_engine(provider.embedder(), provider.llm(), &config.query);
    let reader = TerminalReader::new().context("failed to open terminal")?;
    let summary = Repl::new(reader, std::io::stdout(), &engine, config.repl.clone()).run()?;

    if summary.exit == LoopExit::Interrupted {
        tracing::debug!("Stopped by interrupt");
    }

    Ok(())
}
