//! pdfqa CLI
//!
//! Main entry point for the pdfqa command-line tool.
//! Upload PDFs into per-document vector indices and ask questions about them.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, IngestCommand, SessionCommand};
use pdfqa_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// pdfqa - ask questions about PDF documents
#[derive(Parser, Debug)]
#[command(name = "pdfqa")]
#[command(about = "Ask questions about PDF documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "PDFQA_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "PDFQA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Chat model identifier
    #[arg(short, long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload a PDF and build its vector index
    Ingest(IngestCommand),

    /// Answer one question from an existing index
    Ask(AskCommand),

    /// Interactive upload-and-ask session
    Session(SessionCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Pick up OPENAI_API_KEY, BASE_URL, MODEL, ... from a local .env
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Workspace and config file decide which YAML layer is read, so they are
    // resolved before loading rather than applied as overrides afterwards.
    let config = AppConfig::load_with(|key| match key {
        "PDFQA_WORKSPACE" => cli
            .workspace
            .as_ref()
            .map(|p| p.display().to_string())
            .or_else(|| std::env::var(key).ok()),
        "PDFQA_CONFIG" => cli
            .config
            .as_ref()
            .map(|p| p.display().to_string())
            .or_else(|| std::env::var(key).ok()),
        _ => std::env::var(key).ok(),
    })?;

    let config = config.with_overrides(
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
        cli.log_json,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color, config.log_json)?;

    tracing::info!("pdfqa starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("LLM settings: {:?}", config.llm);
    tracing::debug!(
        "Embedding: {} ({})",
        config.embedding.provider,
        config.embedding.model
    );

    let command_name = match &cli.command {
        Commands::Ingest(_) => "ingest",
        Commands::Ask(_) => "ask",
        Commands::Session(_) => "session",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ingest(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Session(cmd) => cmd.execute(config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
