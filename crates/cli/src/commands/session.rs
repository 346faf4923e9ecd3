//! Interactive session command handler.
//!
//! A line-oriented loop over stdin with one active document at a time.

use clap::Args;
use pdfqa_core::{config::AppConfig, AppError, AppResult};
use pdfqa_knowledge::Session;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  :upload <path>   upload and index a PDF (replaces the current document)
  :help            show this help
  :quit, :exit     leave the session
Any other line is a question about the current document.";

/// Interactive upload-and-ask session
#[derive(Args, Debug)]
pub struct SessionCommand {
    /// PDF to upload before the first prompt
    #[arg(long)]
    pub pdf: Option<PathBuf>,
}

/// One parsed line of session input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    Upload(PathBuf),
    Help,
    Quit,
    Query(String),
    Empty,
    Invalid(String),
}

impl SessionInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            ":upload" | "/upload" => {
                if rest.is_empty() {
                    Self::Invalid("Usage: :upload <path-to-pdf>".to_string())
                } else {
                    Self::Upload(PathBuf::from(unquote(rest)))
                }
            }
            ":help" | "/help" => Self::Help,
            ":quit" | ":exit" | "/quit" | "/exit" => Self::Quit,
            _ => Self::Query(line.to_string()),
        }
    }
}

/// Strip one pair of matching quotes, as left by drag-and-drop in terminals.
fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|s| s.strip_suffix(quote)) {
            return inner;
        }
    }
    s
}

impl SessionCommand {
    pub async fn execute(&self, config: AppConfig) -> AppResult<()> {
        tracing::info!("Starting interactive session");

        let mut session = Session::new(config);

        if let Some(ref pdf) = self.pdf {
            handle_upload(&mut session, pdf.clone()).await;
        }

        println!("Type :help for commands.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush().ok();

            let Some(line) = lines.next_line().await? else {
                println!();
                break;
            };

            match SessionInput::parse(&line) {
                SessionInput::Empty => continue,
                SessionInput::Help => println!("{}", HELP),
                SessionInput::Quit => break,
                SessionInput::Invalid(message) => println!("{}", message),
                SessionInput::Upload(path) => handle_upload(&mut session, path).await,
                SessionInput::Query(query) => handle_query(&session, &query).await,
            }
        }

        tracing::info!("Session ended");
        Ok(())
    }
}

async fn handle_upload(session: &mut Session, path: PathBuf) {
    match session.upload(&path).await {
        Ok(report) => {
            tracing::info!(
                "Active index is now {:?} ({} chunks)",
                report.index_path,
                report.chunk_count
            );
            println!("PDF ingested and indexed successfully.");
        }
        Err(e) => {
            tracing::error!("Upload of {:?} failed: {}", path, e);
            println!("Error while ingesting the PDF: {}", e);
        }
    }
}

async fn handle_query(session: &Session, query: &str) {
    match session.ask(query).await {
        Ok(response) => println!("Response: {}", response.answer),
        Err(AppError::NoDocument) => {
            println!("{}", AppError::NoDocument);
        }
        Err(e) => {
            tracing::error!("Query failed: {}", e);
            println!("Error while answering the query: {}", e);
        }
    }
}
