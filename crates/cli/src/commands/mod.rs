//! Command handlers for the pdfqa CLI.

pub mod ask;
pub mod ingest;
pub mod session;

pub use ask::AskCommand;
pub use ingest::IngestCommand;
pub use session::SessionCommand;
