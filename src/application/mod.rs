//! Application layer - use cases and orchestration.
//!
//! This layer contains the quote store, the sync engine and the output
//! formatting used by the CLI.

pub mod formatter;
pub mod quote_store;
pub mod sync_engine;

pub use formatter::{
    format_notification, format_outcome, format_quote, format_quotes_json, format_quotes_table,
    format_quotes_text, format_sync_state, OutputFormat,
};
pub use quote_store::QuoteStore;
pub use sync_engine::SyncEngine;
