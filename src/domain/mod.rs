//! Domain layer - core types and pure logic.
//!
//! This layer contains pure domain models, the deduplicator and error types
//! without any external dependencies (DB, IO, etc.).

pub mod dedupe;
pub mod error;
pub mod models;
pub mod sync;

pub use dedupe::dedupe;
pub use error::{AppError, Result};
pub use models::{seed_quotes, CategoryFilter, ImportSummary, Quote, QuoteCollection};
pub use sync::{
    AppConfig, Notification, NotificationKind, RemoteConfig, SyncOutcome, SyncPhase, SyncState,
};
