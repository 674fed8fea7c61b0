//! Sync-related domain models and configuration.
//!
//! Contains types for configuring the periodic remote sync, the persisted
//! sync state, and the notifications a sync run emits.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Configuration for the sync loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Interval between sync operations in seconds.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Whether periodic sync is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Timeout applied to each remote request, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            enabled: default_enabled(),
            timeout_secs: default_timeout(),
        }
    }
}

const fn default_interval() -> u64 {
    30
}

const fn default_enabled() -> bool {
    true
}

const fn default_timeout() -> u64 {
    10
}

/// Configuration for the remote quote source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Endpoint read on every sync.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Endpoint the local collection is posted to.
    #[serde(default = "default_endpoint")]
    pub push_endpoint: String,

    /// How many remote items become quotes.
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,

    /// Category assigned to every fetched quote.
    #[serde(default = "default_remote_category")]
    pub category: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            push_endpoint: default_endpoint(),
            fetch_limit: default_fetch_limit(),
            category: default_remote_category(),
        }
    }
}

fn default_endpoint() -> String {
    "https://jsonplaceholder.typicode.com/posts".to_string()
}

const fn default_fetch_limit() -> usize {
    5
}

fn default_remote_category() -> String {
    "ServerSync".to_string()
}

/// Path configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Base data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Sync loop configuration.
    #[serde(default)]
    pub sync: SyncConfig,

    /// Remote source configuration.
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Path configuration.
    #[serde(default)]
    pub paths: PathConfig,
}

impl AppConfig {
    /// Get the data directory, using default if not configured.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.paths
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".quote-sync")
    }

    /// Get the storage database path.
    #[must_use]
    pub fn storage_db_path(&self) -> PathBuf {
        self.data_dir().join("storage.db")
    }

    /// Sync interval as a duration.
    #[must_use]
    pub const fn sync_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sync.interval_secs)
    }

    /// Remote request timeout as a duration.
    #[must_use]
    pub const fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sync.timeout_secs)
    }
}

/// Whether a sync is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Syncing,
}

/// Current state of synchronization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncState {
    /// Last successful sync timestamp.
    pub last_sync: Option<DateTime<Utc>>,

    /// Quotes added by the most recent merge.
    pub last_merged: usize,

    /// Size of the local collection after the last successful sync.
    pub quote_count: usize,

    /// Whether a sync is currently in progress.
    pub is_syncing: bool,

    /// Last error message if any.
    pub last_error: Option<String>,
}

impl SyncState {
    /// Create a new sync state with current timestamp.
    #[must_use]
    pub fn with_sync_time(mut self) -> Self {
        self.last_sync = Some(Utc::now());
        self
    }

    /// Mark sync as in progress.
    #[must_use]
    pub const fn syncing(mut self) -> Self {
        self.is_syncing = true;
        self
    }

    /// Mark sync as completed.
    #[must_use]
    pub const fn completed(mut self) -> Self {
        self.is_syncing = false;
        self
    }

    /// Set error state.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.last_error = Some(error.into());
        self.is_syncing = false;
        self
    }

    /// Clear error state.
    #[must_use]
    pub fn clear_error(mut self) -> Self {
        self.last_error = None;
        self
    }
}

/// Result of a single sync attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Another sync was already in flight.
    Skipped,
    /// Remote content matched local content.
    Unchanged,
    /// Remote quotes were appended.
    Merged { added: usize },
    /// The remote could not be read.
    Failed { message: String },
}

/// Kind of user-facing sync notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Merged,
    Failed,
}

/// Transient message for the user about a sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn merged(added: usize) -> Self {
        Self {
            kind: NotificationKind::Merged,
            message: format!("Quotes synced with server ({added} new)"),
        }
    }

    #[must_use]
    pub fn failed(reason: impl std::fmt::Display) -> Self {
        Self {
            kind: NotificationKind::Failed,
            message: format!("Failed to sync with server: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.sync.interval_secs, 30);
        assert!(config.sync.enabled);
        assert_eq!(config.remote.fetch_limit, 5);
        assert_eq!(config.remote.category, "ServerSync");
    }

    #[test]
    fn test_sync_state_transitions() {
        let state = SyncState::default()
            .syncing()
            .with_sync_time()
            .completed();

        assert!(!state.is_syncing);
        assert!(state.last_sync.is_some());
    }

    #[test]
    fn test_error_clears_syncing() {
        let state = SyncState::default().syncing().with_error("boom");
        assert!(!state.is_syncing);
        assert_eq!(state.last_error.as_deref(), Some("boom"));
        assert!(state.clear_error().last_error.is_none());
    }

    #[test]
    fn test_data_dir_override() {
        let mut config = AppConfig::default();
        config.paths.data_dir = Some(PathBuf::from("/tmp/quotes"));
        assert_eq!(
            config.storage_db_path(),
            PathBuf::from("/tmp/quotes/storage.db")
        );
    }
}
