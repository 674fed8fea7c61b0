//! Infrastructure layer - external adapters (database, network, filesystem).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod config;
pub mod local_storage;
pub mod remote_mirror;

pub use config::{config_file_path, ensure_config_exists, load_config};
pub use local_storage::LocalStorage;
pub use remote_mirror::{HttpRemoteMirror, RemoteMirror};
