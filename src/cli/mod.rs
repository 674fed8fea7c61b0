//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::application::OutputFormat;

/// quote-sync - Keep a list of quotes and sync it with a remote server.
#[derive(Parser, Debug)]
#[command(name = "quote-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format: text, json, or table.
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Path to a configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a random quote.
    Show {
        /// Category to pick from (defaults to the saved filter).
        #[arg(short = 'C', long)]
        category: Option<String>,
    },

    /// List quotes.
    List {
        /// Only list this category (defaults to the saved filter).
        #[arg(short = 'C', long)]
        category: Option<String>,
    },

    /// Add a new quote.
    Add {
        /// Quote text.
        text: String,

        /// Quote category.
        #[arg(short = 'C', long)]
        category: String,
    },

    /// List distinct categories.
    Categories,

    /// Save the category filter used by `show` and `list` ("all" clears it).
    Filter {
        /// Category name or "all".
        category: String,
    },

    /// Sync once with the remote server.
    Sync,

    /// Sync periodically until interrupted.
    Watch {
        /// Override the configured interval in seconds.
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },

    /// Export quotes as a JSON array.
    Export {
        /// Output file path (stdout if not specified).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import quotes from a JSON array file.
    Import {
        /// File to read.
        file: PathBuf,
    },

    /// Show sync status.
    Status,

    /// Show the configuration file path.
    Config {
        /// Write the default configuration file if missing.
        #[arg(long)]
        init: bool,
    },
}

impl Cli {
    /// Parse the output format argument.
    pub fn output_format(&self) -> Result<OutputFormat, String> {
        self.format.parse()
    }
}
