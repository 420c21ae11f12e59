//! Command-line argument parsing for SentiFlow
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SentiFlow - sentiment-aware customer support replies grounded in a knowledge base
#[derive(Parser, Debug)]
#[command(name = "sentiflow")]
#[command(author = "Jerome (Kubashen) Naidoo")]
#[command(version)]
#[command(about = "Sentiment-aware support replies grounded in your knowledge base", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand (defaults to `chat`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start an interactive support conversation
    Chat,

    /// Answer a single message and exit
    Ask {
        /// Customer message
        #[arg(value_name = "MESSAGE")]
        message: String,

        /// Number of knowledge base documents to retrieve
        #[arg(short, long)]
        k: Option<usize>,

        /// Answer without knowledge base retrieval
        #[arg(long)]
        no_retrieval: bool,
    },

    /// Classify the sentiment of a message
    Sentiment {
        #[arg(value_name = "TEXT")]
        text: String,

        /// Print the verdict as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search the knowledge base without generating a reply
    Search {
        #[arg(value_name = "QUERY")]
        query: String,

        /// Number of documents to return
        #[arg(short, long, default_value_t = 5)]
        k: usize,

        /// Only return documents in this category
        #[arg(long)]
        category: Option<String>,
    },

    /// Display the effective configuration
    Config {
        /// Write a default configuration file
        #[arg(long)]
        init: bool,
    },

    /// Check the search cluster and report the indexed document count
    Status,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Subcommand to run; `chat` when none was given
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Chat)
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Check if should show spinners
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if should show per-document scores and model details
    pub fn show_details(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }
}
