//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::application::OutputFormat;

/// Quote Sync - keep a local quote collection in step with a remote source.
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

    /// Path to the configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a random quote from the current category filter.
    Show {
        /// Show the last viewed quote instead of picking a new one.
        #[arg(long)]
        resume: bool,
    },

    /// Add a new quote.
    Add {
        /// Quote text.
        text: String,

        /// Quote category.
        category: String,

        /// Also post the new quote to the remote endpoint.
        #[arg(long)]
        push: bool,
    },

    /// List quotes.
    List {
        /// Category to list (defaults to the current filter).
        #[arg(long)]
        category: Option<String>,
    },

    /// List categories, marking the current filter.
    Categories,

    /// Print or set the category filter.
    Filter {
        /// Category name, or "all".
        category: Option<String>,
    },

    /// Export all quotes to a JSON file.
    Export {
        /// Output file (defaults to quotes.json in the data directory).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Append quotes from a JSON file.
    Import {
        /// JSON file holding an array of quotes.
        file: PathBuf,
    },

    /// Sync once with the remote (remote replaces local quotes).
    Sync,

    /// Sync every 30 seconds until interrupted.
    Daemon,

    /// Write a default configuration file.
    Init,

    /// Show configuration and storage paths.
    Paths,
}

impl Cli {
    /// Parse the output format argument.
    pub fn output_format(&self) -> Result<OutputFormat, String> {
        self.format.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_with_push() {
        let cli = Cli::parse_from(["quote-sync", "add", "Be kind", "Life", "--push"]);
        match cli.command {
            Commands::Add {
                text,
                category,
                push,
            } => {
                assert_eq!(text, "Be kind");
                assert_eq!(category, "Life");
                assert!(push);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["quote-sync", "-vv", "-f", "table", "list"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.output_format(), Ok(OutputFormat::Table)));
    }

    #[test]
    fn test_filter_without_argument() {
        let cli = Cli::parse_from(["quote-sync", "filter"]);
        assert!(matches!(cli.command, Commands::Filter { category: None }));
    }
}
