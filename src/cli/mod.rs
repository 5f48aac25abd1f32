//! CLI module for Jarvis.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Jarvis - a tool-using restaurant assistant
///
/// Chats with an OpenAI model that can look up restaurants in a local
/// vector index.
#[derive(Parser, Debug)]
#[command(name = "jarvis")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Chat model to use
        #[arg(short, long)]
        model: Option<String>,

        /// Vector collection backing the search tool
        #[arg(long)]
        collection: Option<String>,
    },

    /// Send a single message and print the reply
    Ask {
        /// The message to send
        message: String,

        /// Chat model to use
        #[arg(short, long)]
        model: Option<String>,

        /// Vector collection backing the search tool
        #[arg(long)]
        collection: Option<String>,
    },

    /// Index one document
    Add {
        /// Document id
        id: String,

        /// Document attributes as a JSON object
        attributes: String,

        /// Target collection
        #[arg(long)]
        collection: Option<String>,
    },

    /// Index documents from a JSON Lines file
    Import {
        /// File with one {"id": ..., "attributes": {...}} object per line
        file: String,

        /// Target collection
        #[arg(long)]
        collection: Option<String>,
    },

    /// Search indexed documents
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,

        /// Collection to search
        #[arg(long)]
        collection: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask() {
        let cli = Cli::try_parse_from(["jarvis", "-vv", "ask", "Where can I get tacos?"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Ask { message, model, .. } => {
                assert_eq!(message, "Where can I get tacos?");
                assert!(model.is_none());
            }
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_search_limit() {
        let cli = Cli::try_parse_from(["jarvis", "search", "tacos", "-l", "3"]).unwrap();
        match cli.command {
            Commands::Search { query, limit, .. } => {
                assert_eq!(query, "tacos");
                assert_eq!(limit, Some(3));
            }
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_config_init() {
        let cli = Cli::try_parse_from(["jarvis", "-c", "/tmp/j.toml", "config", "init", "--force"])
            .unwrap();
        assert_eq!(cli.config.as_deref(), Some("/tmp/j.toml"));
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Init { force: true }
            }
        ));
    }
}
