//! CLI module for ragline
//!
//! Provides command-line interface parsing for the ragline-server binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ragline - retrieval-augmented question answering server
#[derive(Parser, Debug)]
#[command(
    name = "ragline-server",
    version,
    about = "ragline - retrieval-augmented question answering server",
    long_about = "Answers questions about a fixed text corpus. The corpus is indexed at startup;\n\
                  answers are generated by an Ollama backend and streamed as NDJSON.\n\n\
                  Run without arguments to start the server.",
    after_help = "EXAMPLES:\n    \
                  ragline-server                          # Start the server (reads ragline.toml)\n    \
                  ragline-server --config my.toml         # Use a custom config file\n    \
                  ragline-server query \"Is there a pool?\" # Show the chunks a question retrieves\n    \
                  ragline-server config --validate        # Check the effective configuration"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "ragline.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Build the index and serve the HTTP API
    Serve,

    /// Build the index and print the chunks retrieved for a question
    ///
    /// No text is generated; useful for checking what context a question
    /// would receive.
    Query {
        /// The question to embed
        text: String,

        /// Number of chunks to return (defaults to rag.top_k)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Show the effective configuration
    Config {
        /// Only validate, do not print
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The subcommand to run, `serve` when none was given.
    pub fn selected_command(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&Commands::Serve)
    }
}
