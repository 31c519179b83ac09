//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Browse Link-paginated JSON APIs and validate forms
#[derive(Parser, Debug)]
#[command(name = "pagewire")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a Links header and print its relations
    Links {
        /// Header value, e.g. `</players/?after=10>; rel=next`
        header: String,
    },

    /// Browse a configured paginator interactively.
    /// Reads `n`, `p`, `r`, `f <text>`, `s <index>` and `q` from stdin
    Browse {
        /// Paginator name from the configuration
        paginator: String,

        /// Extra query parameters (repeatable)
        #[arg(short, long = "query", value_name = "KEY=VALUE")]
        query: Vec<String>,
    },

    /// Fill a configured form and submit it
    Validate {
        /// Form name from the configuration
        form: String,

        /// Input values as a JSON object keyed by input id
        #[arg(long)]
        values: String,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
