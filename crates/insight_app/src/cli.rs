use std::path::PathBuf;

use clap::{Parser, Subcommand};
use insight_core::Category;
use insight_logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "insight")]
#[command(about = "Run social-media analysis jobs against the insight backend", version)]
pub struct Cli {
    /// Path to a RON config file (default: ./insight.ron when present)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overriding the config file
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Where logs go: terminal, file (./insight.log) or both
    #[arg(long, global = true, default_value = "terminal", value_parser = parse_log_destination)]
    pub log: LogDestination,

    /// Log at debug level
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start analyses and wait for them to finish
    Analyze {
        /// Categories to analyze (competitors, lowes, strategy, campaigns, full)
        #[arg(required = true)]
        categories: Vec<Category>,

        /// Print each result payload as JSON once it arrives
        #[arg(long)]
        print_results: bool,
    },

    /// Show the backend's operational status
    Status,

    /// Show the most recent stored result of a category
    Latest {
        /// Category to look up
        category: Category,
    },
}

fn parse_log_destination(name: &str) -> Result<LogDestination, String> {
    LogDestination::from_name(name)
        .ok_or_else(|| format!("unknown log destination `{name}` (expected terminal, file or both)"))
}
