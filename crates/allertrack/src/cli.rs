//! Clap derive structures for the `allertrack` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-level CLI ────────────────────────────────────────────────────

/// allertrack -- allergen exposure tracking from the command line
#[derive(Debug, Parser)]
#[command(
    name = "allertrack",
    version,
    about = "Track days since your last exposure to each allergen",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Tracker server URL (overrides the config file)
    #[arg(long, short = 's', env = "ALLERTRACK_SERVER", global = true)]
    pub server: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "ALLERTRACK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ALLERTRACK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the current allergen exposure snapshot
    #[command(alias = "ls")]
    Show,

    /// Trigger a server-side recompute and show the fresh snapshot
    Refresh,

    /// Show the historical feed log
    Feed,

    /// Follow live updates until interrupted
    #[command(alias = "w")]
    Watch,

    /// Show the food/allergen suggestion table
    #[command(alias = "sug")]
    Suggestions,
}
