//! CLI struct definitions for the scrivener command-line interface.
//!
//! All clap-derived types live here. Dispatch logic lives in `lib.rs`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "scrivener",
    version = env!("CARGO_PKG_VERSION"),
    about = "Rule-based editing agent for Hugo page bundles: review, copyedit, and summarize prose while front matter and code blocks stay byte-identical."
)]
pub(crate) struct Cli {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// Colored report on stderr
    Text,
    /// JSON report on stdout
    Json,
}

#[derive(clap::Args, Debug)]
pub(crate) struct EditCli {
    /// File to edit. Takes precedence over --active.
    #[clap(short, long)]
    pub file: Option<PathBuf>,
    /// The currently active file; it must carry the reserved name (index.md by default).
    #[clap(long)]
    pub active: Option<PathBuf>,
    /// Site root containing the content directory (defaults to current working directory).
    #[clap(long)]
    pub root: Option<PathBuf>,
    /// Print the edited document to stdout instead of writing it.
    #[clap(long)]
    pub dry_run: bool,
    /// Report format.
    #[clap(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(clap::Args, Debug)]
pub(crate) struct RegionsCli {
    /// Markdown file to segment. Never modified.
    pub path: PathBuf,
    /// Output format.
    #[clap(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Correct spelling and grammar in prose
    Review(EditCli),
    /// Review plus terminology, clarity, and cross-page consistency
    Copyedit(EditCli),
    /// Insert or refresh the trailing summary section
    Summary(EditCli),
    /// Show how a file splits into front matter, code, and prose
    Regions(RegionsCli),
}
