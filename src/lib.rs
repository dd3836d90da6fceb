//! Scrivener: an editing agent for a Hugo blog
//!
//! **Scrivener edits prose and nothing else.**
//!
//! A post is a page bundle (`content/**/index.md`). Scrivener splits it into
//! front matter, fenced code, and prose, applies one editing policy to the
//! prose, proves the other two regions came out byte-identical, and only then
//! writes the file back.
//!
//! # Commands
//!
//! - `review`: spelling and grammar corrections
//! - `copyedit`: review plus terminology, whitespace, and consistency with
//!   the pages the post links to
//! - `summary`: insert or refresh the trailing `## Summary` section
//! - `regions`: print the segmentation of a file, read-only
//!
//! # Targeting
//!
//! `--file` names the target explicitly. Without it, `--active` supplies the
//! currently open file, which must be named `index.md`; anything else stops
//! the run with `WrongTargetFile` before the file is read. Either way the
//! target must be an `index.md` under `content/`.
//!
//! # Examples
//!
//! ```bash
//! # Fix typos in the open post
//! scrivener review --active content/posts/streaming-sdk/index.md
//!
//! # Preview a copyedit without writing
//! scrivener copyedit --file content/posts/streaming-sdk/index.md --dry-run
//!
//! # Add or refresh the summary, machine-readable report
//! scrivener summary --file content/posts/streaming-sdk/index.md --format json
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: segmentation, rules, target gating, reporting, the edit pipeline
//! - [`policies`]: the `review`, `copyedit`, and `summary` policies

pub mod core;
pub mod policies;

mod cli;

use crate::cli::{Cli, Command, EditCli, OutputFormat, RegionsCli};
use crate::core::document::{Document, RegionKind};
use crate::core::editor::{self, EditRequest};
use crate::core::error::{self, ScrivenerError};
use crate::core::output::region_row;
use crate::core::report::{AnomalyKind, Report};
use crate::policies::EditCommand;
use clap::Parser;
use std::path::PathBuf;

pub fn run() -> Result<(), error::ScrivenerError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Review(args) => run_edit_cli(EditCommand::Review, args),
        Command::Copyedit(args) => run_edit_cli(EditCommand::Copyedit, args),
        Command::Summary(args) => run_edit_cli(EditCommand::Summary, args),
        Command::Regions(args) => run_regions_cli(args),
    }
}

fn rejection_kind(err: &ScrivenerError) -> Option<AnomalyKind> {
    match err {
        ScrivenerError::WrongTargetFile { .. } => Some(AnomalyKind::WrongTargetFile),
        ScrivenerError::IneligibleTarget { .. } => Some(AnomalyKind::IneligibleTarget),
        _ => None,
    }
}

fn run_edit_cli(command: EditCommand, args: EditCli) -> Result<(), ScrivenerError> {
    let site_root = match args.root {
        Some(root) => root,
        None => std::env::current_dir().map_err(ScrivenerError::IoError)?,
    };
    let request = EditRequest {
        command,
        file: args.file,
        active: args.active,
        site_root,
        dry_run: args.dry_run,
    };

    let result = match editor::run_edit(&request) {
        Ok(result) => result,
        Err(err) => {
            if args.format == OutputFormat::Json {
                let mut report = Report::rejected(command.as_str(), rejection_kind(&err), err.to_string());
                report.target = request.file.clone().or_else(|| request.active.clone());
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            return Err(err);
        }
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result.report)?),
        OutputFormat::Text => eprint!("{}", result.report.render_text()),
    }
    if request.dry_run && args.format == OutputFormat::Text {
        print!("{}", result.output);
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct RegionListing {
    path: PathBuf,
    regions: Vec<crate::core::document::Region>,
    anomalies: Vec<crate::core::report::Anomaly>,
}

fn run_regions_cli(args: RegionsCli) -> Result<(), ScrivenerError> {
    let doc = Document::read(&args.path)?;
    match args.format {
        OutputFormat::Json => {
            let listing = RegionListing {
                path: doc.path.clone(),
                regions: doc.regions().to_vec(),
                anomalies: doc.anomalies().to_vec(),
            };
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        OutputFormat::Text => {
            for region in doc.regions() {
                let first = doc.line_of(region.span.start);
                let last = doc.line_of(region.span.end.saturating_sub(1).max(region.span.start));
                let tag = match region.kind {
                    RegionKind::Code => Some(region.info.as_deref().unwrap_or("-")),
                    _ => None,
                };
                println!("{}", region_row(&region.kind.to_string(), first, last, tag));
            }
            for anomaly in doc.anomalies() {
                eprintln!("L{} {}: {}", anomaly.line, anomaly.kind, anomaly.message);
            }
        }
    }
    Ok(())
}
