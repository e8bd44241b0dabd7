//! CLI module for reelcut
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// Reelcut - timeline editing and ffmpeg orchestration
///
/// Edits timeline documents, imports sources as lossless proxies and
/// exports timelines either merged into one file or as lossless cuts.
/// Events are printed to stdout as JSON lines; logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "reelcut")]
#[command(about = "Reelcut - timeline editing and ffmpeg orchestration")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (TOML, `[reelcut]` table)
    #[arg(long, global = true, env = "REELCUT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format (pretty, compact, json)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Transcoder binary
    #[arg(long, global = true)]
    pub ffmpeg: Option<String>,

    /// Project directory for proxies and thumbnails
    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Maximum concurrent transcoder processes
    #[arg(long, global = true)]
    pub jobs: Option<usize>,

    /// Per-operation timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Include encoding progress events in the output
    #[arg(long, global = true)]
    pub progress: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the duration of a source file
    Probe(args::SourceArgs),
    /// Import a source file by creating its proxy
    Import(args::SourceArgs),
    /// Create the thumbnail of a source file
    Thumbnail(args::SourceArgs),
    /// Export the timeline as one re-encoded file
    Export(args::ExportArgs),
    /// Export flagged nodes as lossless cuts
    Cut(args::CutArgs),
    /// Edit a timeline document
    Timeline(args::TimelineArgs),
}
