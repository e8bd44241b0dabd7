//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::domain::model::{codec, crf, preset, scale, SplitMode};

/// Arguments for commands that work on one source file
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Source video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Print the transcoder command instead of running it
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the merged export
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Timeline JSON document
    #[arg(short, long)]
    pub timeline: PathBuf,

    /// Directory receiving the export
    #[arg(short, long)]
    pub output_dir: PathBuf,

    /// Output file name without extension
    #[arg(short, long, default_value = "output")]
    pub filename: String,

    /// Output container extension
    #[arg(long, default_value = ".mp4")]
    pub format: String,

    /// Resolution every clip is scaled to
    #[arg(long, default_value = scale::HD)]
    pub resolution: String,

    /// Video codec
    #[arg(long, default_value = codec::H264_RGB)]
    pub codec: String,

    /// Constant Rate Factor
    #[arg(long, default_value = crf::HIGH)]
    pub crf: String,

    /// Encoding preset
    #[arg(long, default_value = preset::MEDIUM)]
    pub preset: String,

    /// Print the transcoder command instead of running it
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the lossless batch export
#[derive(Args, Debug)]
pub struct CutArgs {
    /// Timeline JSON document
    #[arg(short, long)]
    pub timeline: PathBuf,

    /// Directory receiving one file per node
    #[arg(short, long)]
    pub output_dir: PathBuf,

    /// Output container extension
    #[arg(long, default_value = ".mp4")]
    pub format: String,

    /// Cut every node, not only the flagged ones
    #[arg(long)]
    pub all: bool,

    /// Print the transcoder commands instead of running them
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for timeline editing
#[derive(Args, Debug)]
pub struct TimelineArgs {
    /// Timeline JSON document, created on first insert
    #[arg(short, long)]
    pub file: PathBuf,

    #[command(subcommand)]
    pub op: TimelineOp,
}

/// Timeline edits
#[derive(Subcommand, Debug)]
pub enum TimelineOp {
    /// Print the timeline
    Show,
    /// Insert a node
    Insert {
        /// Source id (path of the source media)
        #[arg(long)]
        rid: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long)]
        start: f64,
        #[arg(long)]
        end: f64,
        /// Insert position; appends when omitted
        #[arg(long)]
        position: Option<usize>,
    },
    /// Delete the node at a position
    Delete {
        #[arg(long)]
        position: usize,
    },
    /// Rename the node at a position
    Rename {
        #[arg(long)]
        position: usize,
        #[arg(long)]
        name: String,
    },
    /// Split the node at a position
    Split {
        /// sliceCut or intervalCut
        #[arg(long)]
        mode: SplitMode,
        #[arg(long)]
        position: usize,
        #[arg(long)]
        start: f64,
        #[arg(long)]
        end: f64,
    },
    /// Flip the lossless flag of one node
    Toggle {
        #[arg(long)]
        position: usize,
    },
    /// Flag every node for lossless export
    MarkAll,
    /// Clear every lossless flag
    UnmarkAll,
    /// Remove every node cut from a source
    RemoveSource {
        #[arg(long)]
        rid: String,
    },
}
