//! Reelcut Library
//!
//! Media core of a non-linear video editor: an ordered timeline of clip
//! nodes, a transcoder command builder, typed queries that turn editor
//! intent into ffmpeg invocations, and an execution pipeline that runs
//! them while streaming progress events.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod command;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ports;
pub mod query;
pub mod utils;

// Re-export commonly used types
pub use command::TranscoderCommand;
pub use domain::errors::{TimelineError, ValidationError};
pub use domain::model::{ProcessingOpts, ProcessingResult, SourceVideo, SplitMode, Timeline, VideoNode};
pub use engine::EditorEvent;
pub use error::{EditorError, EditorResult};
pub use query::{Query, QueryKind};
