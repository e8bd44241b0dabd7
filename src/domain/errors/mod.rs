// Domain errors - Error types for the domain layer

use thiserror::Error;

/// Timeline position and cut-range failures. The timeline is left unchanged
/// whenever one of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimelineError {
    /// Position outside the accepted range for the operation
    #[error("position {position} is out of range for a timeline of {len} nodes")]
    OutOfRange { position: usize, len: usize },

    /// Operation needs at least one node
    #[error("the timeline has no video nodes")]
    EmptyTimeline,

    /// Split bounds violate the guard band
    #[error("invalid cut range {start:.4}..{end:.4} for node spanning {node_start:.4}..{node_end:.4}")]
    InvalidCutRange {
        node_start: f64,
        node_end: f64,
        start: f64,
        end: f64,
    },
}

/// Required-field and shape violations found before a command is rendered.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A processing option the recipe needs is empty
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Concatenation was asked for with no nodes
    #[error("no video nodes were provided")]
    NoNodesProvided,

    /// Wrong number of distinct inputs
    #[error("expected {expected} input(s), found {found}")]
    InputCount { expected: usize, found: usize },

    /// Wrong number of outputs
    #[error("expected {expected} output(s), found {found}")]
    OutputCount { expected: usize, found: usize },

    /// Computed clip duration below zero
    #[error("clip duration cannot be negative ({0:.4}s)")]
    NegativeDuration(f64),

    /// Recipe must stream-copy but another codec was set
    #[error("codec must be 'copy', got '{0}'")]
    CodecMustBeCopy(String),

    /// File extension is not a supported video container
    #[error("unsupported video extension: {0}")]
    UnsupportedExtension(String),

    /// Path has no usable file stem or extension
    #[error("invalid file name: {0}")]
    InvalidFileName(String),

    /// Option value carries characters the transcoder line cannot hold
    #[error("{field} contains unsupported characters: '{value}'")]
    UnsafeValue { field: &'static str, value: String },

    /// A proxy for this source already exists
    #[error("proxy already exists: {0}")]
    ProxyExists(String),
}
