// Domain rules - Business logic and policies

use crate::domain::errors::ValidationError;
use crate::domain::model::{SplitMode, GUARD_BAND};

/// Container extensions accepted on import
pub const VALID_VIDEO_EXTENSIONS: &[&str] = &[
    ".mov", ".mkv", ".mp4", ".m4v", ".mp4v", ".avi", ".wmv", ".flv", ".h264", ".hevc", ".3gp",
    ".3g2", ".ogv", ".264", ".265", ".webm",
];

/// Guard-band rules for splitting one interval into several
pub struct SplitPlanner;

impl SplitPlanner {
    /// Compute the intervals a split of `[node_start, node_end]` yields.
    ///
    /// Returns `None` when the requested bounds leave no room for the guard
    /// band on the sides that need it.
    pub fn plan(
        mode: SplitMode,
        node_start: f64,
        node_end: f64,
        start: f64,
        end: f64,
    ) -> Option<Vec<(f64, f64)>> {
        match mode {
            SplitMode::SliceCut => {
                let tail_start = end + GUARD_BAND;
                if end > node_start && tail_start < node_end {
                    Some(vec![(start, end), (tail_start, node_end)])
                } else {
                    None
                }
            }
            SplitMode::IntervalCut => {
                let head_end = start - GUARD_BAND;
                let tail_start = end + GUARD_BAND;
                if head_end > node_start && tail_start < node_end {
                    Some(vec![(node_start, head_end), (start, end), (tail_start, node_end)])
                } else {
                    None
                }
            }
        }
    }
}

/// Policy for source files brought into a project
pub struct ImportPolicy;

impl ImportPolicy {
    /// Check an extension (with leading dot) against the supported list
    pub fn is_supported_extension(extension: &str) -> bool {
        let lowered = extension.to_ascii_lowercase();
        VALID_VIDEO_EXTENSIONS.contains(&lowered.as_str())
    }

    /// Reject unsupported containers before any work is scheduled
    pub fn validate_extension(extension: &str) -> Result<(), ValidationError> {
        if Self::is_supported_extension(extension) {
            Ok(())
        } else {
            Err(ValidationError::UnsupportedExtension(extension.to_string()))
        }
    }
}
