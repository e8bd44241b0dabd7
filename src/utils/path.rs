//! Path helpers for building transcoder input and output locations

use std::path::Path;

use crate::domain::errors::ValidationError;
use crate::domain::model::ProcessingOpts;

/// Path utilities shared by the query recipes and the editor
pub struct PathUtils;

impl PathUtils {
    /// `dir/filename+format`, e.g. `out` + `clip` + `.mp4` → `out/clip.mp4`
    pub fn join_file(dir: &str, filename: &str, format: &str) -> String {
        Path::new(dir)
            .join(format!("{}{}", filename, format))
            .to_string_lossy()
            .into_owned()
    }

    /// Full path of the source file described by the options
    pub fn input_file(opts: &ProcessingOpts) -> String {
        Self::join_file(&opts.input_path, &opts.filename, &opts.video_format)
    }

    /// Full path of the produced file described by the options
    pub fn output_file(opts: &ProcessingOpts) -> String {
        Self::join_file(&opts.output_path, &opts.filename, &opts.video_format)
    }

    /// Split a path into its file stem and dotted extension
    pub fn name_and_extension(path: &Path) -> Result<(String, String), ValidationError> {
        let invalid = || ValidationError::InvalidFileName(path.to_string_lossy().into_owned());

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .ok_or_else(invalid)?;
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .filter(|e| !e.is_empty())
            .ok_or_else(invalid)?;

        Ok((stem, format!(".{}", extension)))
    }

    /// Parent directory as a string; `.` for a bare file name
    pub fn parent_dir(path: &Path) -> String {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_string_lossy().into_owned(),
            _ => ".".to_string(),
        }
    }
}
