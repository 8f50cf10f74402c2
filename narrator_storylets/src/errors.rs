//! Error types for storylet loading and validation.

use std::path::PathBuf;
use thiserror::Error;

use crate::validation::StoryletValidationError;

/// Errors produced while loading a storylet directory into a [`crate::library::StoryletLibrary`].
#[derive(Debug, Error)]
pub enum StoryletCompileError {
    /// Failed to read a file from disk.
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A file's contents were not valid storylet JSON.
    #[error("json parse error in {path}: {source}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// A storylet failed one or more validation checks.
    #[error("validation failed for '{id}' in {path}: {errors:?}")]
    Validation {
        id: String,
        path: PathBuf,
        errors: Vec<StoryletValidationError>,
    },
    /// The same storylet id appeared in two different files.
    #[error("duplicate storylet id '{id}': first seen in {first_path}, duplicate in {duplicate_path}")]
    DuplicateId {
        id: String,
        first_path: PathBuf,
        duplicate_path: PathBuf,
    },
    /// A `requires_fired`/`forbids_fired` reference names an id absent from the library.
    #[error("storylet '{from_id}' references unknown storylet id '{missing_id}'")]
    DanglingReference { from_id: String, missing_id: String },
    /// The directory contained no `.json` files.
    #[error("no storylet files found in {dir}")]
    NoStorylets { dir: PathBuf },
}
