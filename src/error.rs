//! Fatal errors for the scan and move workflow.
//!
//! Anything that only affects one step or one file is reported through the
//! outcome types instead; these variants stop the whole operation.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MoverError {
    #[error("Source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Failed to read source directory {}: {source}", .path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create destination directory {}: {source}", .path.display())]
    DestinationUncreatable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid filename pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type MoverResult<T> = Result<T, MoverError>;
