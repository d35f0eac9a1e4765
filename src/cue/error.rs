use crate::audio::error::AudioError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CueError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    AudioError(#[from] AudioError),

    #[error("Invalid timecode: {0}")]
    InvalidTimecode(String),

    #[error("Invalid encoding in CUE file: {0}")]
    InvalidEncoding(PathBuf),

    #[error("No FILE directive found in: {0}")]
    MissingFileDirective(PathBuf),

    #[error("Unparsable FILE directive in {path}: {line}")]
    InvalidFileDirective { path: PathBuf, line: String },

    #[error("No CUE files found in: {0}")]
    NoCueSheetsFound(PathBuf),

    #[error("No CD number found in CUE file path: {0}")]
    MissingDiscNumber(PathBuf),

    #[error("No CUE sheets were given to combine")]
    EmptySheetSet,
}

pub type CueResult<T> = Result<T, CueError>;
