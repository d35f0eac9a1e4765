use crate::audio::error::AudioError;
use crate::chapters::error::ChapterError;
use crate::cue::error::CueError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    CueError(#[from] CueError),

    #[error(transparent)]
    ChapterError(#[from] ChapterError),

    #[error(transparent)]
    AudioError(#[from] AudioError),

    #[error("No valid FLAC or MP3 files found in {0}")]
    NoAudioFilesFound(PathBuf),
}

pub type ProcessorResult<T> = Result<T, ProcessorError>;
