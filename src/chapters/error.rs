use crate::audio::error::AudioError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChapterError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    AudioError(#[from] AudioError),
}

pub type ChapterResult<T> = Result<T, ChapterError>;
