use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to probe audio file: {0}")]
    ProbeFailed(PathBuf),

    #[error("Could not read a duration from the probe output for: {0}")]
    InvalidProbeOutput(PathBuf),

    #[error("Probing {path} did not finish within {seconds}s")]
    ProbeTimeout { path: PathBuf, seconds: u64 },

    #[error("{tool} failed: {stderr}")]
    ToolFailed { tool: String, stderr: String },
}

pub type AudioResult<T> = Result<T, AudioError>;
