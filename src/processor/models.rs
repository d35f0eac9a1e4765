use crate::audio::AudioConfig;
use clap::ValueEnum;
use std::fmt;
use std::path::PathBuf;

/// Tag-level metadata for the finished audiobook.
#[derive(Debug, Clone, Default)]
pub struct AudiobookMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub cover_art: Option<PathBuf>,
}

impl AudiobookMetadata {
    pub fn has_required_metadata(&self) -> bool {
        self.title.is_some() && self.artist.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// M4B with chapters, muxed by ffmpeg
    M4bFfmpeg,
    /// M4B with chapters, muxed by MP4Box
    M4bMp4box,
    /// Bare AAC audio, no chapters
    Aac,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::M4bFfmpeg => "m4b-ffmpeg",
            Self::M4bMp4box => "m4b-mp4box",
            Self::Aac => "aac",
        };

        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct ProcessingOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub output_format: OutputFormat,
    pub audio_config: AudioConfig,
    pub metadata: AudiobookMetadata,
    pub dry_run: bool,
}
