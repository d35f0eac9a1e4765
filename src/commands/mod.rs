use crate::processor::models::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI for converting FLAC+CUE and MP3 audiobook rips into M4B audiobooks
/// with chapter markers.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Process(ProcessCommand),
    CombineCue(CombineCueCommand),
}

/// Runs the full workflow: merge the audio, derive chapters and produce
/// the final audiobook file.
#[derive(Parser, Debug, Clone)]
pub struct ProcessCommand {
    /// Directory containing the audiobook rip (FLAC+CUE discs or
    /// chapter-named MP3 files)
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Directory for output files
    #[arg(long, short = 'o', value_name = "OUTPUT_DIR", default_value = "./out")]
    pub output_dir: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::M4bFfmpeg)]
    pub format: OutputFormat,

    /// AAC bitrate
    #[arg(long, default_value = "64k")]
    pub bitrate: String,

    /// Output channel count (1 = mono, fine for spoken word)
    #[arg(long, default_value_t = 1)]
    pub channels: u32,

    /// Output sample rate in Hz
    #[arg(long, default_value_t = 44100)]
    pub sample_rate: u32,

    /// Audiobook title
    #[arg(long)]
    pub title: Option<String>,

    /// Audiobook author/narrator
    #[arg(long)]
    pub artist: Option<String>,

    /// Cover art image to embed
    #[arg(long, value_name = "IMAGE")]
    pub cover: Option<PathBuf>,

    /// List the files that would be processed, then exit
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

/// Combines per-disc CUE sheets into a single renumbered, offset-adjusted
/// sheet without touching the audio.
#[derive(Parser, Debug, Clone)]
pub struct CombineCueCommand {
    /// Directory containing the per-disc CUE sheets (CD1, CD2, ...)
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Directory for the combined CUE file
    #[arg(long, short = 'o', value_name = "OUTPUT_DIR", default_value = "./out")]
    pub output_dir: PathBuf,
}
