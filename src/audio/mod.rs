//! Wrappers around the external tools (ffmpeg, sox, MP4Box) that do the
//! actual audio work. Nothing in this crate decodes or encodes audio itself.

use crate::audio::error::{AudioError, AudioResult};
use crate::processor::models::AudiobookMetadata;
use log::debug;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::fs;
use tokio::process::Command;

pub mod error;
pub mod probe;

/// Encoder settings for the AAC conversion step.
#[derive(Debug, Clone)]
pub struct AudioConfig {
    pub bitrate: String,
    pub channels: u32,
    pub sample_rate: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        // Mono 64k is plenty for spoken word
        Self {
            bitrate: "64k".to_string(),
            channels: 1,
            sample_rate: 44100,
        }
    }
}

async fn run_tool(tool: &str, command: &mut Command) -> AudioResult<Output> {
    let output = command.output().await?;

    if !output.status.success() {
        return Err(AudioError::ToolFailed {
            tool: tool.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    Ok(output)
}

/// Merges FLAC files losslessly with sox, in the given order.
pub async fn merge_flac_files(input_files: &[PathBuf], output_file: &Path) -> AudioResult<()> {
    debug!("Merging {} FLAC files with sox", input_files.len());

    let mut command = Command::new("sox");
    command.args(input_files).arg(output_file);

    run_tool("sox", &mut command).await?;

    Ok(())
}

/// Merges MP3 files without re-encoding via the ffmpeg concat demuxer.
pub async fn merge_mp3_files(input_files: &[PathBuf], output_file: &Path) -> AudioResult<()> {
    debug!("Merging {} MP3 files with ffmpeg", input_files.len());

    let list_path = output_file.with_file_name("concat.txt");
    let mut list = String::new();

    for file in input_files {
        list.push_str(&format!("file '{}'\n", file.display()));
    }

    fs::write(&list_path, list).await?;

    let mut command = Command::new("ffmpeg");
    command
        .args(["-f", "concat", "-safe", "0", "-i"])
        .arg(&list_path)
        .args(["-c", "copy", "-y"])
        .arg(output_file);

    run_tool("ffmpeg", &mut command).await?;

    Ok(())
}

/// Converts an audio file to AAC with ffmpeg.
pub async fn convert_to_aac(
    input_file: &Path,
    output_file: &Path,
    config: &AudioConfig,
) -> AudioResult<()> {
    let mut command = Command::new("ffmpeg");
    command
        .arg("-i")
        .arg(input_file)
        .args(["-c:a", "aac", "-b:a", &config.bitrate])
        .args(["-ac", &config.channels.to_string()])
        .args(["-ar", &config.sample_rate.to_string()])
        .arg("-y")
        .arg(output_file);

    run_tool("ffmpeg", &mut command).await?;

    Ok(())
}

/// Muxes an AAC stream into an M4B container with ffmpeg, attaching
/// metadata, optional cover art and an optional chapters file.
pub async fn create_m4b(
    input_file: &Path,
    output_file: &Path,
    metadata: &AudiobookMetadata,
    chapters_file: Option<&Path>,
) -> AudioResult<()> {
    let mut command = Command::new("ffmpeg");
    command.arg("-i").arg(input_file);

    if let Some(cover_art) = &metadata.cover_art {
        command
            .arg("-i")
            .arg(cover_art)
            .args(["-map", "0:a", "-map", "1:v"]);
    }

    if let Some(chapters) = chapters_file {
        command.arg("-i").arg(chapters).args(["-map_metadata", "1"]);
    }

    if let Some(title) = &metadata.title {
        command.arg("-metadata").arg(format!("title={title}"));
    }

    if let Some(artist) = &metadata.artist {
        command.arg("-metadata").arg(format!("artist={artist}"));
    }

    command.args(["-c:a", "copy"]);

    if metadata.cover_art.is_some() {
        command.args(["-c:v", "copy"]);
    }

    command.args(["-f", "mp4", "-y"]).arg(output_file);

    run_tool("ffmpeg", &mut command).await?;

    Ok(())
}

/// Muxes an AAC stream into an M4B container with MP4Box. The chapters
/// file must be in MP4Box's line-based format.
pub async fn create_m4b_mp4box(
    input_file: &Path,
    output_file: &Path,
    chapters_file: Option<&Path>,
) -> AudioResult<()> {
    let mut command = Command::new("MP4Box");
    command.arg("-add").arg(input_file);

    if let Some(chapters) = chapters_file {
        command.arg("-chap").arg(chapters);
    }

    command.arg(output_file);

    run_tool("MP4Box", &mut command).await?;

    Ok(())
}

/// Extracts embedded cover art from an audio file with ffmpeg.
pub async fn extract_cover_art(input_file: &Path, output_file: &Path) -> AudioResult<()> {
    let mut command = Command::new("ffmpeg");
    command
        .arg("-i")
        .arg(input_file)
        .args(["-an", "-vcodec", "copy", "-y"])
        .arg(output_file);

    run_tool("ffmpeg", &mut command).await?;

    Ok(())
}
