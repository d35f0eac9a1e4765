//! The end-to-end audiobook workflow: discover inputs, merge audio,
//! derive the chapter timeline, convert and mux the final M4B.

use crate::audio::probe::{DurationProbe, FfprobeDuration};
use crate::audio::{
    convert_to_aac, create_m4b, create_m4b_mp4box, extract_cover_art, merge_flac_files,
    merge_mp3_files,
};
use crate::chapters;
use crate::chapters::models::ChapterFormat;
use crate::cue;
use crate::processor::error::{ProcessorError, ProcessorResult};
use crate::processor::models::{OutputFormat, ProcessingOptions};
use crate::util::fs::find_files_with_extension;
use indicatif::{MultiProgress, ProgressBar};
use log::{debug, info, warn};
use std::path::PathBuf;
use tokio::fs;

pub mod error;
pub mod models;

pub struct AudiobookProcessor {
    options: ProcessingOptions,
}

impl AudiobookProcessor {
    pub fn new(options: ProcessingOptions) -> Self {
        Self { options }
    }

    /// Finds the input audio files in playback order: disc-tagged FLAC
    /// rips first, MP3 chapter files as the fallback.
    pub async fn find_audio_files(&self) -> ProcessorResult<Vec<PathBuf>> {
        let flac_files = find_files_with_extension(&self.options.input_dir, "flac").await?;

        let mut discs: Vec<_> = flac_files
            .into_iter()
            .filter_map(|file| Some((cue::disc_number(&file).ok()?, file)))
            .collect();

        if !discs.is_empty() {
            discs.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
            return Ok(discs.into_iter().map(|(_, file)| file).collect());
        }

        let mut mp3_files = find_files_with_extension(&self.options.input_dir, "mp3").await?;

        if mp3_files.is_empty() {
            return Err(ProcessorError::NoAudioFilesFound(
                self.options.input_dir.clone(),
            ));
        }

        chapters::sort_into_playback_order(&mut mp3_files);

        Ok(mp3_files)
    }

    pub async fn process(&self, progress: &MultiProgress) -> ProcessorResult<PathBuf> {
        info!("Starting audiobook processing...");
        fs::create_dir_all(&self.options.output_dir).await?;

        let audio_files = self.find_audio_files().await?;
        let is_mp3 = audio_files[0]
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"));

        info!(
            "Found {} {} files",
            audio_files.len(),
            if is_mp3 { "MP3" } else { "FLAC" }
        );
        for (position, file) in audio_files.iter().enumerate() {
            info!("{}. {:?}", position + 1, file);
        }

        if self.options.dry_run {
            info!("Dry run complete. No files were processed.");
            return Ok(self.options.output_dir.clone());
        }

        let probe = FfprobeDuration::new();
        let bar = progress.add(ProgressBar::new(4));

        let (combined_audio, timeline) = if is_mp3 {
            let combined = self.options.output_dir.join("combined.mp3");
            info!("Merging MP3 files...");
            merge_mp3_files(&audio_files, &combined).await?;
            bar.inc(1);

            info!("Processing chapter information from filenames...");
            let timeline = chapters::extract_from_filenames(&audio_files, &probe).await?;
            (combined, timeline)
        } else {
            let combined = self.options.output_dir.join("combined.flac");
            info!("Merging FLAC files...");
            merge_flac_files(&audio_files, &combined).await?;
            bar.inc(1);

            info!("Processing CUE sheets...");
            let combined_cue_path =
                cue::process_directory(&self.options.input_dir, &self.options.output_dir, &probe)
                    .await?;
            let combined_cue = fs::read_to_string(&combined_cue_path).await?;

            let total_duration = probe.duration_secs(&combined).await?;
            let timeline = chapters::timeline_from_combined_cue(&combined_cue, total_duration);
            (combined, timeline)
        };
        bar.inc(1);

        let chapter_format = match self.options.output_format {
            OutputFormat::M4bMp4box => ChapterFormat::Mp4Box,
            _ => ChapterFormat::FfMetadata,
        };
        let chapters_file = self.options.output_dir.join("chapters.txt");
        fs::write(&chapters_file, chapters::render(&timeline, chapter_format)).await?;
        info!("Wrote {} chapters", timeline.len());

        if self.options.output_format == OutputFormat::Aac {
            info!("Converting to AAC...");
            let output_file = self.options.output_dir.join("audiobook.aac");
            convert_to_aac(&combined_audio, &output_file, &self.options.audio_config).await?;
            bar.finish_and_clear();
            return Ok(output_file);
        }

        info!("Converting to AAC...");
        let aac_file = self.options.output_dir.join("audiobook.aac");
        convert_to_aac(&combined_audio, &aac_file, &self.options.audio_config).await?;
        bar.inc(1);

        info!("Creating M4B...");
        let output_file = self.options.output_dir.join("audiobook.m4b");

        if !self.options.metadata.has_required_metadata() {
            warn!("Title or artist missing; the M4B will carry incomplete tags");
        }

        match self.options.output_format {
            OutputFormat::M4bFfmpeg => {
                let mut metadata = self.options.metadata.clone();
                metadata.cover_art = self.resolve_cover_art(&combined_audio).await;

                create_m4b(&aac_file, &output_file, &metadata, Some(&chapters_file)).await?;
            }
            OutputFormat::M4bMp4box => {
                create_m4b_mp4box(&aac_file, &output_file, Some(&chapters_file)).await?;
            }
            OutputFormat::Aac => unreachable!(),
        }

        bar.finish_and_clear();
        Ok(output_file)
    }

    /// An explicit cover image wins; otherwise try to salvage art embedded
    /// in the merged audio. No art at all is fine.
    async fn resolve_cover_art(&self, combined_audio: &std::path::Path) -> Option<PathBuf> {
        if let Some(cover) = &self.options.metadata.cover_art {
            return Some(cover.clone());
        }

        let extracted = self.options.output_dir.join("cover.jpg");

        match extract_cover_art(combined_audio, &extracted).await {
            Ok(()) => {
                info!("Using cover art embedded in the source audio");
                Some(extracted)
            }
            Err(err) => {
                debug!("No embedded cover art: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioConfig;
    use crate::processor::models::AudiobookMetadata;

    fn options_for(input_dir: &std::path::Path) -> ProcessingOptions {
        ProcessingOptions {
            input_dir: input_dir.to_path_buf(),
            output_dir: input_dir.join("out"),
            output_format: OutputFormat::M4bFfmpeg,
            audio_config: AudioConfig::default(),
            metadata: AudiobookMetadata::default(),
            dry_run: true,
        }
    }

    #[tokio::test]
    async fn finds_flac_discs_in_disc_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["Book CD2.flac", "Book CD10.flac", "Book CD1.flac"] {
            std::fs::write(dir.path().join(name), b"fLaC").unwrap();
        }

        let processor = AudiobookProcessor::new(options_for(dir.path()));
        let files = processor.find_audio_files().await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_str().unwrap().to_string())
            .collect();

        assert_eq!(names, ["Book CD1.flac", "Book CD2.flac", "Book CD10.flac"]);
    }

    #[tokio::test]
    async fn falls_back_to_mp3_files_in_playback_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "Book - 02 - Chapter 2.mp3",
            "Book - 01 - Chapter 1.mp3",
            "Book - 10 - Chapter 7.mp3",
        ] {
            std::fs::write(dir.path().join(name), [0x49, 0x44, 0x33]).unwrap();
        }

        let processor = AudiobookProcessor::new(options_for(dir.path()));
        let files = processor.find_audio_files().await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_str().unwrap().to_string())
            .collect();

        assert_eq!(
            names,
            [
                "Book - 01 - Chapter 1.mp3",
                "Book - 02 - Chapter 2.mp3",
                "Book - 10 - Chapter 7.mp3",
            ]
        );
    }

    #[tokio::test]
    async fn explicit_cover_art_wins_over_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = options_for(dir.path());
        options.metadata.cover_art = Some(PathBuf::from("cover.png"));

        let processor = AudiobookProcessor::new(options);
        let resolved = processor
            .resolve_cover_art(std::path::Path::new("combined.flac"))
            .await;

        assert_eq!(resolved, Some(PathBuf::from("cover.png")));
    }

    #[tokio::test]
    async fn empty_input_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let processor = AudiobookProcessor::new(options_for(dir.path()));

        assert!(matches!(
            processor.find_audio_files().await,
            Err(ProcessorError::NoAudioFilesFound(_))
        ));
    }
}
