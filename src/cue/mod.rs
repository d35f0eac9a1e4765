//! CUE sheet parsing and multi-disc combination.
//!
//! A multi-disc rip ships one CUE sheet per disc, each with timestamps
//! relative to its own disc. Combining renumbers the tracks sequentially
//! and shifts every index by the summed duration of the preceding discs,
//! producing one sheet that matches the merged audio file.

use crate::audio::probe::DurationProbe;
use crate::cue::error::{CueError, CueResult};
use crate::cue::models::{CueSheet, Track};
use crate::cue::timecode::Timecode;
use crate::util::disc::disc_ordinal;
use crate::util::fs::find_files_with_extension;
use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;
use std::path::{Path, PathBuf};

pub mod error;
pub mod models;
pub mod timecode;

lazy_static! {
    static ref FILE_RE: Regex = Regex::new(r#"FILE\s+"([^"]+)""#).unwrap();
    static ref TRACK_RE: Regex = Regex::new(r"TRACK\s+(\d+)\s+AUDIO").unwrap();
    static ref TITLE_RE: Regex = Regex::new(r#"TITLE\s+"([^"]+)""#).unwrap();
    static ref PERFORMER_RE: Regex = Regex::new(r#"PERFORMER\s+"([^"]+)""#).unwrap();
    static ref INDEX_RE: Regex = Regex::new(r"INDEX\s+(\d+)\s+(\d{2}:\d{2}:\d{2})").unwrap();
}

pub struct CueParser {
    cue_path: PathBuf,
}

impl CueParser {
    pub fn new(cue_path: impl AsRef<Path>) -> Self {
        Self {
            cue_path: cue_path.as_ref().to_path_buf(),
        }
    }

    pub async fn parse(&self) -> CueResult<CueSheet> {
        let data = tokio::fs::read(&self.cue_path).await?;
        let text = String::from_utf8(data)
            .map_err(|_| CueError::InvalidEncoding(self.cue_path.clone()))?;

        self.parse_text(&text)
    }

    pub fn parse_text(&self, text: &str) -> CueResult<CueSheet> {
        let audio_file = self.extract_audio_file(text)?;

        let mut tracks = Vec::new();
        let mut current_track: Option<Track> = None;

        for line in text.lines() {
            let line = line.trim();

            if line.starts_with("TRACK") {
                // Non-AUDIO tracks fall through and are ignored
                if let Some(captures) = TRACK_RE.captures(line)
                    && let Ok(number) = captures[1].parse()
                {
                    if let Some(track) = current_track.take() {
                        tracks.push(track);
                    }

                    current_track = Some(Track::new(number));
                }
            } else if let Some(track) = &mut current_track {
                if line.starts_with("TITLE") {
                    if let Some(captures) = TITLE_RE.captures(line) {
                        track.title = Some(captures[1].to_string());
                    }
                } else if line.starts_with("PERFORMER") {
                    if let Some(captures) = PERFORMER_RE.captures(line) {
                        track.performer = Some(captures[1].to_string());
                    }
                } else if line.starts_with("INDEX") {
                    // Index lines that do not match the pattern are
                    // ignored; an out-of-range timecode is a hard error
                    if let Some(captures) = INDEX_RE.captures(line)
                        && let Ok(number) = captures[1].parse()
                    {
                        let timecode: Timecode = captures[2].parse()?;
                        track.index.insert(number, timecode);
                    }
                }
            }
        }

        if let Some(track) = current_track {
            tracks.push(track);
        }

        Ok(CueSheet {
            path: self.cue_path.clone(),
            audio_file,
            tracks,
        })
    }

    fn extract_audio_file(&self, text: &str) -> CueResult<String> {
        let file_line = text
            .lines()
            .map(str::trim)
            .find(|line| line.starts_with("FILE"))
            .ok_or_else(|| CueError::MissingFileDirective(self.cue_path.clone()))?;

        let captures = FILE_RE
            .captures(file_line)
            .ok_or_else(|| CueError::InvalidFileDirective {
                path: self.cue_path.clone(),
                line: file_line.to_string(),
            })?;

        Ok(captures[1].to_string())
    }
}

/// Extracts the disc ordinal from a `CD<n>` token in the path.
pub fn disc_number(path: &Path) -> CueResult<u32> {
    disc_ordinal(path).ok_or_else(|| CueError::MissingDiscNumber(path.to_path_buf()))
}

/// Finds all CUE sheets under `dir` and orders them by disc number.
///
/// Every sheet must carry a disc token, otherwise the combine order would
/// be undefined. Equal ordinals are tie-broken by path so a run is
/// deterministic either way.
pub async fn find_cue_sheets(dir: &Path) -> CueResult<Vec<PathBuf>> {
    let files = find_files_with_extension(dir, "cue").await?;

    if files.is_empty() {
        return Err(CueError::NoCueSheetsFound(dir.to_path_buf()));
    }

    let mut keyed = files
        .into_iter()
        .map(|path| Ok((disc_number(&path)?, path)))
        .collect::<CueResult<Vec<_>>>()?;

    keyed.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    Ok(keyed.into_iter().map(|(_, path)| path).collect())
}

/// Combines ordered per-disc sheets into one renumbered, offset-adjusted
/// sheet, returned as directive text.
///
/// Each sheet's audio file is probed exactly once, after its tracks are
/// emitted, in a single left-to-right pass.
pub async fn combine_cue_sheets<P: DurationProbe>(
    sheets: &[CueSheet],
    probe: &P,
) -> CueResult<String> {
    if sheets.is_empty() {
        return Err(CueError::EmptySheetSet);
    }

    let mut lines = Vec::new();
    let mut cumulative_offset = 0.0;
    let mut track_number = 1u32;

    for sheet in sheets {
        info!("Processing CUE file: {:?}", sheet.path);

        lines.push(format!("FILE \"{}\" WAVE", sheet.audio_file));

        for track in &sheet.tracks {
            lines.push(format!("  TRACK {track_number:02} AUDIO"));

            if let Some(title) = &track.title {
                lines.push(format!("    TITLE \"{title}\""));
            }

            if let Some(performer) = &track.performer {
                lines.push(format!("    PERFORMER \"{performer}\""));
            }

            for (index_number, timecode) in &track.index {
                let adjusted = Timecode::from_seconds(timecode.to_seconds() + cumulative_offset);
                lines.push(format!("    INDEX {index_number:02} {adjusted}"));
            }

            track_number += 1;
        }

        let sheet_dir = sheet.path.parent().unwrap_or(Path::new("."));
        let audio_path = sheet_dir.join(&sheet.audio_file);
        let duration = probe.duration_secs(&audio_path).await?;

        debug!("Disc {:?} runs {duration:.3}s", sheet.path);
        cumulative_offset += duration;
    }

    Ok(lines.join("\n"))
}

/// Finds, parses and combines every CUE sheet under `base_dir`, writing
/// the result to `output_dir/combined.cue`.
pub async fn process_directory<P: DurationProbe>(
    base_dir: &Path,
    output_dir: &Path,
    probe: &P,
) -> CueResult<PathBuf> {
    let cue_paths = find_cue_sheets(base_dir).await?;

    let mut sheets = Vec::with_capacity(cue_paths.len());
    for path in &cue_paths {
        sheets.push(CueParser::new(path).parse().await?);
    }

    let combined = combine_cue_sheets(&sheets, probe).await?;

    tokio::fs::create_dir_all(output_dir).await?;
    let output_file = output_dir.join("combined.cue");
    tokio::fs::write(&output_file, combined).await?;

    Ok(output_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::error::{AudioError, AudioResult};
    use std::collections::HashMap;
    use std::io::Write;

    struct FixedDurations(HashMap<String, f64>);

    impl DurationProbe for FixedDurations {
        async fn duration_secs(&self, path: &Path) -> AudioResult<f64> {
            let name = path.file_name().unwrap().to_str().unwrap();
            self.0
                .get(name)
                .copied()
                .ok_or_else(|| AudioError::ProbeFailed(path.to_path_buf()))
        }
    }

    fn sheet_from(text: &str, path: &str) -> CueSheet {
        CueParser::new(path).parse_text(text).unwrap()
    }

    const DISC_ONE: &str = r#"FILE "disc1.flac" WAVE
  TRACK 01 AUDIO
    TITLE "Chapter 1"
    PERFORMER "Narrator"
    INDEX 01 00:00:00
  TRACK 02 AUDIO
    TITLE "Chapter 2"
    INDEX 01 12:34:56
"#;

    #[test]
    fn parses_file_directive_and_tracks() {
        let sheet = sheet_from(DISC_ONE, "CD1/disc1.cue");

        assert_eq!(sheet.audio_file, "disc1.flac");
        assert_eq!(sheet.tracks.len(), 2);
        assert_eq!(sheet.tracks[0].number, 1);
        assert_eq!(sheet.tracks[0].title.as_deref(), Some("Chapter 1"));
        assert_eq!(sheet.tracks[0].performer.as_deref(), Some("Narrator"));
        assert_eq!(sheet.tracks[1].title.as_deref(), Some("Chapter 2"));
        assert_eq!(sheet.tracks[1].performer, None);
        assert_eq!(
            sheet.tracks[1].index[&1],
            "12:34:56".parse::<Timecode>().unwrap()
        );
    }

    #[test]
    fn missing_file_directive_is_fatal() {
        let result = CueParser::new("broken.cue").parse_text("TRACK 01 AUDIO\n");
        assert!(matches!(result, Err(CueError::MissingFileDirective(_))));
    }

    #[test]
    fn malformed_index_lines_are_skipped() {
        let text = r#"FILE "disc1.flac" WAVE
  TRACK 01 AUDIO
    INDEX xx garbage
    INDEX 01 00:10:00
"#;
        let sheet = sheet_from(text, "CD1/disc1.cue");
        assert_eq!(sheet.tracks[0].index.len(), 1);
    }

    #[test]
    fn title_outside_any_track_is_ignored() {
        let text = r#"TITLE "The Book"
FILE "disc1.flac" WAVE
  TRACK 01 AUDIO
    TITLE "Chapter 1"
    INDEX 01 00:00:00
"#;
        let sheet = sheet_from(text, "CD1/disc1.cue");
        assert_eq!(sheet.tracks.len(), 1);
        assert_eq!(sheet.tracks[0].title.as_deref(), Some("Chapter 1"));
    }

    #[tokio::test]
    async fn parse_rejects_non_utf8_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CD1.cue");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&[0xff, 0xfe, 0x00, 0xd8]).unwrap();

        let result = CueParser::new(&path).parse().await;
        assert!(matches!(result, Err(CueError::InvalidEncoding(_))));
    }

    #[test]
    fn disc_number_from_directory_or_filename() {
        assert_eq!(disc_number(Path::new("book/CD1/disc.cue")).unwrap(), 1);
        assert_eq!(disc_number(Path::new("book/Book CD12.cue")).unwrap(), 12);
        assert_eq!(disc_number(Path::new("book/cd3/disc.cue")).unwrap(), 3);
        assert!(matches!(
            disc_number(Path::new("book/disc.cue")),
            Err(CueError::MissingDiscNumber(_))
        ));
    }

    #[tokio::test]
    async fn cue_sheets_are_ordered_by_disc_number() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["CD10.cue", "CD2.cue", "CD1.cue"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }

        let sheets = find_cue_sheets(dir.path()).await.unwrap();
        let names: Vec<_> = sheets
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();

        assert_eq!(names, ["CD1.cue", "CD2.cue", "CD10.cue"]);
    }

    #[tokio::test]
    async fn empty_directory_reports_the_scanned_path() {
        let dir = tempfile::tempdir().unwrap();
        let result = find_cue_sheets(dir.path()).await;

        match result {
            Err(CueError::NoCueSheetsFound(reported)) => assert_eq!(reported, dir.path()),
            other => panic!("expected NoCueSheetsFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn untagged_sheet_aborts_the_ordering() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("CD1.cue"), "").unwrap();
        std::fs::write(dir.path().join("bonus.cue"), "").unwrap();

        assert!(matches!(
            find_cue_sheets(dir.path()).await,
            Err(CueError::MissingDiscNumber(_))
        ));
    }

    #[tokio::test]
    async fn combining_offsets_second_disc_by_first_disc_duration() {
        let disc2 = r#"FILE "disc2.flac" WAVE
  TRACK 01 AUDIO
    TITLE "Chapter 3"
    INDEX 01 00:00:00
"#;
        let sheets = vec![
            sheet_from(DISC_ONE, "CD1/disc1.cue"),
            sheet_from(disc2, "CD2/disc2.cue"),
        ];
        let probe = FixedDurations(HashMap::from([
            ("disc1.flac".to_string(), 300.0),
            ("disc2.flac".to_string(), 120.0),
        ]));

        let combined = combine_cue_sheets(&sheets, &probe).await.unwrap();

        let expected = r#"FILE "disc1.flac" WAVE
  TRACK 01 AUDIO
    TITLE "Chapter 1"
    PERFORMER "Narrator"
    INDEX 01 00:00:00
  TRACK 02 AUDIO
    TITLE "Chapter 2"
    INDEX 01 12:34:56
FILE "disc2.flac" WAVE
  TRACK 03 AUDIO
    TITLE "Chapter 3"
    INDEX 01 05:00:00"#;

        assert_eq!(combined, expected);
    }

    #[tokio::test]
    async fn combining_renumbers_across_source_gaps() {
        let text = r#"FILE "disc1.flac" WAVE
  TRACK 01 AUDIO
    INDEX 01 00:00:00
  TRACK 13 AUDIO
    INDEX 01 01:00:00
"#;
        let sheets = vec![sheet_from(text, "CD1/disc1.cue")];
        let probe = FixedDurations(HashMap::from([("disc1.flac".to_string(), 100.0)]));

        let combined = combine_cue_sheets(&sheets, &probe).await.unwrap();

        assert!(combined.contains("TRACK 01 AUDIO"));
        assert!(combined.contains("TRACK 02 AUDIO"));
        assert!(!combined.contains("TRACK 13"));
    }

    #[tokio::test]
    async fn empty_sheet_set_is_rejected() {
        let probe = FixedDurations(HashMap::new());
        assert!(matches!(
            combine_cue_sheets(&[], &probe).await,
            Err(CueError::EmptySheetSet)
        ));
    }

    #[tokio::test]
    async fn probe_failure_aborts_the_combine() {
        let sheets = vec![sheet_from(DISC_ONE, "CD1/disc1.cue")];
        let probe = FixedDurations(HashMap::new());

        assert!(matches!(
            combine_cue_sheets(&sheets, &probe).await,
            Err(CueError::AudioError(AudioError::ProbeFailed(_)))
        ));
    }
}
