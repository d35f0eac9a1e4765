//! Chapter timeline derivation and serialization.
//!
//! Timelines come from two sources: a combined CUE sheet (FLAC rips) or
//! the chapter phrases embedded in MP3 filenames. Both end up in the same
//! [`ChapterTimeline`] and are written out by [`render`].

use crate::audio::probe::DurationProbe;
use crate::chapters::error::ChapterResult;
use crate::chapters::models::{Chapter, ChapterFormat, ChapterTimeline};
use crate::util::disc::disc_ordinal;
use lazy_static::lazy_static;
use log::warn;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub mod error;
pub mod models;

lazy_static! {
    static ref CHAPTER_FILE_RE: Regex =
        Regex::new(r"^.*? - (\d+) - (Chapter \d+.*?)\.mp3$").unwrap();
    static ref CUE_TITLE_RE: Regex = Regex::new(r#"TITLE\s+"([^"]+)""#).unwrap();
    static ref CUE_INDEX_RE: Regex = Regex::new(r"INDEX 01 (\d+):(\d+):(\d+)").unwrap();
}

/// Parses the `... - <track> - Chapter <n>[ - <subtitle>]` grammar from a
/// filename. Returns the track number and the chapter phrase.
fn chapter_match(path: &Path) -> Option<(u32, String)> {
    let name = path.file_name()?.to_str()?;
    let captures = CHAPTER_FILE_RE.captures(name)?;
    let track = captures[1].parse().ok()?;

    Some((track, captures[2].to_string()))
}

/// Sorts chapter-named audio files into playback order: by
/// `(disc, track)` when the path carries a `CD<n>` token, by track alone
/// otherwise.
pub fn sort_into_playback_order(files: &mut [PathBuf]) {
    files.sort_by_key(|file| {
        let disc = disc_ordinal(file).unwrap_or(0);
        let track = chapter_match(file).map_or(0, |(track, _)| track);

        (disc, track)
    });
}

fn disambiguate(phrase: &str, occurrences: &mut HashMap<String, u32>) -> String {
    // Introductions are unique by construction and keep their bare title;
    // everything else carries its running occurrence count, first use
    // included
    if phrase.contains("Introduction") {
        return phrase.to_string();
    }

    let count = occurrences.entry(phrase.to_string()).or_insert(0);
    *count += 1;

    format!("{phrase} ({count})")
}

/// Derives a chapter timeline from an ordered list of chapter-named audio
/// files, probing each file's duration.
///
/// Files that do not match the grammar, or whose duration comes back
/// non-positive, are skipped with a warning. Probe failures abort the run:
/// every later chapter's offset would be wrong.
pub async fn extract_from_filenames<P: DurationProbe>(
    files: &[PathBuf],
    probe: &P,
) -> ChapterResult<ChapterTimeline> {
    let mut timeline = ChapterTimeline::new();
    let mut occurrences = HashMap::new();
    let mut current_time = 0.0;

    for file in files {
        let Some((_, phrase)) = chapter_match(file) else {
            warn!("Skipping file without chapter information: {file:?}");
            continue;
        };

        let duration = probe.duration_secs(file).await?;

        if duration <= 0.0 {
            warn!("Skipping file with no usable duration: {file:?}");
            continue;
        }

        timeline.push(Chapter {
            title: disambiguate(&phrase, &mut occurrences),
            start: current_time,
            end: current_time + duration,
        });

        current_time += duration;
    }

    Ok(timeline)
}

/// Builds a timeline from combined CUE text. Each chapter runs until the
/// next one starts; the final chapter runs until `total_duration`, the
/// length of the merged audio.
///
/// Combined sheets can exceed 99 minutes, so index timecodes are parsed
/// here without the strict two-digit gate the per-disc parser applies.
pub fn timeline_from_combined_cue(text: &str, total_duration: f64) -> ChapterTimeline {
    let mut starts: Vec<(f64, String)> = Vec::new();
    let mut current_title: Option<String> = None;

    for line in text.lines() {
        if let Some(captures) = CUE_TITLE_RE.captures(line) {
            current_title = Some(captures[1].to_string());
        } else if let Some(captures) = CUE_INDEX_RE.captures(line)
            && let Some(title) = &current_title
        {
            let minutes: f64 = captures[1].parse().unwrap_or(0.0);
            let seconds: f64 = captures[2].parse().unwrap_or(0.0);
            let frames: f64 = captures[3].parse().unwrap_or(0.0);
            let start = minutes * 60.0 + seconds + frames / 75.0;

            starts.push((start, title.clone()));
        }
    }

    let mut timeline = ChapterTimeline::new();

    for (position, (start, title)) in starts.iter().enumerate() {
        let end = starts
            .get(position + 1)
            .map_or(total_duration, |(next_start, _)| *next_start);

        timeline.push(Chapter {
            title: title.clone(),
            start: *start,
            end,
        });
    }

    timeline
}

fn mp4box_timestamp(seconds: f64) -> String {
    let mut ms = (seconds * 1000.0).round() as u64;
    let hours = ms / 3_600_000;
    ms %= 3_600_000;
    let minutes = ms / 60_000;
    ms %= 60_000;
    let secs = ms / 1000;
    ms %= 1000;

    format!("{hours:02}:{minutes:02}:{secs:02}.{ms:03}")
}

/// Serializes a timeline into the requested chapter metadata text.
///
/// The FFmpeg form is byte-stable: no blank lines, and nothing after the
/// last title line. Downstream parsers have choked on trailing whitespace
/// before.
pub fn render(timeline: &ChapterTimeline, format: ChapterFormat) -> String {
    match format {
        ChapterFormat::FfMetadata => {
            let mut lines = vec![";FFMETADATA1".to_string()];

            for chapter in timeline.chapters() {
                lines.push("[CHAPTER]".to_string());
                lines.push("TIMEBASE=1/1".to_string());
                lines.push(format!("START={}", chapter.start as u64));
                lines.push(format!("END={}", chapter.end as u64));
                lines.push(format!("title={}", chapter.title));
            }

            lines.join("\n")
        }
        ChapterFormat::Mp4Box => {
            let lines: Vec<_> = timeline
                .chapters()
                .iter()
                .map(|chapter| format!("{} {}", mp4box_timestamp(chapter.start), chapter.title))
                .collect();

            lines.join("\n")
        }
    }
}
