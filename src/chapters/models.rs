/// One named time range of the output timeline, in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    pub title: String,
    pub start: f64,
    pub end: f64,
}

/// The ordered chapter list handed to the muxer. Chapters are contiguous:
/// each one ends exactly where the next begins, and the last one ends at
/// the total duration of the merged audio.
#[derive(Debug, Clone, Default)]
pub struct ChapterTimeline {
    chapters: Vec<Chapter>,
}

impl ChapterTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chapter: Chapter) {
        self.chapters.push(chapter);
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn total_duration(&self) -> f64 {
        self.chapters.last().map_or(0.0, |chapter| chapter.end)
    }
}

/// On-disk chapter metadata formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterFormat {
    /// FFmpeg metadata with bracketed `[CHAPTER]` blocks. Canonical.
    FfMetadata,
    /// MP4Box's line-based `HH:MM:SS.mmm <title>` format. Kept only for
    /// the MP4Box muxing path.
    Mp4Box,
}
