use crate::cue::timecode::Timecode;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One parsed CUE file.
#[derive(Debug, Clone)]
pub struct CueSheet {
    pub path: PathBuf,
    /// The audio filename exactly as written in the FILE directive,
    /// never resolved against the filesystem.
    pub audio_file: String,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone)]
pub struct Track {
    /// Track number as printed in the source sheet; not necessarily
    /// contiguous across discs.
    pub number: u32,
    pub title: Option<String>,
    pub performer: Option<String>,
    pub index: BTreeMap<u32, Timecode>,
}

impl Track {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            title: None,
            performer: None,
            index: BTreeMap::new(),
        }
    }
}
