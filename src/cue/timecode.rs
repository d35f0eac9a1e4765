use crate::cue::error::CueError;
use lazy_static::lazy_static;
use std::fmt;
use std::str::FromStr;

pub const FRAMES_PER_SECOND: u32 = 75;

/// A CD-audio position in MM:SS:FF notation, 75 frames per second.
///
/// Frames are the finest unit the notation can express, so conversion to
/// seconds and back is lossless for any value on a frame boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timecode {
    pub minutes: u32,
    pub seconds: u8,
    pub frames: u8,
}

impl Timecode {
    pub fn to_seconds(self) -> f64 {
        self.minutes as f64 * 60.0 + self.seconds as f64 + self.frames as f64 / FRAMES_PER_SECOND as f64
    }

    /// Rounds to the nearest whole frame and decomposes.
    pub fn from_seconds(seconds: f64) -> Self {
        let total_frames = (seconds * FRAMES_PER_SECOND as f64).round() as u64;
        let frames_per_minute = (FRAMES_PER_SECOND * 60) as u64;

        Self {
            minutes: (total_frames / frames_per_minute) as u32,
            seconds: (total_frames % frames_per_minute / FRAMES_PER_SECOND as u64) as u8,
            frames: (total_frames % FRAMES_PER_SECOND as u64) as u8,
        }
    }
}

impl FromStr for Timecode {
    type Err = CueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        lazy_static! {
            static ref RE: regex::Regex =
                regex::Regex::new(r"^(\d{2}):(\d{2}):(\d{2})$").unwrap();
        }

        let captures = RE
            .captures(value)
            .ok_or_else(|| CueError::InvalidTimecode(value.to_string()))?;

        // The regex guarantees two digits each, so these cannot fail
        let minutes: u32 = captures[1].parse().unwrap();
        let seconds: u8 = captures[2].parse().unwrap();
        let frames: u8 = captures[3].parse().unwrap();

        if seconds >= 60 || frames >= FRAMES_PER_SECOND as u8 {
            return Err(CueError::InvalidTimecode(value.to_string()));
        }

        Ok(Self {
            minutes,
            seconds,
            frames,
        })
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.minutes, self.seconds, self.frames
        )
    }
}
