use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    static ref DISC_RE: Regex = Regex::new(r"(?i)CD(\d+)").unwrap();
}

/// Extracts the disc ordinal from a `CD<n>` token anywhere in the path,
/// directory or filename, upper- or lowercase.
pub fn disc_ordinal(path: &Path) -> Option<u32> {
    DISC_RE
        .captures(&path.to_string_lossy())
        .and_then(|captures| captures[1].parse().ok())
}
