//! Marker-bounded fragment extraction.
//!
//! The letters this tool reads carry a fixed contact address just above the
//! recipient block and open the body with "Dear". Everything between the two
//! is the recipient address, preceded by two lines of sender boilerplate.

/// Literal that opens the region of interest.
pub const START_MARKER: &str = "uk_team_gbmailgps@lilly.com";

/// Literal that closes the region of interest.
pub const END_MARKER: &str = "Dear";

/// Bytes skipped past the start of `START_MARKER` before the fragment begins.
pub const START_OFFSET: usize = 5;

/// Leading lines dropped from the fragment when more than this many remain.
const BOILERPLATE_LINES: usize = 2;

/// Byte offsets of the first occurrence of each marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerSpan {
    pub start: usize,
    pub end: usize,
}

/// Why a document produced no fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerMiss {
    StartMissing,
    EndMissing,
    OutOfOrder,
    Empty,
}

impl std::fmt::Display for MarkerMiss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkerMiss::StartMissing => write!(f, "start marker not found"),
            MarkerMiss::EndMissing => write!(f, "end marker '{END_MARKER}' not found"),
            MarkerMiss::OutOfOrder => write!(f, "end marker precedes start marker"),
            MarkerMiss::Empty => write!(f, "no content between markers"),
        }
    }
}

/// Locate both markers, each searched independently from the beginning.
pub fn locate_markers(text: &str) -> Result<MarkerSpan, MarkerMiss> {
    let start = text.find(START_MARKER).ok_or(MarkerMiss::StartMissing)?;
    let end = text.find(END_MARKER).ok_or(MarkerMiss::EndMissing)?;
    if start >= end {
        return Err(MarkerMiss::OutOfOrder);
    }
    Ok(MarkerSpan { start, end })
}

/// Extract the cleaned fragment between the markers, reporting why none was found.
pub fn try_extract_fragment(text: &str) -> Result<String, MarkerMiss> {
    let span = locate_markers(text)?;

    // START_MARKER is ASCII, so start + START_OFFSET is always a char boundary.
    let region = text
        .get(span.start + START_OFFSET..span.end)
        .ok_or(MarkerMiss::Empty)?;

    let lines: Vec<&str> = region
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let kept = if lines.len() > BOILERPLATE_LINES {
        &lines[BOILERPLATE_LINES..]
    } else {
        &lines[..]
    };

    let fragment = kept.join("\n");
    if fragment.is_empty() {
        return Err(MarkerMiss::Empty);
    }
    Ok(fragment)
}

/// Extract the cleaned fragment between the markers, if any.
pub fn extract_fragment(text: &str) -> Option<String> {
    try_extract_fragment(text).ok()
}
