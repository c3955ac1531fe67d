use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Header line every WebVTT document starts with
pub const VTT_HEADER: &str = "WEBVTT";

/// Start of the single cue
pub const CUE_START: Duration = Duration::from_millis(0);

/// End of the single cue, far beyond any real media duration (99:59:59.999)
pub const CUE_END: Duration = Duration::from_millis(99 * 3_600_000 + 59 * 60_000 + 59_000 + 999);

/// WebVTT cue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VttCue {
    /// Start timestamp
    pub start: Duration,
    /// End timestamp
    pub end: Duration,
    /// Cue text, kept verbatim
    pub text: String,
}

impl VttCue {
    pub fn new(start: Duration, end: Duration, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

impl fmt::Display for VttCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} --> {}\n{}",
            format_timestamp(self.start),
            format_timestamp(self.end),
            self.text
        )
    }
}

/// Untimed subtitle document: one cue spanning the whole media.
///
/// The transcription request asks for plain text without timestamps, so there
/// is nothing to align against; the full transcript goes into a single cue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleDocument {
    cue: VttCue,
}

impl SubtitleDocument {
    /// Build the document for a transcript
    pub fn from_transcript(text: &str) -> Self {
        Self {
            cue: VttCue::new(CUE_START, CUE_END, text),
        }
    }

    pub fn cue(&self) -> &VttCue {
        &self.cue
    }
}

impl fmt::Display for SubtitleDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n\n{}", VTT_HEADER, self.cue)
    }
}

/// Render a transcript as a single-cue WebVTT document
pub fn to_subtitle(text: &str) -> String {
    SubtitleDocument::from_transcript(text).to_string()
}

/// Format duration as WebVTT timestamp (HH:MM:SS.mmm)
pub fn format_timestamp(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let milliseconds = duration.subsec_millis();

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, milliseconds)
}
