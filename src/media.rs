//! Uploaded media and the filenames derived from it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Suffix appended to the stem of the plain-text download
pub const TRANSCRIPT_SUFFIX: &str = "_transcricao.txt";

/// Suffix appended to the stem of the subtitle download
pub const SUBTITLE_SUFFIX: &str = "_legendas.vtt";

/// Container/codec extensions accepted for upload
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SupportedFormat {
    Mp4,
    Wav,
    Ogg,
    M4a,
    Webm,
}

impl SupportedFormat {
    pub const ALL: [SupportedFormat; 5] = [
        SupportedFormat::Mp4,
        SupportedFormat::Wav,
        SupportedFormat::Ogg,
        SupportedFormat::M4a,
        SupportedFormat::Webm,
    ];

    /// Resolve the format from a filename's extension (case-insensitive)
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = split_extension(filename);
        let ext = ext.strip_prefix('.')?.to_ascii_lowercase();
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SupportedFormat::Mp4 => "mp4",
            SupportedFormat::Wav => "wav",
            SupportedFormat::Ogg => "ogg",
            SupportedFormat::M4a => "m4a",
            SupportedFormat::Webm => "webm",
        }
    }

    /// MIME type used when the browser did not declare one
    pub fn default_mime(&self) -> &'static str {
        match self {
            SupportedFormat::Mp4 => "video/mp4",
            SupportedFormat::Wav => "audio/wav",
            SupportedFormat::Ogg => "audio/ogg",
            SupportedFormat::M4a => "audio/mp4",
            SupportedFormat::Webm => "video/webm",
        }
    }

    /// Comma separated list for messages and the upload form's `accept`
    pub fn accepted_list() -> String {
        Self::ALL
            .iter()
            .map(|f| format!(".{}", f.extension()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for SupportedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A file received from the browser. Immutable once built.
#[derive(Clone)]
pub struct UploadedMedia {
    bytes: Vec<u8>,
    filename: String,
    content_type: Option<String>,
}

impl UploadedMedia {
    pub fn new(bytes: Vec<u8>, filename: impl Into<String>, content_type: Option<String>) -> Self {
        Self {
            bytes,
            filename: filename.into(),
            content_type: content_type.filter(|ct| !ct.trim().is_empty()),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Size in megabytes as shown to the user
    pub fn size_mb(&self) -> String {
        format!("{:.2} MB", self.bytes.len() as f64 / (1024.0 * 1024.0))
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn format(&self) -> Option<SupportedFormat> {
        SupportedFormat::from_filename(&self.filename)
    }

    /// Hand the payload over to the scratch store
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl fmt::Debug for UploadedMedia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedMedia")
            .field("filename", &self.filename)
            .field("size", &self.bytes.len())
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Split a filename into stem and extension, keeping the dot on the extension.
///
/// Only the last extension is split off. Leading dots are part of the stem, so
/// `.bashrc` has no extension.
pub fn split_extension(filename: &str) -> (&str, &str) {
    let name_start = filename.rfind(|c: char| c == '/' || c == '\\').map(|i| i + 1).unwrap_or(0);
    let name = &filename[name_start..];
    let leading_dots = name.len() - name.trim_start_matches('.').len();

    match name.rfind('.') {
        Some(dot) if dot >= leading_dots => {
            let split_at = name_start + dot;
            (&filename[..split_at], &filename[split_at..])
        }
        _ => (filename, ""),
    }
}

/// `lecture.mp4` -> `lecture`
pub fn file_stem(filename: &str) -> &str {
    split_extension(filename).0
}

/// `lecture.mp4` -> `lecture_transcricao.txt`
pub fn transcript_filename(source: &str) -> String {
    format!("{}{}", file_stem(source), TRANSCRIPT_SUFFIX)
}

/// `lecture.mp4` -> `lecture_legendas.vtt`
pub fn subtitle_filename(source: &str) -> String {
    format!("{}{}", file_stem(source), SUBTITLE_SUFFIX)
}
