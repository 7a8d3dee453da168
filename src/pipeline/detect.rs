//! Content sniffing: decide whether an upload is a PDF or a raster image.
//!
//! Classification never looks at the filename. It is a two-step contract:
//! a cheap signature check for `%PDF`, then an image header probe that
//! reads only the container header (format + dimensions), never pixels.

use crate::error::IngestError;
use image::ImageReader;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;
use std::str::FromStr;
use tracing::debug;

/// Leading bytes of every PDF file.
pub const PDF_SIGNATURE: &[u8; 4] = b"%PDF";

/// Content-derived classification of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Image,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Pdf => "pdf",
            FileKind::Image => "image",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsing a kind name from outside the crate (CLI flag, request field) is
/// where an unknown kind can appear; it is rejected as an unsupported format.
impl FromStr for FileKind {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(FileKind::Pdf),
            "image" => Ok(FileKind::Image),
            _ => Err(IngestError::unsupported("Unsupported format.")),
        }
    }
}

/// Classify `bytes` as [`FileKind::Pdf`] or [`FileKind::Image`].
///
/// # Errors
/// - [`IngestError::EmptyInput`] for a zero-length slice.
/// - [`IngestError::UnsupportedFormat`] when the bytes carry neither the PDF
///   signature nor a readable image header.
pub fn classify(bytes: &[u8]) -> Result<FileKind, IngestError> {
    if bytes.is_empty() {
        return Err(IngestError::EmptyInput);
    }

    if bytes.starts_with(PDF_SIGNATURE) {
        debug!("Classified {} bytes as PDF", bytes.len());
        return Ok(FileKind::Pdf);
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| IngestError::unsupported(format!("Error processing file: {e}")))?;

    let Some(format) = reader.format() else {
        return Err(IngestError::unsupported("Unsupported image format"));
    };

    reader
        .into_dimensions()
        .map_err(|e| IngestError::unsupported(format!("Error processing file: {e}")))?;

    debug!("Classified {} bytes as {:?} image", bytes.len(), format);
    Ok(FileKind::Image)
}
