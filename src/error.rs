//! Error types for the edgequake-docprep library.
//!
//! Three layers of failure:
//!
//! * [`IngestError`]: the uploaded bytes were rejected
//!   (empty, unknown format, over a limit, structurally broken). These are
//!   the only errors [`crate::DocumentPipeline::process`] returns, and none
//!   of them is worth retrying with the same input.
//!
//! * [`SetupError`]: the pipeline itself could not be built (pdfium library
//!   missing, nonsensical configuration) or the blocking task died.
//!
//! * [`ServiceError`] / [`SummaryError`]: failures reported by the external
//!   collaborators (vision, storage, summariser) during summarisation.

use std::path::PathBuf;
use thiserror::Error;

/// The four terminal rejection kinds for an uploaded document.
///
/// Decoder and pdfium errors are translated into one of these at the stage
/// boundary; their original type never escapes the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    /// Zero-length upload.
    #[error("File is empty")]
    EmptyInput,

    /// Neither a `%PDF` signature nor a recognisable raster image.
    #[error("Unsupported file format: {detail}")]
    UnsupportedFormat { detail: String },

    /// Over the byte size, page count, or pixel dimension limit.
    /// `detail` always names the measured value and the limit.
    #[error("File too large: {detail}")]
    TooLarge { detail: String },

    /// Matched a format signature but failed structural parsing.
    #[error("File is corrupted: {detail}")]
    Corrupted { detail: String },
}

impl IngestError {
    pub(crate) fn unsupported(detail: impl Into<String>) -> Self {
        IngestError::UnsupportedFormat {
            detail: detail.into(),
        }
    }

    pub(crate) fn too_large(detail: impl Into<String>) -> Self {
        IngestError::TooLarge {
            detail: detail.into(),
        }
    }

    pub(crate) fn corrupted(detail: impl Into<String>) -> Self {
        IngestError::Corrupted {
            detail: detail.into(),
        }
    }

    /// Whether retrying with the same bytes could ever succeed.
    ///
    /// Always `false`: every rejection is a property of the input itself.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

/// Errors raised while building or driving a pipeline, never by the
/// validation logic itself.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium (or the directory containing it),\n\
or place the platform library in the working directory.\n"
    )]
    PdfiumBindingFailed(String),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors returned by the async entry points in [`crate::process`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The document was rejected; passed through unchanged.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Setup(#[from] SetupError),

    /// The input file could not be read from disk.
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// The ingest rejection, if that is what this is.
    pub fn as_ingest(&self) -> Option<&IngestError> {
        match self {
            PipelineError::Ingest(e) => Some(e),
            _ => None,
        }
    }
}

/// A failure reported by an external collaborator.
#[derive(Debug, Clone, Error)]
#[error("{service} failed: {message}")]
pub struct ServiceError {
    /// Short collaborator name, e.g. `"vision"` or `"storage"`.
    pub service: String,
    pub message: String,
}

impl ServiceError {
    pub fn new(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            message: message.into(),
        }
    }
}

/// Errors from [`crate::summarize`]. Page numbers are 1-indexed.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// A rasterised page could not be PNG-encoded.
    #[error("Page {page}: image encoding failed: {detail}")]
    Encode { page: usize, detail: String },

    #[error("Page {page}: upload failed: {source}")]
    Storage {
        page: usize,
        #[source]
        source: ServiceError,
    },

    #[error("Page {page}: vision analysis failed: {source}")]
    Vision {
        page: usize,
        #[source]
        source: ServiceError,
    },

    #[error("Page {page}: summarisation failed: {source}")]
    Summarizer {
        page: usize,
        #[source]
        source: ServiceError,
    },
}
