//! # edgequake-docprep
//!
//! Validate uploaded documents and turn PDFs into page images for OCR.
//!
//! ## Why this crate?
//!
//! An upload endpoint has to refuse hostile or broken files before any
//! expensive work starts: a 2 000-page PDF, a 60 000-pixel-wide scan, or a
//! truncated JPEG should fail fast with a clear message. This crate does
//! that checking from the bytes alone (never from the file name), then
//! rasterises accepted PDFs into bounded-width RGB pages that an OCR or
//! vision model can read.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload bytes
//!  │
//!  ├─ 1. Detect     %PDF signature or a decodable image header
//!  ├─ 2. Validate   size, page count, page / image dimensions, integrity
//!  ├─ 3. Rasterize  pdfium at dpi/72, Lanczos downsample to max width
//!  ├─ 4. Encode     lossless PNG per page (caller side)
//!  └─ 5. Summarize  optional: vision + storage + LLM collaborators
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_docprep::{process_file, PipelineConfig, ProcessingOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::builder().dpi(150).max_width_px(1200).build()?;
//!     match process_file("report.pdf", config).await? {
//!         ProcessingOutcome::Pages(pages) => {
//!             for page in &pages {
//!                 println!("page {}: {}x{}", page.index() + 1, page.width(), page.height());
//!             }
//!         }
//!         ProcessingOutcome::Image(bytes) => println!("image upload, {} bytes", bytes.len()),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docprep` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-docprep = { version = "0.1", default-features = false }
//! ```
//!
//! ## PDFium
//!
//! PDF handling needs the pdfium shared library at runtime. See
//! [`engine`] for the lookup order; `PDFIUM_LIB_PATH` wins when set.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod prompts;
pub mod summarize;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analysis::{ObjectStore, Summarizer, SummaryRequest, VisionAnalysis, VisionAnalyzer};
pub use config::{PipelineConfig, PipelineConfigBuilder, RenderSettings, ValidationLimits};
pub use error::{IngestError, PipelineError, ServiceError, SetupError, SummaryError};
pub use output::{EncodedPage, OutcomeSummary, PageDimensions, PageImage, ProcessingOutcome};
pub use pipeline::detect::{classify, FileKind};
pub use pipeline::encode::encode_png;
pub use process::{process_async, process_file, DocumentPipeline};
pub use summarize::{
    summarize_document, summarize_outcome, Collaborators, DocumentSummary, PageSummary,
    SummaryOptions,
};
