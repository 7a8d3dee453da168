//! Pipeline orchestration: detect → validate → rasterize-if-pdf.
//!
//! [`DocumentPipeline`] borrows the process-wide pdfium engine (see
//! [`crate::engine::shared_pdfium`]) and owns its configuration. Apart from
//! that engine, separate pipelines and separate calls share nothing, and
//! they may run in parallel.
//!
//! ## Why spawn_blocking?
//!
//! pdfium is CPU-bound and not async-safe. [`process_async`] moves the whole
//! synchronous chain onto Tokio's blocking pool, so async services never
//! stall a worker on a large document.

use crate::config::PipelineConfig;
use crate::engine;
use crate::error::{IngestError, PipelineError, SetupError};
use crate::output::{PageImage, ProcessingOutcome};
use crate::pipeline::detect::{self, FileKind};
use crate::pipeline::rasterize::Rasterizer;
use crate::pipeline::validate::Validator;
use pdfium_render::prelude::Pdfium;
use std::path::Path;
use tracing::{debug, info};

/// Validates uploads and rasterises PDFs with a fixed configuration.
///
/// # Example
/// ```rust,no_run
/// use edgequake_docprep::{DocumentPipeline, PipelineConfig, ProcessingOutcome};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pipeline = DocumentPipeline::new(PipelineConfig::default())?;
/// let bytes = std::fs::read("report.pdf")?;
/// match pipeline.process(bytes)? {
///     ProcessingOutcome::Pages(pages) => println!("{} pages", pages.len()),
///     ProcessingOutcome::Image(bytes) => println!("image, {} bytes", bytes.len()),
/// }
/// # Ok(())
/// # }
/// ```
pub struct DocumentPipeline {
    pdfium: &'static Pdfium,
    config: PipelineConfig,
}

impl DocumentPipeline {
    /// Check `config` and build a pipeline on the shared pdfium engine.
    pub fn new(config: PipelineConfig) -> Result<Self, SetupError> {
        config.validate()?;
        Self::with_pdfium(engine::shared_pdfium()?, config)
    }

    /// Build a pipeline around an explicit engine.
    pub fn with_pdfium(pdfium: &'static Pdfium, config: PipelineConfig) -> Result<Self, SetupError> {
        config.validate()?;
        Ok(Self { pdfium, config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn validator(&self) -> Validator<'_> {
        Validator::new(self.pdfium, self.config.limits)
    }

    pub fn rasterizer(&self) -> Rasterizer<'_> {
        Rasterizer::new(self.pdfium, self.config.render)
    }

    /// See [`detect::classify`].
    pub fn classify(&self, bytes: &[u8]) -> Result<FileKind, IngestError> {
        detect::classify(bytes)
    }

    /// See [`Validator::validate`].
    pub fn validate(&self, bytes: &[u8], kind: FileKind) -> Result<(), IngestError> {
        self.validator().validate(bytes, kind)
    }

    /// See [`Rasterizer::rasterize`]. `bytes` must already be validated.
    pub fn rasterize(&self, bytes: &[u8]) -> Result<Vec<PageImage>, IngestError> {
        self.rasterizer().rasterize(bytes)
    }

    /// Classify, validate, and (for PDFs) rasterise an upload.
    ///
    /// Image uploads come back byte-for-byte unchanged. Errors from every
    /// stage propagate as-is; no new kinds are introduced here.
    pub fn process(&self, bytes: Vec<u8>) -> Result<ProcessingOutcome, IngestError> {
        let kind = detect::classify(&bytes)?;
        info!("Processing {} bytes as {}", bytes.len(), kind);

        match kind {
            FileKind::Pdf => {
                // The document is parsed once: the handle that passed
                // validation is the one that gets rendered.
                let validated = self.validator().validate_pdf(&bytes)?;
                let pages = self.rasterizer().rasterize_validated(&validated)?;
                debug!("PDF produced {} page images", pages.len());
                Ok(ProcessingOutcome::Pages(pages))
            }
            FileKind::Image => {
                self.validator().validate(&bytes, FileKind::Image)?;
                Ok(ProcessingOutcome::Image(bytes))
            }
        }
    }
}

/// Run [`DocumentPipeline::process`] on Tokio's blocking pool.
pub async fn process_async(
    bytes: Vec<u8>,
    config: PipelineConfig,
) -> Result<ProcessingOutcome, PipelineError> {
    tokio::task::spawn_blocking(move || -> Result<ProcessingOutcome, PipelineError> {
        let pipeline = DocumentPipeline::new(config)?;
        Ok(pipeline.process(bytes)?)
    })
    .await
    .map_err(|e| SetupError::Internal(format!("Processing task panicked: {e}")))?
}

/// Read a local file and process it.
pub async fn process_file(
    path: impl AsRef<Path>,
    config: PipelineConfig,
) -> Result<ProcessingOutcome, PipelineError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| PipelineError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    process_async(bytes, config).await
}
