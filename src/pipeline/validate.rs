//! Limit enforcement: byte size, PDF structure and page sizes, image
//! dimensions and integrity.
//!
//! ## Order of checks
//!
//! The byte-length check runs first and for both kinds, before any parser
//! touches the input: an oversized upload is reported as `TooLarge` even
//! when it is also garbage. Only then does format-specific validation open
//! the document.
//!
//! ## PDF page sizes without rendering
//!
//! Each page's size at native scale (1 px per PDF point) is read from the
//! page box; no bitmap is allocated. The first page over the limit stops
//! validation and is reported with its 0-based index.

use crate::config::ValidationLimits;
use crate::error::IngestError;
use crate::pipeline::detect::FileKind;
use image::{ImageReader, Limits};
use pdfium_render::prelude::*;
use std::io::Cursor;
use tracing::debug;

/// Enforces [`ValidationLimits`] against raw uploads.
pub struct Validator<'a> {
    pdfium: &'a Pdfium,
    limits: ValidationLimits,
}

/// A PDF that passed every limit, still open.
///
/// Only [`Validator`] can create one, so holding a `ValidatedPdf` proves the
/// whole document was checked before any page is rendered.
pub struct ValidatedPdf<'a> {
    document: PdfDocument<'a>,
    page_count: usize,
}

impl<'a> ValidatedPdf<'a> {
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub(crate) fn document(&self) -> &PdfDocument<'a> {
        &self.document
    }
}

impl<'a> Validator<'a> {
    pub fn new(pdfium: &'a Pdfium, limits: ValidationLimits) -> Self {
        Self { pdfium, limits }
    }

    pub fn limits(&self) -> &ValidationLimits {
        &self.limits
    }

    /// Validate `bytes` as `kind`.
    ///
    /// Pure: calling it twice on the same input gives the same answer.
    pub fn validate(&self, bytes: &[u8], kind: FileKind) -> Result<(), IngestError> {
        check_size(bytes, kind, &self.limits)?;
        match kind {
            FileKind::Pdf => self.inspect_pdf(bytes).map(drop),
            FileKind::Image => validate_image(bytes, &self.limits),
        }
    }

    /// Validate a PDF and keep it open for rasterisation.
    pub fn validate_pdf<'b>(&self, bytes: &'b [u8]) -> Result<ValidatedPdf<'b>, IngestError>
    where
        'a: 'b,
    {
        check_size(bytes, FileKind::Pdf, &self.limits)?;
        self.inspect_pdf(bytes)
    }

    fn inspect_pdf<'b>(&self, bytes: &'b [u8]) -> Result<ValidatedPdf<'b>, IngestError>
    where
        'a: 'b,
    {
        let pdfium: &'b Pdfium = self.pdfium;
        let document = pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| IngestError::corrupted(format!("PDF appears corrupted ({e})")))?;

        let page_count = check_page_count(raw_page_count(&document), &self.limits)?;

        for (idx, page) in document.pages().iter().enumerate() {
            let (width, height) = native_size(&page);
            if self.limits.exceeds_dimensions(width, height) {
                return Err(IngestError::too_large(format!(
                    "PDF page {idx} renders to {width}x{height}, which exceeds max allowed {}x{}.",
                    self.limits.max_image_width, self.limits.max_image_height
                )));
            }
        }

        debug!("PDF validated: {} pages", page_count);
        Ok(ValidatedPdf {
            document,
            page_count,
        })
    }
}

/// Highest page count pdfium-render can address (`PdfPageIndex` is `u16`).
pub const MAX_ADDRESSABLE_PAGES: usize = u16::MAX as usize;

/// Page count straight from pdfium, before any narrowing to `PdfPageIndex`.
pub(crate) fn raw_page_count(document: &PdfDocument<'_>) -> i32 {
    let bindings = document.bindings();
    bindings.FPDF_GetPageCount(bindings.get_handle_from_document(document))
}

/// Enforce `max_pdf_pages` on a raw pdfium page count.
pub fn check_page_count(raw: i32, limits: &ValidationLimits) -> Result<usize, IngestError> {
    let count = usize::try_from(raw).map_err(|_| {
        IngestError::corrupted(format!("PDF reports an invalid page count ({raw})."))
    })?;
    if count > limits.max_pdf_pages {
        return Err(IngestError::too_large(format!(
            "{} pages exceeds max number of {}.",
            count, limits.max_pdf_pages
        )));
    }
    addressable_pages(raw)
}

/// A raw page count every page of which can be iterated.
pub fn addressable_pages(raw: i32) -> Result<usize, IngestError> {
    let count = usize::try_from(raw).map_err(|_| {
        IngestError::corrupted(format!("PDF reports an invalid page count ({raw})."))
    })?;
    if count > MAX_ADDRESSABLE_PAGES {
        return Err(IngestError::too_large(format!(
            "{count} pages exceeds max number of {MAX_ADDRESSABLE_PAGES}."
        )));
    }
    Ok(count)
}

/// Pixel size of a page rendered at 72 DPI (one pixel per point).
pub fn native_size(page: &PdfPage<'_>) -> (u32, u32) {
    (
        page.width().value.ceil() as u32,
        page.height().value.ceil() as u32,
    )
}

/// Reject uploads over `max_file_mb` (decimal megabytes).
pub fn check_size(
    bytes: &[u8],
    kind: FileKind,
    limits: &ValidationLimits,
) -> Result<(), IngestError> {
    if limits.exceeds_file_size(bytes.len()) {
        let observed_mb = bytes.len() as f64 / crate::config::BYTES_PER_MB as f64;
        return Err(IngestError::too_large(format!(
            "{} is {:.2} MB, which exceeds max allowed size of {} MB.",
            kind.as_str().to_uppercase(),
            observed_mb,
            limits.max_file_mb
        )));
    }
    Ok(())
}

/// Validate an image upload: readable header, dimensions in bounds, and a
/// clean full decode.
///
/// Decoding happens last so the allocation is bounded by the dimension
/// limits that were just checked.
pub fn validate_image(bytes: &[u8], limits: &ValidationLimits) -> Result<(), IngestError> {
    let (width, height) = open_image(bytes)?
        .into_dimensions()
        .map_err(|e| IngestError::corrupted(format!("Image is corrupted ({e})")))?;

    if limits.exceeds_dimensions(width, height) {
        return Err(IngestError::too_large(format!(
            "Image dimensions {width}×{height} exceed limits of {}×{}.",
            limits.max_image_width, limits.max_image_height
        )));
    }

    let mut decode_limits = Limits::default();
    decode_limits.max_image_width = Some(limits.max_image_width);
    decode_limits.max_image_height = Some(limits.max_image_height);
    decode_limits.max_alloc = None;

    let mut reader = open_image(bytes)?;
    reader.limits(decode_limits);
    reader
        .decode()
        .map_err(|e| IngestError::corrupted(format!("Image validation failed ({e})")))?;

    debug!("Image validated: {}x{}", width, height);
    Ok(())
}

fn open_image(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, IngestError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| IngestError::corrupted(format!("Image is corrupted ({e})")))?;
    if reader.format().is_none() {
        return Err(IngestError::corrupted("Image is corrupted."));
    }
    Ok(reader)
}
