//! PDF rasterisation: render every page to an RGB bitmap via pdfium.
//!
//! Conversion only. Limits were enforced by [`super::validate`]; nothing here
//! re-checks them, so a rejected document is always reported with the
//! validator's specific error and never as a rendering failure.
//!
//! ## Two sizes per page
//!
//! Pages are rendered at `dpi / 72` times their native size, then any bitmap
//! wider than `max_width_px` is downsampled to exactly that width with a
//! Lanczos filter. This runs once per page, so quality wins over speed.

use crate::config::RenderSettings;
use crate::error::IngestError;
use crate::output::PageImage;
use crate::pipeline::validate::{addressable_pages, raw_page_count, ValidatedPdf};
use image::imageops::{self, FilterType};
use image::RgbImage;
use pdfium_render::prelude::*;
use tracing::{debug, info};

/// Renders validated PDFs at a fixed resolution.
pub struct Rasterizer<'a> {
    pdfium: &'a Pdfium,
    settings: RenderSettings,
}

impl<'a> Rasterizer<'a> {
    pub fn new(pdfium: &'a Pdfium, settings: RenderSettings) -> Self {
        Self { pdfium, settings }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Reopen `bytes` and render every page.
    ///
    /// The caller must already have validated `bytes`.
    ///
    /// # Errors
    /// [`IngestError::Corrupted`] if pdfium cannot reopen the document or
    /// fails on a page. A page is never skipped.
    pub fn rasterize(&self, bytes: &[u8]) -> Result<Vec<PageImage>, IngestError> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| IngestError::corrupted(format!("PDF appears corrupted ({e})")))?;
        self.render_document(&document)
    }

    /// Render a document that is still open from validation.
    pub fn rasterize_validated(&self, pdf: &ValidatedPdf<'_>) -> Result<Vec<PageImage>, IngestError> {
        let pages = self.render_document(pdf.document())?;
        debug_assert_eq!(pages.len(), pdf.page_count());
        Ok(pages)
    }

    fn render_document(&self, document: &PdfDocument<'_>) -> Result<Vec<PageImage>, IngestError> {
        let render_config = PdfRenderConfig::new().scale_page_by_factor(self.settings.scale());

        let expected = addressable_pages(raw_page_count(document))?;
        let mut images = Vec::with_capacity(expected);

        for (idx, page) in document.pages().iter().enumerate() {
            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                IngestError::corrupted(format!("PDF page {idx} could not be rendered ({e})"))
            })?;

            let rendered = bitmap.as_image().to_rgb8();
            let (w, h) = rendered.dimensions();
            let image = downsample(rendered, self.settings.max_width_px);
            debug!(
                "Rendered page {} → {}x{} px (stored {}x{})",
                idx,
                w,
                h,
                image.width(),
                image.height()
            );

            images.push(PageImage::new(idx, image));
        }

        if images.len() != expected {
            return Err(IngestError::corrupted(format!(
                "PDF has {} pages but only {} could be rendered",
                expected,
                images.len()
            )));
        }

        info!("Rasterised {} pages at {} DPI", images.len(), self.settings.dpi);
        Ok(images)
    }
}

/// Shrink `image` to exactly `max_width` px wide if it is wider, keeping the
/// aspect ratio. Narrower images are returned untouched.
pub fn downsample(image: RgbImage, max_width: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    if width <= max_width {
        return image;
    }
    let new_height = scaled_height(width, height, max_width);
    imageops::resize(&image, max_width, new_height, FilterType::Lanczos3)
}

/// `round(height * target_width / width)`, never below 1.
pub fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    let scaled = (height as f64 * target_width as f64 / width as f64).round();
    (scaled as u32).max(1)
}
