//! Values produced by the pipeline.

use crate::pipeline::detect::FileKind;
use crate::pipeline::encode;
use image::{DynamicImage, RgbImage};
use serde::{Deserialize, Serialize};

/// One rasterised page: a 3-channel RGB bitmap plus its 0-based position in
/// the source document.
#[derive(Debug, Clone, PartialEq)]
pub struct PageImage {
    index: usize,
    image: RgbImage,
}

impl PageImage {
    pub fn new(index: usize, image: RgbImage) -> Self {
        Self { index, image }
    }

    /// 0-based page index in the source document.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Raw interleaved RGB samples, row-major, `width * height * 3` bytes.
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_rgb(self) -> RgbImage {
        self.image
    }

    pub fn to_dynamic(&self) -> DynamicImage {
        DynamicImage::ImageRgb8(self.image.clone())
    }
}

/// Result of [`crate::DocumentPipeline::process`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingOutcome {
    /// PDF input: one bitmap per page, in source order.
    Pages(Vec<PageImage>),
    /// Image input: the original bytes, untouched.
    Image(Vec<u8>),
}

impl ProcessingOutcome {
    pub fn kind(&self) -> FileKind {
        match self {
            ProcessingOutcome::Pages(_) => FileKind::Pdf,
            ProcessingOutcome::Image(_) => FileKind::Image,
        }
    }

    /// Number of pages the downstream OCR step will see.
    pub fn page_count(&self) -> usize {
        match self {
            ProcessingOutcome::Pages(pages) => pages.len(),
            ProcessingOutcome::Image(_) => 1,
        }
    }

    /// One encoded buffer per page, with the file extension to store it
    /// under: PNG for rasterised pages, the original container for images.
    pub fn into_page_bytes(self) -> Result<Vec<EncodedPage>, image::ImageError> {
        match self {
            ProcessingOutcome::Pages(pages) => pages
                .iter()
                .map(|page| {
                    Ok(EncodedPage {
                        bytes: encode::encode_png(page)?,
                        extension: "png",
                    })
                })
                .collect(),
            ProcessingOutcome::Image(bytes) => {
                let extension = image_extension(&bytes);
                Ok(vec![EncodedPage { bytes, extension }])
            }
        }
    }

    /// A serialisable description of the outcome (no pixel data).
    pub fn summary(&self) -> OutcomeSummary {
        match self {
            ProcessingOutcome::Pages(pages) => OutcomeSummary {
                kind: FileKind::Pdf,
                page_count: pages.len(),
                pages: pages
                    .iter()
                    .map(|p| PageDimensions {
                        index: p.index(),
                        width: p.width(),
                        height: p.height(),
                    })
                    .collect(),
                image_bytes: None,
            },
            ProcessingOutcome::Image(bytes) => OutcomeSummary {
                kind: FileKind::Image,
                page_count: 1,
                pages: Vec::new(),
                image_bytes: Some(bytes.len()),
            },
        }
    }
}

/// Canonical extension of a sniffed image container, `"bin"` if unknown.
pub(crate) fn image_extension(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .ok()
        .and_then(|f| f.extensions_str().first().copied())
        .unwrap_or("bin")
}

/// A page ready to hand to storage or OCR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPage {
    pub bytes: Vec<u8>,
    /// Extension without the dot, e.g. `"png"`.
    pub extension: &'static str,
}

/// JSON-friendly view of a [`ProcessingOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeSummary {
    pub kind: FileKind,
    pub page_count: usize,
    /// Rendered page sizes (PDF input only).
    pub pages: Vec<PageDimensions>,
    /// Size of the passed-through upload (image input only).
    pub image_bytes: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDimensions {
    pub index: usize,
    pub width: u32,
    pub height: u32,
}
