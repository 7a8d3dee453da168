//! Configuration types for document validation and rasterisation.
//!
//! All limits travel in a [`PipelineConfig`] handed to the pipeline at
//! construction. There is no process-wide state.
//!
//! The defaults match the input bounds of the downstream OCR service:
//! 500 MB uploads, 10 000 × 10 000 px images, 2 000 PDF pages.

use crate::error::SetupError;
use serde::{Deserialize, Serialize};

/// Bytes in one (decimal) megabyte, as used by the file size limit.
pub const BYTES_PER_MB: u64 = 1_000_000;

/// Hard limits every accepted document must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
    /// Maximum raw upload size in megabytes. Default: 500.
    pub max_file_mb: u64,

    /// Maximum image or native-scale PDF page width in pixels. Default: 10 000.
    pub max_image_width: u32,

    /// Maximum image or native-scale PDF page height in pixels. Default: 10 000.
    pub max_image_height: u32,

    /// Maximum number of pages in a PDF. Default: 2 000.
    pub max_pdf_pages: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_file_mb: 500,
            max_image_width: 10_000,
            max_image_height: 10_000,
            max_pdf_pages: 2_000,
        }
    }
}

impl ValidationLimits {
    /// `true` when `len` bytes is strictly more than `max_file_mb` megabytes.
    pub fn exceeds_file_size(&self, len: usize) -> bool {
        len as u64 > self.max_file_mb.saturating_mul(BYTES_PER_MB)
    }

    /// `true` when either dimension is over its limit.
    pub fn exceeds_dimensions(&self, width: u32, height: u32) -> bool {
        width > self.max_image_width || height > self.max_image_height
    }
}

/// How PDF pages are turned into bitmaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Rendering resolution. Render scale is `dpi / 72`. Default: 150.
    pub dpi: u32,

    /// Rendered pages wider than this are downsampled to exactly this width,
    /// preserving aspect ratio. Default: 1 200.
    pub max_width_px: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            dpi: 150,
            max_width_px: 1_200,
        }
    }
}

impl RenderSettings {
    /// PDF points per inch.
    pub const POINTS_PER_INCH: f32 = 72.0;

    /// Scale factor applied to native page size when rendering.
    pub fn scale(&self) -> f32 {
        self.dpi as f32 / Self::POINTS_PER_INCH
    }
}

/// Complete configuration for a [`crate::DocumentPipeline`].
///
/// # Example
/// ```rust
/// use edgequake_docprep::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .max_file_mb(20)
///     .max_pdf_pages(50)
///     .dpi(200)
///     .build()
///     .unwrap();
/// assert_eq!(config.render.dpi, 200);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub limits: ValidationLimits,
    pub render: RenderSettings,
}

impl PipelineConfig {
    /// Create a new builder seeded with the defaults.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }

    /// Check the constraints [`PipelineConfigBuilder::build`] enforces.
    ///
    /// Pipelines call this on every config they are handed, including ones
    /// deserialised or assembled field by field.
    pub fn validate(&self) -> Result<(), SetupError> {
        let c = self;
        if c.limits.max_file_mb == 0 {
            return Err(SetupError::InvalidConfig(
                "max file size must be ≥ 1 MB".into(),
            ));
        }
        if c.limits.max_image_width == 0 || c.limits.max_image_height == 0 {
            return Err(SetupError::InvalidConfig(format!(
                "image dimension limits must be ≥ 1, got {}x{}",
                c.limits.max_image_width, c.limits.max_image_height
            )));
        }
        if c.limits.max_pdf_pages == 0 {
            return Err(SetupError::InvalidConfig(
                "max PDF pages must be ≥ 1".into(),
            ));
        }
        if !(36..=600).contains(&c.render.dpi) {
            return Err(SetupError::InvalidConfig(format!(
                "DPI must be 36–600, got {}",
                c.render.dpi
            )));
        }
        if c.render.max_width_px == 0 {
            return Err(SetupError::InvalidConfig(
                "max render width must be ≥ 1 px".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn limits(mut self, limits: ValidationLimits) -> Self {
        self.config.limits = limits;
        self
    }

    pub fn max_file_mb(mut self, mb: u64) -> Self {
        self.config.limits.max_file_mb = mb;
        self
    }

    pub fn max_image_width(mut self, px: u32) -> Self {
        self.config.limits.max_image_width = px;
        self
    }

    pub fn max_image_height(mut self, px: u32) -> Self {
        self.config.limits.max_image_height = px;
        self
    }

    /// Set both dimension limits at once.
    pub fn max_dimension(self, px: u32) -> Self {
        self.max_image_width(px).max_image_height(px)
    }

    pub fn max_pdf_pages(mut self, pages: usize) -> Self {
        self.config.limits.max_pdf_pages = pages;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.render.dpi = dpi;
        self
    }

    pub fn max_width_px(mut self, px: u32) -> Self {
        self.config.render.max_width_px = px;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, SetupError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
