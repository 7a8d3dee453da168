//! Image encoding: `PageImage` → PNG bytes.
//!
//! The caller-side step between rasterisation and the OCR / storage
//! collaborators. PNG keeps rendered glyph edges intact.

use crate::output::PageImage;
use image::ImageFormat;
use std::io::Cursor;
use tracing::debug;

/// Encode a page as an 8-bit RGB PNG.
pub fn encode_png(page: &PageImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    page.as_rgb()
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    debug!("Encoded page {} → {} bytes PNG", page.index(), buf.len());
    Ok(buf)
}
