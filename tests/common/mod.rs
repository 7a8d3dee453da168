//! Shared fixtures for integration tests.
//!
//! PDFs are generated in-process so the suite needs no binary fixtures.

#![allow(dead_code)]

use edgequake_docprep::engine;
use image::{ImageFormat, Rgb, RgbImage};
use pdfium_render::prelude::Pdfium;
use std::io::Cursor;
use tracing_subscriber::EnvFilter;

/// Build a minimal, well-formed PDF with one blank page per `(width, height)`
/// MediaBox entry (in points).
pub fn pdf_with_pages(sizes: &[(u32, u32)]) -> Vec<u8> {
    let mut objects: Vec<String> = Vec::new();
    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());

    let kids: Vec<String> = (0..sizes.len()).map(|i| format!("{} 0 R", i + 3)).collect();
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        sizes.len()
    ));
    for (w, h) in sizes {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {w} {h}] /Resources << >> >>"
        ));
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_at = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for off in offsets {
        out.extend_from_slice(format!("{off:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        )
        .as_bytes(),
    );
    out
}

/// US Letter in points.
pub const LETTER: (u32, u32) = (612, 792);

pub fn image_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    RgbImage::from_pixel(width, height, Rgb([200, 30, 30]))
        .write_to(&mut Cursor::new(&mut buf), format)
        .expect("encode test image");
    buf
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    image_bytes(width, height, ImageFormat::Png)
}

/// Route library logs through the test harness; `RUST_LOG` picks the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// The process-wide engine, or `None` (with a SKIP note) when pdfium is
/// not installed.
pub fn try_bind() -> Option<&'static Pdfium> {
    init_tracing();
    match engine::shared_pdfium() {
        Ok(p) => Some(p),
        Err(e) => {
            println!("SKIP: pdfium not available: {e}");
            println!("       Set PDFIUM_LIB_PATH to run PDF tests");
            None
        }
    }
}

/// Return early from the test when pdfium is not installed.
macro_rules! pdfium_or_skip {
    () => {
        match $crate::common::try_bind() {
            Some(p) => p,
            None => return,
        }
    };
}
