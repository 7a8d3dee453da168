//! Integration tests for the ingestion pipeline.
//!
//! Tests that touch PDFs need the pdfium shared library. When it cannot be
//! bound they print `SKIP` and pass, so the suite stays green on machines
//! without pdfium.
//!
//! Run with:
//!   PDFIUM_LIB_PATH=/path/to/libpdfium.so cargo test --test pipeline -- --nocapture

#[macro_use]
mod common;

use common::{pdf_with_pages, png_bytes, LETTER};
use edgequake_docprep::pipeline::validate::{check_size, validate_image};
use edgequake_docprep::{
    classify, process_async, DocumentPipeline, FileKind, IngestError, PipelineConfig,
    PipelineError, ProcessingOutcome, ValidationLimits,
};
use futures::future::try_join_all;
use image::ImageFormat;

fn pipeline_with(config: PipelineConfig) -> Option<DocumentPipeline> {
    let pdfium = common::try_bind()?;
    Some(DocumentPipeline::with_pdfium(pdfium, config).expect("valid config"))
}

macro_rules! pipeline_or_skip {
    ($config:expr) => {
        match pipeline_with($config) {
            Some(p) => p,
            None => return,
        }
    };
}

// ── Classification and image validation (no pdfium) ──────────────────────

#[test]
fn generated_pdf_is_classified_as_pdf() {
    let pdf = pdf_with_pages(&[LETTER]);
    assert_eq!(classify(&pdf), Ok(FileKind::Pdf));
}

#[test]
fn common_image_formats_are_classified_as_images() {
    for format in [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Gif, ImageFormat::Bmp] {
        let bytes = common::image_bytes(16, 16, format);
        assert_eq!(classify(&bytes), Ok(FileKind::Image), "{format:?}");
    }
}

#[test]
fn empty_upload_is_rejected_before_anything_else() {
    assert_eq!(classify(&[]), Err(IngestError::EmptyInput));
}

#[test]
fn text_upload_is_unsupported() {
    let err = classify(b"name,amount\nalice,3\n").unwrap_err();
    assert!(matches!(err, IngestError::UnsupportedFormat { .. }), "got {err:?}");
    assert!(err.to_string().starts_with("Unsupported file format"));
}

#[test]
fn image_over_dimension_limit_is_too_large() {
    let limits = ValidationLimits {
        max_image_width: 100,
        max_image_height: 100,
        ..ValidationLimits::default()
    };
    let err = validate_image(&png_bytes(200, 50), &limits).unwrap_err();
    match err {
        IngestError::TooLarge { detail } => {
            assert!(detail.contains("200×50"), "got: {detail}");
            assert!(detail.contains("100×100"), "got: {detail}");
        }
        other => panic!("expected TooLarge, got {other:?}"),
    }
}

#[test]
fn image_exactly_at_limit_is_accepted() {
    let limits = ValidationLimits {
        max_image_width: 64,
        max_image_height: 64,
        ..ValidationLimits::default()
    };
    assert_eq!(validate_image(&png_bytes(64, 64), &limits), Ok(()));
}

#[test]
fn jpeg_cut_before_frame_header_is_corrupted() {
    let mut jpeg = common::image_bytes(64, 64, ImageFormat::Jpeg);
    // SOI + JFIF APP0 only
    jpeg.truncate(20);
    let err = validate_image(&jpeg, &ValidationLimits::default()).unwrap_err();
    assert!(matches!(err, IngestError::Corrupted { .. }), "got {err:?}");
}

#[test]
fn size_limit_is_checked_on_raw_bytes() {
    let limits = ValidationLimits {
        max_file_mb: 1,
        ..ValidationLimits::default()
    };
    let mut bytes = b"%PDF".to_vec();
    bytes.resize(1_500_000, 0);

    let err = check_size(&bytes, FileKind::Pdf, &limits).unwrap_err();
    match err {
        IngestError::TooLarge { detail } => {
            assert!(detail.starts_with("PDF is 1.50 MB"), "got: {detail}");
        }
        other => panic!("expected TooLarge, got {other:?}"),
    }

    bytes.truncate(1_000_000);
    assert_eq!(check_size(&bytes, FileKind::Pdf, &limits), Ok(()));
}

// ── PDF processing (pdfium required) ─────────────────────────────────────

#[test]
fn letter_pages_are_downsampled_to_max_width() {
    let pipeline = pipeline_or_skip!(PipelineConfig::default());

    let outcome = pipeline.process(pdf_with_pages(&[LETTER])).unwrap();
    let ProcessingOutcome::Pages(pages) = outcome else {
        panic!("expected pages");
    };
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].width(), 1200);
    // 1650 * 1200 / 1275 ≈ 1553
    assert!(
        (1551..=1555).contains(&pages[0].height()),
        "height {}",
        pages[0].height()
    );
    assert_eq!(pages[0].pixels().len(), 1200 * pages[0].height() as usize * 3);
}

#[test]
fn pages_come_back_in_document_order() {
    let config = PipelineConfig::builder().dpi(72).build().unwrap();
    let pipeline = pipeline_or_skip!(config);

    let sizes = [(100, 200), (300, 150), (250, 250)];
    let outcome = pipeline.process(pdf_with_pages(&sizes)).unwrap();
    let ProcessingOutcome::Pages(pages) = outcome else {
        panic!("expected pages");
    };

    assert_eq!(pages.len(), 3);
    for (i, (page, (w, h))) in pages.iter().zip(sizes).enumerate() {
        assert_eq!(page.index(), i);
        assert!(page.width().abs_diff(w) <= 1, "page {i}: {}", page.width());
        assert!(page.height().abs_diff(h) <= 1, "page {i}: {}", page.height());
    }
}

#[test]
fn narrow_pages_are_not_upscaled() {
    let config = PipelineConfig::builder().dpi(72).max_width_px(1200).build().unwrap();
    let pipeline = pipeline_or_skip!(config);

    let outcome = pipeline.process(pdf_with_pages(&[(300, 400)])).unwrap();
    let ProcessingOutcome::Pages(pages) = outcome else {
        panic!("expected pages");
    };
    assert!(pages[0].width().abs_diff(300) <= 1);
}

#[test]
fn too_many_pages_is_too_large() {
    let config = PipelineConfig::builder().max_pdf_pages(2).build().unwrap();
    let pipeline = pipeline_or_skip!(config);

    let pdf = pdf_with_pages(&[LETTER, LETTER, LETTER]);
    let err = pipeline.validate(&pdf, FileKind::Pdf).unwrap_err();
    assert_eq!(
        err,
        IngestError::TooLarge {
            detail: "3 pages exceeds max number of 2.".into()
        }
    );
    assert_eq!(pipeline.process(pdf).unwrap_err(), err);
}

#[test]
fn oversized_page_names_its_index() {
    let config = PipelineConfig::builder().max_dimension(1000).build().unwrap();
    let pipeline = pipeline_or_skip!(config);

    let pdf = pdf_with_pages(&[LETTER, (2000, 500)]);
    let err = pipeline.process(pdf).unwrap_err();
    match err {
        IngestError::TooLarge { detail } => {
            assert!(detail.contains("page 1"), "got: {detail}");
            assert!(detail.contains("2000x500"), "got: {detail}");
        }
        other => panic!("expected TooLarge, got {other:?}"),
    }
}

#[test]
fn garbage_after_signature_is_corrupted() {
    let pipeline = pipeline_or_skip!(PipelineConfig::default());

    let err = pipeline
        .process(b"%PDF-1.4\nthis is not really a pdf\n".to_vec())
        .unwrap_err();
    assert!(matches!(err, IngestError::Corrupted { .. }), "got {err:?}");
    assert!(err.to_string().starts_with("File is corrupted"));
}

#[test]
fn oversized_and_corrupted_reports_size() {
    let config = PipelineConfig::builder().max_file_mb(1).build().unwrap();
    let pipeline = pipeline_or_skip!(config);

    let mut bytes = b"%PDF".to_vec();
    bytes.resize(1_500_000, 0);
    let err = pipeline.process(bytes).unwrap_err();
    assert!(matches!(err, IngestError::TooLarge { .. }), "got {err:?}");
}

#[test]
fn validation_is_repeatable() {
    let pipeline = pipeline_or_skip!(PipelineConfig::default());

    let pdf = pdf_with_pages(&[LETTER, LETTER]);
    assert_eq!(pipeline.validate(&pdf, FileKind::Pdf), Ok(()));
    assert_eq!(pipeline.validate(&pdf, FileKind::Pdf), Ok(()));

    let broken = b"%PDF-1.7\n%%EOF".to_vec();
    let first = pipeline.validate(&broken, FileKind::Pdf).unwrap_err();
    let second = pipeline.validate(&broken, FileKind::Pdf).unwrap_err();
    assert_eq!(first, second);
}

#[test]
fn validated_pdf_rasterizes_same_as_reopened() {
    let config = PipelineConfig::builder().dpi(72).build().unwrap();
    let pipeline = pipeline_or_skip!(config);

    let pdf = pdf_with_pages(&[(120, 80), (80, 120)]);
    let validator = pipeline.validator();
    let validated = validator.validate_pdf(&pdf).unwrap();
    assert_eq!(validated.page_count(), 2);

    let from_handle = pipeline.rasterizer().rasterize_validated(&validated).unwrap();
    let reopened = pipeline.rasterize(&pdf).unwrap();
    assert_eq!(from_handle, reopened);
}

#[test]
fn image_upload_passes_through_unchanged() {
    let pipeline = pipeline_or_skip!(PipelineConfig::default());

    let png = png_bytes(100, 100);
    let outcome = pipeline.process(png.clone()).unwrap();
    assert_eq!(outcome, ProcessingOutcome::Image(png));
}

#[tokio::test]
async fn async_processing_matches_sync() {
    let config = PipelineConfig::builder().dpi(72).build().unwrap();
    let Some(pipeline) = pipeline_with(config) else {
        return;
    };
    let pdf = pdf_with_pages(&[(200, 100)]);
    let sync_outcome = pipeline.process(pdf.clone()).unwrap();

    let async_outcome = process_async(pdf, config).await.unwrap();
    assert_eq!(async_outcome, sync_outcome);
    assert_eq!(async_outcome.summary().page_count, 1);
}

#[tokio::test]
async fn async_errors_keep_their_ingest_kind() {
    pdfium_or_skip!();

    let err = process_async(Vec::new(), PipelineConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Ingest(IngestError::EmptyInput)), "got {err:?}");
    assert_eq!(err.as_ingest(), Some(&IngestError::EmptyInput));
}

#[test]
fn oversized_image_kind_reports_size_before_decoding() {
    let config = PipelineConfig::builder().max_file_mb(1).build().unwrap();
    let pipeline = pipeline_or_skip!(config);

    // Zero bytes are not an image at all; size still wins.
    let garbage = vec![0u8; 2_000_000];
    let err = pipeline.validate(&garbage, FileKind::Image).unwrap_err();
    match err {
        IngestError::TooLarge { detail } => {
            assert!(detail.starts_with("IMAGE is 2.00 MB"), "got: {detail}");
        }
        other => panic!("expected TooLarge, got {other:?}"),
    }
}

#[test]
fn oversized_image_shaped_upload_is_too_large() {
    let config = PipelineConfig::builder().max_file_mb(1).build().unwrap();
    let pipeline = pipeline_or_skip!(config);

    // A readable PNG header followed by padding: classified as an image,
    // rejected on size before the body is decoded.
    let mut bytes = png_bytes(8, 8);
    bytes.resize(1_500_000, 0);
    assert_eq!(classify(&bytes), Ok(FileKind::Image));

    let err = pipeline.process(bytes).unwrap_err();
    assert!(matches!(err, IngestError::TooLarge { .. }), "got {err:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_async_calls_share_the_engine() {
    pdfium_or_skip!();
    let config = PipelineConfig::builder().dpi(72).build().unwrap();

    let documents: Vec<Vec<(u32, u32)>> = vec![
        vec![(200, 100); 6],
        vec![(100, 200), (150, 150), (300, 120)],
        vec![LETTER, (612, 400)],
        vec![(50, 50); 12],
    ];
    let calls = documents
        .iter()
        .map(|sizes| process_async(pdf_with_pages(sizes), config));
    let outcomes = try_join_all(calls).await.unwrap();

    for (sizes, outcome) in documents.iter().zip(outcomes) {
        let ProcessingOutcome::Pages(pages) = outcome else {
            panic!("expected pages");
        };
        assert_eq!(pages.len(), sizes.len());
        for (i, (page, (w, h))) in pages.iter().zip(sizes).enumerate() {
            assert_eq!(page.index(), i);
            assert!(page.width().abs_diff(*w) <= 1, "page {i}: {}", page.width());
            assert!(page.height().abs_diff(*h) <= 1, "page {i}: {}", page.height());
        }
    }

    // The engine survives every call above.
    let again = process_async(pdf_with_pages(&[(80, 80)]), config).await.unwrap();
    assert_eq!(again.page_count(), 1);
}

#[test]
fn parallel_sync_pipelines_render_independently() {
    pdfium_or_skip!();

    let handles: Vec<_> = (1..=4u32)
        .map(|n| {
            std::thread::spawn(move || {
                let config = PipelineConfig::builder().dpi(72).build().unwrap();
                let pipeline = DocumentPipeline::new(config).unwrap();
                let sizes = vec![(100 + n * 10, 100); n as usize + 1];
                match pipeline.process(pdf_with_pages(&sizes)).unwrap() {
                    ProcessingOutcome::Pages(pages) => (n, pages.len()),
                    ProcessingOutcome::Image(_) => panic!("expected pages"),
                }
            })
        })
        .collect();

    for handle in handles {
        let (n, count) = handle.join().unwrap();
        assert_eq!(count, n as usize + 1);
    }
}
