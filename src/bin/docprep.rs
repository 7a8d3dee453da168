//! CLI binary for edgequake-docprep.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `PipelineConfig`, runs the pipeline and reports the result.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_docprep::{
    process_async, DocumentPipeline, FileKind, PipelineConfig, ProcessingOutcome,
};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Validate only
  docprep --check upload.pdf

  # Rasterise a PDF and write page-001.png, page-002.png, ...
  docprep report.pdf -o pages/

  # Higher DPI, wider pages, machine-readable summary
  docprep --dpi 200 --max-width 1600 --json scan.pdf

  # Tighter limits for a public endpoint
  docprep --max-file-mb 20 --max-pages 50 --max-dimension 8000 upload.bin

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to libpdfium (file or directory)
  RUST_LOG          Override the log filter (e.g. edgequake_docprep=debug)
"#;

/// Validate documents and rasterise PDFs into page images.
#[derive(Parser, Debug)]
#[command(
    name = "docprep",
    version,
    about = "Validate documents and rasterise PDFs into page images for OCR",
    long_about = "Classify an upload by content (PDF or image), check it against size, page \
and dimension limits, and render PDF pages to width-capped RGB images.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF or image file.
    input: PathBuf,

    /// Write page images into this directory.
    #[arg(short, long, env = "DOCPREP_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Classify and validate only; render nothing.
    #[arg(long)]
    check: bool,

    /// Print a JSON summary instead of a table.
    #[arg(long, env = "DOCPREP_JSON")]
    json: bool,

    /// Rendering DPI (36–600).
    #[arg(long, env = "DOCPREP_DPI", default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(36..=600))]
    dpi: u32,

    /// Maximum rendered page width in pixels.
    #[arg(long, env = "DOCPREP_MAX_WIDTH", default_value_t = 1200)]
    max_width: u32,

    /// Maximum upload size in MB (1 MB = 1 000 000 bytes).
    #[arg(long, env = "DOCPREP_MAX_FILE_MB", default_value_t = 500)]
    max_file_mb: u64,

    /// Maximum image / page width and height in pixels.
    #[arg(long, env = "DOCPREP_MAX_DIMENSION", default_value_t = 10_000)]
    max_dimension: u32,

    /// Maximum number of PDF pages.
    #[arg(long, env = "DOCPREP_MAX_PAGES", default_value_t = 2000)]
    max_pages: usize,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCPREP_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCPREP_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || cli.json {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;
    let bytes = tokio::fs::read(&cli.input)
        .await
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;

    if cli.check {
        return check(bytes, config, &cli).await;
    }

    // Failures are reported once, by anyhow, when `main` returns.
    let outcome = process_async(bytes, config)
        .await
        .context("Processing failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&outcome.summary())
            .context("Failed to serialise summary")?;
        println!("{json}");
    } else if !cli.quiet {
        print_table(&outcome);
    }

    if let Some(ref dir) = cli.output_dir {
        let written = write_pages(outcome, dir).await?;
        if !cli.quiet {
            eprintln!(
                "{} wrote {} file(s) to {}",
                green("✔"),
                written,
                dir.display()
            );
        }
    }

    Ok(())
}

/// Map CLI args to `PipelineConfig`.
fn build_config(cli: &Cli) -> Result<PipelineConfig> {
    PipelineConfig::builder()
        .max_file_mb(cli.max_file_mb)
        .max_dimension(cli.max_dimension)
        .max_pdf_pages(cli.max_pages)
        .dpi(cli.dpi)
        .max_width_px(cli.max_width)
        .build()
        .context("Invalid configuration")
}

async fn check(bytes: Vec<u8>, config: PipelineConfig, cli: &Cli) -> Result<()> {
    let verdict = tokio::task::spawn_blocking(move || -> Result<FileKind> {
        let pipeline = DocumentPipeline::new(config).context("Failed to load PDFium")?;
        let kind = pipeline.classify(&bytes)?;
        pipeline.validate(&bytes, kind)?;
        Ok(kind)
    })
    .await
    .context("Validation task panicked")?;

    if let Some(line) = verdict_line(&verdict, cli.json, cli.quiet) {
        println!("{line}");
    }
    verdict.map(drop)
}

/// What `--check` prints on stdout. A failure in text mode prints nothing
/// here; its message reaches stderr once, through `main`'s error.
fn verdict_line(verdict: &Result<FileKind>, json: bool, quiet: bool) -> Option<String> {
    match (verdict, json) {
        (Ok(kind), true) => Some(serde_json::json!({ "kind": kind, "valid": true }).to_string()),
        (Err(e), true) => {
            Some(serde_json::json!({ "valid": false, "error": format!("{e:#}") }).to_string())
        }
        (Ok(kind), false) if !quiet => Some(format!("{} {} is valid", green("✔"), kind)),
        _ => None,
    }
}

fn print_table(outcome: &ProcessingOutcome) {
    match outcome {
        ProcessingOutcome::Pages(pages) => {
            println!("PDF, {} page(s)", pages.len());
            for page in pages {
                println!(
                    "  page {:>4}  {}",
                    page.index() + 1,
                    dim(&format!("{}x{}", page.width(), page.height()))
                );
            }
        }
        ProcessingOutcome::Image(bytes) => {
            println!("Image, {} bytes (passed through)", bytes.len());
        }
    }
}

/// Write `page-001.png`, ... (or the original image) into `dir`.
async fn write_pages(outcome: ProcessingOutcome, dir: &Path) -> Result<usize> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let encoded = tokio::task::spawn_blocking(move || outcome.into_page_bytes())
        .await
        .context("Encoding task panicked")?
        .context("Failed to encode page images")?;

    let count = encoded.len();
    for (i, page) in encoded.into_iter().enumerate() {
        let path = dir.join(format!("page-{:03}.{}", i + 1, page.extension));
        tokio::fs::write(&path, &page.bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(count)
}
