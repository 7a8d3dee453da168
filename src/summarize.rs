//! Report summarisation: run every processed page through the storage,
//! vision and summariser collaborators and assemble one Markdown summary.
//!
//! ## Per-page flow
//!
//! ```text
//! page bytes ──▶ vision.analyze ──▶ store.upload ──▶ summarizer.summarize
//!                (caption, lines)   (page URL)       (system + prompt)
//! ```
//!
//! Each page gets its own stored image and URL, so the model is always
//! pointed at the page it is summarising. Pages run with bounded
//! concurrency but the results keep document order; the first failure
//! aborts the whole summary with its page number attached.

use crate::analysis::{ObjectStore, Summarizer, SummaryRequest, VisionAnalysis, VisionAnalyzer};
use crate::config::PipelineConfig;
use crate::error::SummaryError;
use crate::output::{image_extension, ProcessingOutcome};
use crate::pipeline::encode::encode_png;
use crate::process::process_async;
use crate::prompts::{interpretation_prompt, page_heading, SYSTEM_MESSAGE};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// The services a summary needs.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub vision: &'a dyn VisionAnalyzer,
    pub summarizer: &'a dyn Summarizer,
    pub store: &'a dyn ObjectStore,
}

/// Knobs for [`summarize_outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryOptions {
    /// Pages in flight at once. Default: 4.
    pub concurrency: usize,
    /// Sampling temperature for the summariser. Default: 0.3.
    pub temperature: f32,
    /// Output token cap per page. Default: 800.
    pub max_tokens: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            temperature: 0.3,
            max_tokens: 800,
        }
    }
}

/// One page's trail through the collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSummary {
    /// 1-indexed.
    pub page_num: usize,
    pub image_url: String,
    pub analysis: VisionAnalysis,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub pages: Vec<PageSummary>,
    /// All page summaries under `### Page N` headings.
    pub text: String,
}

/// Process `bytes` and summarise the result.
///
/// `extension` is the upload's original extension; it is only used to name
/// the stored object for image uploads.
pub async fn summarize_document(
    bytes: Vec<u8>,
    extension: Option<&str>,
    config: PipelineConfig,
    collaborators: Collaborators<'_>,
    options: &SummaryOptions,
) -> Result<DocumentSummary, SummaryError> {
    let outcome = process_async(bytes, config).await?;
    summarize_outcome(outcome, extension, collaborators, options).await
}

/// Summarise an already-processed document.
pub async fn summarize_outcome(
    outcome: ProcessingOutcome,
    extension: Option<&str>,
    collaborators: Collaborators<'_>,
    options: &SummaryOptions,
) -> Result<DocumentSummary, SummaryError> {
    let encoded = encode_pages(outcome, extension)?;
    info!("Summarising {} pages", encoded.len());

    let pages: Vec<PageSummary> = stream::iter(
        encoded
            .into_iter()
            .enumerate()
            .map(|(i, (bytes, ext))| summarize_page(i + 1, bytes, ext, collaborators, options)),
    )
    .buffered(options.concurrency.max(1))
    .try_collect()
    .await?;

    let mut text = String::new();
    for page in &pages {
        text.push_str(&page_heading(page.page_num));
        text.push_str(&page.summary);
    }

    Ok(DocumentSummary { pages, text })
}

fn encode_pages(
    outcome: ProcessingOutcome,
    extension: Option<&str>,
) -> Result<Vec<(Vec<u8>, String)>, SummaryError> {
    match outcome {
        ProcessingOutcome::Pages(pages) => pages
            .iter()
            .map(|page| {
                encode_png(page)
                    .map(|png| (png, "png".to_string()))
                    .map_err(|e| SummaryError::Encode {
                        page: page.index() + 1,
                        detail: e.to_string(),
                    })
            })
            .collect(),
        ProcessingOutcome::Image(bytes) => {
            let ext = match extension.map(|e| e.trim_start_matches('.')) {
                Some(e) if !e.is_empty() => e.to_string(),
                _ => image_extension(&bytes).to_string(),
            };
            Ok(vec![(bytes, ext)])
        }
    }
}

async fn summarize_page(
    page_num: usize,
    bytes: Vec<u8>,
    extension: String,
    collaborators: Collaborators<'_>,
    options: &SummaryOptions,
) -> Result<PageSummary, SummaryError> {
    let analysis = collaborators
        .vision
        .analyze(&bytes)
        .await
        .map_err(|source| SummaryError::Vision {
            page: page_num,
            source,
        })?;
    debug!(
        "Page {}: {} text lines, caption {:?}",
        page_num,
        analysis.lines.len(),
        analysis.caption
    );

    let image_url = collaborators
        .store
        .upload(bytes, Some(&extension))
        .await
        .map_err(|source| SummaryError::Storage {
            page: page_num,
            source,
        })?;

    let request = SummaryRequest {
        system: SYSTEM_MESSAGE.to_string(),
        prompt: interpretation_prompt(&analysis, &image_url),
        temperature: options.temperature,
        max_tokens: options.max_tokens,
    };
    let summary = collaborators
        .summarizer
        .summarize(request)
        .await
        .map_err(|source| SummaryError::Summarizer {
            page: page_num,
            source,
        })?;

    Ok(PageSummary {
        page_num,
        image_url,
        analysis,
        summary,
    })
}
