//! Contracts for the external collaborators used after ingestion.
//!
//! The crate ships no network clients. Callers plug in their own vision,
//! summarisation and storage services by implementing these traits. Only
//! the caption and the recognised lines cross the boundary.

use crate::error::ServiceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Placeholder used when the vision service returns no caption.
pub const NO_CAPTION: &str = "No Caption detected";

/// Placeholder used when the vision service returns no text.
pub const NO_TEXT_LINES: &str = "No text lines detected";

/// What a vision service saw on one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisionAnalysis {
    pub caption: Option<String>,
    /// Recognised text lines in reading order.
    pub lines: Vec<String>,
}

impl VisionAnalysis {
    pub fn new(caption: Option<String>, lines: Vec<String>) -> Self {
        Self { caption, lines }
    }

    pub fn caption_or_default(&self) -> &str {
        self.caption.as_deref().unwrap_or(NO_CAPTION)
    }

    /// The recognised lines, or a single placeholder line when there are none.
    pub fn lines_or_default(&self) -> Vec<&str> {
        if self.lines.is_empty() {
            vec![NO_TEXT_LINES]
        } else {
            self.lines.iter().map(String::as_str).collect()
        }
    }
}

/// One chat-completion request for a page summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: usize,
}

/// Captioning + text recognition over raw image bytes (PNG, JPEG, …).
#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    async fn analyze(&self, image: &[u8]) -> Result<VisionAnalysis, ServiceError>;
}

/// Free-text summarisation by a language model.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, request: SummaryRequest) -> Result<String, ServiceError>;
}

/// Object storage returning a publicly fetchable URL for uploaded bytes.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// `extension` is given without the leading dot, e.g. `"png"`.
    async fn upload(&self, bytes: Vec<u8>, extension: Option<&str>) -> Result<String, ServiceError>;
}
