//! Prompts for per-page report interpretation.

use crate::analysis::VisionAnalysis;

/// System message for page interpretation.
pub const SYSTEM_MESSAGE: &str = "You are a helpful data-analysis assistant.\n\
Your input consists of:\n\
1. OCR text extracted from an image\n\
2. A URL pointing to the image itself\n\n\
Your task is to:\n\
- interpret both the visual content (from URL) and the OCR text\n\
- produce a structured, factual summary\n\
- Do NOT hallucinate values that aren't present in the data";

/// Closing instruction appended to every page prompt.
pub const INTERPRETATION_INSTRUCTION: &str =
    "Use both the OCR text and visual information from the image URL to create a factual summary.";

/// Build the user prompt for one page.
pub fn interpretation_prompt(analysis: &VisionAnalysis, image_url: &str) -> String {
    format!(
        "Caption: {}\nText: {}\nImage URL: {}\n\n{}",
        analysis.caption_or_default(),
        analysis.lines_or_default().join("\n"),
        image_url,
        INTERPRETATION_INSTRUCTION
    )
}

/// Heading placed before each page's summary in the assembled document
/// (`page_num` is 1-indexed).
pub fn page_heading(page_num: usize) -> String {
    format!("\n\n### Page {page_num}\n")
}
