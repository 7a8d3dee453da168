//! Pipeline stages for document ingestion.
//!
//! Each submodule implements exactly one step. Validation and rendering are
//! separate passes: nothing is rasterised until the whole document has
//! passed every limit, so a rejected upload never costs a render and there
//! is no state where some pages were converted and others refused.
//!
//! ## Data Flow
//!
//! ```text
//! bytes ──▶ detect ──▶ validate ──▶ rasterize (PDF only) ──▶ encode (caller)
//!          (sniff)    (limits)      (pdfium + resize)        (PNG)
//! ```
//!
//! 1. [`detect`]     classify by content: `%PDF` signature or image header
//! 2. [`validate`]   byte size first, then page count / dimensions / integrity
//! 3. [`rasterize`]  render every page at `dpi / 72` and cap the width
//! 4. [`encode`]     lossless PNG for the OCR and storage collaborators

pub mod detect;
pub mod encode;
pub mod rasterize;
pub mod validate;
