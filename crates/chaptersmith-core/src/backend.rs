use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open document: {0}")]
    OpenError(String),
    #[error("document is password-protected")]
    Encrypted,
    #[error("no extractable text layer (scanned or image-only document)")]
    NoTextLayer,
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Text extracted from a manuscript file.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub text: String,
    /// Page count when the source format has pages (PDF); `None` otherwise.
    pub page_count: Option<usize>,
}

/// Trait for manuscript text extraction backends.
///
/// Implementors provide the low-level "bytes in, plain text out" step; the
/// chaptering pipeline (TOC extraction, body location, assembly, scoring)
/// lives in [`crate::splitter`] and never performs I/O itself.
///
/// Backends must fail with a distinguishable error ([`BackendError::Encrypted`],
/// [`BackendError::NoTextLayer`]) when the source cannot yield text, so the
/// caller can surface an actionable message instead of a generic failure.
pub trait TextBackend: Send + Sync {
    /// Extract the full text content of a manuscript file.
    fn extract_text(&self, path: &Path) -> Result<ExtractedText, BackendError>;
}
