//! Universal manuscript text extraction.
//!
//! Dispatches to a format-specific extractor based on file extension and
//! returns plain text plus a page count where the format has pages. Failure
//! modes are distinguishable so the caller can surface an actionable
//! message: encrypted sources, image-only sources, and unsupported formats
//! each get their own error variant.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

mod docx;
mod epub;

// Re-export the extraction boundary types for convenience
pub use chaptersmith_core::{BackendError, ExtractedText, TextBackend};

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("unsupported file format: .{0}")]
    UnsupportedFormat(String),
    #[error("backend error: {0}")]
    Backend(#[from] chaptersmith_core::BackendError),
    #[error("container error: {0}")]
    Container(#[from] zip::result::ZipError),
    #[error("malformed document XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("no extractable text in document")]
    NoText,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(not(feature = "pdf"))]
    #[error("PDF support not compiled in (enable the `pdf` feature of chaptersmith-extract)")]
    NoPdfSupport,
}

/// Extract text from a manuscript file.
///
/// Dispatches on file extension:
/// - `.pdf` → MuPDF backend (requires the `pdf` feature)
/// - `.epub` → zip container, XHTML content documents in reading order
/// - `.docx` → zip container, `word/document.xml` paragraph traversal
/// - `.txt` → UTF-8 with lossy fallback
pub fn extract_text(path: &Path) -> Result<ExtractedText, ExtractError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    tracing::info!(path = %path.display(), format = %ext, "extracting manuscript text");

    let extracted = match ext.as_str() {
        "pdf" => extract_pdf(path)?,
        "epub" => epub::extract(path)?,
        "docx" => docx::extract(path)?,
        "txt" | "text" => extract_txt(path)?,
        other => return Err(ExtractError::UnsupportedFormat(other.to_string())),
    };

    let text = clean_text(&extracted.text);
    if text.trim().is_empty() {
        return Err(ExtractError::NoText);
    }

    tracing::info!(
        chars = text.len(),
        pages = ?extracted.page_count,
        "extraction complete"
    );
    Ok(ExtractedText {
        text,
        page_count: extracted.page_count,
    })
}

#[cfg(feature = "pdf")]
fn extract_pdf(path: &Path) -> Result<ExtractedText, ExtractError> {
    let backend = chaptersmith_pdf_mupdf::MupdfTextBackend::default();
    Ok(backend.extract_text(path)?)
}

#[cfg(not(feature = "pdf"))]
fn extract_pdf(_path: &Path) -> Result<ExtractedText, ExtractError> {
    Err(ExtractError::NoPdfSupport)
}

fn extract_txt(path: &Path) -> Result<ExtractedText, ExtractError> {
    let bytes = std::fs::read(path)?;
    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(path = %path.display(), "text file is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };
    Ok(ExtractedText {
        text,
        page_count: None,
    })
}

static TRAILING_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+\n").unwrap());
static BLANK_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Normalize extracted whitespace: trailing spaces removed, runs of blank
/// lines collapsed to one.
fn clean_text(text: &str) -> String {
    let text = TRAILING_SPACE_RE.replace_all(text, "\n");
    BLANK_RUN_RE.replace_all(&text, "\n\n").into_owned()
}
