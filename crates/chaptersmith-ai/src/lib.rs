//! LLM-backed collaborators for the audiobook pipeline.
//!
//! Everything here sits behind traits so the chaptering core never depends
//! on network calls: callers inject a [`ContentClassifier`] /
//! [`MetadataExtractor`] / [`VoiceRecommender`] implementation, and tests
//! use the in-process mock and catalog matcher. All HTTP calls carry an
//! explicit timeout and a cancellation token, and are cancellable
//! independently of the chaptering core, which has no dependency on their
//! results.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub mod catalog;
pub mod mock;
pub mod openai;
pub mod sampling;

pub use catalog::CatalogVoiceMatcher;
pub use mock::MockClassifier;
pub use openai::OpenAiAnalyzer;
pub use sampling::sample_for_analysis;

#[derive(Error, Debug)]
pub enum AiError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {0}")]
    Api(String),
    #[error("malformed API response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("operation cancelled")]
    Cancelled,
}

/// Verdict from the content suitability gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuitabilityVerdict {
    pub is_suitable: bool,
    #[serde(default)]
    pub document_type: String,
    #[serde(default)]
    pub estimated_genre: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub rejection_category: Option<String>,
}

impl SuitabilityVerdict {
    /// The degrade-open verdict used when the classifier itself fails:
    /// processing continues rather than blocking on a collaborator outage.
    pub fn degraded_open() -> Self {
        Self {
            is_suitable: true,
            document_type: "Unknown".to_string(),
            estimated_genre: "Unknown".to_string(),
            confidence: 0.5,
            reason: "Validation check failed".to_string(),
            rejection_category: None,
        }
    }

    /// User-facing message for a rejection, keyed by category.
    pub fn user_message(&self) -> Option<&'static str> {
        if self.is_suitable {
            return None;
        }
        Some(match self.rejection_category.as_deref() {
            Some("template") => {
                "This appears to be a template document, not a book. Our service is for audiobook production, not template processing."
            }
            Some("guide") => {
                "This appears to be a guide or instruction manual, not a book suitable for audiobook narration."
            }
            Some("report") => {
                "This appears to be a report or analysis document, not a narrative book."
            }
            Some("manual") => {
                "This appears to be a technical or user manual, not a book for audiobook production."
            }
            Some("academic") => {
                "This appears to be an academic paper or research document, not a narrative book."
            }
            _ => {
                "This document is not suitable for audiobook production. We accept narrative books and stories only."
            }
        })
    }
}

/// Book-level metadata extracted from a sampled excerpt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookAnalysis {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subtitle: Option<String>,
    pub genre: Option<String>,
    pub tone: Option<String>,
    pub target_audience: Option<String>,
    /// Nationality / cultural setting, used for accent matching.
    pub cultural_context: Option<String>,
}

/// A ranked narrator voice recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceMatch {
    pub name: String,
    pub gender: String,
    pub age_range: String,
    pub accent: String,
    pub match_percentage: u32,
    #[serde(default)]
    pub characteristics: Vec<String>,
    #[serde(default)]
    pub rationale: String,
}

/// Boxed future type for dyn-compatible async trait methods.
pub type AiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, AiError>> + Send + 'a>>;

/// Classifies whether a document is suitable for audiobook production.
/// A black box to the rest of the system; only the call contract matters.
pub trait ContentClassifier: Send + Sync {
    fn classify<'a>(
        &'a self,
        sample: &'a str,
        cancel: &'a CancellationToken,
    ) -> AiFuture<'a, SuitabilityVerdict>;
}

/// Extracts book metadata (title, author, genre, tone) from sampled text.
pub trait MetadataExtractor: Send + Sync {
    fn extract_metadata<'a>(
        &'a self,
        sample: &'a str,
        cancel: &'a CancellationToken,
    ) -> AiFuture<'a, BookAnalysis>;
}

/// Recommends narrator voices for a book, ranked by fit.
pub trait VoiceRecommender: Send + Sync {
    fn recommend<'a>(
        &'a self,
        analysis: &'a BookAnalysis,
        cancel: &'a CancellationToken,
    ) -> AiFuture<'a, Vec<VoiceMatch>>;
}
