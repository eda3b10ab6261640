//! Mock classifier for testing pipeline wiring without network access.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio_util::sync::CancellationToken;

use crate::{AiError, AiFuture, ContentClassifier, SuitabilityVerdict};

/// A hand-rolled mock implementing [`ContentClassifier`] for tests.
///
/// Returns a fixed verdict (or a fixed error) and counts calls.
pub struct MockClassifier {
    verdict: Option<SuitabilityVerdict>,
    error: Option<String>,
    call_count: AtomicUsize,
}

impl MockClassifier {
    /// A mock that always accepts with the given document type.
    pub fn suitable(document_type: &str) -> Self {
        Self {
            verdict: Some(SuitabilityVerdict {
                is_suitable: true,
                document_type: document_type.to_string(),
                estimated_genre: "Fiction".to_string(),
                confidence: 0.95,
                reason: "mock".to_string(),
                rejection_category: None,
            }),
            error: None,
            call_count: AtomicUsize::new(0),
        }
    }

    /// A mock that always rejects with the given category.
    pub fn unsuitable(category: &str) -> Self {
        Self {
            verdict: Some(SuitabilityVerdict {
                is_suitable: false,
                document_type: "Template".to_string(),
                estimated_genre: String::new(),
                confidence: 0.9,
                reason: "mock rejection".to_string(),
                rejection_category: Some(category.to_string()),
            }),
            error: None,
            call_count: AtomicUsize::new(0),
        }
    }

    /// A mock that always fails, for exercising degrade-open paths.
    pub fn failing(message: &str) -> Self {
        Self {
            verdict: None,
            error: Some(message.to_string()),
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl ContentClassifier for MockClassifier {
    fn classify<'a>(
        &'a self,
        _sample: &'a str,
        _cancel: &'a CancellationToken,
    ) -> AiFuture<'a, SuitabilityVerdict> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let verdict = self.verdict.clone();
        let error = self.error.clone();
        Box::pin(async move {
            match (verdict, error) {
                (Some(v), _) => Ok(v),
                (None, Some(e)) => Err(AiError::Api(e)),
                (None, None) => Err(AiError::Api("mock misconfigured".to_string())),
            }
        })
    }
}
