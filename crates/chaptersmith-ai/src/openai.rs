//! OpenAI-compatible chat-completions client for the collaborator traits.
//!
//! Every request carries an explicit timeout and honors a cancellation
//! token; JSON answers are requested via `response_format` and defensively
//! stripped of markdown code fences before parsing.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::{
    AiError, AiFuture, BookAnalysis, ContentClassifier, MetadataExtractor, SuitabilityVerdict,
    VoiceMatch, VoiceRecommender,
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4.1-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub struct OpenAiAnalyzer {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAiAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiAnalyzer")
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiAnalyzer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send a chat request expecting a JSON object back.
    async fn chat_json(
        &self,
        system: &str,
        user: &str,
        cancel: &CancellationToken,
    ) -> Result<Value, AiError> {
        let request = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "temperature": 0.1,
            "response_format": {"type": "json_object"},
        });

        let send = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send();

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AiError::Cancelled),
            result = tokio::time::timeout(self.timeout, send) => match result {
                Err(_) => return Err(AiError::Timeout(self.timeout.as_secs())),
                Ok(Err(e)) => return Err(AiError::Http(e)),
                Ok(Ok(response)) => response,
            },
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Api(format!(
                "{}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: Message,
        }
        #[derive(Deserialize)]
        struct Message {
            content: String,
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| AiError::Api("empty choices in response".to_string()))?;

        Ok(serde_json::from_str(strip_code_fences(content).trim())?)
    }
}

static CODE_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^```(?:json)?\s*|\s*```\s*$").unwrap());

/// Models sometimes wrap JSON answers in markdown fences despite the
/// response-format instruction.
fn strip_code_fences(content: &str) -> String {
    CODE_FENCE_RE.replace_all(content.trim(), "").into_owned()
}

fn classify_prompt(sample: &str) -> String {
    format!(
        r#"You are a strict content validator for an audiobook production service.

Analyze this document and determine if it is suitable for audiobook production.

Document sample:
{sample}

ACCEPT ONLY:
- Fiction books (novels, short stories, novellas)
- Non-fiction narrative books (memoirs, biographies, autobiographies)
- Self-help books with narrative structure
- Educational books with narrative flow
- Sample chapters from books

REJECT ALL:
- Business proposals or templates
- Deployment guides, setup instructions, how-to guides
- Technical documentation, API documentation
- Requirements documents (SRS, PRD, specifications)
- Templates of any kind (forms, applications, etc.)
- Academic papers, research papers
- Reports (business, technical, analysis)
- Presentations, slide decks
- Reference materials, glossaries
- Marketing materials, brochures
- Legal documents, contracts
- Instruction manuals, user guides

Return ONLY a JSON object:
{{
    "is_suitable": true/false,
    "document_type": "Novel/Memoir/Template/Guide/Report/etc",
    "estimated_genre": "Fiction/Non-fiction/Memoir/etc",
    "confidence": 0.0-1.0,
    "reason": "Brief explanation",
    "rejection_category": "template/guide/report/manual/academic" (if rejected)
}}"#
    )
}

fn metadata_prompt(sample: &str) -> String {
    format!(
        r#"Extract book metadata from this text sample.

Text sample:
{sample}

Return ONLY a JSON object with these fields (null where unknown):
{{
    "title": "...",
    "author": "...",
    "subtitle": "...",
    "genre": "memoir/fiction/non-fiction/etc",
    "tone": "serious/light/dramatic/etc",
    "target_audience": "age range like 30-40",
    "cultural_context": "nationality or cultural setting"
}}"#
    )
}

fn recommend_prompt(analysis: &BookAnalysis) -> String {
    format!(
        r#"Recommend ideal audiobook narrator voices for this book.

Book analysis:
{}

Return ONLY a JSON object:
{{
    "recommendations": [
        {{
            "name": "...",
            "gender": "...",
            "age_range": "...",
            "accent": "...",
            "match_percentage": 0-100,
            "characteristics": ["..."],
            "rationale": "..."
        }}
    ]
}}
Rank by fit, best first, at most 4 entries."#,
        serde_json::to_string_pretty(analysis).unwrap_or_default()
    )
}

impl ContentClassifier for OpenAiAnalyzer {
    fn classify<'a>(
        &'a self,
        sample: &'a str,
        cancel: &'a CancellationToken,
    ) -> AiFuture<'a, SuitabilityVerdict> {
        Box::pin(async move {
            let value = self
                .chat_json(
                    "You are a strict content validator. Reject anything that is not a narrative book or story.",
                    &classify_prompt(sample),
                    cancel,
                )
                .await?;
            let verdict: SuitabilityVerdict = serde_json::from_value(value)?;
            tracing::info!(
                suitable = verdict.is_suitable,
                document_type = %verdict.document_type,
                "content classification complete"
            );
            Ok(verdict)
        })
    }
}

impl MetadataExtractor for OpenAiAnalyzer {
    fn extract_metadata<'a>(
        &'a self,
        sample: &'a str,
        cancel: &'a CancellationToken,
    ) -> AiFuture<'a, BookAnalysis> {
        Box::pin(async move {
            let value = self
                .chat_json(
                    "You extract bibliographic metadata from book text.",
                    &metadata_prompt(sample),
                    cancel,
                )
                .await?;
            Ok(serde_json::from_value(value)?)
        })
    }
}

impl VoiceRecommender for OpenAiAnalyzer {
    fn recommend<'a>(
        &'a self,
        analysis: &'a BookAnalysis,
        cancel: &'a CancellationToken,
    ) -> AiFuture<'a, Vec<VoiceMatch>> {
        Box::pin(async move {
            let value = self
                .chat_json(
                    "You are an audiobook casting director matching narrator voices to books.",
                    &recommend_prompt(analysis),
                    cancel,
                )
                .await?;
            let recommendations = value
                .get("recommendations")
                .cloned()
                .ok_or_else(|| AiError::Api("missing recommendations field".to_string()))?;
            Ok(serde_json::from_value(recommendations)?)
        })
    }
}
