//! Deterministic in-process voice matching against a built-in catalog.
//!
//! Usable offline and in tests; the LLM-backed recommender is layered on
//! top when an API key is available. Scoring is a fixed-weight trait
//! match: genre 30, tone 25, target audience 20, accent 25.

use tokio_util::sync::CancellationToken;

use crate::{AiFuture, BookAnalysis, VoiceMatch, VoiceRecommender};

/// A narrator voice profile in the built-in catalog.
#[derive(Debug, Clone)]
pub struct VoiceProfile {
    pub name: &'static str,
    pub gender: &'static str,
    pub age_range: &'static str,
    pub accent: &'static str,
    pub genre: &'static str,
    pub tone: &'static str,
    pub characteristics: &'static [&'static str],
}

const CATALOG: &[VoiceProfile] = &[
    VoiceProfile {
        name: "Marcus",
        gender: "Male",
        age_range: "30-40",
        accent: "American",
        genre: "memoir",
        tone: "serious",
        characteristics: &["warm", "authoritative", "emotional"],
    },
    VoiceProfile {
        name: "Sophia",
        gender: "Female",
        age_range: "25-35",
        accent: "British",
        genre: "fiction",
        tone: "light",
        characteristics: &["elegant", "clear", "engaging"],
    },
    VoiceProfile {
        name: "David",
        gender: "Male",
        age_range: "40-50",
        accent: "American",
        genre: "non-fiction",
        tone: "serious",
        characteristics: &["professional", "authoritative", "clear"],
    },
    VoiceProfile {
        name: "Emma",
        gender: "Female",
        age_range: "30-40",
        accent: "International",
        genre: "memoir",
        tone: "dramatic",
        characteristics: &["emotional", "expressive", "warm"],
    },
];

/// Score one profile against the book analysis.
fn score_profile(profile: &VoiceProfile, analysis: &BookAnalysis) -> u32 {
    let mut score = 0;

    let matches_ci = |field: &Option<String>, value: &str| {
        field
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case(value))
    };

    if matches_ci(&analysis.genre, profile.genre) {
        score += 30;
    }
    if matches_ci(&analysis.tone, profile.tone) {
        score += 25;
    }
    if matches_ci(&analysis.target_audience, profile.age_range) {
        score += 20;
    }
    if matches_ci(&analysis.cultural_context, profile.accent) {
        score += 25;
    }

    score.min(100)
}

/// Deterministic [`VoiceRecommender`] over the built-in catalog.
pub struct CatalogVoiceMatcher {
    top_n: usize,
}

impl Default for CatalogVoiceMatcher {
    fn default() -> Self {
        Self { top_n: 4 }
    }
}

impl CatalogVoiceMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Rank the catalog for a book. Ties break by catalog order, so the
    /// result is fully deterministic.
    pub fn rank(&self, analysis: &BookAnalysis) -> Vec<VoiceMatch> {
        let mut scored: Vec<(usize, u32)> = CATALOG
            .iter()
            .enumerate()
            .map(|(i, profile)| (i, score_profile(profile, analysis)))
            .collect();
        scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        scored
            .into_iter()
            .take(self.top_n)
            .map(|(i, score)| {
                let profile = &CATALOG[i];
                VoiceMatch {
                    name: profile.name.to_string(),
                    gender: profile.gender.to_string(),
                    age_range: profile.age_range.to_string(),
                    accent: profile.accent.to_string(),
                    match_percentage: score,
                    characteristics: profile
                        .characteristics
                        .iter()
                        .map(|c| c.to_string())
                        .collect(),
                    rationale: format!("Matches {}% of book characteristics", score),
                }
            })
            .collect()
    }
}

impl VoiceRecommender for CatalogVoiceMatcher {
    fn recommend<'a>(
        &'a self,
        analysis: &'a BookAnalysis,
        _cancel: &'a CancellationToken,
    ) -> AiFuture<'a, Vec<VoiceMatch>> {
        let matches = self.rank(analysis);
        Box::pin(async move { Ok(matches) })
    }
}
