//! Chapter quality scoring and the acceptance gate.
//!
//! Each assembled chapter gets a confidence score in [0, 1] from a weighted
//! sum of content-quality signals. Chapters at or above the acceptance
//! threshold are validated; the rest are surfaced as low-confidence so a
//! human can review them instead of trusting a silent accuracy claim.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::text_utils::floor_char_boundary;
use crate::{Chapter, ChapterSource};

/// Weights for the quality scoring function.
///
/// Each weight controls the relative importance of a signal:
/// - `word_count`: longer chapters are more likely to be real chapters
/// - `sentence_density`: prose has sentence punctuation; furniture doesn't
/// - `title`: penalizes empty, numeric, over-long, or all-caps titles
/// - `position`: a nonzero body offset means this wasn't a degenerate start
/// - `repetition`: a single token dominating the opening text indicates
///   extraction garbage
///
/// The defaults are empirically chosen constants carried from production
/// tuning, not derived values; treat them as a starting point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityWeights {
    pub word_count: f64,
    pub sentence_density: f64,
    pub title: f64,
    pub position: f64,
    pub repetition: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            word_count: 0.30,
            sentence_density: 0.25,
            title: 0.20,
            position: 0.15,
            repetition: 0.10,
        }
    }
}

/// Score a chapter's quality. Pure function over already-assembled data;
/// returns a value in [0, 1] where higher is better.
pub fn score_chapter(chapter: &Chapter, weights: &QualityWeights) -> f64 {
    let mut score = 0.0;

    // 1. Content length, tiered by word count
    score += weights.word_count
        * if chapter.word_count > 2000 {
            1.0
        } else if chapter.word_count > 1000 {
            2.0 / 3.0
        } else if chapter.word_count > 500 {
            1.0 / 3.0
        } else {
            0.0
        };

    // 2. Sentence density via terminal punctuation count
    let sentences = chapter
        .content
        .chars()
        .filter(|c| matches!(c, '.' | '!' | '?'))
        .count();
    score += weights.sentence_density
        * if sentences > 20 {
            1.0
        } else if sentences > 10 {
            0.6
        } else if sentences > 5 {
            0.2
        } else {
            0.0
        };

    // 3. Title validity
    if is_valid_title(&chapter.title) {
        score += weights.title;
    }

    // 4. Nonzero body position
    if chapter.position > 0 {
        score += weights.position;
    }

    // 5. Absence of excessive repetition
    if !has_excessive_repetition(&chapter.content) {
        score += weights.repetition;
    }

    score.min(1.0)
}

/// A plausible chapter title: not empty, not over-long, not a bare number,
/// not a long all-caps run (likely a page header).
fn is_valid_title(title: &str) -> bool {
    let trimmed = title.trim();
    if trimmed.len() < 3 || trimmed.len() > 100 {
        return false;
    }
    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let has_alpha = trimmed.chars().any(|c| c.is_alphabetic());
    let has_lower = trimmed.chars().any(|c| c.is_lowercase());
    if has_alpha && !has_lower && trimmed.len() > 10 {
        return false;
    }
    true
}

/// Sample the first 500 chars; if any single token exceeds 30% of the
/// sampled token count (or there are fewer than 10 tokens), the content
/// looks like extraction garbage.
fn has_excessive_repetition(content: &str) -> bool {
    let end = floor_char_boundary(content, 500);
    let sample = &content[..end];
    let words: Vec<&str> = sample.split_whitespace().collect();

    if words.len() < 10 {
        return true;
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for word in &words {
        *counts.entry(word).or_insert(0) += 1;
    }
    let max_count = counts.values().copied().max().unwrap_or(0);

    max_count as f64 > words.len() as f64 * 0.3
}

/// Split chapters into (validated, low-confidence) at the acceptance
/// threshold, assigning each chapter its score as confidence.
///
/// The synthetic whole-book chapter is exempt: it is the terminal fallback,
/// not a scored candidate, and always passes through.
pub fn gate_chapters(
    chapters: Vec<Chapter>,
    weights: &QualityWeights,
    threshold: f64,
) -> (Vec<Chapter>, Vec<Chapter>) {
    let mut validated = Vec::new();
    let mut low_confidence = Vec::new();

    for mut chapter in chapters {
        if chapter.source == ChapterSource::WholeBook {
            validated.push(chapter);
            continue;
        }
        let score = score_chapter(&chapter, weights);
        chapter.confidence = score;
        if score >= threshold {
            tracing::debug!(title = %chapter.title, score, "chapter validated");
            validated.push(chapter);
        } else {
            tracing::warn!(title = %chapter.title, score, "chapter below confidence threshold");
            low_confidence.push(chapter);
        }
    }

    (validated, low_confidence)
}
