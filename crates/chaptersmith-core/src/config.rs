use regex::Regex;

use crate::locate::MatchStrategy;
use crate::quality::QualityWeights;

/// Configuration for the chapter splitting pipeline.
///
/// Regex fields are `Option<Regex>` — `None` means "use the built-in
/// default". Use [`SplitterConfigBuilder`] to construct from string
/// patterns; it fails fast on invalid patterns.
#[derive(Debug, Clone)]
pub struct SplitterConfig {
    // ── toc.rs ──
    /// How far into the document to look for the TOC anchor (chars).
    pub(crate) toc_anchor_window: usize,
    /// How many chars after the anchor to scan for TOC entries.
    pub(crate) toc_scan_window: usize,
    /// Search-start offset used when no TOC end marker can be found.
    pub(crate) default_search_start: usize,
    /// Maximum length of a line considered as a TOC entry.
    pub(crate) max_toc_line_len: usize,
    /// Override for the TOC anchor pattern ("contents", ...).
    pub(crate) toc_anchor_re: Option<Regex>,
    /// Override for the special-section pattern (Prologue, Epilogue, ...).
    pub(crate) special_section_re: Option<Regex>,

    // ── locate.rs ──
    /// Ordered list of matching strategies tried per TOC entry.
    pub(crate) strategy_order: Vec<MatchStrategy>,
    /// Minimum similarity ratio for the fuzzy fallback.
    pub(crate) fuzzy_threshold: f64,
    /// Uppercase ratio above which following text marks a running header.
    pub(crate) header_uppercase_ratio: f64,
    /// How many chars after a candidate match the header filter inspects.
    pub(crate) header_lookahead: usize,

    // ── assemble.rs / fallback.rs ──
    /// Minimum words for a chapter located via TOC or user list.
    pub(crate) min_chapter_words: usize,
    /// Lower minimum applied to regex-only pattern fallback sections.
    pub(crate) section_marker_min_words: usize,
    /// Pattern hits closer than this (chars) to the previous accepted hit
    /// are discarded as duplicates.
    pub(crate) pattern_dedup_distance: usize,

    // ── quality.rs ──
    /// Chapters scoring at or above this are validated.
    pub(crate) accept_threshold: f64,
    /// Weights for the quality scoring function.
    pub(crate) weights: Option<QualityWeights>,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            toc_anchor_window: 5_000,
            toc_scan_window: 3_000,
            default_search_start: 5_000,
            max_toc_line_len: 100,
            toc_anchor_re: None,
            special_section_re: None,
            strategy_order: MatchStrategy::default_order().to_vec(),
            fuzzy_threshold: 0.80,
            header_uppercase_ratio: 0.7,
            header_lookahead: 100,
            min_chapter_words: 500,
            section_marker_min_words: 50,
            pattern_dedup_distance: 500,
            accept_threshold: 0.75,
            weights: None,
        }
    }
}

impl SplitterConfig {
    pub fn builder() -> SplitterConfigBuilder {
        SplitterConfigBuilder::new()
    }

    /// Get the quality weights, using defaults if not configured.
    pub(crate) fn quality_weights(&self) -> QualityWeights {
        self.weights.clone().unwrap_or_default()
    }

    pub fn min_chapter_words(&self) -> usize {
        self.min_chapter_words
    }

    pub fn accept_threshold(&self) -> f64 {
        self.accept_threshold
    }
}

/// Builder for [`SplitterConfig`].
///
/// Accepts string patterns that are compiled to `Regex` in
/// [`build()`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct SplitterConfigBuilder {
    toc_anchor_window: Option<usize>,
    toc_scan_window: Option<usize>,
    default_search_start: Option<usize>,
    max_toc_line_len: Option<usize>,
    toc_anchor_re: Option<String>,
    special_section_re: Option<String>,
    strategy_order: Option<Vec<MatchStrategy>>,
    fuzzy_threshold: Option<f64>,
    header_uppercase_ratio: Option<f64>,
    header_lookahead: Option<usize>,
    min_chapter_words: Option<usize>,
    section_marker_min_words: Option<usize>,
    pattern_dedup_distance: Option<usize>,
    accept_threshold: Option<f64>,
    weights: Option<QualityWeights>,
}

impl SplitterConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toc_anchor_window(mut self, chars: usize) -> Self {
        self.toc_anchor_window = Some(chars);
        self
    }

    pub fn toc_scan_window(mut self, chars: usize) -> Self {
        self.toc_scan_window = Some(chars);
        self
    }

    pub fn default_search_start(mut self, offset: usize) -> Self {
        self.default_search_start = Some(offset);
        self
    }

    pub fn max_toc_line_len(mut self, chars: usize) -> Self {
        self.max_toc_line_len = Some(chars);
        self
    }

    pub fn toc_anchor_regex(mut self, pattern: impl Into<String>) -> Self {
        self.toc_anchor_re = Some(pattern.into());
        self
    }

    pub fn special_section_regex(mut self, pattern: impl Into<String>) -> Self {
        self.special_section_re = Some(pattern.into());
        self
    }

    pub fn strategy_order(mut self, order: Vec<MatchStrategy>) -> Self {
        self.strategy_order = Some(order);
        self
    }

    pub fn fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_threshold = Some(threshold);
        self
    }

    pub fn header_uppercase_ratio(mut self, ratio: f64) -> Self {
        self.header_uppercase_ratio = Some(ratio);
        self
    }

    pub fn header_lookahead(mut self, chars: usize) -> Self {
        self.header_lookahead = Some(chars);
        self
    }

    pub fn min_chapter_words(mut self, words: usize) -> Self {
        self.min_chapter_words = Some(words);
        self
    }

    pub fn section_marker_min_words(mut self, words: usize) -> Self {
        self.section_marker_min_words = Some(words);
        self
    }

    pub fn pattern_dedup_distance(mut self, chars: usize) -> Self {
        self.pattern_dedup_distance = Some(chars);
        self
    }

    pub fn accept_threshold(mut self, threshold: f64) -> Self {
        self.accept_threshold = Some(threshold);
        self
    }

    pub fn quality_weights(mut self, weights: QualityWeights) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Compile pattern overrides and produce the config.
    pub fn build(self) -> Result<SplitterConfig, regex::Error> {
        let defaults = SplitterConfig::default();
        Ok(SplitterConfig {
            toc_anchor_window: self.toc_anchor_window.unwrap_or(defaults.toc_anchor_window),
            toc_scan_window: self.toc_scan_window.unwrap_or(defaults.toc_scan_window),
            default_search_start: self
                .default_search_start
                .unwrap_or(defaults.default_search_start),
            max_toc_line_len: self.max_toc_line_len.unwrap_or(defaults.max_toc_line_len),
            toc_anchor_re: self.toc_anchor_re.map(|p| Regex::new(&p)).transpose()?,
            special_section_re: self
                .special_section_re
                .map(|p| Regex::new(&p))
                .transpose()?,
            strategy_order: self.strategy_order.unwrap_or(defaults.strategy_order),
            fuzzy_threshold: self.fuzzy_threshold.unwrap_or(defaults.fuzzy_threshold),
            header_uppercase_ratio: self
                .header_uppercase_ratio
                .unwrap_or(defaults.header_uppercase_ratio),
            header_lookahead: self.header_lookahead.unwrap_or(defaults.header_lookahead),
            min_chapter_words: self.min_chapter_words.unwrap_or(defaults.min_chapter_words),
            section_marker_min_words: self
                .section_marker_min_words
                .unwrap_or(defaults.section_marker_min_words),
            pattern_dedup_distance: self
                .pattern_dedup_distance
                .unwrap_or(defaults.pattern_dedup_distance),
            accept_threshold: self.accept_threshold.unwrap_or(defaults.accept_threshold),
            weights: self.weights,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SplitterConfig::default();
        assert_eq!(config.min_chapter_words, 500);
        assert_eq!(config.section_marker_min_words, 50);
        assert!((config.accept_threshold - 0.75).abs() < f64::EPSILON);
        assert!((config.fuzzy_threshold - 0.80).abs() < f64::EPSILON);
        assert_eq!(config.strategy_order, MatchStrategy::default_order().to_vec());
    }

    #[test]
    fn test_builder_overrides() {
        let config = SplitterConfig::builder()
            .min_chapter_words(200)
            .toc_anchor_window(15_000)
            .fuzzy_threshold(0.9)
            .build()
            .unwrap();
        assert_eq!(config.min_chapter_words, 200);
        assert_eq!(config.toc_anchor_window, 15_000);
        assert!((config.fuzzy_threshold - 0.9).abs() < f64::EPSILON);
        // Untouched knobs keep their defaults
        assert_eq!(config.section_marker_min_words, 50);
    }

    #[test]
    fn test_builder_invalid_pattern_fails_fast() {
        let result = SplitterConfig::builder().toc_anchor_regex("([unclosed").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_custom_anchor_pattern() {
        let config = SplitterConfig::builder()
            .toc_anchor_regex(r"(?i)inhalt")
            .build()
            .unwrap();
        assert!(config.toc_anchor_re.is_some());
    }
}
