//! Body location: find where each TOC entry's chapter actually starts.
//!
//! A cascade of matching strategies is tried in configurable order; the
//! first accepted match wins. Every structural candidate passes a
//! header-rejection filter so running page headers ("PROLOGUE" repeated at
//! the top of consecutive pages) are not mistaken for chapter starts, and
//! no strategy may return a position before the end of the TOC block —
//! that invariant is what keeps the TOC's own listing from matching.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::SplitterConfig;
use crate::normalize::{fold_for_comparison, normalize_title};
use crate::text_utils::{floor_char_boundary, uppercase_ratio};
use crate::{LocatedChapter, TocEntry};

/// Matching strategy identifier, in roughly decreasing specificity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchStrategy {
    /// Literal `ordinal \n title` search (optionally preceded by a bare
    /// page-number line).
    Exact,
    /// `ordinal \n <anything>`, accepting when the captured line
    /// normalizes to the entry's title.
    NormalizedLine,
    /// Like [`Exact`](Self::Exact) but joining title words with `\s+` to
    /// tolerate inconsistent line wrapping.
    FlexibleWhitespace,
    /// For entries without an ordinal (Prologue, Epilogue): the title on a
    /// line of its own.
    NoOrdinal,
    /// Retry with camelCase variants regenerated from the raw TOC title.
    CamelVariant,
    /// Sliding-window similarity fallback.
    Fuzzy,
}

impl MatchStrategy {
    /// Default cascade order: structural strategies first, similarity last.
    pub fn default_order() -> &'static [MatchStrategy] {
        &[
            MatchStrategy::Exact,
            MatchStrategy::NormalizedLine,
            MatchStrategy::FlexibleWhitespace,
            MatchStrategy::NoOrdinal,
            MatchStrategy::CamelVariant,
            MatchStrategy::Fuzzy,
        ]
    }

    /// Fixed match score for structural strategies. The fuzzy strategy
    /// reports its similarity ratio instead.
    fn base_score(&self) -> f64 {
        match self {
            MatchStrategy::Exact => 1.0,
            MatchStrategy::NormalizedLine => 0.95,
            MatchStrategy::FlexibleWhitespace => 0.90,
            MatchStrategy::NoOrdinal => 0.90,
            MatchStrategy::CamelVariant => 0.85,
            MatchStrategy::Fuzzy => 0.80,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStrategy::Exact => "exact",
            MatchStrategy::NormalizedLine => "normalized",
            MatchStrategy::FlexibleWhitespace => "flexible_whitespace",
            MatchStrategy::NoOrdinal => "no_ordinal",
            MatchStrategy::CamelVariant => "camel_variant",
            MatchStrategy::Fuzzy => "fuzzy",
        }
    }
}

/// Locate a TOC entry in the body text.
///
/// `search_start` is the computed end of the TOC block; no match before it
/// is ever returned. Returns `None` when every strategy fails — callers
/// collect such entries as unmatched and proceed with the rest.
pub fn locate(
    entry: &TocEntry,
    text: &str,
    search_start: usize,
    config: &SplitterConfig,
) -> Option<LocatedChapter> {
    let search_start = floor_char_boundary(text, search_start);

    for strategy in &config.strategy_order {
        let found = match strategy {
            MatchStrategy::Exact => try_exact(entry, text, search_start, config),
            MatchStrategy::NormalizedLine => try_normalized_line(entry, text, search_start, config),
            MatchStrategy::FlexibleWhitespace => try_flexible(entry, text, search_start, config),
            MatchStrategy::NoOrdinal => try_no_ordinal(entry, text, search_start, config),
            MatchStrategy::CamelVariant => try_camel_variants(entry, text, search_start, config),
            MatchStrategy::Fuzzy => try_fuzzy(entry, text, search_start, config),
        };
        if let Some((body_position, score)) = found {
            tracing::debug!(
                title = %entry.display(),
                strategy = strategy.as_str(),
                position = body_position,
                "located chapter"
            );
            return Some(LocatedChapter {
                entry: entry.clone(),
                body_position,
                strategy: *strategy,
                score,
            });
        }
    }

    tracing::info!(title = %entry.display(), "no body match for TOC entry");
    None
}

/// Inspect text following a candidate match; a first line dominated by
/// uppercase letters marks a running page header, not a chapter start.
fn is_running_header_after(text: &str, pos: usize, config: &SplitterConfig) -> bool {
    let end = floor_char_boundary(text, pos + config.header_lookahead);
    let after = text[pos..end].trim_start();
    let first_line = after.lines().next().unwrap_or("").trim();
    if first_line.is_empty() {
        return false;
    }
    uppercase_ratio(first_line) > config.header_uppercase_ratio
}

/// Walk a regex's matches, returning the first acceptable position.
fn first_accepted(
    re: &Regex,
    text: &str,
    search_start: usize,
    config: &SplitterConfig,
) -> Option<usize> {
    for m in re.find_iter(text) {
        if m.start() < search_start {
            continue;
        }
        if is_running_header_after(text, m.end(), config) {
            continue;
        }
        return Some(m.start());
    }
    None
}

fn try_exact(
    entry: &TocEntry,
    text: &str,
    search_start: usize,
    config: &SplitterConfig,
) -> Option<(usize, f64)> {
    let ordinal = entry.ordinal.as_ref()?;
    let pattern = format!(
        r"(?i)(?:\d+\s*\n\s*)?{}\s*\n\s*{}",
        regex::escape(ordinal),
        regex::escape(&entry.normalized_title),
    );
    let re = Regex::new(&pattern).ok()?;
    first_accepted(&re, text, search_start, config)
        .map(|pos| (pos, MatchStrategy::Exact.base_score()))
}

fn try_normalized_line(
    entry: &TocEntry,
    text: &str,
    search_start: usize,
    config: &SplitterConfig,
) -> Option<(usize, f64)> {
    let ordinal = entry.ordinal.as_ref()?;
    let pattern = format!(
        r"(?i)(?:\d+\s*\n\s*)?{}\s*\n\s*([^\n]+)",
        regex::escape(ordinal),
    );
    let re = Regex::new(&pattern).ok()?;

    for caps in re.captures_iter(text) {
        let m = caps.get(0).unwrap();
        if m.start() < search_start {
            continue;
        }
        let candidate = caps.get(1).unwrap().as_str();
        if fold_for_comparison(&normalize_title(candidate)) != entry.normalized_title {
            continue;
        }
        if is_running_header_after(text, m.end(), config) {
            continue;
        }
        return Some((m.start(), MatchStrategy::NormalizedLine.base_score()));
    }
    None
}

fn try_flexible(
    entry: &TocEntry,
    text: &str,
    search_start: usize,
    config: &SplitterConfig,
) -> Option<(usize, f64)> {
    let ordinal = entry.ordinal.as_ref()?;
    let flexible_title = entry
        .normalized_title
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    if flexible_title.is_empty() {
        return None;
    }
    let pattern = format!(
        r"(?i)(?:\d+\s*\n\s*)?{}\s*\n\s*{}",
        regex::escape(ordinal),
        flexible_title,
    );
    let re = Regex::new(&pattern).ok()?;
    first_accepted(&re, text, search_start, config)
        .map(|pos| (pos, MatchStrategy::FlexibleWhitespace.base_score()))
}

fn try_no_ordinal(
    entry: &TocEntry,
    text: &str,
    search_start: usize,
    config: &SplitterConfig,
) -> Option<(usize, f64)> {
    if entry.ordinal.is_some() {
        return None;
    }
    let pattern = format!(r"(?i)\n{}\s*\n", regex::escape(&entry.normalized_title));
    let re = Regex::new(&pattern).ok()?;
    for m in re.find_iter(text) {
        // The chapter starts at the title, not at the framing newline
        let pos = m.start() + 1;
        if pos < search_start {
            continue;
        }
        if is_running_header_after(text, m.end(), config) {
            continue;
        }
        return Some((pos, MatchStrategy::NoOrdinal.base_score()));
    }
    None
}

static LOWER_UPPER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z])([A-Z])").unwrap());
static UPPER_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Z])([A-Z][a-z])").unwrap());

/// Regenerate camelCase variants of the raw (un-normalized) TOC title:
/// spaces removed entirely, then the compact form re-split at
/// lowercase→uppercase and uppercase-run→uppercase+lowercase boundaries.
fn camel_variants(raw_title: &str) -> Vec<String> {
    let compact: String = raw_title.split_whitespace().collect();
    let mut variants = vec![compact.clone()];
    for split in [
        LOWER_UPPER_RE.replace_all(&compact, "$1 $2").into_owned(),
        UPPER_RUN_RE.replace_all(&compact, "$1 $2").into_owned(),
    ] {
        if !variants.contains(&split) {
            variants.push(split);
        }
    }
    variants
}

fn try_camel_variants(
    entry: &TocEntry,
    text: &str,
    search_start: usize,
    config: &SplitterConfig,
) -> Option<(usize, f64)> {
    for variant in camel_variants(&entry.raw_title) {
        if variant.is_empty() {
            continue;
        }
        let pattern = format!("(?i){}", regex::escape(&variant));
        let re = match Regex::new(&pattern) {
            Ok(re) => re,
            Err(_) => continue,
        };
        if let Some(pos) = first_accepted(&re, text, search_start, config) {
            return Some((pos, MatchStrategy::CamelVariant.base_score()));
        }
    }
    None
}

/// Slide a window the length of the title across the post-TOC text and
/// keep the best similarity ratio. Accepts only above the configured
/// threshold. The stride trades a little precision for a large constant
/// factor; chapter headings are short, so quarter-length steps still land
/// a window on them.
fn try_fuzzy(
    entry: &TocEntry,
    text: &str,
    search_start: usize,
    config: &SplitterConfig,
) -> Option<(usize, f64)> {
    let needle: Vec<char> = entry.normalized_title.chars().collect();
    if needle.is_empty() {
        return None;
    }

    let haystack: Vec<(usize, char)> = text[search_start..]
        .char_indices()
        .map(|(i, c)| (search_start + i, c.to_ascii_lowercase()))
        .collect();
    let window = needle.len();
    if haystack.len() < window {
        return None;
    }

    let step = (window / 4).max(1);
    let mut best_pos = 0usize;
    let mut best_ratio = 0.0f64;

    let mut i = 0;
    while i + window <= haystack.len() {
        let ratio = rapidfuzz::fuzz::ratio(
            needle.iter().copied(),
            haystack[i..i + window].iter().map(|(_, c)| *c),
        );
        if ratio > best_ratio {
            best_ratio = ratio;
            best_pos = haystack[i].0;
        }
        i += step;
    }

    if best_ratio >= config.fuzzy_threshold {
        Some((best_pos, best_ratio))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ordinal: Option<&str>, raw: &str) -> TocEntry {
        TocEntry::new(ordinal.map(str::to_string), raw)
    }

    fn prose_line() -> &'static str {
        "It was a bright cold day in April, and the clocks were striking thirteen.\n"
    }

    // =========================================================================
    // Structural strategies
    // =========================================================================

    #[test]
    fn test_exact_match_in_body() {
        let mut text = String::from("Contents\n1 OnceUponaTime 9\n");
        text.push_str(&"front matter filler\n".repeat(20));
        let search_start = text.len();
        let body_pos = text.len();
        text.push_str("1\nOnce Upon a Time\n");
        text.push_str(prose_line());

        let e = entry(Some("1"), "OnceUponaTime");
        let located = locate(&e, &text, search_start, &SplitterConfig::default()).unwrap();
        assert_eq!(located.body_position, body_pos);
        assert_eq!(located.strategy, MatchStrategy::Exact);
        assert!((located.score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_normalized_line_match_for_concatenated_body() {
        // Body heading is still camelCase-concatenated; the captured line
        // normalizes to the entry title.
        let mut text = String::from("filler\n");
        let body_pos = text.len();
        text.push_str("1\nOnceUponaTime\n");
        text.push_str(prose_line());

        let e = entry(Some("1"), "OnceUponaTime");
        let located = locate(&e, &text, 0, &SplitterConfig::default()).unwrap();
        assert_eq!(located.body_position, body_pos);
        assert_eq!(located.strategy, MatchStrategy::NormalizedLine);
    }

    #[test]
    fn test_flexible_whitespace_tolerates_wrapping() {
        let mut text = String::from("filler\n");
        let body_pos = text.len();
        text.push_str("1\nOnce  Upon   a\nTime ");
        text.push_str(prose_line());

        let e = entry(Some("1"), "OnceUponaTime");
        let located = locate(&e, &text, 0, &SplitterConfig::default()).unwrap();
        assert_eq!(located.body_position, body_pos);
        assert_eq!(located.strategy, MatchStrategy::FlexibleWhitespace);
    }

    #[test]
    fn test_no_ordinal_locates_special_section() {
        let mut text = String::from("filler text\n");
        text.push_str("\n");
        let body_pos = text.len();
        text.push_str("Prologue\n");
        text.push_str(prose_line());

        let e = entry(None, "Prologue");
        let located = locate(&e, &text, 0, &SplitterConfig::default()).unwrap();
        assert_eq!(located.body_position, body_pos);
        assert_eq!(located.strategy, MatchStrategy::NoOrdinal);
    }

    // =========================================================================
    // TOC exclusion
    // =========================================================================

    #[test]
    fn test_never_matches_inside_toc_block() {
        // Title appears verbatim inside the TOC region only
        let mut text = String::from("Contents\n1\nOnce Upon a Time\n");
        text.push_str(&"unrelated body prose with nothing that resembles it\n".repeat(10));
        let search_start = 30;

        let e = entry(Some("1"), "OnceUponaTime");
        let located = locate(&e, &text, search_start, &SplitterConfig::default());
        if let Some(found) = located {
            assert!(
                found.body_position >= search_start,
                "match at {} is inside the TOC block",
                found.body_position
            );
        }
    }

    // =========================================================================
    // Header rejection
    // =========================================================================

    #[test]
    fn test_running_headers_rejected() {
        let mut text = String::from("front matter\n");
        // Four consecutive pages with "PROLOGUE" as a running header,
        // each followed by all-caps page furniture
        for page in 0..4 {
            text.push_str("\nPROLOGUE\nA MEMOIR OF THE LOST YEARS\n");
            text.push_str(&format!("page {} body text here\n", page));
        }
        text.push_str("\n");
        let real_pos = text.len();
        text.push_str("Prologue\n");
        text.push_str(prose_line());

        let e = entry(None, "Prologue");
        let located = locate(&e, &text, 0, &SplitterConfig::default()).unwrap();
        assert_eq!(located.body_position, real_pos);
    }

    // =========================================================================
    // Camel variants
    // =========================================================================

    #[test]
    fn test_camel_variant_finds_concatenated_heading() {
        let mut text = String::from("filler\n");
        let body_pos = text.len();
        text.push_str("OnceUponaTime ");
        text.push_str(prose_line());

        // TOC carried the spaced form; the body lost its spaces
        let e = entry(Some("1"), "Once Upon a Time");
        let config = SplitterConfig::builder()
            .strategy_order(vec![MatchStrategy::CamelVariant])
            .build()
            .unwrap();
        let located = locate(&e, &text, 0, &config).unwrap();
        assert_eq!(located.body_position, body_pos);
        assert_eq!(located.strategy, MatchStrategy::CamelVariant);
    }

    #[test]
    fn test_camel_variants_generated() {
        let variants = camel_variants("Once Upon a Time");
        assert!(variants.contains(&"OnceUponaTime".to_string()));
        // Re-split at lowercase→uppercase boundaries
        assert!(variants.iter().any(|v| v.contains("Once Upona Time")));
    }

    // =========================================================================
    // Fuzzy fallback
    // =========================================================================

    #[test]
    fn test_fuzzy_match_above_threshold() {
        let mut text = String::from("filler!\n");
        text.push_str("once upin a tyme "); // two character errors
        text.push_str(prose_line());

        let e = entry(Some("1"), "OnceUponaTime");
        let config = SplitterConfig::builder()
            .strategy_order(vec![MatchStrategy::Fuzzy])
            .build()
            .unwrap();
        let located = locate(&e, &text, 0, &config).unwrap();
        assert_eq!(located.strategy, MatchStrategy::Fuzzy);
        assert!(located.score >= 0.80, "score {}", located.score);
    }

    #[test]
    fn test_fuzzy_rejects_dissimilar_text() {
        let text = "completely different content about gardening and weather\n".repeat(5);
        let e = entry(Some("1"), "OnceUponaTime");
        let config = SplitterConfig::builder()
            .strategy_order(vec![MatchStrategy::Fuzzy])
            .build()
            .unwrap();
        assert!(locate(&e, &text, 0, &config).is_none());
    }

    // =========================================================================
    // Failure is not fatal
    // =========================================================================

    #[test]
    fn test_unlocatable_entry_returns_none() {
        let text = "no chapter headings anywhere in this body text\n".repeat(3);
        let e = entry(Some("7"), "TheMissingChapter");
        assert!(locate(&e, &text, 0, &SplitterConfig::default()).is_none());
    }
}
