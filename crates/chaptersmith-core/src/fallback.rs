//! Regex-only chapter scanning for documents without a usable TOC.
//!
//! A documented secondary strategy, distinct from TOC-driven matching: a
//! cascade of structural heading patterns is run over the whole body, hits
//! are ordered by position, and near-duplicate hits (several patterns
//! firing on the same heading) are collapsed by proximity.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::assemble::Boundary;
use crate::config::SplitterConfig;
use crate::text_utils::floor_char_boundary;

static PROLOGUE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(?:Prologue|PROLOGUE)\s*$").unwrap());

static EPILOGUE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(?:Epilogue|EPILOGUE)\s*$").unwrap());

/// Part markers: "III Into Adulthood".
static PART_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([IVX]+)\s+([A-Z][^\n]{5,40})$").unwrap());

/// Number on its own line followed by a capitalized title line.
static NUMBERED_TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(\d{1,3})\s*\n\s*([A-Z][^\n]{5,50})$").unwrap());

/// "Chapter 7: The Storm" headings.
static CHAPTER_HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?mi)^Chapter\s+(\d{1,3})[:.\s]+([^\n]{3,50})$").unwrap());

/// Bare chapter number with following prose (title recovered from the next
/// line when one looks like a title).
static BARE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(\d{1,3})\s*$").unwrap());

static TITLE_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][^\n]{3,50}").unwrap());

/// Scan the body for chapter-like headings.
///
/// Returns boundaries ordered by position, with hits closer than
/// `pattern_dedup_distance` to the previous accepted hit discarded (the
/// same heading often matches more than one pattern).
pub fn scan_chapter_patterns(text: &str, config: &SplitterConfig) -> Vec<Boundary> {
    let mut hits: Vec<(usize, String)> = Vec::new();

    for m in PROLOGUE_RE.find_iter(text) {
        hits.push((m.start(), "Prologue".to_string()));
    }

    for caps in PART_RE.captures_iter(text) {
        let m = caps.get(0).unwrap();
        hits.push((m.start(), format!("{} {}", &caps[1], caps[2].trim())));
    }

    for caps in NUMBERED_TITLE_RE.captures_iter(text) {
        let m = caps.get(0).unwrap();
        hits.push((m.start(), format!("{} {}", &caps[1], caps[2].trim())));
    }

    for caps in CHAPTER_HEADING_RE.captures_iter(text) {
        let m = caps.get(0).unwrap();
        hits.push((m.start(), format!("Chapter {}: {}", &caps[1], caps[2].trim())));
    }

    for caps in BARE_NUMBER_RE.captures_iter(text) {
        let m = caps.get(0).unwrap();
        let after_start = m.end();
        let after_end = floor_char_boundary(text, after_start + 100);
        let following = text[after_start..after_end].trim_start();
        // A bare number followed by another number is page furniture
        if following.is_empty() || following.starts_with(|c: char| c.is_ascii_digit()) {
            continue;
        }
        let title = match TITLE_LINE_RE.find(following) {
            Some(t) => format!("{} {}", &caps[1], t.as_str().trim()),
            None => format!("Chapter {}", &caps[1]),
        };
        hits.push((m.start(), title));
    }

    for m in EPILOGUE_RE.find_iter(text) {
        hits.push((m.start(), "Epilogue".to_string()));
    }

    hits.sort_by_key(|(pos, _)| *pos);

    // Collapse hits that sit on (or right next to) the same heading
    let mut boundaries: Vec<Boundary> = Vec::new();
    for (pos, title) in hits {
        if let Some(prev) = boundaries.last() {
            if pos.saturating_sub(prev.position) < config.pattern_dedup_distance {
                tracing::debug!(%title, position = pos, "skipping duplicate pattern hit");
                continue;
            }
        }
        boundaries.push(Boundary {
            position: pos,
            title,
            strategy: "pattern".to_string(),
        });
    }

    tracing::info!(count = boundaries.len(), "pattern scan found chapter headings");
    boundaries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filler(words: usize) -> String {
        let mut s = String::new();
        for w in 0..words {
            s.push_str(&format!("word{} ", w));
            if w % 12 == 11 {
                s.push_str("\n");
            }
        }
        s.push('\n');
        s
    }

    #[test]
    fn test_detects_mixed_heading_styles() {
        let mut text = String::new();
        text.push_str("Prologue\n");
        text.push_str(&filler(200));
        text.push_str("7\nThe Long Road Home\n");
        text.push_str(&filler(200));
        text.push_str("Chapter 8: The Storm\n");
        text.push_str(&filler(200));
        text.push_str("Epilogue\n");
        text.push_str(&filler(200));

        let boundaries = scan_chapter_patterns(&text, &SplitterConfig::default());
        let titles: Vec<&str> = boundaries.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Prologue",
                "7 The Long Road Home",
                "Chapter 8: The Storm",
                "Epilogue"
            ]
        );
    }

    #[test]
    fn test_hits_ordered_by_position() {
        let mut text = String::new();
        text.push_str("Epilogue\n");
        text.push_str(&filler(200));
        text.push_str("Prologue\n");
        text.push_str(&filler(200));

        let boundaries = scan_chapter_patterns(&text, &SplitterConfig::default());
        assert_eq!(boundaries[0].title, "Epilogue");
        assert_eq!(boundaries[1].title, "Prologue");
    }

    #[test]
    fn test_nearby_duplicate_hits_collapsed() {
        // "12\nThe Storm Returns" matches both the numbered-title and the
        // bare-number patterns at the same offset
        let mut text = filler(100);
        text.push_str("12\nThe Storm Returns\n");
        text.push_str(&filler(300));

        let boundaries = scan_chapter_patterns(&text, &SplitterConfig::default());
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].title, "12 The Storm Returns");
    }

    #[test]
    fn test_bare_number_before_digits_ignored() {
        // Page-number artifacts: a number line followed by another number,
        // and a trailing number with nothing after it
        let mut text = filler(50);
        text.push_str("42\n43\n");

        let boundaries = scan_chapter_patterns(&text, &SplitterConfig::default());
        assert!(boundaries.is_empty());
    }

    #[test]
    fn test_bare_number_before_prose_becomes_chapter() {
        let mut text = filler(120);
        text.push_str("9\nShe woke before dawn and listened to the rain.\n");
        text.push_str(&filler(120));

        let boundaries = scan_chapter_patterns(&text, &SplitterConfig::default());
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].title, "9 She woke before dawn and listened to the rain.");
    }

    #[test]
    fn test_plain_text_yields_nothing() {
        let text = filler(500);
        assert!(scan_chapter_patterns(&text, &SplitterConfig::default()).is_empty());
    }

    #[test]
    fn test_running_caps_prologue_detected_once() {
        // PROLOGUE in caps is still a valid heading for the scanner
        let mut text = String::from("PROLOGUE\n");
        text.push_str(&filler(300));
        let boundaries = scan_chapter_patterns(&text, &SplitterConfig::default());
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].title, "Prologue");
    }
}
