//! Table-of-contents extraction.
//!
//! Scans a bounded prefix of the document for a TOC anchor ("Contents" /
//! "Table of Contents") and parses candidate chapter entries from the lines
//! that follow. A missing TOC is a normal degraded-input condition, not an
//! error: the caller falls back to pattern-based body scanning.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::TocEntry;
use crate::config::SplitterConfig;
use crate::text_utils::floor_char_boundary;

static ANCHOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bcontents\b").unwrap());

/// Numbered chapter with an optional trailing page number:
/// "3 MyFirstMisadventure 23".
static NUMBERED_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,3})\s+([A-Za-z].*?)(?:\s+\d{1,4})?$").unwrap());

/// Roman-numeral part heading: "III IntoAdulthood".
static ROMAN_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([IVXLCDM]+)\s+([A-Za-z].*?)$").unwrap());

/// Special sections carry no ordinal.
static SPECIAL_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(Prologue|Epilogue|Preface|Introduction|Foreword|Afterword)\s*\d*$")
        .unwrap()
});

/// Marker that ends TOC scanning early.
static BODY_START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^about\s+the\s+author\b").unwrap());

/// Markers whose *second* occurrence signals the end of the TOC block
/// (the first occurrence is the TOC's own listing).
static TOC_END_MARKERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    ["prologue", "chapter 1", "part i", "part 1", "introduction"]
        .iter()
        .map(|m| Regex::new(&format!("(?i){}", regex::escape(m))).unwrap())
        .collect()
});

/// Extract chapter entries from the document's table of contents.
///
/// Operates only on a bounded prefix (`toc_anchor_window` chars for the
/// anchor, `toc_scan_window` chars of entries after it) to avoid scanning
/// the whole book and to avoid false matches deep in the body. Returns an
/// empty list when no anchor is found.
pub fn extract_toc(text: &str, config: &SplitterConfig) -> Vec<TocEntry> {
    let anchor_re = config.toc_anchor_re.as_ref().unwrap_or(&ANCHOR_RE);
    let special_re = config.special_section_re.as_ref().unwrap_or(&SPECIAL_LINE_RE);

    let prefix = &text[..floor_char_boundary(text, config.toc_anchor_window)];
    let anchor = match anchor_re.find(prefix) {
        Some(m) => m.start(),
        None => {
            tracing::info!("no TOC anchor found in document prefix");
            return Vec::new();
        }
    };

    let scan_end = floor_char_boundary(text, anchor + config.toc_scan_window);
    let window = &text[anchor..scan_end];

    let mut entries = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for line in window.lines() {
        let line = line.trim();
        if line.len() < 5 || line.len() > config.max_toc_line_len {
            continue;
        }
        if BODY_START_RE.is_match(line) {
            break;
        }

        let entry = if let Some(caps) = NUMBERED_LINE_RE.captures(line) {
            Some(TocEntry::new(
                Some(caps[1].to_string()),
                caps[2].trim().to_string(),
            ))
        } else if let Some(caps) = ROMAN_LINE_RE.captures(line) {
            Some(TocEntry::new(
                Some(caps[1].to_string()),
                caps[2].trim().to_string(),
            ))
        } else if let Some(caps) = special_re.captures(line) {
            Some(TocEntry::new(None, caps[1].to_string()))
        } else {
            None
        };

        if let Some(entry) = entry {
            // Duplicate TOC renderings: keep only the first occurrence
            let key = entry
                .ordinal
                .clone()
                .unwrap_or_else(|| entry.normalized_title.clone());
            if seen.insert(key) {
                entries.push(entry);
            }
        }
    }

    tracing::info!(count = entries.len(), "extracted TOC entries");
    entries
}

/// Estimate where the TOC block ends, i.e. the earliest offset at which
/// body matching may begin.
///
/// Looks for the second occurrence of a body-start marker — the first is
/// the TOC's own listing, the second is the actual section. Falls back to
/// `default_search_start` when no marker repeats.
pub fn find_toc_end(text: &str, config: &SplitterConfig) -> usize {
    for marker_re in TOC_END_MARKERS.iter() {
        let mut matches = marker_re.find_iter(text);
        let first = match matches.next() {
            Some(m) => m,
            None => continue,
        };
        // Require some distance so a line-wrapped duplicate doesn't count
        for second in matches {
            if second.start() > first.end() + 100 {
                tracing::debug!(
                    marker = marker_re.as_str(),
                    position = second.start(),
                    "found TOC end marker"
                );
                return second.start();
            }
        }
    }
    floor_char_boundary(text, config.default_search_start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_toc_text() -> String {
        let mut text = String::from(
            "My Memoir\n\nContents\n\nPrologue\n1 OnceUponaTime 9\n2 MyFirstMisadventure 23\nIII IntoAdulthood\nEpilogue 301\n\n",
        );
        text.push_str(&"body filler\n".repeat(600));
        text
    }

    #[test]
    fn test_extracts_numbered_roman_and_special_entries() {
        let text = sample_toc_text();
        let entries = extract_toc(&text, &SplitterConfig::default());
        assert_eq!(entries.len(), 5);

        assert_eq!(entries[0].ordinal, None);
        assert_eq!(entries[0].raw_title, "Prologue");

        assert_eq!(entries[1].ordinal.as_deref(), Some("1"));
        assert_eq!(entries[1].normalized_title, "once upon a time");

        assert_eq!(entries[2].ordinal.as_deref(), Some("2"));
        assert_eq!(entries[2].normalized_title, "my first misadventure");

        assert_eq!(entries[3].ordinal.as_deref(), Some("III"));
        assert_eq!(entries[3].normalized_title, "into adulthood");

        assert_eq!(entries[4].ordinal, None);
        assert_eq!(entries[4].normalized_title, "epilogue");
    }

    #[test]
    fn test_no_anchor_returns_empty() {
        let text = "Just a story that begins immediately.\nNo front matter at all.\n";
        assert!(extract_toc(text, &SplitterConfig::default()).is_empty());
    }

    #[test]
    fn test_duplicate_ordinal_keeps_first() {
        let text = "Contents\n\n1 FirstTitle 3\n1 FirstTitle 3\n2 SecondTitle 20\n";
        let entries = extract_toc(text, &SplitterConfig::default());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].ordinal.as_deref(), Some("1"));
        assert_eq!(entries[1].ordinal.as_deref(), Some("2"));
    }

    #[test]
    fn test_pure_number_lines_discarded() {
        let text = "Contents\n\n12345\n1 RealChapter 5\n";
        let entries = extract_toc(text, &SplitterConfig::default());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].normalized_title, "real chapter");
    }

    #[test]
    fn test_scan_stops_at_about_the_author() {
        let text = "Contents\n\n1 RealChapter 5\nAbout the Author\n2 NotAnEntry 9\n";
        let entries = extract_toc(text, &SplitterConfig::default());
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_anchor_outside_window_ignored() {
        let mut text = "padding\n".repeat(700); // pushes "Contents" past 5000 chars
        text.push_str("Contents\n\n1 LateChapter 3\n");
        assert!(extract_toc(&text, &SplitterConfig::default()).is_empty());
    }

    #[test]
    fn test_custom_anchor_pattern() {
        let config = SplitterConfig::builder()
            .toc_anchor_regex(r"(?i)inhalt")
            .build()
            .unwrap();
        let text = "Inhalt\n\n1 ErstesKapitel 3\n";
        let entries = extract_toc(text, &config);
        assert_eq!(entries.len(), 1);
    }

    // =========================================================================
    // TOC end detection
    // =========================================================================

    #[test]
    fn test_find_toc_end_uses_second_marker_occurrence() {
        let mut text = String::from("Contents\n\nPrologue\n1 Alpha 5\n");
        text.push_str(&"filler text here\n".repeat(50));
        let body_marker = text.len();
        text.push_str("Prologue\n\nThe actual prologue prose starts here.\n");

        let end = find_toc_end(&text, &SplitterConfig::default());
        assert_eq!(end, body_marker);
    }

    #[test]
    fn test_find_toc_end_defaults_without_markers() {
        let text = "short document with no markers at all".to_string();
        let end = find_toc_end(&text, &SplitterConfig::default());
        assert_eq!(end, text.len()); // default 5000 clamped to text length
    }
}
