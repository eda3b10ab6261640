pub mod assemble;
pub mod backend;
pub mod config;
pub mod config_file;
pub mod fallback;
pub mod locate;
pub mod normalize;
pub mod quality;
pub mod splitter;
pub(crate) mod text_utils;
pub mod toc;

// Re-export for convenience
pub use backend::{BackendError, ExtractedText, TextBackend};
pub use config::{SplitterConfig, SplitterConfigBuilder};
pub use locate::MatchStrategy;
pub use normalize::{fold_for_comparison, normalize_title};
pub use quality::QualityWeights;
pub use splitter::{split_chapters, split_with_user_titles};

/// A single entry parsed from a book's table of contents.
///
/// `raw_title` is the TOC's literal (possibly concatenated) text;
/// `normalized_title` is the camelCase-split, whitespace-collapsed,
/// lowercase-folded form used for comparison. Entries are never mutated
/// after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    /// "3", "IV", or `None` for special sections (Prologue, Epilogue, ...).
    pub ordinal: Option<String>,
    pub raw_title: String,
    pub normalized_title: String,
}

impl TocEntry {
    pub fn new(ordinal: Option<String>, raw_title: impl Into<String>) -> Self {
        let raw_title = raw_title.into();
        let normalized_title = fold_for_comparison(&normalize_title(&raw_title));
        Self {
            ordinal,
            raw_title,
            normalized_title,
        }
    }

    /// Human-readable title with camelCase boundaries re-inserted.
    pub fn display_title(&self) -> String {
        normalize_title(&self.raw_title)
    }

    /// Display form including the ordinal, e.g. "3 My First Misadventure".
    pub fn display(&self) -> String {
        match &self.ordinal {
            Some(ord) => format!("{} {}", ord, self.display_title()),
            None => self.display_title(),
        }
    }
}

/// A TOC entry successfully located in the body text.
///
/// At most one per entry; the first accepted match wins.
#[derive(Debug, Clone)]
pub struct LocatedChapter {
    pub entry: TocEntry,
    /// Byte offset into the document text where the chapter heading starts.
    pub body_position: usize,
    pub strategy: MatchStrategy,
    /// Match quality in [0, 1]. Structural strategies carry a fixed score;
    /// the fuzzy fallback carries its similarity ratio.
    pub score: f64,
}

/// How a chapter's boundary was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterSource {
    /// Located from a TOC entry.
    Toc,
    /// Found by the regex-only pattern scanner (no usable TOC).
    Pattern,
    /// Located from a user-supplied chapter title list.
    UserList,
    /// Terminal fallback: the whole document as one chapter.
    WholeBook,
}

impl ChapterSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChapterSource::Toc => "toc",
            ChapterSource::Pattern => "pattern",
            ChapterSource::UserList => "user_list",
            ChapterSource::WholeBook => "whole_book",
        }
    }
}

/// A fully assembled chapter.
#[derive(Debug, Clone)]
pub struct Chapter {
    /// "00" for a prologue, "900" for an epilogue, zero-padded sequential
    /// integers for everything else.
    pub number: String,
    pub title: String,
    pub content: String,
    /// Always `content.split_whitespace().count()`, recomputed at
    /// construction, never cached stale.
    pub word_count: usize,
    /// Quality confidence in [0, 1], assigned after assembly.
    pub confidence: f64,
    pub source: ChapterSource,
    /// Label of the matching strategy that found the boundary
    /// ("exact", "fuzzy", "pattern", ...).
    pub strategy: String,
    /// Byte offset of the chapter start in the document text.
    pub position: usize,
}

/// Which top-level detection path produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionStrategy {
    Toc,
    PatternFallback,
    UserList,
    WholeBook,
}

impl DetectionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionStrategy::Toc => "toc",
            DetectionStrategy::PatternFallback => "pattern_fallback",
            DetectionStrategy::UserList => "user_list",
            DetectionStrategy::WholeBook => "whole_book",
        }
    }
}

/// Run-level verdict derived from accuracy against the reference chapter
/// count (TOC entries or a user-supplied list).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunVerdict {
    /// ≥ 80% of reference chapters located and validated.
    Success,
    /// ≥ 50%, or no reference to measure against; a human should review.
    NeedsReview,
    /// < 50% of the reference located; manual intervention needed.
    LowAccuracy,
}

impl RunVerdict {
    pub fn from_accuracy(accuracy: f64) -> Self {
        if accuracy >= 0.80 {
            RunVerdict::Success
        } else if accuracy >= 0.50 {
            RunVerdict::NeedsReview
        } else {
            RunVerdict::LowAccuracy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunVerdict::Success => "success",
            RunVerdict::NeedsReview => "needs_review",
            RunVerdict::LowAccuracy => "low_accuracy",
        }
    }
}

/// The complete result of one splitting run.
///
/// Partial results are expected and surfaced, never silently discarded:
/// `unmatched` lists TOC entries that could not be located in the body, and
/// `low_confidence` lists assembled chapters that failed the quality gate.
#[derive(Debug, Clone)]
pub struct SplitOutcome {
    /// Accepted (validated) chapters in document order.
    pub chapters: Vec<Chapter>,
    /// Chapters that scored below the acceptance threshold.
    pub low_confidence: Vec<Chapter>,
    /// TOC entries with no located body match.
    pub unmatched: Vec<TocEntry>,
    /// Number of entries the TOC extractor found (0 if no TOC).
    pub toc_entry_count: usize,
    pub detection: DetectionStrategy,
    /// Validated chapters / reference count. `None` when there was no TOC
    /// or user list to measure against.
    pub accuracy: Option<f64>,
    pub verdict: RunVerdict,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_thresholds() {
        assert_eq!(RunVerdict::from_accuracy(1.0), RunVerdict::Success);
        assert_eq!(RunVerdict::from_accuracy(0.80), RunVerdict::Success);
        assert_eq!(RunVerdict::from_accuracy(0.79), RunVerdict::NeedsReview);
        assert_eq!(RunVerdict::from_accuracy(0.50), RunVerdict::NeedsReview);
        assert_eq!(RunVerdict::from_accuracy(0.49), RunVerdict::LowAccuracy);
    }

    #[test]
    fn test_toc_entry_normalizes_on_construction() {
        let entry = TocEntry::new(Some("3".to_string()), "MyFirstMisadventure");
        assert_eq!(entry.raw_title, "MyFirstMisadventure");
        assert_eq!(entry.normalized_title, "my first misadventure");
        assert_eq!(entry.display(), "3 My First Misadventure");
    }

    #[test]
    fn test_special_entry_display_has_no_ordinal() {
        let entry = TocEntry::new(None, "Prologue");
        assert_eq!(entry.display(), "Prologue");
    }
}
