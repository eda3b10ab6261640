//! Chapter assembly: turn located boundaries into ordered chapter spans.
//!
//! Boundaries are sorted by body position; each chapter's span runs to the
//! next boundary (or end of document), so accepted chapters tile the text
//! without overlap. Too-short spans are dropped before numbering, and
//! numbering is assigned among the retained chapters only.

use crate::{Chapter, ChapterSource};

/// A chapter start located in the body text, however it was found.
#[derive(Debug, Clone)]
pub struct Boundary {
    pub position: usize,
    pub title: String,
    /// Label of the strategy that produced this boundary.
    pub strategy: String,
}

/// Slice the document into chapters at the given boundaries.
///
/// `min_words` is the retention floor: spans below it never reach the
/// output. Word counts are recomputed from the sliced content, never
/// carried over from earlier stages.
pub(crate) fn assemble(
    mut boundaries: Vec<Boundary>,
    text: &str,
    min_words: usize,
    source: ChapterSource,
) -> Vec<Chapter> {
    boundaries.sort_by_key(|b| b.position);

    let mut chapters = Vec::new();
    for (i, boundary) in boundaries.iter().enumerate() {
        let start = boundary.position;
        let end = boundaries
            .get(i + 1)
            .map(|next| next.position)
            .unwrap_or(text.len());
        let content = text[start..end].trim();
        let word_count = content.split_whitespace().count();

        if word_count < min_words {
            tracing::warn!(
                title = %boundary.title,
                word_count,
                "dropping too-short chapter span"
            );
            continue;
        }

        chapters.push(Chapter {
            number: String::new(), // assigned below, after filtering
            title: boundary.title.clone(),
            content: content.to_string(),
            word_count,
            confidence: 0.0,
            source,
            strategy: boundary.strategy.clone(),
            position: start,
        });
    }

    assign_numbers(&mut chapters);
    chapters
}

/// Sentinel numbering: prologues are "00", epilogues "900", everything
/// else sequential two-digit numbers in document order among the retained
/// chapters.
///
/// Known limitation: the "900" sentinel collides with a real chapter count
/// of 900 or more, and a book with several epilogue-like sections gets
/// duplicate numbers. Both cases are carried as-is.
fn assign_numbers(chapters: &mut [Chapter]) {
    let mut sequence = 0usize;
    for chapter in chapters.iter_mut() {
        let lower = chapter.title.to_lowercase();
        chapter.number = if lower.contains("prologue") {
            "00".to_string()
        } else if lower.contains("epilogue") {
            "900".to_string()
        } else {
            sequence += 1;
            format!("{:02}", sequence)
        };
    }
}

/// The terminal "never return nothing" fallback: the entire document as a
/// single chapter.
pub(crate) fn whole_book_chapter(text: &str) -> Chapter {
    let content = text.trim();
    Chapter {
        number: "00".to_string(),
        title: "Full Book".to_string(),
        content: content.to_string(),
        word_count: content.split_whitespace().count(),
        confidence: 0.0,
        source: ChapterSource::WholeBook,
        strategy: "whole_book".to_string(),
        position: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boundary(position: usize, title: &str) -> Boundary {
        Boundary {
            position,
            title: title.to_string(),
            strategy: "exact".to_string(),
        }
    }

    fn build_text(sections: &[(&str, usize)]) -> (String, Vec<Boundary>) {
        let mut text = String::new();
        let mut boundaries = Vec::new();
        for (title, words) in sections {
            boundaries.push(boundary(text.len(), title));
            text.push_str(title);
            text.push('\n');
            for w in 0..*words {
                text.push_str(&format!("word{} ", w));
            }
            text.push('\n');
        }
        (text, boundaries)
    }

    // =========================================================================
    // Spans
    // =========================================================================

    #[test]
    fn test_spans_tile_the_document() {
        let (text, boundaries) = build_text(&[("Alpha", 30), ("Beta", 30), ("Gamma", 30)]);
        let chapters = assemble(boundaries, &text, 10, ChapterSource::Toc);
        assert_eq!(chapters.len(), 3);

        for pair in chapters.windows(2) {
            let span = &text[pair[0].position..pair[1].position];
            assert_eq!(span.trim(), pair[0].content);
        }
        let last = chapters.last().unwrap();
        assert_eq!(text[last.position..].trim(), last.content);
    }

    #[test]
    fn test_unsorted_boundaries_are_ordered() {
        let (text, mut boundaries) = build_text(&[("Alpha", 30), ("Beta", 30)]);
        boundaries.reverse();
        let chapters = assemble(boundaries, &text, 10, ChapterSource::Toc);
        assert_eq!(chapters[0].title, "Alpha");
        assert_eq!(chapters[1].title, "Beta");
        assert!(chapters[0].position < chapters[1].position);
    }

    #[test]
    fn test_word_count_recomputed_from_content() {
        let (text, boundaries) = build_text(&[("Alpha", 25)]);
        let chapters = assemble(boundaries, &text, 10, ChapterSource::Toc);
        assert_eq!(
            chapters[0].word_count,
            chapters[0].content.split_whitespace().count()
        );
    }

    // =========================================================================
    // Minimum-length filtering
    // =========================================================================

    #[test]
    fn test_short_span_dropped() {
        let (text, boundaries) = build_text(&[("Alpha", 600), ("Stub", 40), ("Gamma", 600)]);
        let chapters = assemble(boundaries, &text, 500, ChapterSource::Toc);
        let titles: Vec<&str> = chapters.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Gamma"]);
    }

    #[test]
    fn test_numbering_skips_dropped_spans() {
        let (text, boundaries) = build_text(&[("Alpha", 600), ("Stub", 40), ("Gamma", 600)]);
        let chapters = assemble(boundaries, &text, 500, ChapterSource::Toc);
        assert_eq!(chapters[0].number, "01");
        assert_eq!(chapters[1].number, "02");
    }

    // =========================================================================
    // Sentinel numbering
    // =========================================================================

    #[test]
    fn test_sentinel_numbering() {
        let (text, boundaries) =
            build_text(&[("Prologue", 30), ("1 Alpha", 30), ("2 Beta", 30), ("Epilogue", 30)]);
        let chapters = assemble(boundaries, &text, 10, ChapterSource::Toc);
        let numbers: Vec<&str> = chapters.iter().map(|c| c.number.as_str()).collect();
        assert_eq!(numbers, vec!["00", "01", "02", "900"]);
    }

    #[test]
    fn test_sentinels_case_insensitive() {
        let (text, boundaries) = build_text(&[("PROLOGUE", 30), ("EPILOGUE", 30)]);
        let chapters = assemble(boundaries, &text, 10, ChapterSource::Toc);
        assert_eq!(chapters[0].number, "00");
        assert_eq!(chapters[1].number, "900");
    }

    // =========================================================================
    // Degenerate fallback
    // =========================================================================

    #[test]
    fn test_no_boundaries_yields_nothing() {
        assert!(assemble(Vec::new(), "some text", 1, ChapterSource::Toc).is_empty());
    }

    #[test]
    fn test_whole_book_chapter() {
        let ch = whole_book_chapter("  The entire book text. \n");
        assert_eq!(ch.number, "00");
        assert_eq!(ch.title, "Full Book");
        assert_eq!(ch.content, "The entire book text.");
        assert_eq!(ch.source, ChapterSource::WholeBook);
        assert_eq!(ch.position, 0);
    }
}
