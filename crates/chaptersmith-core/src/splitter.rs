//! Pipeline orchestration: TOC extraction → body location → assembly →
//! quality gate.
//!
//! The pipeline is deterministic and synchronous: the same text and config
//! always produce the same outcome. Per-entry location is independent work
//! and could be parallelized, but a sequential loop is correct and fast
//! enough for book-length documents.

use crate::assemble::{Boundary, assemble, whole_book_chapter};
use crate::config::SplitterConfig;
use crate::fallback::scan_chapter_patterns;
use crate::quality::gate_chapters;
use crate::{
    ChapterSource, DetectionStrategy, LocatedChapter, RunVerdict, SplitOutcome, TocEntry, locate,
    toc,
};

/// Split a document into chapters.
///
/// Never fails and never returns an empty result: when no TOC is found the
/// pattern scanner runs instead, and when nothing survives filtering the
/// whole document is returned as a single chapter.
pub fn split_chapters(text: &str, config: &SplitterConfig) -> SplitOutcome {
    let entries = toc::extract_toc(text, config);
    let toc_entry_count = entries.len();

    let mut unmatched: Vec<TocEntry> = Vec::new();
    let mut located: Vec<LocatedChapter> = Vec::new();

    if !entries.is_empty() {
        let search_start = toc::find_toc_end(text, config);
        tracing::info!(search_start, "locating TOC entries in body text");
        for entry in &entries {
            match locate::locate(entry, text, search_start, config) {
                Some(found) => located.push(found),
                None => unmatched.push(entry.clone()),
            }
        }
        tracing::info!(
            located = located.len(),
            total = toc_entry_count,
            "TOC entry location complete"
        );
    }

    let mut detection;
    let assembled = if located.is_empty() {
        detection = DetectionStrategy::PatternFallback;
        let boundaries = scan_chapter_patterns(text, config);
        assemble(
            boundaries,
            text,
            config.section_marker_min_words,
            ChapterSource::Pattern,
        )
    } else {
        detection = DetectionStrategy::Toc;
        let boundaries = located
            .iter()
            .map(|l| Boundary {
                position: l.body_position,
                title: l.entry.display(),
                strategy: l.strategy.as_str().to_string(),
            })
            .collect();
        assemble(boundaries, text, config.min_chapter_words, ChapterSource::Toc)
    };

    let assembled = if assembled.is_empty() {
        tracing::warn!("no chapters survived filtering; degrading to whole-book output");
        detection = DetectionStrategy::WholeBook;
        vec![whole_book_chapter(text)]
    } else {
        assembled
    };

    let (chapters, low_confidence) = gate_chapters(
        assembled,
        &config.quality_weights(),
        config.accept_threshold,
    );

    let accuracy = (toc_entry_count > 0)
        .then(|| (chapters.len() as f64 / toc_entry_count as f64).min(1.0));
    let verdict = match accuracy {
        Some(a) => RunVerdict::from_accuracy(a),
        None => RunVerdict::NeedsReview,
    };

    SplitOutcome {
        chapters,
        low_confidence,
        unmatched,
        toc_entry_count,
        detection,
        accuracy,
        verdict,
    }
}

/// Split with a user-supplied chapter title list as the explicit fallback.
///
/// Automatic detection runs first; the user list takes over only when it
/// located under 80% of the titles the user says exist. User-located
/// chapters are trusted at full confidence and skip the quality gate.
pub fn split_with_user_titles(
    text: &str,
    user_titles: &[String],
    config: &SplitterConfig,
) -> SplitOutcome {
    let auto = split_chapters(text, config);
    if user_titles.is_empty() {
        return auto;
    }

    let needed = (user_titles.len() as f64 * 0.8).ceil() as usize;
    if auto.chapters.len() >= needed {
        return auto;
    }
    tracing::info!(
        auto_count = auto.chapters.len(),
        user_count = user_titles.len(),
        "automatic detection incomplete; using user-provided chapter list"
    );

    let search_start = if auto.toc_entry_count > 0 {
        toc::find_toc_end(text, config)
    } else {
        0
    };

    let mut boundaries = Vec::new();
    let mut unmatched = Vec::new();
    for title in user_titles {
        let entry = TocEntry::new(None, title.clone());
        match locate::locate(&entry, text, search_start, config) {
            Some(found) => boundaries.push(Boundary {
                position: found.body_position,
                title: entry.display(),
                strategy: found.strategy.as_str().to_string(),
            }),
            None => unmatched.push(entry),
        }
    }

    let mut chapters = assemble(
        boundaries,
        text,
        config.min_chapter_words,
        ChapterSource::UserList,
    );
    for chapter in &mut chapters {
        chapter.confidence = 1.0;
    }

    let detection = if chapters.is_empty() {
        chapters.push(whole_book_chapter(text));
        DetectionStrategy::WholeBook
    } else {
        DetectionStrategy::UserList
    };

    let accuracy = Some((chapters.len() as f64 / user_titles.len() as f64).min(1.0));
    let verdict = RunVerdict::from_accuracy(accuracy.unwrap_or(0.0));

    SplitOutcome {
        chapters,
        low_confidence: Vec::new(),
        unmatched,
        toc_entry_count: auto.toc_entry_count,
        detection,
        accuracy,
        verdict,
    }
}
