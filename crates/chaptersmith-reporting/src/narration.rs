//! Narration-ready per-chapter text files.

use std::io::Write;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use chaptersmith_core::Chapter;

static UNSAFE_CHARS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());
static SPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Make a chapter title safe for a filename: drop everything outside
/// word chars, whitespace, and hyphens, then join words with underscores.
pub fn sanitize_title(title: &str) -> String {
    let cleaned = UNSAFE_CHARS_RE.replace_all(title, "");
    SPACE_RUN_RE
        .replace_all(cleaned.trim(), "_")
        .into_owned()
}

/// Filename for a chapter: `<number>_<sanitized-title>.txt`.
pub fn chapter_filename(chapter: &Chapter) -> String {
    format!("{}_{}.txt", chapter.number, sanitize_title(&chapter.title))
}

/// Write one text file per chapter into `dir` (created if missing).
/// Returns the written paths in chapter order.
pub fn write_chapter_files(chapters: &[Chapter], dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut paths = Vec::with_capacity(chapters.len());
    for chapter in chapters {
        let path = dir.join(chapter_filename(chapter));
        let mut file = std::fs::File::create(&path)?;
        file.write_all(chapter.content.as_bytes())?;
        tracing::info!(path = %path.display(), words = chapter.word_count, "wrote chapter file");
        paths.push(path);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaptersmith_core::ChapterSource;

    fn chapter(number: &str, title: &str, content: &str) -> Chapter {
        Chapter {
            number: number.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            word_count: content.split_whitespace().count(),
            confidence: 0.9,
            source: ChapterSource::Toc,
            strategy: "exact".to_string(),
            position: 0,
        }
    }

    #[test]
    fn test_sanitize_drops_punctuation() {
        assert_eq!(sanitize_title("Chapter 7: The Storm!"), "Chapter_7_The_Storm");
    }

    #[test]
    fn test_sanitize_keeps_hyphens() {
        assert_eq!(sanitize_title("The Well-Worn Path"), "The_Well-Worn_Path");
    }

    #[test]
    fn test_chapter_filename() {
        let ch = chapter("01", "Once Upon a Time", "text");
        assert_eq!(chapter_filename(&ch), "01_Once_Upon_a_Time.txt");
    }

    #[test]
    fn test_epilogue_sentinel_filename() {
        let ch = chapter("900", "Epilogue", "text");
        assert_eq!(chapter_filename(&ch), "900_Epilogue.txt");
    }

    #[test]
    fn test_write_chapter_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("chapters");
        let chapters = vec![
            chapter("00", "Prologue", "Prologue text."),
            chapter("01", "First", "First chapter text."),
        ];

        let paths = write_chapter_files(&chapters, &out).unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(
            std::fs::read_to_string(&paths[0]).unwrap(),
            "Prologue text."
        );
        assert!(paths[1].ends_with("01_First.txt"));
    }
}
