//! EPUB extraction: XHTML content documents inside a zip container.
//!
//! Reading order is approximated by sorted archive paths. Resolving the
//! OPF spine would be exact, but publishers almost universally number
//! their content files, and chapter detection runs on the concatenated
//! text anyway.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;

use chaptersmith_core::ExtractedText;

use crate::ExtractError;

pub(crate) fn extract(path: &Path) -> Result<ExtractedText, ExtractError> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    let mut content_names: Vec<String> = archive
        .file_names()
        .filter(|name| {
            let lower = name.to_lowercase();
            lower.ends_with(".xhtml") || lower.ends_with(".html") || lower.ends_with(".htm")
        })
        .map(str::to_string)
        .collect();
    content_names.sort();

    tracing::debug!(documents = content_names.len(), "reading EPUB content documents");

    let mut parts = Vec::new();
    for name in &content_names {
        let mut entry = archive.by_name(name)?;
        let mut xml = String::new();
        entry.read_to_string(&mut xml)?;
        parts.push(markup_to_text(&xml)?);
    }

    Ok(ExtractedText {
        text: parts.join("\n\n"),
        page_count: None,
    })
}

/// Tags that imply a line break around their content.
fn is_block(name: &[u8]) -> bool {
    matches!(
        name,
        b"p" | b"div"
            | b"h1"
            | b"h2"
            | b"h3"
            | b"h4"
            | b"h5"
            | b"h6"
            | b"li"
            | b"section"
            | b"blockquote"
            | b"tr"
    )
}

fn push_newline(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Strip markup from an XHTML document, keeping text content with line
/// breaks at block boundaries. Script and style bodies are dropped.
pub(crate) fn markup_to_text(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut skip_depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let local = e.local_name();
                let name = local.as_ref();
                if matches!(name, b"script" | b"style") {
                    skip_depth += 1;
                } else if skip_depth == 0 && is_block(name) {
                    push_newline(&mut out);
                }
            }
            Event::End(e) => {
                let local = e.local_name();
                let name = local.as_ref();
                if matches!(name, b"script" | b"style") {
                    skip_depth = skip_depth.saturating_sub(1);
                } else if skip_depth == 0 && is_block(name) {
                    push_newline(&mut out);
                }
            }
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"br" {
                    out.push('\n');
                }
            }
            Event::Text(e) => {
                if skip_depth == 0 {
                    out.push_str(&e.unescape()?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_epub(path: &Path, chapters: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        writer.start_file("mimetype", options).unwrap();
        writer.write_all(b"application/epub+zip").unwrap();

        for (name, body) in chapters {
            writer
                .start_file(format!("OEBPS/{}", name), options)
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_extracts_chapters_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.epub");
        write_epub(
            &path,
            &[
                (
                    "ch01.xhtml",
                    "<html><body><h1>Prologue</h1><p>It was raining.</p></body></html>",
                ),
                (
                    "ch02.xhtml",
                    "<html><body><h1>Chapter One</h1><p>The sun returned.</p></body></html>",
                ),
            ],
        );

        let extracted = extract(&path).unwrap();
        let prologue = extracted.text.find("Prologue").unwrap();
        let chapter_one = extracted.text.find("Chapter One").unwrap();
        assert!(prologue < chapter_one);
        assert!(extracted.text.contains("It was raining."));
        assert_eq!(extracted.page_count, None);
    }

    #[test]
    fn test_markup_stripped_with_block_breaks() {
        let text =
            markup_to_text("<body><h1>Title</h1><p>First.</p><p>Second.</p></body>").unwrap();
        assert_eq!(text.trim(), "Title\nFirst.\nSecond.");
    }

    #[test]
    fn test_entities_unescaped() {
        let text = markup_to_text("<p>Tom &amp; Jerry</p>").unwrap();
        assert_eq!(text.trim(), "Tom & Jerry");
    }

    #[test]
    fn test_style_bodies_dropped() {
        let text =
            markup_to_text("<head><style>p { color: red; }</style></head><p>Kept.</p>").unwrap();
        assert!(!text.contains("color"));
        assert!(text.contains("Kept."));
    }

    #[test]
    fn test_br_becomes_newline() {
        let text = markup_to_text("<p>line one<br/>line two</p>").unwrap();
        assert!(text.contains("line one\nline two"));
    }
}
