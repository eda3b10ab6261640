//! DOCX extraction: paragraph traversal of `word/document.xml`.

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

    let mut entry = archive.by_name("word/document.xml")?;
    let mut xml = String::new();
    entry.read_to_string(&mut xml)?;

    Ok(ExtractedText {
        text: document_to_text(&xml)?,
        page_count: None,
    })
}

/// Walk the OOXML body: text lives in `w:t` runs, paragraphs (`w:p`) end
/// with a newline, explicit breaks (`w:br`) and tabs (`w:tab`) are
/// self-closing elements.
fn document_to_text(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_run = true;
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"br" => out.push('\n'),
                b"tab" => out.push('\t'),
                _ => {}
            },
            Event::Text(e) => {
                if in_text_run {
                    out.push_str(&e.unescape()?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out)
}
