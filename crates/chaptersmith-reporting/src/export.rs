//! Export of a processing run: HTML review page, JSON, and plain text.

use std::io::Write;
use std::path::Path;

use chaptersmith_ai::{BookAnalysis, SuitabilityVerdict, VoiceMatch};
use chaptersmith_core::{Chapter, SplitOutcome, TocEntry};

/// Everything the exporters need about one run.
pub struct RunReport<'a> {
    pub source_name: &'a str,
    pub page_count: Option<usize>,
    pub outcome: &'a SplitOutcome,
    pub suitability: Option<&'a SuitabilityVerdict>,
    pub analysis: Option<&'a BookAnalysis>,
    pub voices: &'a [VoiceMatch],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Html,
    Json,
    Text,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Json => "json",
            ExportFormat::Text => "txt",
        }
    }
}

/// Render a report in the given format.
pub fn render_report(report: &RunReport<'_>, format: ExportFormat) -> String {
    match format {
        ExportFormat::Html => render_html(report),
        ExportFormat::Json => render_json(report),
        ExportFormat::Text => render_text(report),
    }
}

/// Render and write a report to `path`.
pub fn export_report(
    report: &RunReport<'_>,
    format: ExportFormat,
    path: &Path,
) -> Result<(), String> {
    let content = render_report(report, format);
    let mut file =
        std::fs::File::create(path).map_err(|e| format!("Failed to create file: {}", e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| format!("Failed to write: {}", e))?;
    tracing::info!(path = %path.display(), "wrote report");
    Ok(())
}

// ── JSON ──

fn json_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c < '\x20' => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}

fn json_str(s: &str) -> String {
    format!("\"{}\"", json_escape(s))
}

fn json_opt_str(s: &Option<String>) -> String {
    match s {
        Some(v) => json_str(v),
        None => "null".to_string(),
    }
}

fn chapter_json(chapter: &Chapter, indent: &str) -> String {
    format!(
        "{i}{{\n{i}  \"number\": {},\n{i}  \"title\": {},\n{i}  \"word_count\": {},\n{i}  \"confidence\": {:.2},\n{i}  \"strategy\": {},\n{i}  \"source\": {}\n{i}}}",
        json_str(&chapter.number),
        json_str(&chapter.title),
        chapter.word_count,
        chapter.confidence,
        json_str(&chapter.strategy),
        json_str(chapter.source.as_str()),
        i = indent,
    )
}

fn toc_entry_json(entry: &TocEntry, indent: &str) -> String {
    format!(
        "{i}{{\n{i}  \"ordinal\": {},\n{i}  \"raw_title\": {},\n{i}  \"normalized_title\": {}\n{i}}}",
        json_opt_str(&entry.ordinal),
        json_str(&entry.raw_title),
        json_str(&entry.normalized_title),
        i = indent,
    )
}

fn render_json(report: &RunReport<'_>) -> String {
    let outcome = report.outcome;
    let mut out = String::from("{\n");
    out.push_str(&format!("  \"source\": {},\n", json_str(report.source_name)));
    out.push_str(&format!(
        "  \"page_count\": {},\n",
        report
            .page_count
            .map(|p| p.to_string())
            .unwrap_or_else(|| "null".to_string())
    ));
    out.push_str(&format!(
        "  \"detection\": {},\n",
        json_str(outcome.detection.as_str())
    ));
    out.push_str(&format!(
        "  \"verdict\": {},\n",
        json_str(outcome.verdict.as_str())
    ));
    out.push_str(&format!(
        "  \"accuracy\": {},\n",
        outcome
            .accuracy
            .map(|a| format!("{:.3}", a))
            .unwrap_or_else(|| "null".to_string())
    ));
    out.push_str(&format!(
        "  \"toc_entry_count\": {},\n",
        outcome.toc_entry_count
    ));

    if let Some(verdict) = report.suitability {
        out.push_str(&format!(
            "  \"suitability\": {{\n    \"is_suitable\": {},\n    \"document_type\": {},\n    \"reason\": {}\n  }},\n",
            verdict.is_suitable,
            json_str(&verdict.document_type),
            json_str(&verdict.reason),
        ));
    }

    let chapters: Vec<String> = outcome
        .chapters
        .iter()
        .map(|c| chapter_json(c, "    "))
        .collect();
    out.push_str(&format!("  \"chapters\": [\n{}\n  ],\n", chapters.join(",\n")));

    let low: Vec<String> = outcome
        .low_confidence
        .iter()
        .map(|c| chapter_json(c, "    "))
        .collect();
    out.push_str(&format!(
        "  \"low_confidence\": [\n{}\n  ],\n",
        low.join(",\n")
    ));

    let unmatched: Vec<String> = outcome
        .unmatched
        .iter()
        .map(|e| toc_entry_json(e, "    "))
        .collect();
    out.push_str(&format!(
        "  \"unmatched_toc_entries\": [\n{}\n  ],\n",
        unmatched.join(",\n")
    ));

    let voices: Vec<String> = report
        .voices
        .iter()
        .map(|v| {
            format!(
                "    {{\n      \"name\": {},\n      \"gender\": {},\n      \"accent\": {},\n      \"match_percentage\": {}\n    }}",
                json_str(&v.name),
                json_str(&v.gender),
                json_str(&v.accent),
                v.match_percentage,
            )
        })
        .collect();
    out.push_str(&format!("  \"voices\": [\n{}\n  ]\n", voices.join(",\n")));

    out.push_str("}\n");
    out
}

// ── HTML ──

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn chapter_row(chapter: &Chapter, low_confidence: bool) -> String {
    let class = if low_confidence { " class=\"low\"" } else { "" };
    format!(
        "      <tr{}><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td><td>{}</td></tr>\n",
        class,
        html_escape(&chapter.number),
        html_escape(&chapter.title),
        chapter.word_count,
        chapter.confidence,
        html_escape(&chapter.strategy),
    )
}

fn render_html(report: &RunReport<'_>) -> String {
    let outcome = report.outcome;
    let mut out = String::new();

    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!(
        "<title>Chapter Report — {}</title>\n",
        html_escape(report.source_name)
    ));
    out.push_str(
        "<style>\n\
         body { font-family: -apple-system, Segoe UI, sans-serif; max-width: 900px; margin: 2em auto; color: #222; }\n\
         table { border-collapse: collapse; width: 100%; }\n\
         th, td { border: 1px solid #ddd; padding: 6px 10px; text-align: left; }\n\
         th { background: #f4f4f4; }\n\
         tr.low { background: #fff3cd; }\n\
         .summary { display: flex; gap: 2em; margin: 1em 0; }\n\
         .summary div { background: #f8f8f8; padding: 0.8em 1.2em; border-radius: 6px; }\n\
         .verdict-success { color: #1a7f37; }\n\
         .verdict-needs_review { color: #9a6700; }\n\
         .verdict-low_accuracy { color: #cf222e; }\n\
         </style>\n</head>\n<body>\n",
    );

    out.push_str(&format!(
        "<h1>Chapter Report — {}</h1>\n",
        html_escape(report.source_name)
    ));

    let accuracy = outcome
        .accuracy
        .map(|a| format!("{:.0}%", a * 100.0))
        .unwrap_or_else(|| "n/a".to_string());
    out.push_str("<div class=\"summary\">\n");
    out.push_str(&format!(
        "  <div><b>Verdict</b><br><span class=\"verdict-{}\">{}</span></div>\n",
        outcome.verdict.as_str(),
        outcome.verdict.as_str()
    ));
    out.push_str(&format!(
        "  <div><b>Detection</b><br>{}</div>\n",
        outcome.detection.as_str()
    ));
    out.push_str(&format!(
        "  <div><b>Chapters</b><br>{}</div>\n",
        outcome.chapters.len()
    ));
    out.push_str(&format!("  <div><b>Accuracy</b><br>{}</div>\n", accuracy));
    if let Some(pages) = report.page_count {
        out.push_str(&format!("  <div><b>Pages</b><br>{}</div>\n", pages));
    }
    out.push_str("</div>\n");

    if let Some(analysis) = report.analysis {
        out.push_str("<h2>Book</h2>\n<p>");
        if let Some(title) = &analysis.title {
            out.push_str(&format!("<b>{}</b>", html_escape(title)));
        }
        if let Some(author) = &analysis.author {
            out.push_str(&format!(" by {}", html_escape(author)));
        }
        if let Some(genre) = &analysis.genre {
            out.push_str(&format!(" — {}", html_escape(genre)));
        }
        out.push_str("</p>\n");
    }

    out.push_str("<h2>Chapters</h2>\n<table>\n");
    out.push_str(
        "      <tr><th>Number</th><th>Title</th><th>Words</th><th>Confidence</th><th>Strategy</th></tr>\n",
    );
    for chapter in &outcome.chapters {
        out.push_str(&chapter_row(chapter, false));
    }
    for chapter in &outcome.low_confidence {
        out.push_str(&chapter_row(chapter, true));
    }
    out.push_str("</table>\n");
    if !outcome.low_confidence.is_empty() {
        out.push_str(&format!(
            "<p>{} low-confidence chapter(s) highlighted for review.</p>\n",
            outcome.low_confidence.len()
        ));
    }

    if !outcome.unmatched.is_empty() {
        out.push_str("<h2>Unmatched TOC entries</h2>\n<ul>\n");
        for entry in &outcome.unmatched {
            out.push_str(&format!("  <li>{}</li>\n", html_escape(&entry.display())));
        }
        out.push_str("</ul>\n");
    }

    if !report.voices.is_empty() {
        out.push_str("<h2>Narrator recommendations</h2>\n<table>\n");
        out.push_str("      <tr><th>Name</th><th>Gender</th><th>Accent</th><th>Match</th><th>Rationale</th></tr>\n");
        for voice in report.voices {
            out.push_str(&format!(
                "      <tr><td>{}</td><td>{}</td><td>{}</td><td>{}%</td><td>{}</td></tr>\n",
                html_escape(&voice.name),
                html_escape(&voice.gender),
                html_escape(&voice.accent),
                voice.match_percentage,
                html_escape(&voice.rationale),
            ));
        }
        out.push_str("</table>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}

// ── Text ──

fn render_text(report: &RunReport<'_>) -> String {
    let outcome = report.outcome;
    let mut out = String::new();
    out.push_str(&format!("Source: {}\n", report.source_name));
    out.push_str(&format!("Detection: {}\n", outcome.detection.as_str()));
    out.push_str(&format!("Verdict: {}\n", outcome.verdict.as_str()));
    if let Some(accuracy) = outcome.accuracy {
        out.push_str(&format!("Accuracy: {:.0}%\n", accuracy * 100.0));
    }
    out.push_str(&format!(
        "Chapters: {} accepted, {} low-confidence, {} unmatched TOC entries\n\n",
        outcome.chapters.len(),
        outcome.low_confidence.len(),
        outcome.unmatched.len()
    ));

    for chapter in &outcome.chapters {
        out.push_str(&format!(
            "  {} {} ({} words, conf {:.2}, {})\n",
            chapter.number, chapter.title, chapter.word_count, chapter.confidence, chapter.strategy
        ));
    }
    for chapter in &outcome.low_confidence {
        out.push_str(&format!(
            "  [review] {} {} ({} words, conf {:.2})\n",
            chapter.number, chapter.title, chapter.word_count, chapter.confidence
        ));
    }
    for entry in &outcome.unmatched {
        out.push_str(&format!("  [unmatched] {}\n", entry.display()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaptersmith_core::{ChapterSource, DetectionStrategy, RunVerdict};

    fn sample_outcome() -> SplitOutcome {
        let chapter = Chapter {
            number: "01".to_string(),
            title: "Tom & Jerry's <Day>".to_string(),
            content: "content".to_string(),
            word_count: 700,
            confidence: 0.85,
            source: ChapterSource::Toc,
            strategy: "exact".to_string(),
            position: 5000,
        };
        let mut low = chapter.clone();
        low.number = "02".to_string();
        low.title = "Shaky".to_string();
        low.confidence = 0.6;

        SplitOutcome {
            chapters: vec![chapter],
            low_confidence: vec![low],
            unmatched: vec![TocEntry::new(Some("3".to_string()), "TheGhostChapter")],
            toc_entry_count: 3,
            detection: DetectionStrategy::Toc,
            accuracy: Some(1.0 / 3.0),
            verdict: RunVerdict::LowAccuracy,
        }
    }

    fn report(outcome: &SplitOutcome) -> RunReport<'_> {
        RunReport {
            source_name: "book.pdf",
            page_count: Some(214),
            outcome,
            suitability: None,
            analysis: None,
            voices: &[],
        }
    }

    #[test]
    fn test_json_escapes_titles() {
        let outcome = sample_outcome();
        let json = render_report(&report(&outcome), ExportFormat::Json);
        assert!(json.contains(r#""title": "Tom & Jerry's <Day>""#));
        assert!(json.contains(r#""verdict": "low_accuracy""#));
        assert!(json.contains(r#""page_count": 214"#));
    }

    #[test]
    fn test_html_escapes_titles() {
        let outcome = sample_outcome();
        let html = render_report(&report(&outcome), ExportFormat::Html);
        assert!(html.contains("Tom &amp; Jerry's &lt;Day&gt;"));
        assert!(!html.contains("<Day>"));
    }

    #[test]
    fn test_html_highlights_low_confidence() {
        let outcome = sample_outcome();
        let html = render_report(&report(&outcome), ExportFormat::Html);
        assert!(html.contains("class=\"low\""));
        assert!(html.contains("1 low-confidence chapter(s)"));
    }

    #[test]
    fn test_html_lists_unmatched_entries() {
        let outcome = sample_outcome();
        let html = render_report(&report(&outcome), ExportFormat::Html);
        assert!(html.contains("Unmatched TOC entries"));
        assert!(html.contains("3 The Ghost Chapter"));
    }

    #[test]
    fn test_text_summary() {
        let outcome = sample_outcome();
        let text = render_report(&report(&outcome), ExportFormat::Text);
        assert!(text.contains("Verdict: low_accuracy"));
        assert!(text.contains("1 accepted, 1 low-confidence, 1 unmatched"));
        assert!(text.contains("[unmatched] 3 The Ghost Chapter"));
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let outcome = sample_outcome();
        export_report(&report(&outcome), ExportFormat::Json, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("{"));
    }
}
