use std::io::Write;

use chaptersmith_core::{RunVerdict, SplitOutcome};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the extraction summary after text extraction.
pub fn print_extraction_summary(
    w: &mut dyn Write,
    source_name: &str,
    chars: usize,
    page_count: Option<usize>,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w, "Extracting text from {}...", source_name)?;
    let pages = page_count
        .map(|p| format!(" across {} pages", p))
        .unwrap_or_default();
    let msg = format!("Extracted {} characters{}", chars, pages);
    if color.enabled() {
        writeln!(w, "{}", msg.dimmed())?;
    } else {
        writeln!(w, "{}", msg)?;
    }
    writeln!(w)?;
    Ok(())
}

/// Print per-chapter result lines and the run verdict.
pub fn print_outcome(
    w: &mut dyn Write,
    outcome: &SplitOutcome,
    color: ColorMode,
) -> std::io::Result<()> {
    for chapter in &outcome.chapters {
        let line = format!(
            "{} {} ({} words, conf {:.2}, {})",
            chapter.number, chapter.title, chapter.word_count, chapter.confidence, chapter.strategy
        );
        if color.enabled() {
            writeln!(w, "{} {}", "OK".green(), line)?;
        } else {
            writeln!(w, "OK {}", line)?;
        }
    }

    for chapter in &outcome.low_confidence {
        let line = format!(
            "{} {} ({} words, conf {:.2})",
            chapter.number, chapter.title, chapter.word_count, chapter.confidence
        );
        if color.enabled() {
            writeln!(w, "{} {}", "REVIEW".yellow(), line)?;
        } else {
            writeln!(w, "REVIEW {}", line)?;
        }
    }

    for entry in &outcome.unmatched {
        if color.enabled() {
            writeln!(w, "{} {}", "NOT FOUND".red(), entry.display())?;
        } else {
            writeln!(w, "NOT FOUND {}", entry.display())?;
        }
    }

    writeln!(w)?;
    let accuracy = outcome
        .accuracy
        .map(|a| format!(" ({:.0}% of TOC)", a * 100.0))
        .unwrap_or_default();
    let summary = format!(
        "{} chapters via {}{}",
        outcome.chapters.len(),
        outcome.detection.as_str(),
        accuracy
    );

    match outcome.verdict {
        RunVerdict::Success => {
            if color.enabled() {
                writeln!(w, "{}: {}", "SUCCESS".green(), summary)?;
            } else {
                writeln!(w, "SUCCESS: {}", summary)?;
            }
        }
        RunVerdict::NeedsReview => {
            if color.enabled() {
                writeln!(w, "{}: {}", "NEEDS REVIEW".yellow(), summary)?;
            } else {
                writeln!(w, "NEEDS REVIEW: {}", summary)?;
            }
        }
        RunVerdict::LowAccuracy => {
            if color.enabled() {
                writeln!(w, "{}: {}", "LOW ACCURACY".red(), summary)?;
            } else {
                writeln!(w, "LOW ACCURACY: {}", summary)?;
            }
        }
    }
    Ok(())
}

/// Print narrator voice recommendations.
pub fn print_voices(
    w: &mut dyn Write,
    voices: &[chaptersmith_ai::VoiceMatch],
    color: ColorMode,
) -> std::io::Result<()> {
    if voices.is_empty() {
        return Ok(());
    }
    writeln!(w)?;
    writeln!(w, "Narrator recommendations:")?;
    for voice in voices {
        let line = format!(
            "  {} ({}, {} accent) — {}% match",
            voice.name, voice.gender, voice.accent, voice.match_percentage
        );
        if color.enabled() {
            writeln!(w, "{}", line.dimmed())?;
        } else {
            writeln!(w, "{}", line)?;
        }
    }
    Ok(())
}
