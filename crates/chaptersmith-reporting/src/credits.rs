//! Opening and closing credits scripts for narration.
//!
//! Scripts are plain text with `[PAUSE: ...]` markers the narration stage
//! understands. Productions narrated by synthetic voices get a disclosure
//! line in the closing credits.

use std::path::{Path, PathBuf};

/// Book metadata used for credits generation.
#[derive(Debug, Clone)]
pub struct BookMetadata {
    pub title: String,
    pub author: String,
    pub narrator: String,
    pub subtitle: Option<String>,
    pub genre: Option<String>,
    pub copyright_year: u16,
    pub copyright_holder: Option<String>,
    pub production_company: String,
    pub include_extended_credits: bool,
    pub use_ai_narration: bool,
}

impl BookMetadata {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            narrator: "To Be Determined".to_string(),
            subtitle: None,
            genre: None,
            copyright_year: 2025,
            copyright_holder: None,
            production_company: "Chaptersmith".to_string(),
            include_extended_credits: false,
            use_ai_narration: false,
        }
    }

    fn full_title(&self) -> String {
        match &self.subtitle {
            Some(subtitle) => format!("{}: {}", self.title, subtitle),
            None => self.title.clone(),
        }
    }

    fn holder(&self) -> &str {
        self.copyright_holder.as_deref().unwrap_or(&self.author)
    }
}

/// Generates opening and closing credits scripts.
pub struct CreditsGenerator {
    metadata: BookMetadata,
}

impl CreditsGenerator {
    pub fn new(metadata: BookMetadata) -> Self {
        Self { metadata }
    }

    pub fn opening_credits(&self) -> String {
        let m = &self.metadata;
        let mut script = String::new();
        script.push_str(&format!("\"{}\"\n", m.full_title()));
        script.push_str("[PAUSE: 0.5 seconds]\n");

        if m.include_extended_credits {
            match &m.genre {
                Some(genre) => {
                    script.push_str(&format!("\"A {} by {}\"\n", genre, m.author));
                }
                None => script.push_str(&format!("\"Written by {}\"\n", m.author)),
            }
        } else {
            script.push_str(&format!("\"Written by {}\"\n", m.author));
        }

        script.push_str("[PAUSE: 0.5 seconds]\n");
        script.push_str(&format!("\"Narrated by {}\"\n", m.narrator));

        if m.include_extended_credits {
            script.push_str("[PAUSE: 0.5 seconds]\n");
            script.push_str(&format!("\"Produced by {}\"\n", m.production_company));
        }
        script
    }

    pub fn closing_credits(&self) -> String {
        let m = &self.metadata;
        let mut script = String::new();
        script.push_str(&format!("\"This has been {}\"\n", m.full_title()));
        script.push_str("[PAUSE: 0.5 seconds]\n");
        script.push_str(&format!("\"Written by {}\"\n", m.author));
        script.push_str("[PAUSE: 0.5 seconds]\n");
        script.push_str(&format!("\"Narrated by {}\"\n", m.narrator));
        script.push_str("[PAUSE: 0.3 seconds]\n");

        if m.use_ai_narration {
            // Disclosure wording is deliberately provider-neutral
            script.push_str(
                "\"This audiobook was created using state-of-the-art voice synthesis technology\"\n",
            );
            script.push_str("[PAUSE: 0.3 seconds]\n");
        }

        script.push_str(&format!(
            "\"Copyright {} by {}\"\n",
            m.copyright_year,
            m.holder()
        ));
        script.push_str("[PAUSE: 0.3 seconds]\n");
        script.push_str("\"The End\"\n");
        script
    }

    /// Write both scripts into `dir` as `00_opening_credits.txt` and
    /// `99_closing_credits.txt`.
    pub fn write_credits(&self, dir: &Path) -> std::io::Result<(PathBuf, PathBuf)> {
        std::fs::create_dir_all(dir)?;
        let opening_path = dir.join("00_opening_credits.txt");
        let closing_path = dir.join("99_closing_credits.txt");
        std::fs::write(&opening_path, self.opening_credits())?;
        std::fs::write(&closing_path, self.closing_credits())?;
        Ok((opening_path, closing_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_opening_credits() {
        let credits = CreditsGenerator::new(BookMetadata::new("The Long Road", "Jane Doe"));
        let script = credits.opening_credits();
        assert!(script.starts_with("\"The Long Road\"\n"));
        assert!(script.contains("\"Written by Jane Doe\""));
        assert!(script.contains("\"Narrated by To Be Determined\""));
        assert!(!script.contains("Produced by"));
    }

    #[test]
    fn test_extended_credits_include_producer_and_genre() {
        let mut metadata = BookMetadata::new("The Long Road", "Jane Doe");
        metadata.include_extended_credits = true;
        metadata.genre = Some("memoir".to_string());
        let script = CreditsGenerator::new(metadata).opening_credits();
        assert!(script.contains("\"A memoir by Jane Doe\""));
        assert!(script.contains("\"Produced by Chaptersmith\""));
    }

    #[test]
    fn test_subtitle_in_full_title() {
        let mut metadata = BookMetadata::new("The Long Road", "Jane Doe");
        metadata.subtitle = Some("A Memoir".to_string());
        let script = CreditsGenerator::new(metadata).opening_credits();
        assert!(script.starts_with("\"The Long Road: A Memoir\"\n"));
    }

    #[test]
    fn test_ai_disclosure_only_when_enabled() {
        let mut metadata = BookMetadata::new("The Long Road", "Jane Doe");
        let without = CreditsGenerator::new(metadata.clone()).closing_credits();
        assert!(!without.contains("voice synthesis"));

        metadata.use_ai_narration = true;
        let with = CreditsGenerator::new(metadata).closing_credits();
        assert!(with.contains("voice synthesis technology"));
    }

    #[test]
    fn test_closing_credits_end_with_the_end() {
        let script =
            CreditsGenerator::new(BookMetadata::new("The Long Road", "Jane Doe")).closing_credits();
        assert!(script.ends_with("\"The End\"\n"));
        assert!(script.contains("\"Copyright 2025 by Jane Doe\""));
    }

    #[test]
    fn test_write_credits_files() {
        let dir = tempfile::tempdir().unwrap();
        let credits = CreditsGenerator::new(BookMetadata::new("The Long Road", "Jane Doe"));
        let (opening, closing) = credits.write_credits(dir.path()).unwrap();
        assert!(opening.ends_with("00_opening_credits.txt"));
        assert!(std::fs::read_to_string(&closing)
            .unwrap()
            .contains("The End"));
    }
}
