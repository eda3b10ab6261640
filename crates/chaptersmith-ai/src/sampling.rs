//! Strategic text sampling for AI analysis.
//!
//! Classifier and recommender prompts don't need the whole book; five
//! excerpts spread across it represent the content well and keep requests
//! small and fast.

/// Extract a representative sample: five excerpts (opening, quarter,
/// middle, three-quarter, ending) of `total_words / 5` words each, joined
/// with `---` separators. Documents shorter than `total_words` are
/// returned whole.
pub fn sample_for_analysis(text: &str, total_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= total_words {
        return words.join(" ");
    }

    let per_location = (total_words / 5).max(1);
    let anchors = [
        0,
        words.len() / 4,
        words.len() / 2,
        3 * words.len() / 4,
        words.len().saturating_sub(per_location),
    ];

    let samples: Vec<String> = anchors
        .iter()
        .map(|&start| {
            let end = (start + per_location).min(words.len());
            words[start..end].join(" ")
        })
        .collect();

    samples.join("\n\n---\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_returned_whole() {
        let text = "just a handful of words here";
        assert_eq!(sample_for_analysis(text, 1000), text);
    }

    #[test]
    fn test_five_sections_sampled() {
        let text = (0..10_000)
            .map(|i| format!("w{}", i))
            .collect::<Vec<_>>()
            .join(" ");
        let sample = sample_for_analysis(&text, 1000);

        assert_eq!(sample.matches("---").count(), 4);
        // Opening, middle, and ending words all present
        assert!(sample.contains("w0 "));
        assert!(sample.contains("w5000"));
        assert!(sample.contains("w9999"));
    }

    #[test]
    fn test_sample_size_bounded() {
        let text = (0..50_000)
            .map(|i| format!("w{}", i))
            .collect::<Vec<_>>()
            .join(" ");
        let sample = sample_for_analysis(&text, 1000);
        let sampled_words = sample
            .split_whitespace()
            .filter(|w| w.starts_with('w'))
            .count();
        assert!(sampled_words <= 1000);
    }
}
