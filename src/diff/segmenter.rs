//! Splits answer text into the candidate chunks compared across versions.

use std::sync::OnceLock;

use regex::Regex;

fn block_separator() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\n\s*\n").expect("block pattern is valid"))
}

fn sentence_end() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[.!?]\s+").expect("sentence pattern is valid"))
}

fn whitespace_run() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"))
}

/// Paragraph blocks when the text has more than one, otherwise sentences.
///
/// A sentence ends at `.`, `!` or `?` followed by whitespace; the
/// punctuation stays with the sentence.
pub fn split_into_sentences(text: &str) -> Vec<String> {
    let text = text.trim();

    let blocks: Vec<&str> = block_separator().split(text).collect();
    if blocks.len() > 1 {
        return blocks
            .into_iter()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(str::to_string)
            .collect();
    }

    let mut sentences = Vec::new();
    let mut start = 0;
    for m in sentence_end().find_iter(text) {
        // Punctuation is a single ASCII byte.
        sentences.push(&text[start..m.start() + 1]);
        start = m.end();
    }
    sentences.push(&text[start..]);

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Sentence units and non-empty lines, deduplicated in first-seen order,
/// followed by the whole trimmed text unless it is already present.
pub fn split_into_chunks(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let lines = trimmed
        .split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string);

    let mut chunks: Vec<String> = Vec::new();
    for candidate in split_into_sentences(trimmed).into_iter().chain(lines) {
        if !chunks.contains(&candidate) {
            chunks.push(candidate);
        }
    }

    if !chunks.iter().any(|c| c == trimmed) {
        chunks.push(trimmed.to_string());
    }
    chunks
}

/// Lower-cased, trimmed, with every whitespace run collapsed to one space.
pub fn normalize_text(text: &str) -> String {
    whitespace_run()
        .replace_all(text.trim(), " ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_split_into_blocks() {
        assert_eq!(split_into_sentences("A.\n\nB."), vec!["A.", "B."]);
        assert_eq!(
            split_into_sentences("First para. Still first.\n   \nSecond para."),
            vec!["First para. Still first.", "Second para."]
        );
    }

    #[test]
    fn single_block_splits_on_sentence_punctuation() {
        assert_eq!(
            split_into_sentences("Fees apply. Is it capped? Yes!  Done"),
            vec!["Fees apply.", "Is it capped?", "Yes!", "Done"]
        );
        assert_eq!(split_into_sentences("version 1.2 is out"), vec!["version 1.2 is out"]);
        assert!(split_into_sentences("   ").is_empty());
    }

    #[test]
    fn chunks_cover_sentences_lines_and_whole_text() {
        let chunks = split_into_chunks("A.\n\nB.");
        assert!(chunks.contains(&"A.".to_string()));
        assert!(chunks.contains(&"B.".to_string()));
        assert!(chunks.contains(&"A.\n\nB.".to_string()));
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn chunks_are_deduplicated() {
        let chunks = split_into_chunks("Only one sentence.");
        assert_eq!(chunks, vec!["Only one sentence."]);

        let chunks = split_into_chunks("Line one\nLine one\nLine two");
        assert_eq!(chunks, vec!["Line one\nLine one\nLine two", "Line one", "Line two"]);
    }

    #[test]
    fn punctuation_variants_stay_distinct() {
        let chunks = split_into_chunks("Cap is 100\nCap is 100.");
        assert!(chunks.contains(&"Cap is 100".to_string()));
        assert!(chunks.contains(&"Cap is 100.".to_string()));
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(split_into_chunks("").is_empty());
        assert!(split_into_chunks(" \n\t ").is_empty());
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_text("  The Fee\tCap\n\n is  100. "), "the fee cap is 100.");
        assert_eq!(normalize_text(""), "");
    }
}
