//! Query expansion for domain abbreviations.
//!
//! Short, acronym-heavy questions embed poorly; spelling out the acronyms
//! before embedding improves recall. Matching is case-insensitive and on
//! whole words only.

use std::collections::BTreeMap;

use regex::{Captures, Regex};

const DEFAULT_ABBREVIATIONS: [(&str, &str); 7] = [
    ("COB", "Close of Business"),
    ("AA", "Arrangement Architecture"),
    ("MM", "Money Market"),
    ("FX", "Foreign Exchange"),
    ("SW", "SWAP"),
    ("LC", "Letter of Credit"),
    ("MD", "Miscellaneous Deals"),
];

pub struct AbbreviationExpander {
    table: BTreeMap<String, String>,
    pattern: Option<Regex>,
}

impl AbbreviationExpander {
    /// Builds an expander from the built-in table plus `extra` entries; an
    /// extra entry with the same key replaces the built-in expansion.
    pub fn new(extra: &BTreeMap<String, String>) -> Self {
        let mut table: BTreeMap<String, String> = DEFAULT_ABBREVIATIONS
            .iter()
            .map(|(abbr, expansion)| (abbr.to_string(), expansion.to_string()))
            .collect();
        for (abbr, expansion) in extra {
            let key = abbr.trim().to_uppercase();
            if !key.is_empty() {
                table.insert(key, expansion.clone());
            }
        }

        let alternatives: Vec<String> = table.keys().map(|abbr| regex::escape(abbr)).collect();
        let pattern = if alternatives.is_empty() {
            None
        } else {
            Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|"))).ok()
        };

        Self { table, pattern }
    }

    pub fn expand(&self, text: &str) -> String {
        let Some(pattern) = &self.pattern else {
            return text.to_string();
        };

        pattern
            .replace_all(text, |caps: &Captures| {
                let matched = &caps[0];
                self.table
                    .get(&matched.to_uppercase())
                    .cloned()
                    .unwrap_or_else(|| matched.to_string())
            })
            .into_owned()
    }
}

impl Default for AbbreviationExpander {
    fn default() -> Self {
        Self::new(&BTreeMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_whole_words_case_insensitively() {
        let expander = AbbreviationExpander::default();
        assert_eq!(
            expander.expand("How does cob handle FX deals?"),
            "How does Close of Business handle Foreign Exchange deals?"
        );
        assert_eq!(
            expander.expand("Set up an Lc for AA"),
            "Set up an Letter of Credit for Arrangement Architecture"
        );
    }

    #[test]
    fn leaves_embedded_letters_alone() {
        let expander = AbbreviationExpander::default();
        assert_eq!(expander.expand("SWIFT messages and COBOL"), "SWIFT messages and COBOL");
        assert_eq!(expander.expand("swap the mmr field"), "swap the mmr field");
    }

    #[test]
    fn leaves_text_without_abbreviations_untouched() {
        let expander = AbbreviationExpander::default();
        let text = "What is the grace period in r23?";
        assert_eq!(expander.expand(text), text);
    }

    #[test]
    fn extra_entries_extend_and_override() {
        let extra = BTreeMap::from([
            ("gl".to_string(), "General Ledger".to_string()),
            ("SW".to_string(), "Swap".to_string()),
        ]);
        let expander = AbbreviationExpander::new(&extra);
        assert_eq!(expander.expand("GL and sw"), "General Ledger and Swap");
    }
}
