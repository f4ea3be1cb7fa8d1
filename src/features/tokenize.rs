//! Tokenizers for the text/categorical fields.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

lazy_static! {
    static ref PUNCTUATION: Regex = Regex::new(r"[^a-zA-Z0-9\s]").unwrap();
}

/// How a text field is split into tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerKind {
    /// Lowercased unicode words. Used for genre, album and tag fields.
    Words,
    /// Split on `;`, strip punctuation, lowercase; one token per artist.
    /// Keeps multi-word artist names as single vocabulary entries.
    SemicolonList,
}

impl TokenizerKind {
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        match self {
            TokenizerKind::Words => text
                .to_lowercase()
                .unicode_words()
                .map(|w| w.to_string())
                .collect(),
            TokenizerKind::SemicolonList => text
                .split(';')
                .map(|part| {
                    PUNCTUATION
                        .replace_all(part, "")
                        .trim()
                        .to_lowercase()
                })
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }
}
