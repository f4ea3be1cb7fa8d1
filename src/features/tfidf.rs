//! TF-IDF vectorization of a single text field.

use super::tokenize::TokenizerKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// TF-IDF vectorizer with a frozen, capped vocabulary.
///
/// `fit` selects the top `max_features` tokens by document frequency
/// (ties broken by token ascending) and orders columns alphabetically, so
/// the column layout is deterministic for a given corpus. Idf weights use
/// the smoothed formula `ln((N+1)/(df+1)) + 1`; each transformed row is
/// normalized to unit Euclidean norm. Tokens unseen at fit time are
/// ignored at transform time; the vocabulary never grows after build.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    tokenizer: TokenizerKind,
    max_features: usize,
    /// token -> column within this block
    vocabulary: HashMap<String, u32>,
    /// idf weight per column
    idf: Vec<f32>,
}

impl TfidfVectorizer {
    pub fn fit<S: AsRef<str>>(
        tokenizer: TokenizerKind,
        max_features: usize,
        documents: &[S],
    ) -> Self {
        let n_docs = documents.len();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for doc in documents {
            let mut seen: Vec<String> = tokenizer.tokenize(doc.as_ref());
            seen.sort_unstable();
            seen.dedup();
            for token in seen {
                *doc_freq.entry(token).or_insert(0) += 1;
            }
        }

        // Cap the vocabulary: highest document frequency first, token
        // ascending on ties, so the selection is reproducible.
        let mut ranked: Vec<(String, usize)> = doc_freq.into_iter().collect();
        ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(max_features);

        // Columns in alphabetical token order.
        let mut selected: Vec<(String, usize)> = ranked;
        selected.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let mut vocabulary = HashMap::with_capacity(selected.len());
        let mut idf = Vec::with_capacity(selected.len());
        for (column, (token, df)) in selected.into_iter().enumerate() {
            vocabulary.insert(token, column as u32);
            idf.push((((n_docs + 1) as f32) / ((df + 1) as f32)).ln() + 1.0);
        }

        TfidfVectorizer {
            tokenizer,
            max_features,
            vocabulary,
            idf,
        }
    }

    /// Number of columns in this block.
    pub fn width(&self) -> usize {
        self.idf.len()
    }

    /// Transform one document into L2-normalized (column, weight) entries.
    /// Columns are local to this block; the encoder applies the block offset.
    pub fn transform(&self, document: &str) -> Vec<(u32, f32)> {
        let mut counts: HashMap<u32, f32> = HashMap::new();
        for token in self.tokenizer.tokenize(document) {
            if let Some(&column) = self.vocabulary.get(&token) {
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(u32, f32)> = counts
            .into_iter()
            .map(|(column, tf)| (column, tf * self.idf[column as usize]))
            .collect();

        let norm = entries.iter().map(|&(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for entry in entries.iter_mut() {
                entry.1 /= norm;
            }
        }
        entries.sort_unstable_by_key(|&(c, _)| c);
        entries
    }
}
