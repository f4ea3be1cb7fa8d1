//! Feature encoder: raw track attributes to fixed-schema sparse vectors.
//!
//! The encoded vector is the concatenation of a min-max-scaled numeric
//! block and one TF-IDF block per text field (artist, genre, album, tags).
//! Block boundaries are recorded in a `FeatureSchema` alongside the matrix
//! so query-time vectors for the same corpus stay interpretable without
//! re-deriving the layout.

use super::scaler::MinMaxScaler;
use super::tfidf::TfidfVectorizer;
use super::tokenize::TokenizerKind;
use super::vector::SparseVector;
use crate::track_store::{Track, NUMERIC_ATTRIBUTES};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// One contiguous column range of the feature vector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSchema {
    pub name: String,
    pub offset: usize,
    pub width: usize,
}

/// Column layout of the feature vector, fixed at build time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub blocks: Vec<BlockSchema>,
    pub dim: usize,
}

impl FeatureSchema {
    pub fn block(&self, name: &str) -> Option<&BlockSchema> {
        self.blocks.iter().find(|b| b.name == name)
    }
}

/// Per-field vocabulary caps for the TF-IDF blocks.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EncoderParams {
    pub artist_max_features: usize,
    pub genre_max_features: usize,
    pub album_max_features: usize,
    pub tags_max_features: usize,
}

impl Default for EncoderParams {
    fn default() -> Self {
        EncoderParams {
            artist_max_features: 1000,
            genre_max_features: 128,
            album_max_features: 1000,
            tags_max_features: 1000,
        }
    }
}

/// Row-aligned collection of encoded vectors plus their schema.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeatureMatrix {
    pub schema: FeatureSchema,
    pub rows: Vec<SparseVector>,
}

impl FeatureMatrix {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn dim(&self) -> usize {
        self.schema.dim
    }
}

/// Frozen encoder: scale parameters and per-field vocabularies computed
/// once over the build corpus, reused unchanged for any future vector.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeatureEncoder {
    scaler: MinMaxScaler,
    artist_tfidf: TfidfVectorizer,
    genre_tfidf: TfidfVectorizer,
    album_tfidf: TfidfVectorizer,
    tags_tfidf: TfidfVectorizer,
    schema: FeatureSchema,
}

impl FeatureEncoder {
    /// Fit scale parameters and vocabularies over the build corpus.
    pub fn fit(tracks: &[Track], params: &EncoderParams) -> Self {
        let numeric: Vec<[f32; 13]> = tracks.iter().map(|t| t.attributes.to_array()).collect();
        let scaler = MinMaxScaler::fit(&numeric);

        let artists: Vec<&str> = tracks.iter().map(|t| t.artist.as_str()).collect();
        let genres: Vec<&str> = tracks
            .iter()
            .map(|t| t.genre.as_deref().unwrap_or(""))
            .collect();
        let albums: Vec<&str> = tracks
            .iter()
            .map(|t| t.album.as_deref().unwrap_or(""))
            .collect();
        let tags: Vec<&str> = tracks
            .iter()
            .map(|t| t.tags.as_deref().unwrap_or(""))
            .collect();

        let artist_tfidf =
            TfidfVectorizer::fit(TokenizerKind::SemicolonList, params.artist_max_features, &artists);
        let genre_tfidf =
            TfidfVectorizer::fit(TokenizerKind::Words, params.genre_max_features, &genres);
        let album_tfidf =
            TfidfVectorizer::fit(TokenizerKind::Words, params.album_max_features, &albums);
        let tags_tfidf =
            TfidfVectorizer::fit(TokenizerKind::Words, params.tags_max_features, &tags);

        let mut blocks = Vec::new();
        let mut offset = 0usize;
        for (name, width) in [
            ("audio", NUMERIC_ATTRIBUTES.len()),
            ("artist", artist_tfidf.width()),
            ("genre", genre_tfidf.width()),
            ("album", album_tfidf.width()),
            ("tags", tags_tfidf.width()),
        ] {
            blocks.push(BlockSchema {
                name: name.to_string(),
                offset,
                width,
            });
            offset += width;
        }
        let schema = FeatureSchema { blocks, dim: offset };

        info!(
            "Fitted feature encoder: {} columns ({} audio + {} artist + {} genre + {} album + {} tags)",
            schema.dim,
            NUMERIC_ATTRIBUTES.len(),
            artist_tfidf.width(),
            genre_tfidf.width(),
            album_tfidf.width(),
            tags_tfidf.width(),
        );

        FeatureEncoder {
            scaler,
            artist_tfidf,
            genre_tfidf,
            album_tfidf,
            tags_tfidf,
            schema,
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Encode one track with the frozen parameters.
    pub fn encode(&self, track: &Track) -> SparseVector {
        let mut entries: Vec<(u32, f32)> = Vec::new();

        let scaled = self.scaler.transform(&track.attributes.to_array());
        for (column, value) in scaled.into_iter().enumerate() {
            entries.push((column as u32, value));
        }

        let text_blocks: [(&TfidfVectorizer, &str, &str); 4] = [
            (&self.artist_tfidf, "artist", track.artist.as_str()),
            (&self.genre_tfidf, "genre", track.genre.as_deref().unwrap_or("")),
            (&self.album_tfidf, "album", track.album.as_deref().unwrap_or("")),
            (&self.tags_tfidf, "tags", track.tags.as_deref().unwrap_or("")),
        ];
        for (vectorizer, block_name, text) in text_blocks {
            // block() cannot miss: the schema is built from these same fields.
            let offset = self.schema.block(block_name).map(|b| b.offset).unwrap_or(0) as u32;
            for (column, weight) in vectorizer.transform(text) {
                entries.push((offset + column, weight));
            }
        }

        SparseVector::from_entries(entries)
    }

    /// Encode the whole corpus, one row per track in row-id order.
    pub fn encode_all(&self, tracks: &[Track]) -> FeatureMatrix {
        let rows: Vec<SparseVector> = tracks.par_iter().map(|t| self.encode(t)).collect();
        FeatureMatrix {
            schema: self.schema.clone(),
            rows,
        }
    }
}
