//! The recommendation service: seed resolution, nearest-neighbor lookup
//! and mood filtering over the active model snapshot.

use crate::model::{ModelRegistry, ModelSnapshot, ModelVariant};
use crate::mood::{MoodFilterError, MoodTable};
use crate::track_store::Track;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// How many near-match names to surface when a seed is not found.
const MAX_SUGGESTIONS: usize = 5;

pub const DEFAULT_RECOMMENDATIONS: usize = 12;

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("{message}")]
    NotFound {
        message: String,
        /// Best-effort near matches, "name - artist" strings.
        suggestions: Vec<String>,
    },

    #[error("{0}")]
    InvalidParameter(String),

    #[error("Model variant '{0}' is not loaded")]
    ModelUnavailable(ModelVariant),
}

impl From<MoodFilterError> for RecommendError {
    fn from(err: MoodFilterError) -> Self {
        match err {
            MoodFilterError::UnknownMood { .. } => {
                RecommendError::InvalidParameter(err.to_string())
            }
            MoodFilterError::NoMatches(_) | MoodFilterError::NoMatchesWithTags { .. } => {
                RecommendError::NotFound {
                    message: err.to_string(),
                    suggestions: Vec::new(),
                }
            }
        }
    }
}

/// One recommended track, shaped for display.
#[derive(Clone, Debug, Serialize)]
pub struct Recommendation {
    pub name: String,
    pub artist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spotify_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// Cosine similarity to the seed, rounded to 3 decimals. Absent for
    /// mood results, which are ranked by raw attributes instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
}

impl Recommendation {
    fn from_track(track: &Track, similarity: Option<f64>) -> Self {
        Recommendation {
            name: track.name.clone(),
            artist: track.artist.clone(),
            year: track.year,
            genre: track.genre.clone(),
            spotify_id: track.spotify_id.clone(),
            tags: track.tags.clone(),
            similarity_score: similarity,
        }
    }
}

/// Pure read-only facade over the registry; every call pins one snapshot
/// for its whole duration.
pub struct Recommender {
    registry: Arc<ModelRegistry>,
    moods: MoodTable,
}

impl Recommender {
    pub fn new(registry: Arc<ModelRegistry>, moods: MoodTable) -> Self {
        Recommender { registry, moods }
    }

    pub fn moods(&self) -> &MoodTable {
        &self.moods
    }

    /// `recommend(seed_key, k)`: resolve the seed by case-insensitive
    /// exact name and artist substring, query `k+1` neighbors on the
    /// selected variant, exclude the seed, attach similarity scores.
    pub fn recommend_song(
        &self,
        song_name: &str,
        artist_name: &str,
        k: usize,
        variant: Option<ModelVariant>,
    ) -> Result<Vec<Recommendation>, RecommendError> {
        if song_name.trim().is_empty() || artist_name.trim().is_empty() {
            return Err(RecommendError::InvalidParameter(
                "Song name and artist name are required.".to_string(),
            ));
        }

        let snapshot = self.registry.current();
        let variant = variant.unwrap_or_else(|| snapshot.default_variant());
        if !snapshot.has_variant(variant) {
            return Err(RecommendError::ModelUnavailable(variant));
        }

        let seed = resolve_seed(&snapshot, song_name, artist_name)?;
        let neighbors = query_variant(&snapshot, variant, seed.row_id, k.saturating_add(1))?;

        let recommendations = neighbors
            .into_iter()
            .filter(|n| n.row_id != seed.row_id)
            .take(k)
            .map(|n| {
                let track = &snapshot.tracks()[n.row_id];
                Recommendation::from_track(track, Some(round3(n.similarity())))
            })
            .collect();
        Ok(recommendations)
    }

    /// `filterByMood(moodName, tagFilters, limit)` over the snapshot's
    /// raw attributes; see the mood module for the selection semantics.
    pub fn recommend_mood(
        &self,
        mood: &str,
        tags: &[String],
        limit: usize,
    ) -> Result<Vec<Recommendation>, RecommendError> {
        if mood.trim().is_empty() {
            return Err(RecommendError::InvalidParameter(
                "Mood is required.".to_string(),
            ));
        }
        let limit = limit.max(1);

        let snapshot = self.registry.current();
        let survivors = self.moods.filter(mood, tags, limit, snapshot.tracks())?;
        Ok(survivors
            .into_iter()
            .map(|t| Recommendation::from_track(t, None))
            .collect())
    }
}

/// Resolve a (name, artist-substring) seed key to a single track:
/// case-insensitive exact match on name, substring on artist; among
/// multiple candidates the most popular wins, ties to the lowest row id.
fn resolve_seed<'a>(
    snapshot: &'a ModelSnapshot,
    song_name: &str,
    artist_name: &str,
) -> Result<&'a Track, RecommendError> {
    snapshot
        .tracks()
        .iter()
        .filter(|t| t.name_matches(song_name) && t.artist_contains(artist_name))
        .min_by(|a, b| {
            b.attributes
                .popularity
                .total_cmp(&a.attributes.popularity)
                .then_with(|| a.row_id.cmp(&b.row_id))
        })
        .ok_or_else(|| {
            let needle = song_name.to_lowercase();
            let suggestions: Vec<String> = snapshot
                .tracks()
                .iter()
                .filter(|t| t.name.to_lowercase().contains(&needle))
                .take(MAX_SUGGESTIONS)
                .map(|t| format!("{} - {}", t.name, t.artist))
                .collect();
            RecommendError::NotFound {
                message: format!("Song '{song_name}' by '{artist_name}' not found."),
                suggestions,
            }
        })
}

fn query_variant(
    snapshot: &ModelSnapshot,
    variant: ModelVariant,
    seed_row: usize,
    k: usize,
) -> Result<Vec<crate::index::Neighbor>, RecommendError> {
    match variant {
        ModelVariant::Full => {
            let index = snapshot.full_index();
            let seed = index
                .vector(seed_row)
                .ok_or_else(|| RecommendError::ModelUnavailable(variant))?;
            Ok(index.query(seed, k))
        }
        ModelVariant::Reduced => {
            let reduced = snapshot
                .reduced_model()
                .ok_or(RecommendError::ModelUnavailable(variant))?;
            let seed = reduced
                .index
                .vector(seed_row)
                .ok_or(RecommendError::ModelUnavailable(variant))?;
            Ok(reduced.index.query(seed, k))
        }
    }
}

fn round3(similarity: f32) -> f64 {
    (similarity as f64 * 1000.0).round() / 1000.0
}
