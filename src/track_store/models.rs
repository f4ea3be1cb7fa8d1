//! Track models for the SQLite-backed metadata store.
//!
//! A `Track` is an immutable record; its `row_id` is the stable 0-based,
//! contiguous position assigned at load time. Every derived artifact
//! (feature matrix, embedding, vector index) is row-aligned with it.

use serde::{Deserialize, Serialize};

/// Names of the numeric audio attributes, in vector column order.
///
/// The order is fixed: it defines the layout of the scaled-numeric block
/// of the feature matrix and must not change between build and query time.
pub const NUMERIC_ATTRIBUTES: [&str; 13] = [
    "popularity",
    "duration_ms",
    "danceability",
    "energy",
    "key",
    "loudness",
    "mode",
    "speechiness",
    "acousticness",
    "instrumentalness",
    "liveness",
    "valence",
    "tempo",
];

/// The fixed set of numeric audio attributes of a track.
///
/// Most values arrive already normalized to [0,1] by the ingestion
/// collaborator; tempo, loudness, key, popularity and duration are raw and
/// get min-max scaled by the feature encoder. The mood filter engine always
/// reads these raw values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioAttributes {
    pub popularity: f32,
    pub duration_ms: f32,
    pub danceability: f32,
    pub energy: f32,
    pub key: f32,
    pub loudness: f32,
    pub mode: f32,
    pub speechiness: f32,
    pub acousticness: f32,
    pub instrumentalness: f32,
    pub liveness: f32,
    pub valence: f32,
    pub tempo: f32,
}

impl AudioAttributes {
    /// All attributes as an array, in `NUMERIC_ATTRIBUTES` order.
    pub fn to_array(&self) -> [f32; 13] {
        [
            self.popularity,
            self.duration_ms,
            self.danceability,
            self.energy,
            self.key,
            self.loudness,
            self.mode,
            self.speechiness,
            self.acousticness,
            self.instrumentalness,
            self.liveness,
            self.valence,
            self.tempo,
        ]
    }

    /// Look up an attribute by name. Used by the mood filter engine, which
    /// addresses attributes through profile configuration.
    pub fn get(&self, name: &str) -> Option<f32> {
        NUMERIC_ATTRIBUTES
            .iter()
            .position(|&a| a == name)
            .map(|i| self.to_array()[i])
    }

    /// True if every attribute is a finite number.
    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

/// A single catalog track.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Track {
    /// Stable 0-based position in the loaded corpus.
    pub row_id: usize,
    pub name: String,
    /// Display artist; multiple artists are semicolon-separated.
    pub artist: String,
    pub album: Option<String>,
    pub genre: Option<String>,
    /// Free-text tag string, comma separated.
    pub tags: Option<String>,
    pub year: Option<i64>,
    /// External (Spotify) identifier.
    pub spotify_id: Option<String>,
    pub attributes: AudioAttributes,
}

impl Track {
    /// Case-insensitive exact match on the track name.
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Case-insensitive substring match on the artist field.
    pub fn artist_contains(&self, artist: &str) -> bool {
        self.artist
            .to_lowercase()
            .contains(&artist.to_lowercase())
    }

    /// Case-insensitive substring match on the tag text.
    pub fn tags_contain(&self, needle: &str) -> bool {
        self.tags
            .as_deref()
            .map(|t| t.to_lowercase().contains(&needle.to_lowercase()))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs() -> AudioAttributes {
        AudioAttributes {
            popularity: 50.0,
            duration_ms: 200_000.0,
            danceability: 0.5,
            energy: 0.7,
            key: 5.0,
            loudness: -7.0,
            mode: 1.0,
            speechiness: 0.05,
            acousticness: 0.2,
            instrumentalness: 0.0,
            liveness: 0.1,
            valence: 0.6,
            tempo: 120.0,
        }
    }

    #[test]
    fn attribute_lookup_by_name() {
        let a = attrs();
        assert_eq!(a.get("energy"), Some(0.7));
        assert_eq!(a.get("tempo"), Some(120.0));
        assert_eq!(a.get("no_such_attribute"), None);
    }

    #[test]
    fn array_order_matches_attribute_names() {
        let a = attrs();
        let arr = a.to_array();
        for (i, name) in NUMERIC_ATTRIBUTES.iter().enumerate() {
            assert_eq!(a.get(name), Some(arr[i]));
        }
    }

    #[test]
    fn matching_is_case_insensitive() {
        let track = Track {
            row_id: 0,
            name: "Bohemian Rhapsody".to_string(),
            artist: "Queen;David Bowie".to_string(),
            album: None,
            genre: None,
            tags: Some("classic rock,pop".to_string()),
            year: Some(1975),
            spotify_id: None,
            attributes: attrs(),
        };
        assert!(track.name_matches("bohemian rhapsody"));
        assert!(!track.name_matches("bohemian"));
        assert!(track.artist_contains("bowie"));
        assert!(track.tags_contain("POP"));
        assert!(!track.tags_contain("jazz"));
    }
}
