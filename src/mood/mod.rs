//! Attribute range-filter retrieval for mood queries.
//!
//! This path reads raw audio attributes and tag text only; it never
//! touches the vector index, so mood queries keep working even when the
//! vector pipeline is unavailable.

use crate::track_store::{Track, NUMERIC_ATTRIBUTES};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MoodFilterError {
    #[error("Unknown mood '{requested}'. Choose from: {}", available.join(", "))]
    UnknownMood {
        requested: String,
        available: Vec<String>,
    },

    #[error("No songs found for mood '{0}'.")]
    NoMatches(String),

    #[error("No songs found for mood '{mood}' with tags [{}].", tags.join(", "))]
    NoMatchesWithTags { mood: String, tags: Vec<String> },
}

/// One inclusive attribute range of a profile. Ranges apply to RAW
/// attribute values (tempo in BPM, not its scaled form).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeRange {
    pub attribute: String,
    pub min: f32,
    pub max: f32,
}

/// A named set of inclusive attribute ranges.
///
/// The declared order of `ranges` matters: it is the sort-key order used
/// to rank survivors (first attribute dominant, later ones break ties).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoodProfile {
    pub name: String,
    pub ranges: Vec<AttributeRange>,
}

impl MoodProfile {
    fn range(name: &str, ranges: &[(&str, f32, f32)]) -> MoodProfile {
        MoodProfile {
            name: name.to_string(),
            ranges: ranges
                .iter()
                .map(|&(attribute, min, max)| AttributeRange {
                    attribute: attribute.to_string(),
                    min,
                    max,
                })
                .collect(),
        }
    }

    /// True when every profile attribute of the track lies inside its
    /// inclusive range. An attribute name missing from the track schema
    /// never matches; profiles are validated at config load.
    pub fn matches(&self, track: &Track) -> bool {
        self.ranges.iter().all(|r| {
            track
                .attributes
                .get(&r.attribute)
                .map(|v| v >= r.min && v <= r.max)
                .unwrap_or(false)
        })
    }
}

/// The process-wide mood profile table.
#[derive(Clone, Debug)]
pub struct MoodTable {
    profiles: Vec<MoodProfile>,
}

impl Default for MoodTable {
    /// The six stock profiles.
    fn default() -> Self {
        MoodTable {
            profiles: vec![
                MoodProfile::range(
                    "happy",
                    &[
                        ("energy", 0.6, 1.0),
                        ("valence", 0.6, 1.0),
                        ("danceability", 0.6, 1.0),
                    ],
                ),
                MoodProfile::range(
                    "sad",
                    &[
                        ("energy", 0.0, 0.4),
                        ("valence", 0.0, 0.4),
                        ("acousticness", 0.5, 1.0),
                    ],
                ),
                MoodProfile::range(
                    "chill",
                    &[
                        ("energy", 0.2, 0.6),
                        ("valence", 0.3, 0.7),
                        ("acousticness", 0.5, 1.0),
                        ("tempo", 60.0, 120.0),
                    ],
                ),
                MoodProfile::range(
                    "energetic",
                    &[
                        ("energy", 0.7, 1.0),
                        ("danceability", 0.6, 1.0),
                        ("tempo", 120.0, 200.0),
                    ],
                ),
                MoodProfile::range("live", &[("liveness", 0.7, 1.0), ("energy", 0.5, 1.0)]),
                MoodProfile::range(
                    "romantic",
                    &[
                        ("valence", 0.4, 0.8),
                        ("acousticness", 0.3, 1.0),
                        ("energy", 0.3, 0.7),
                    ],
                ),
            ],
        }
    }
}

impl MoodTable {
    /// Build from configured profiles, rejecting unknown attribute names
    /// and inverted ranges up front.
    pub fn new(profiles: Vec<MoodProfile>) -> anyhow::Result<Self> {
        for profile in &profiles {
            if profile.ranges.is_empty() {
                anyhow::bail!("Mood '{}' has no attribute ranges", profile.name);
            }
            for range in &profile.ranges {
                if !NUMERIC_ATTRIBUTES.contains(&range.attribute.as_str()) {
                    anyhow::bail!(
                        "Mood '{}' references unknown attribute '{}'",
                        profile.name,
                        range.attribute
                    );
                }
                if range.min > range.max {
                    anyhow::bail!(
                        "Mood '{}' has inverted range for '{}'",
                        profile.name,
                        range.attribute
                    );
                }
            }
        }
        Ok(MoodTable { profiles })
    }

    pub fn names(&self) -> Vec<String> {
        self.profiles.iter().map(|p| p.name.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&MoodProfile> {
        self.profiles
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// `filterByMood`: select tracks inside every profile range (AND), then
    /// optionally restrict to tracks containing at least one tag filter
    /// substring (OR), rank descending by the profile attributes in
    /// declared order and return the first `limit`.
    pub fn filter<'a>(
        &self,
        mood: &str,
        tag_filters: &[String],
        limit: usize,
        tracks: &'a [Track],
    ) -> Result<Vec<&'a Track>, MoodFilterError> {
        let profile = self.get(mood).ok_or_else(|| MoodFilterError::UnknownMood {
            requested: mood.to_string(),
            available: self.names(),
        })?;

        let mut survivors: Vec<&Track> =
            tracks.iter().filter(|t| profile.matches(t)).collect();
        if survivors.is_empty() {
            return Err(MoodFilterError::NoMatches(profile.name.clone()));
        }

        let tag_filters: Vec<String> = tag_filters
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        if !tag_filters.is_empty() {
            survivors.retain(|t| tag_filters.iter().any(|tag| t.tags_contain(tag)));
            if survivors.is_empty() {
                return Err(MoodFilterError::NoMatchesWithTags {
                    mood: profile.name.clone(),
                    tags: tag_filters,
                });
            }
        }

        survivors.sort_by(|a, b| {
            for range in &profile.ranges {
                let av = a.attributes.get(&range.attribute).unwrap_or(0.0);
                let bv = b.attributes.get(&range.attribute).unwrap_or(0.0);
                match bv.total_cmp(&av) {
                    std::cmp::Ordering::Equal => continue,
                    other => return other,
                }
            }
            a.row_id.cmp(&b.row_id)
        });
        survivors.truncate(limit);
        Ok(survivors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track_store::AudioAttributes;

    fn track(row_id: usize, energy: f32, valence: f32, dance: f32, tags: &str) -> Track {
        Track {
            row_id,
            name: format!("Track {row_id}"),
            artist: "Someone".to_string(),
            album: None,
            genre: None,
            tags: Some(tags.to_string()),
            year: None,
            spotify_id: None,
            attributes: AudioAttributes {
                popularity: 10.0,
                duration_ms: 180_000.0,
                danceability: dance,
                energy,
                key: 0.0,
                loudness: -8.0,
                mode: 1.0,
                speechiness: 0.05,
                acousticness: 0.4,
                instrumentalness: 0.0,
                liveness: 0.1,
                valence,
                tempo: 120.0,
            },
        }
    }

    fn corpus() -> Vec<Track> {
        vec![
            track(0, 0.9, 0.8, 0.7, "pop,dance"),
            track(1, 0.7, 0.65, 0.9, "rock"),
            track(2, 0.3, 0.2, 0.5, "pop,acoustic"),
            track(3, 0.65, 0.6, 0.6, "pop"),
            track(4, 0.9, 0.8, 0.7, "indie"),
        ]
    }

    #[test]
    fn matching_ranges_are_inclusive() {
        let table = MoodTable::default();
        let tracks = corpus();
        // Track 3 sits exactly on the happy lower bounds (0.6 valence,
        // 0.6 danceability) and must be included.
        let result = table.filter("happy", &[], 10, &tracks).unwrap();
        let ids: Vec<usize> = result.iter().map(|t| t.row_id).collect();
        assert!(ids.contains(&3));
        let happy = table.get("happy").unwrap();
        for t in &result {
            for r in &happy.ranges {
                let v = t.attributes.get(&r.attribute).unwrap();
                assert!(v >= r.min && v <= r.max);
            }
        }
    }

    #[test]
    fn ranking_is_descending_by_declared_attribute_order() {
        let table = MoodTable::default();
        let tracks = corpus();
        let result = table.filter("happy", &[], 10, &tracks).unwrap();
        let ids: Vec<usize> = result.iter().map(|t| t.row_id).collect();
        // Energy dominates: 0 and 4 (0.9) before 1 (0.7) before 3 (0.65).
        // 0 and 4 tie on every attribute; lower row id first.
        assert_eq!(ids, vec![0, 4, 1, 3]);
    }

    #[test]
    fn tag_filters_are_an_or_over_substrings() {
        let table = MoodTable::default();
        let tracks = corpus();
        let result = table
            .filter("happy", &["POP".to_string(), "indie".to_string()], 10, &tracks)
            .unwrap();
        let ids: Vec<usize> = result.iter().map(|t| t.row_id).collect();
        assert_eq!(ids, vec![0, 4, 3]);
    }

    #[test]
    fn limit_caps_the_result() {
        let table = MoodTable::default();
        let tracks = corpus();
        let result = table
            .filter("happy", &["pop".to_string()], 1, &tracks)
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].row_id, 0);
    }

    #[test]
    fn unknown_mood_is_invalid() {
        let table = MoodTable::default();
        let tracks = corpus();
        let err = table.filter("angry", &[], 10, &tracks).unwrap_err();
        match err {
            MoodFilterError::UnknownMood { available, .. } => {
                assert!(available.contains(&"happy".to_string()));
            }
            other => panic!("expected UnknownMood, got {other:?}"),
        }
    }

    #[test]
    fn empty_results_distinguish_mood_from_mood_plus_tags() {
        let table = MoodTable::default();
        let tracks = corpus();

        // "live" matches nothing in the corpus (liveness is always 0.1).
        let err = table.filter("live", &[], 10, &tracks).unwrap_err();
        assert!(matches!(err, MoodFilterError::NoMatches(_)));

        // "happy" matches, but no happy track carries a "jazz" tag.
        let err = table
            .filter("happy", &["jazz".to_string()], 10, &tracks)
            .unwrap_err();
        assert!(matches!(err, MoodFilterError::NoMatchesWithTags { .. }));
    }

    #[test]
    fn table_rejects_bad_profiles() {
        let bad = MoodProfile::range("broken", &[("no_such", 0.0, 1.0)]);
        assert!(MoodTable::new(vec![bad]).is_err());
        let inverted = MoodProfile::range("inverted", &[("energy", 0.9, 0.1)]);
        assert!(MoodTable::new(vec![inverted]).is_err());
    }
}
