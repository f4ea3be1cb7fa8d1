//! Offline model build: corpus -> encoder -> matrix -> reduced embedding.

use super::artifacts::{ModelArtifacts, ReducedArtifacts, ARTIFACTS_FORMAT_VERSION};
use crate::features::{EncoderParams, FeatureEncoder};
use crate::reducer::TruncatedProjection;
use crate::track_store::Track;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Build-time configuration of the feature pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub encoder: EncoderParams,
    /// Target rank of the reduced embedding; 0 disables the reducer.
    pub reduced_rank: usize,
    pub seed: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            encoder: EncoderParams::default(),
            reduced_rank: 150,
            seed: 42,
        }
    }
}

/// Run the whole offline build over a corpus snapshot.
///
/// This is a one-shot batch job; the row-parallel stages (encoding,
/// projection) use rayon internally. Nothing here mutates shared state;
/// a failed build leaves whatever was previously active untouched.
pub fn build_artifacts(tracks: &[Track], config: &PipelineConfig) -> Result<ModelArtifacts> {
    if tracks.is_empty() {
        bail!("Cannot build a model over an empty corpus");
    }

    info!("Building model artifacts over {} tracks...", tracks.len());
    let encoder = FeatureEncoder::fit(tracks, &config.encoder);
    let matrix = encoder.encode_all(tracks);

    let reduced = if config.reduced_rank > 0 {
        let projection = TruncatedProjection::fit(&matrix, config.reduced_rank, config.seed);
        let embedding = projection.transform(&matrix);
        Some(ReducedArtifacts {
            projection,
            embedding,
        })
    } else {
        info!("Reducer disabled (rank 0); building full-matrix variant only");
        None
    };

    Ok(ModelArtifacts {
        format_version: ARTIFACTS_FORMAT_VERSION,
        n_tracks: tracks.len(),
        encoder,
        matrix,
        reduced,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelSnapshot;
    use crate::track_store::AudioAttributes;
    use std::sync::Arc;

    fn test_tracks(n: usize) -> Vec<Track> {
        (0..n)
            .map(|i| Track {
                row_id: i,
                name: format!("Song {i}"),
                artist: format!("Artist {}", i % 3),
                album: Some(format!("Album {}", i % 2)),
                genre: Some(if i % 2 == 0 { "rock" } else { "jazz" }.to_string()),
                tags: Some("pop,rock".to_string()),
                year: Some(1990 + i as i64),
                spotify_id: Some(format!("sp{i}")),
                attributes: AudioAttributes {
                    popularity: 10.0 + i as f32,
                    duration_ms: 180_000.0 + 1000.0 * i as f32,
                    danceability: 0.1 * (i % 10) as f32,
                    energy: 0.05 + 0.09 * (i % 10) as f32,
                    key: (i % 12) as f32,
                    loudness: -12.0 + i as f32 * 0.3,
                    mode: (i % 2) as f32,
                    speechiness: 0.03,
                    acousticness: 0.2,
                    instrumentalness: 0.0,
                    liveness: 0.1,
                    valence: 0.08 * (i % 11) as f32,
                    tempo: 90.0 + (i % 60) as f32,
                },
            })
            .collect()
    }

    #[test]
    fn build_produces_row_aligned_artifacts() {
        let tracks = test_tracks(8);
        let artifacts = build_artifacts(&tracks, &PipelineConfig::default()).unwrap();
        assert_eq!(artifacts.n_tracks, 8);
        assert_eq!(artifacts.matrix.n_rows(), 8);
        let reduced = artifacts.reduced.as_ref().unwrap();
        assert_eq!(reduced.embedding.len(), 8);
        // Rank 150 clamps to the corpus size.
        assert_eq!(reduced.projection.rank(), 8);
    }

    #[test]
    fn rank_zero_disables_the_reducer() {
        let tracks = test_tracks(5);
        let config = PipelineConfig {
            reduced_rank: 0,
            ..PipelineConfig::default()
        };
        let artifacts = build_artifacts(&tracks, &config).unwrap();
        assert!(artifacts.reduced.is_none());
    }

    #[test]
    fn empty_corpus_is_rejected() {
        assert!(build_artifacts(&[], &PipelineConfig::default()).is_err());
    }

    #[test]
    fn snapshot_assembly_validates_row_alignment() {
        let tracks = test_tracks(6);
        let artifacts = build_artifacts(&tracks, &PipelineConfig::default()).unwrap();

        // Assembling against a shorter corpus must fail loudly.
        let truncated: Vec<Track> = tracks[..4].to_vec();
        let err = ModelSnapshot::assemble(
            Arc::new(truncated),
            &artifacts.encoder,
            artifacts.matrix.clone(),
            artifacts
                .reduced
                .as_ref()
                .map(|r| (r.projection.clone(), r.embedding.clone())),
        )
        .err()
        .unwrap();
        assert!(err.to_string().contains("Row count mismatch"));

        // The aligned corpus assembles fine.
        let snapshot = ModelSnapshot::assemble(
            Arc::new(tracks),
            &artifacts.encoder,
            artifacts.matrix,
            artifacts.reduced.map(|r| (r.projection, r.embedding)),
        )
        .unwrap();
        assert_eq!(snapshot.full_index().len(), 6);
        assert!(snapshot.has_variant(crate::model::ModelVariant::Reduced));
    }
}
