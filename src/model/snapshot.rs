//! Immutable model snapshots.
//!
//! A snapshot bundles the track metadata, the frozen encoder, the feature
//! matrix and the vector index (plus the optional reduced variant) that
//! were built together. Row alignment between all of them is asserted at
//! construction; a mismatch is fatal, the service must refuse to serve
//! rather than silently return wrong neighbors.

use crate::features::{FeatureEncoder, FeatureMatrix, SparseVector};
use crate::index::VectorIndex;
use crate::reducer::TruncatedProjection;
use crate::track_store::Track;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error(
        "Row count mismatch: {tracks} tracks but {vectors} {artifact} rows. \
         The artifacts were built from a different corpus snapshot."
    )]
    RowCountMismatch {
        tracks: usize,
        vectors: usize,
        artifact: &'static str,
    },

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),
}

/// Which feature pipeline variant backs a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelVariant {
    /// Sparse TF-IDF + scaled-numeric feature matrix.
    Full,
    /// Truncated-projection embedding of the full matrix.
    Reduced,
}

impl std::fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelVariant::Full => write!(f, "full"),
            ModelVariant::Reduced => write!(f, "reduced"),
        }
    }
}

/// The reduced-embedding variant: frozen basis plus its index.
pub struct ReducedModel {
    pub projection: TruncatedProjection,
    pub index: VectorIndex<Vec<f32>>,
}

/// One self-consistent, immutable set of artifacts for serving.
pub struct ModelSnapshot {
    tracks: Arc<Vec<Track>>,
    full: VectorIndex<SparseVector>,
    reduced: Option<ReducedModel>,
    dim: usize,
}

impl ModelSnapshot {
    /// Assemble and validate a snapshot. Fails on any row-count or
    /// dimension mismatch between metadata, matrix and embedding. The
    /// encoder is checked for schema agreement but not retained; it lives
    /// in the persisted artifacts.
    pub fn assemble(
        tracks: Arc<Vec<Track>>,
        encoder: &FeatureEncoder,
        matrix: FeatureMatrix,
        reduced: Option<(TruncatedProjection, Vec<Vec<f32>>)>,
    ) -> Result<Self, SnapshotError> {
        if matrix.n_rows() != tracks.len() {
            return Err(SnapshotError::RowCountMismatch {
                tracks: tracks.len(),
                vectors: matrix.n_rows(),
                artifact: "feature matrix",
            });
        }
        if encoder.schema() != &matrix.schema {
            return Err(SnapshotError::SchemaMismatch(
                "encoder schema differs from feature matrix schema".to_string(),
            ));
        }
        if let Some(row) = matrix.rows.iter().find(|r| r.min_dim() > matrix.dim()) {
            return Err(SnapshotError::SchemaMismatch(format!(
                "matrix row spans {} columns but the schema declares {}",
                row.min_dim(),
                matrix.dim()
            )));
        }

        let dim = matrix.dim();
        let reduced = match reduced {
            None => None,
            Some((projection, embedding)) => {
                if embedding.len() != tracks.len() {
                    return Err(SnapshotError::RowCountMismatch {
                        tracks: tracks.len(),
                        vectors: embedding.len(),
                        artifact: "reduced embedding",
                    });
                }
                if projection.dim() != dim {
                    return Err(SnapshotError::SchemaMismatch(format!(
                        "projection basis is over {} columns but the matrix has {}",
                        projection.dim(),
                        dim
                    )));
                }
                if embedding.iter().any(|row| row.len() != projection.rank()) {
                    return Err(SnapshotError::SchemaMismatch(
                        "embedding rows differ from the projection rank".to_string(),
                    ));
                }
                let index = VectorIndex::build(embedding)
                    .map_err(|e| SnapshotError::SchemaMismatch(e.to_string()))?;
                Some(ReducedModel { projection, index })
            }
        };

        let full = VectorIndex::build(matrix.rows)
            .map_err(|e| SnapshotError::SchemaMismatch(e.to_string()))?;

        Ok(ModelSnapshot {
            tracks,
            full,
            reduced,
            dim,
        })
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn full_index(&self) -> &VectorIndex<SparseVector> {
        &self.full
    }

    pub fn reduced_model(&self) -> Option<&ReducedModel> {
        self.reduced.as_ref()
    }

    /// Feature dimension of the full matrix.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn has_variant(&self, variant: ModelVariant) -> bool {
        match variant {
            ModelVariant::Full => true,
            ModelVariant::Reduced => self.reduced.is_some(),
        }
    }

    pub fn variants(&self) -> Vec<ModelVariant> {
        let mut v = vec![ModelVariant::Full];
        if self.reduced.is_some() {
            v.push(ModelVariant::Reduced);
        }
        v
    }

    /// The variant used when a request does not name one: reduced when
    /// available (denoised neighbors), otherwise full.
    pub fn default_variant(&self) -> ModelVariant {
        if self.reduced.is_some() {
            ModelVariant::Reduced
        } else {
            ModelVariant::Full
        }
    }
}
