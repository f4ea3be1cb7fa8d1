//! Persistence of build artifacts.
//!
//! Everything the query service needs to serve (and to embed new items
//! consistently) is serialized into one versioned `model.json` inside the
//! artifacts directory: frozen encoder parameters, the sparse feature
//! matrix with its schema, and the optional projection + embedding. The
//! file is written to a temp file first and persisted atomically so a
//! crashed build never leaves a torn artifact behind.

use crate::features::{FeatureEncoder, FeatureMatrix};
use crate::reducer::TruncatedProjection;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

pub const ARTIFACTS_FORMAT_VERSION: u32 = 1;

const MODEL_FILE_NAME: &str = "model.json";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReducedArtifacts {
    pub projection: TruncatedProjection,
    pub embedding: Vec<Vec<f32>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifacts {
    pub format_version: u32,
    /// Corpus size at build time; re-validated against the metadata table
    /// at load so stale artifacts are refused, not served.
    pub n_tracks: usize,
    pub encoder: FeatureEncoder,
    pub matrix: FeatureMatrix,
    pub reduced: Option<ReducedArtifacts>,
}

/// Serialize artifacts into `dir/model.json`, atomically.
pub fn save_artifacts(artifacts: &ModelArtifacts, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create artifacts dir {:?}", dir))?;
    let target = dir.join(MODEL_FILE_NAME);

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .context("Failed to create temp file for artifacts")?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer(&mut writer, artifacts).context("Failed to serialize artifacts")?;
        writer.flush()?;
    }
    tmp.persist(&target)
        .with_context(|| format!("Failed to persist artifacts to {:?}", target))?;

    info!(
        "Saved model artifacts to {:?} ({} rows, {} columns)",
        target,
        artifacts.n_tracks,
        artifacts.matrix.dim()
    );
    Ok(())
}

/// Load artifacts from `dir/model.json`, checking the format version.
pub fn load_artifacts(dir: &Path) -> Result<ModelArtifacts> {
    let path = dir.join(MODEL_FILE_NAME);
    let file =
        File::open(&path).with_context(|| format!("Failed to open artifacts at {:?}", path))?;
    let artifacts: ModelArtifacts = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse artifacts at {:?}", path))?;

    if artifacts.format_version != ARTIFACTS_FORMAT_VERSION {
        bail!(
            "Artifacts at {:?} have format version {} (expected {}); rebuild the model",
            path,
            artifacts.format_version,
            ARTIFACTS_FORMAT_VERSION
        );
    }
    if artifacts.matrix.n_rows() != artifacts.n_tracks {
        bail!(
            "Artifacts at {:?} are corrupt: {} matrix rows for {} tracks",
            path,
            artifacts.matrix.n_rows(),
            artifacts.n_tracks
        );
    }

    info!(
        "Loaded model artifacts from {:?} ({} rows, {} columns)",
        path,
        artifacts.n_tracks,
        artifacts.matrix.dim()
    );
    Ok(artifacts)
}

/// True if an artifacts file exists in the directory.
pub fn artifacts_exist(dir: &Path) -> bool {
    dir.join(MODEL_FILE_NAME).is_file()
}
