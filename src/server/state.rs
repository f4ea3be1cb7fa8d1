use crate::model::{ModelRegistry, PipelineConfig};
use crate::recommender::Recommender;
use crate::track_store::TrackStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use super::RequestsLoggingLevel;

/// Shared state for all request handlers, cloned per route layer.
#[derive(Clone)]
pub struct ServerState {
    pub start_time: Instant,
    pub logging_level: RequestsLoggingLevel,
    pub recommender: Arc<Recommender>,
    pub registry: Arc<ModelRegistry>,
    pub track_store: Arc<dyn TrackStore>,
    pub artifacts_dir: PathBuf,
    pub pipeline: PipelineConfig,
    pub hash: String,
}
