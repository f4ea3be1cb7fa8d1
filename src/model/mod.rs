mod artifacts;
mod builder;
mod registry;
mod snapshot;

pub use artifacts::{
    artifacts_exist, load_artifacts, save_artifacts, ModelArtifacts, ReducedArtifacts,
};
pub use builder::{build_artifacts, PipelineConfig};
pub use registry::ModelRegistry;
pub use snapshot::{ModelSnapshot, ModelVariant, ReducedModel, SnapshotError};
