mod file_config;

pub use file_config::{FileConfig, MoodProfileConfig, ServerFileConfig};

use crate::model::PipelineConfig;
use crate::mood::MoodTable;
use crate::server::RequestsLoggingLevel;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Fully resolved application configuration: CLI arguments merged with an
/// optional TOML file. File values win where present.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub track_db: PathBuf,
    pub artifacts_dir: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub pipeline: PipelineConfig,
    pub moods: MoodTable,
}

impl AppConfig {
    pub fn resolve(
        track_db: PathBuf,
        artifacts_dir: PathBuf,
        port: u16,
        metrics_port: u16,
        logging_level: RequestsLoggingLevel,
        config_file: Option<&Path>,
    ) -> Result<Self> {
        let file = match config_file {
            Some(path) => FileConfig::load(path)
                .with_context(|| format!("Failed to load config file {:?}", path))?,
            None => FileConfig::default(),
        };

        let pipeline = file.pipeline.unwrap_or_default();
        let moods = match file.moods {
            Some(profiles) => MoodTable::new(profiles.into_iter().map(Into::into).collect())?,
            None => MoodTable::default(),
        };

        let server = file.server.unwrap_or_default();
        Ok(AppConfig {
            track_db,
            artifacts_dir,
            port: server.port.unwrap_or(port),
            metrics_port: server.metrics_port.unwrap_or(metrics_port),
            logging_level,
            pipeline,
            moods,
        })
    }
}
