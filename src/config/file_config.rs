//! Optional TOML file configuration.
//!
//! The file can override the feature pipeline parameters, the server
//! ports and the mood profile table. Example:
//!
//! ```toml
//! [pipeline]
//! reduced_rank = 100
//! seed = 7
//!
//! [server]
//! port = 3002
//!
//! [[moods]]
//! name = "focus"
//! ranges = [
//!     { attribute = "instrumentalness", min = 0.5, max = 1.0 },
//!     { attribute = "energy", min = 0.2, max = 0.6 },
//! ]
//! ```

use crate::model::PipelineConfig;
use crate::mood::{AttributeRange, MoodProfile};
use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub pipeline: Option<PipelineConfig>,
    pub server: Option<ServerFileConfig>,
    /// Replaces the stock mood table entirely when present. Range order
    /// is the ranking order, so profiles are arrays, not maps.
    pub moods: Option<Vec<MoodProfileConfig>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct MoodProfileConfig {
    pub name: String,
    pub ranges: Vec<AttributeRange>,
}

impl From<MoodProfileConfig> for MoodProfile {
    fn from(config: MoodProfileConfig) -> Self {
        MoodProfile {
            name: config.name,
            ranges: config.ranges,
        }
    }
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}
