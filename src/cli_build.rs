//! Offline model builder: encode the catalog, fit the projection, build
//! the indexes and persist everything without starting the server.

use anyhow::Result;
use clap::Parser;
use resona_recommender_server::config::FileConfig;
use resona_recommender_server::model::{build_artifacts, save_artifacts};
use resona_recommender_server::track_store::{SqliteTrackStore, TrackStore};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite track catalog.
    #[clap(long)]
    pub track_db: PathBuf,

    /// Directory receiving the model artifacts.
    #[clap(long, default_value = "model-artifacts")]
    pub artifacts_dir: PathBuf,

    /// Optional TOML config file with pipeline overrides.
    #[clap(long)]
    pub config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .init();

    let pipeline = match &args.config {
        Some(path) => FileConfig::load(path)?.pipeline.unwrap_or_default(),
        None => Default::default(),
    };

    let store = SqliteTrackStore::new(&args.track_db)?;
    let tracks = store.load_all()?;
    if tracks.is_empty() {
        anyhow::bail!("Track catalog at {:?} is empty", args.track_db);
    }
    info!("Loaded {} tracks from catalog", tracks.len());

    let artifacts = build_artifacts(&tracks, &pipeline)?;
    save_artifacts(&artifacts, &args.artifacts_dir)?;
    info!(
        "Saved model artifacts for {} tracks to {:?}",
        tracks.len(),
        args.artifacts_dir
    );
    Ok(())
}
