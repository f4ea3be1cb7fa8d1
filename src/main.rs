use anyhow::{Context, Result};
use clap::Parser;
use resona_recommender_server::config::AppConfig;
use resona_recommender_server::model::{
    artifacts_exist, build_artifacts, load_artifacts, save_artifacts, ModelArtifacts,
    ModelRegistry, ModelSnapshot,
};
use resona_recommender_server::recommender::Recommender;
use resona_recommender_server::server::metrics::{init_metrics, set_model_gauges};
use resona_recommender_server::server::{run_server, RequestsLoggingLevel, ServerState};
use resona_recommender_server::track_store::{SqliteTrackStore, TrackStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
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

    /// Directory holding (or receiving) the model artifacts.
    #[clap(long, default_value = "model-artifacts")]
    pub artifacts_dir: PathBuf,

    /// Optional TOML config file for pipeline and mood overrides.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Rebuild artifacts from the catalog even if a saved model exists.
    #[clap(long, default_value_t = false)]
    pub rebuild: bool,
}

fn load_or_build(config: &AppConfig, tracks: &[resona_recommender_server::track_store::Track], rebuild: bool) -> Result<ModelArtifacts> {
    if !rebuild && artifacts_exist(&config.artifacts_dir) {
        info!("Loading model artifacts from {:?}", config.artifacts_dir);
        return load_artifacts(&config.artifacts_dir);
    }
    info!("Building model artifacts for {} tracks", tracks.len());
    let artifacts = build_artifacts(tracks, &config.pipeline)?;
    save_artifacts(&artifacts, &config.artifacts_dir)?;
    info!("Saved model artifacts to {:?}", config.artifacts_dir);
    Ok(artifacts)
}

#[tokio::main]
async fn main() -> Result<()> {
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

    let config = AppConfig::resolve(
        args.track_db,
        args.artifacts_dir,
        args.port,
        args.metrics_port,
        args.logging_level,
        args.config.as_deref(),
    )?;

    let track_store: Arc<dyn TrackStore> = Arc::new(SqliteTrackStore::new(&config.track_db)?);
    let tracks = track_store.load_all()?;
    if tracks.is_empty() {
        anyhow::bail!("Track catalog at {:?} is empty", config.track_db);
    }
    info!("Loaded {} tracks from catalog", tracks.len());

    let artifacts = load_or_build(&config, &tracks, args.rebuild)?;
    let snapshot = ModelSnapshot::assemble(
        Arc::new(tracks),
        &artifacts.encoder,
        artifacts.matrix,
        artifacts.reduced.map(|r| (r.projection, r.embedding)),
    )
    .context("Saved artifacts do not match the track catalog, rebuild with --rebuild")?;
    let snapshot = Arc::new(snapshot);

    init_metrics();
    set_model_gauges(
        snapshot.tracks().len(),
        snapshot.dim(),
        snapshot.reduced_model().map(|r| r.projection.rank()),
    );

    let registry = Arc::new(ModelRegistry::new(snapshot));
    let recommender = Arc::new(Recommender::new(registry.clone(), config.moods.clone()));

    let state = ServerState {
        start_time: Instant::now(),
        logging_level: config.logging_level,
        recommender,
        registry,
        track_store,
        artifacts_dir: config.artifacts_dir.clone(),
        pipeline: config.pipeline.clone(),
        hash: String::from(env!("GIT_HASH")),
    };

    run_server(state, config.port, config.metrics_port).await
}
