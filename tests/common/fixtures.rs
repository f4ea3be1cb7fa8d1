//! Test catalog and app fixtures.
//!
//! The catalog is a small hand-picked corpus: a few clearly happy tracks
//! (two of them tagged pop), a couple of chill ones, a live recording and
//! a sad acoustic track, so mood selection and neighbor queries both have
//! something meaningful to chew on.

use anyhow::Result;
use axum::Router;
use resona_recommender_server::model::{
    build_artifacts, save_artifacts, ModelRegistry, ModelSnapshot, PipelineConfig,
};
use resona_recommender_server::mood::MoodTable;
use resona_recommender_server::recommender::Recommender;
use resona_recommender_server::server::metrics::init_metrics;
use resona_recommender_server::server::{make_app, RequestsLoggingLevel, ServerState};
use resona_recommender_server::track_store::{SqliteTrackStore, TrackStore};
use rusqlite::{params, Connection};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tempfile::TempDir;

struct TestTrack {
    name: &'static str,
    artist: &'static str,
    tags: &'static str,
    year: i64,
    popularity: f32,
    danceability: f32,
    energy: f32,
    acousticness: f32,
    liveness: f32,
    valence: f32,
    tempo: f32,
}

// Mood memberships this corpus is built for:
//   happy (energy/valence/danceability >= 0.6): Engine Room, Sunrise Drive
//     (Neon Harbor), Golden Hour; of those, only the Neon Harbor tracks
//     carry the "pop" tag.
//   chill: Midnight Coast, Sunrise Drive (Copper Fox), Slow Waltz,
//     Paper Planes Home.
//   live: Stadium Lights only.
//   sad: Rainy Window only.
const TEST_TRACKS: &[TestTrack] = &[
    TestTrack {
        name: "Sunrise Drive",
        artist: "Neon Harbor",
        tags: "pop; upbeat",
        year: 2019,
        popularity: 80.0,
        danceability: 0.8,
        energy: 0.9,
        acousticness: 0.1,
        liveness: 0.1,
        valence: 0.85,
        tempo: 128.0,
    },
    TestTrack {
        name: "Golden Hour",
        artist: "Neon Harbor",
        tags: "pop",
        year: 2020,
        popularity: 60.0,
        danceability: 0.65,
        energy: 0.7,
        acousticness: 0.2,
        liveness: 0.1,
        valence: 0.7,
        tempo: 118.0,
    },
    TestTrack {
        name: "Rainy Window",
        artist: "Mira Vale",
        tags: "indie; sad",
        year: 2018,
        popularity: 50.0,
        danceability: 0.3,
        energy: 0.2,
        acousticness: 0.8,
        liveness: 0.1,
        valence: 0.2,
        tempo: 85.0,
    },
    TestTrack {
        name: "Midnight Coast",
        artist: "Mira Vale",
        tags: "chill",
        year: 2021,
        popularity: 40.0,
        danceability: 0.5,
        energy: 0.4,
        acousticness: 0.7,
        liveness: 0.1,
        valence: 0.5,
        tempo: 90.0,
    },
    TestTrack {
        name: "Engine Room",
        artist: "Voltage Twins",
        tags: "electronic; dance",
        year: 2022,
        popularity: 90.0,
        danceability: 0.9,
        energy: 0.95,
        acousticness: 0.05,
        liveness: 0.2,
        valence: 0.75,
        tempo: 150.0,
    },
    TestTrack {
        name: "Quiet Garden",
        artist: "Mira Vale",
        tags: "acoustic",
        year: 2017,
        popularity: 30.0,
        danceability: 0.4,
        energy: 0.3,
        acousticness: 0.9,
        liveness: 0.1,
        valence: 0.6,
        tempo: 130.0,
    },
    TestTrack {
        name: "Stadium Lights",
        artist: "Voltage Twins",
        tags: "live; rock",
        year: 2016,
        popularity: 70.0,
        danceability: 0.55,
        energy: 0.8,
        acousticness: 0.1,
        liveness: 0.85,
        valence: 0.65,
        tempo: 140.0,
    },
    TestTrack {
        name: "Sunrise Drive",
        artist: "Copper Fox",
        tags: "folk",
        year: 2015,
        popularity: 85.0,
        danceability: 0.5,
        energy: 0.55,
        acousticness: 0.6,
        liveness: 0.15,
        valence: 0.55,
        tempo: 105.0,
    },
    TestTrack {
        name: "Slow Waltz",
        artist: "Copper Fox",
        tags: "romantic",
        year: 2014,
        popularity: 45.0,
        danceability: 0.45,
        energy: 0.5,
        acousticness: 0.6,
        liveness: 0.1,
        valence: 0.6,
        tempo: 95.0,
    },
    TestTrack {
        name: "Paper Planes Home",
        artist: "Neon Harbor",
        tags: "pop; chill",
        year: 2023,
        popularity: 55.0,
        danceability: 0.6,
        energy: 0.5,
        acousticness: 0.6,
        liveness: 0.1,
        valence: 0.6,
        tempo: 100.0,
    },
];

/// Creates a temporary catalog db with 10 tracks across 4 artists.
/// Returns (temp_dir, db_path).
pub fn create_test_catalog() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("tracks.db");

    // Opening through the store creates the schema; after that the inserts
    // go in directly, the way the ingestion collaborator would write them.
    drop(SqliteTrackStore::new(&db_path)?);
    let conn = Connection::open(&db_path)?;
    for t in TEST_TRACKS {
        conn.execute(
            "INSERT INTO tracks (name, artist, album, genre, tags, year, spotify_id,
                popularity, duration_ms, danceability, energy, key, loudness, mode,
                speechiness, acousticness, instrumentalness, liveness, valence, tempo)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                ?15, ?16, ?17, ?18, ?19, ?20)",
            params![
                t.name,
                t.artist,
                format!("{} LP", t.artist),
                "synthpop",
                t.tags,
                t.year,
                format!("spotify:{}", t.name.to_lowercase().replace(' ', "-")),
                t.popularity,
                210_000.0,
                t.danceability,
                t.energy,
                5.0,
                -7.5,
                1.0,
                0.05,
                t.acousticness,
                0.0,
                t.liveness,
                t.valence,
                t.tempo,
            ],
        )?;
    }
    Ok((dir, db_path))
}

/// A fully wired app over a fresh test catalog with artifacts on disk,
/// ready for `oneshot` requests.
pub struct TestApp {
    pub app: Router,
    pub artifacts_dir: PathBuf,
    pub db_path: PathBuf,
    _tmp: TempDir,
}

impl TestApp {
    pub fn spawn() -> TestApp {
        let (tmp, db_path) = create_test_catalog().unwrap();
        let artifacts_dir = tmp.path().join("artifacts");

        let track_store: Arc<dyn TrackStore> =
            Arc::new(SqliteTrackStore::new(&db_path).unwrap());
        let tracks = track_store.load_all().unwrap();

        let pipeline = PipelineConfig::default();
        let artifacts = build_artifacts(&tracks, &pipeline).unwrap();
        save_artifacts(&artifacts, &artifacts_dir).unwrap();

        let snapshot = ModelSnapshot::assemble(
            Arc::new(tracks),
            &artifacts.encoder,
            artifacts.matrix,
            artifacts.reduced.map(|r| (r.projection, r.embedding)),
        )
        .unwrap();
        let registry = Arc::new(ModelRegistry::new(Arc::new(snapshot)));
        let recommender = Arc::new(Recommender::new(registry.clone(), MoodTable::default()));

        init_metrics();
        let state = ServerState {
            start_time: Instant::now(),
            logging_level: RequestsLoggingLevel::None,
            recommender,
            registry,
            track_store,
            artifacts_dir: artifacts_dir.clone(),
            pipeline,
            hash: "test".to_string(),
        };

        TestApp {
            app: make_app(state),
            artifacts_dir,
            db_path,
            _tmp: tmp,
        }
    }
}
