//! Recommendation API routes.

use crate::model::{
    artifacts_exist, load_artifacts, ModelSnapshot, ModelVariant, SnapshotError,
};
use crate::recommender::{RecommendError, Recommendation, DEFAULT_RECOMMENDATIONS};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use super::metrics::{record_recommendation, set_model_gauges, MODEL_SWAPS_TOTAL};
use super::state::ServerState;

/// API error that serializes as `{"error": ...}` with the right status.
struct ApiError {
    status: StatusCode,
    body: serde_json::Value,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            body: json!({ "error": message.into() }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<RecommendError> for ApiError {
    fn from(err: RecommendError) -> Self {
        match &err {
            RecommendError::NotFound { suggestions, .. } if !suggestions.is_empty() => ApiError {
                status: StatusCode::NOT_FOUND,
                body: json!({ "error": err.to_string(), "suggestions": suggestions }),
            },
            RecommendError::NotFound { .. } => ApiError::new(StatusCode::NOT_FOUND, err.to_string()),
            RecommendError::InvalidParameter(_) => {
                ApiError::new(StatusCode::BAD_REQUEST, err.to_string())
            }
            RecommendError::ModelUnavailable(_) => {
                ApiError::new(StatusCode::SERVICE_UNAVAILABLE, err.to_string())
            }
        }
    }
}

#[derive(Deserialize)]
struct RecommendSongBody {
    song_name: Option<String>,
    artist_name: Option<String>,
    #[serde(default)]
    num_recommendations: Option<usize>,
    /// Model variant: "full" or "reduced". Defaults to the snapshot's
    /// preferred variant.
    #[serde(default)]
    model: Option<ModelVariant>,
}

#[derive(Deserialize)]
struct RecommendMoodBody {
    mood: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    num_recommendations: Option<usize>,
}

#[derive(Serialize)]
struct StatusResponse {
    tracks: usize,
    variants: Vec<ModelVariant>,
    feature_dim: usize,
    reduced_rank: Option<usize>,
    moods: Vec<String>,
    uptime_sec: u64,
    hash: String,
}

async fn recommend_song(
    State(state): State<ServerState>,
    Json(payload): Json<RecommendSongBody>,
) -> Result<Json<Vec<Recommendation>>, ApiError> {
    let (song_name, artist_name) = match (payload.song_name, payload.artist_name) {
        (Some(s), Some(a)) => (s, a),
        _ => {
            record_recommendation("song", "invalid");
            return Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                "Song name and artist name are required.",
            ));
        }
    };
    let k = payload
        .num_recommendations
        .unwrap_or(DEFAULT_RECOMMENDATIONS)
        .max(1);

    match state
        .recommender
        .recommend_song(&song_name, &artist_name, k, payload.model)
    {
        Ok(results) => {
            record_recommendation("song", "ok");
            Ok(Json(results))
        }
        Err(err) => {
            record_recommendation(
                "song",
                match err {
                    RecommendError::NotFound { .. } => "not_found",
                    RecommendError::InvalidParameter(_) => "invalid",
                    RecommendError::ModelUnavailable(_) => "unavailable",
                },
            );
            Err(err.into())
        }
    }
}

async fn recommend_mood(
    State(state): State<ServerState>,
    Json(payload): Json<RecommendMoodBody>,
) -> Result<Json<Vec<Recommendation>>, ApiError> {
    let mood = match payload.mood {
        Some(m) => m,
        None => {
            record_recommendation("mood", "invalid");
            return Err(ApiError::new(StatusCode::BAD_REQUEST, "Mood is required."));
        }
    };
    let limit = payload
        .num_recommendations
        .unwrap_or(DEFAULT_RECOMMENDATIONS)
        .max(1);

    match state.recommender.recommend_mood(&mood, &payload.tags, limit) {
        Ok(results) => {
            record_recommendation("mood", "ok");
            Ok(Json(results))
        }
        Err(err) => {
            record_recommendation(
                "mood",
                match err {
                    RecommendError::NotFound { .. } => "not_found",
                    _ => "invalid",
                },
            );
            Err(err.into())
        }
    }
}

async fn list_moods(State(state): State<ServerState>) -> Json<Vec<String>> {
    Json(state.recommender.moods().names())
}

async fn status(State(state): State<ServerState>) -> Json<StatusResponse> {
    let snapshot = state.registry.current();
    Json(StatusResponse {
        tracks: snapshot.tracks().len(),
        variants: snapshot.variants(),
        feature_dim: snapshot.dim(),
        reduced_rank: snapshot.reduced_model().map(|r| r.projection.rank()),
        moods: state.recommender.moods().names(),
        uptime_sec: state.start_time.elapsed().as_secs(),
        hash: state.hash.clone(),
    })
}

/// Reload artifacts from disk and atomically swap the active snapshot.
/// Any failure leaves the current snapshot serving.
async fn reload_model(State(state): State<ServerState>) -> Result<Json<serde_json::Value>, ApiError> {
    let result = tokio::task::spawn_blocking(move || -> anyhow::Result<Arc<ModelSnapshot>> {
        if !artifacts_exist(&state.artifacts_dir) {
            anyhow::bail!("No artifacts found in {:?}", state.artifacts_dir);
        }
        let artifacts = load_artifacts(&state.artifacts_dir)?;
        let tracks = state.track_store.load_all()?;
        let snapshot = ModelSnapshot::assemble(
            Arc::new(tracks),
            &artifacts.encoder,
            artifacts.matrix,
            artifacts.reduced.map(|r| (r.projection, r.embedding)),
        )
        .map_err(|e: SnapshotError| anyhow::anyhow!(e))?;
        let snapshot = Arc::new(snapshot);
        set_model_gauges(
            snapshot.tracks().len(),
            snapshot.dim(),
            snapshot.reduced_model().map(|r| r.projection.rank()),
        );
        state.registry.swap(snapshot.clone());
        Ok(snapshot)
    })
    .await
    .map_err(|e| {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, format!("Reload task failed: {e}"))
    })?;

    match result {
        Ok(snapshot) => {
            MODEL_SWAPS_TOTAL.with_label_values(&["ok"]).inc();
            info!("Swapped in reloaded model snapshot");
            Ok(Json(json!({
                "status": "reloaded",
                "tracks": snapshot.tracks().len(),
                "variants": snapshot.variants(),
            })))
        }
        Err(e) => {
            MODEL_SWAPS_TOTAL.with_label_values(&["failed"]).inc();
            error!("Model reload failed, keeping active snapshot: {:#}", e);
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Reload failed, previous model still active: {e}"),
            ))
        }
    }
}

pub fn make_app(state: ServerState) -> Router {
    Router::new()
        .route("/api/recommend-song", post(recommend_song))
        .route("/api/recommend-mood", post(recommend_mood))
        .route("/api/moods", get(list_moods))
        .route("/api/status", get(status))
        .route("/api/admin/reload", post(reload_model))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            super::log_requests,
        ))
        .with_state(state)
}
