use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, Gauge, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};

/// Metric name prefix for all Resona metrics
const PREFIX: &str = "resona";

lazy_static! {
    // Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Recommendation Metrics
    pub static ref RECOMMENDATIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_recommendations_total"), "Recommendation queries by kind and outcome"),
        &["kind", "status"]
    ).expect("Failed to create recommendations_total metric");

    // Catalog / Model Metrics
    pub static ref CATALOG_TRACKS_TOTAL: Gauge = Gauge::new(
        format!("{PREFIX}_catalog_tracks_total"),
        "Tracks in the loaded corpus"
    ).expect("Failed to create catalog_tracks_total metric");

    pub static ref MODEL_VECTOR_DIM: GaugeVec = GaugeVec::new(
        Opts::new(format!("{PREFIX}_model_vector_dim"), "Vector dimension per model variant"),
        &["variant"]
    ).expect("Failed to create model_vector_dim metric");

    pub static ref MODEL_SWAPS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_model_swaps_total"), "Model snapshot swaps by outcome"),
        &["status"]
    ).expect("Failed to create model_swaps_total metric");
}

/// Register all metrics with the registry. Call once at startup.
pub fn init_metrics() {
    let registrations: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()),
        Box::new(RECOMMENDATIONS_TOTAL.clone()),
        Box::new(CATALOG_TRACKS_TOTAL.clone()),
        Box::new(MODEL_VECTOR_DIM.clone()),
        Box::new(MODEL_SWAPS_TOTAL.clone()),
    ];
    for collector in registrations {
        // An AlreadyReg error only happens when init is called twice; the
        // metrics are fine either way.
        let _ = REGISTRY.register(collector);
    }
}

/// Point-in-time gauges about the active snapshot.
pub fn set_model_gauges(tracks: usize, full_dim: usize, reduced_rank: Option<usize>) {
    CATALOG_TRACKS_TOTAL.set(tracks as f64);
    MODEL_VECTOR_DIM.with_label_values(&["full"]).set(full_dim as f64);
    if let Some(rank) = reduced_rank {
        MODEL_VECTOR_DIM.with_label_values(&["reduced"]).set(rank as f64);
    }
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

pub fn record_recommendation(kind: &str, status: &str) {
    RECOMMENDATIONS_TOTAL.with_label_values(&[kind, status]).inc();
}

/// Prometheus text-format endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let families = REGISTRY.gather();
    let mut buffer = Vec::new();
    match encoder.encode(&families, &mut buffer) {
        Ok(()) => (StatusCode::OK, buffer).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to encode metrics: {}", e),
        )
            .into_response(),
    }
}
