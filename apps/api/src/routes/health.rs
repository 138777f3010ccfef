use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /
/// Liveness only.
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Ranker API up & running"
    }))
}

/// GET /health
/// Returns a status object with service version and loaded corpus size.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let corpus = state.ranking.corpus();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "ranker-api",
        "resumes": corpus.resume_count(),
        "jobs": corpus.job_count(),
        "similarity_mode": state.config.similarity_mode,
    }))
}
