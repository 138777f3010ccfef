//! Axum route handlers for the ranking API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::parsing::vocabulary::Vocabulary;
use crate::ranking::service::{CandidateScore, JobScore, PairScore};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TopKQuery {
    pub top_k: Option<i64>,
}

impl TopKQuery {
    fn resolve(&self, default: usize) -> Result<usize, AppError> {
        match self.top_k {
            None => Ok(default),
            Some(k) => usize::try_from(k)
                .map_err(|_| AppError::Validation(format!("top_k must be >= 0, got {k}"))),
        }
    }
}

/// GET /jobs/:job_id/candidates
///
/// Best resumes for a job, highest score first.
pub async fn handle_top_candidates(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
    Query(query): Query<TopKQuery>,
) -> Result<Json<Vec<CandidateScore>>, AppError> {
    let k = query.resolve(state.config.default_top_k)?;
    Ok(Json(state.ranking.top_candidates(job_id, k)?))
}

/// GET /resumes/:resume_id/jobs
///
/// Best jobs for a resume, highest score first.
pub async fn handle_top_jobs(
    State(state): State<AppState>,
    Path(resume_id): Path<i64>,
    Query(query): Query<TopKQuery>,
) -> Result<Json<Vec<JobScore>>, AppError> {
    let k = query.resolve(state.config.default_top_k)?;
    Ok(Json(state.ranking.top_jobs(resume_id, k)?))
}

/// GET /resumes/:resume_id/jobs/:job_id/score
pub async fn handle_score_pair(
    State(state): State<AppState>,
    Path((resume_id, job_id)): Path<(i64, i64)>,
) -> Result<Json<PairScore>, AppError> {
    Ok(Json(state.ranking.score_pair(resume_id, job_id)?))
}

/// GET /vocabulary
///
/// Every skill / education / experience phrase extracted since startup.
pub async fn handle_vocabulary(State(state): State<AppState>) -> Json<Vocabulary> {
    Json(state.vocabulary.snapshot())
}
