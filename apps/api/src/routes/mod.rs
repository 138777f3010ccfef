pub mod health;

use axum::{routing::get, Router};

use crate::ranking::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route(
            "/jobs/:job_id/candidates",
            get(handlers::handle_top_candidates),
        )
        .route("/resumes/:resume_id/jobs", get(handlers::handle_top_jobs))
        .route(
            "/resumes/:resume_id/jobs/:job_id/score",
            get(handlers::handle_score_pair),
        )
        .route("/vocabulary", get(handlers::handle_vocabulary))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::features::engineer::FeatureEngineer;
    use crate::features::similarity::SimilarityMode;
    use crate::parsing::response_parser::ResponseParser;
    use crate::parsing::vocabulary::VocabularyAccumulator;
    use crate::ranking::service::tests::corpus;
    use crate::ranking::service::RankingService;
    use crate::scoring::artifact::tests::artifact_json;
    use crate::scoring::ModelScorer;

    fn test_state() -> AppState {
        let vocabulary = Arc::new(VocabularyAccumulator::new());
        let parser = ResponseParser::new(vocabulary.clone());
        let engineer = FeatureEngineer::new(Arc::new(parser), SimilarityMode::Parity);
        let artifact = serde_json::from_value(artifact_json()).unwrap();
        let ranking = RankingService::new(
            Arc::new(corpus()),
            engineer,
            Arc::new(ModelScorer::new(artifact)),
        );
        AppState {
            ranking: Arc::new(ranking),
            vocabulary,
            config: Config {
                port: 0,
                rust_log: "debug".to_string(),
                resumes_path: PathBuf::new(),
                jobs_path: PathBuf::new(),
                similarity_path: PathBuf::new(),
                model_artifact_path: PathBuf::new(),
                similarity_mode: SimilarityMode::Parity,
                default_top_k: 2,
            },
        }
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let (status, body) = get_json(build_router(test_state()), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].is_string());

        let (status, body) = get_json(build_router(test_state()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["resumes"], 3);
        assert_eq!(body["jobs"], 2);
        assert_eq!(body["similarity_mode"], "parity");
    }

    #[tokio::test]
    async fn test_top_candidates_uses_default_top_k() {
        let (status, body) = get_json(build_router(test_state()), "/jobs/0/candidates").await;
        assert_eq!(status, StatusCode::OK);
        let ranked = body.as_array().unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0]["resume_id"], 0);
        assert_eq!(ranked[1]["resume_id"], 2);
    }

    #[tokio::test]
    async fn test_top_candidates_explicit_top_k() {
        let (status, body) =
            get_json(build_router(test_state()), "/jobs/0/candidates?top_k=10").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);

        let (status, body) =
            get_json(build_router(test_state()), "/jobs/0/candidates?top_k=0").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_job_returns_404_body() {
        for uri in ["/jobs/2/candidates", "/jobs/-1/candidates"] {
            let (status, body) = get_json(build_router(test_state()), uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["error"]["code"], "NOT_FOUND");
            assert_eq!(body["error"]["message"], "Job ID out of range");
        }
    }

    #[tokio::test]
    async fn test_negative_top_k_is_rejected() {
        let (status, body) =
            get_json(build_router(test_state()), "/jobs/0/candidates?top_k=-3").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_top_jobs_for_resume() {
        let (status, body) = get_json(build_router(test_state()), "/resumes/1/jobs").await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<u64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|j| j["job_id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![0, 1]);

        let (status, body) = get_json(build_router(test_state()), "/resumes/3/jobs").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "Resume ID out of range");
    }

    #[tokio::test]
    async fn test_score_pair() {
        let (status, body) =
            get_json(build_router(test_state()), "/resumes/0/jobs/0/score").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resume_id"], 0);
        assert_eq!(body["job_id"], 0);
        assert!((body["score"].as_f64().unwrap() - 60.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_vocabulary_grows_after_ranking() {
        let state = test_state();
        let (_, before) = get_json(build_router(state.clone()), "/vocabulary").await;
        assert!(before["skills"].as_array().unwrap().is_empty());

        get_json(build_router(state.clone()), "/jobs/0/candidates").await;

        let (status, after) = get_json(build_router(state), "/vocabulary").await;
        assert_eq!(status, StatusCode::OK);
        let skills: Vec<&str> = after["skills"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(skills, vec!["python", "sql"]);
    }
}
