mod config;
mod errors;
mod features;
mod models;
mod parsing;
mod ranking;
mod routes;
mod scoring;
mod state;
mod store;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::features::engineer::FeatureEngineer;
use crate::parsing::response_parser::ResponseParser;
use crate::parsing::vocabulary::VocabularyAccumulator;
use crate::ranking::service::RankingService;
use crate::routes::build_router;
use crate::scoring::artifact::ModelArtifact;
use crate::scoring::ModelScorer;
use crate::state::AppState;
use crate::store::Corpus;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Ranker API v{}", env!("CARGO_PKG_VERSION"));

    // Load resumes, jobs and similarity tables
    let corpus = Corpus::load(
        &config.resumes_path,
        &config.jobs_path,
        &config.similarity_path,
    )?;

    // Load fitted scaler + regression model; schema drift stops startup here
    let artifact = ModelArtifact::load(&config.model_artifact_path).with_context(|| {
        format!(
            "Failed to load model artifact from {}",
            config.model_artifact_path.display()
        )
    })?;
    info!(
        "Model artifact v{} loaded ({} features, fitted at {})",
        artifact.format_version,
        artifact.feature_schema.len(),
        artifact
            .fitted_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "unknown".to_string())
    );

    // Parser and API share one vocabulary accumulator
    let vocabulary = Arc::new(VocabularyAccumulator::new());
    let parser = ResponseParser::new(vocabulary.clone());

    let engineer = FeatureEngineer::new(Arc::new(parser), config.similarity_mode);
    info!("Similarity mode: {:?}", engineer.similarity_mode());

    let scorer = Arc::new(ModelScorer::new(artifact));
    let ranking = RankingService::new(Arc::new(corpus), engineer, scorer);

    // Build app state
    let state = AppState {
        ranking: Arc::new(ranking),
        vocabulary,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
