use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::features::similarity::SimilarityMode;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub resumes_path: PathBuf,
    pub jobs_path: PathBuf,
    pub similarity_path: PathBuf,
    pub model_artifact_path: PathBuf,
    pub similarity_mode: SimilarityMode,
    pub default_top_k: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let data_dir = PathBuf::from(env_or("DATA_DIR", "Challenge-Data"));

        Ok(Config {
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            resumes_path: path_or("RESUMES_PATH", &data_dir, "processed_resumes.csv"),
            jobs_path: path_or("JOBS_PATH", &data_dir, "processed_jds.csv"),
            similarity_path: path_or("SIMILARITY_PATH", &data_dir, "similarity_matrices.json"),
            model_artifact_path: path_or("MODEL_ARTIFACT_PATH", &data_dir, "talent_model.json"),
            similarity_mode: env_or("SIMILARITY_MODE", "parity")
                .parse::<SimilarityMode>()
                .map_err(anyhow::Error::msg)
                .context("SIMILARITY_MODE must be 'parity' or 'per_method'")?,
            default_top_k: env_or("DEFAULT_TOP_K", "5")
                .parse::<usize>()
                .context("DEFAULT_TOP_K must be a non-negative integer")?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn path_or(key: &str, data_dir: &Path, file_name: &str) -> PathBuf {
    std::env::var_os(key)
        .map(PathBuf::from)
        .unwrap_or_else(|| data_dir.join(file_name))
}
