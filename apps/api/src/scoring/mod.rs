//! Scoring: pluggable scorer that maps a feature vector to a bounded score.
//!
//! Default: `ModelScorer` (fitted standard scaler + linear regression, clipped).
//! `RankingService` holds an `Arc<dyn PairScorer>`.

pub mod artifact;

use thiserror::Error;

use crate::features::schema::FeatureVector;
use crate::scoring::artifact::ModelArtifact;

#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("feature schema {found:?} does not match fitted schema {expected:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("feature '{0}' is not finite")]
    NonFinite(&'static str),
}

/// The scorer trait. Implement this to swap scoring backends without
/// touching ranking or handlers.
pub trait PairScorer: Send + Sync {
    fn score(&self, features: &FeatureVector) -> Result<f64, ScoreError>;
}

/// Applies the artifact's scaler and regression model, then clips into its output range.
pub struct ModelScorer {
    artifact: ModelArtifact,
}

impl ModelScorer {
    pub fn new(artifact: ModelArtifact) -> Self {
        Self { artifact }
    }
}

impl PairScorer for ModelScorer {
    fn score(&self, features: &FeatureVector) -> Result<f64, ScoreError> {
        let fitted = &self.artifact.feature_schema;
        if !fitted.iter().map(String::as_str).eq(features.schema().iter().copied()) {
            return Err(ScoreError::SchemaMismatch {
                expected: fitted.clone(),
                found: features.schema().iter().map(|s| s.to_string()).collect(),
            });
        }
        if let Some(name) = features.first_non_finite() {
            return Err(ScoreError::NonFinite(name));
        }

        let scaled = self.artifact.scaler.transform(&features.to_array());
        let raw = self.artifact.model.predict(&scaled);
        Ok(clip(raw, self.artifact.output_range))
    }
}

fn clip(raw: f64, (lo, hi): (f64, f64)) -> f64 {
    if raw.is_nan() {
        return lo;
    }
    raw.clamp(lo, hi)
}
