//! Versioned model artifact: fitted scaler + regression model + the schema
//! they were fitted on. Validated once at load so schema drift fails startup
//! instead of surfacing per request.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::schema::FEATURE_SCHEMA;

pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Hard bounds every score is clipped into.
pub const SCORE_RANGE: (f64, f64) = (0.0, 100.0);

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("model artifact is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported artifact format version {found} (expected {expected})")]
    UnsupportedVersion { expected: u32, found: u32 },

    #[error("artifact schema {found:?} does not match live feature schema {expected:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("{what} has {found} values, expected {expected}")]
    Dimension {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{0} contains a non-finite value")]
    NonFinite(&'static str),

    #[error("output range [{0}, {1}] must be ordered and lie within [0, 100]")]
    InvalidOutputRange(f64, f64),
}

/// Per-feature standardization: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn transform(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(v, (mean, scale))| {
                // Constant features were fitted with zero variance; leave them unscaled.
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (v - mean) / scale
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressionModel {
    LinearRegression { coefficients: Vec<f64>, intercept: f64 },
}

impl RegressionModel {
    pub fn predict(&self, x: &[f64]) -> f64 {
        match self {
            RegressionModel::LinearRegression {
                coefficients,
                intercept,
            } => intercept + coefficients.iter().zip(x).map(|(c, v)| c * v).sum::<f64>(),
        }
    }

    fn coefficients(&self) -> &[f64] {
        match self {
            RegressionModel::LinearRegression { coefficients, .. } => coefficients,
        }
    }

    fn intercept(&self) -> f64 {
        match self {
            RegressionModel::LinearRegression { intercept, .. } => *intercept,
        }
    }
}

fn default_output_range() -> (f64, f64) {
    SCORE_RANGE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    /// Field names, in the order the scaler and model were fitted on.
    pub feature_schema: Vec<String>,
    pub scaler: StandardScaler,
    pub model: RegressionModel,
    #[serde(default = "default_output_range")]
    pub output_range: (f64, f64),
    #[serde(default)]
    pub fitted_at: Option<DateTime<Utc>>,
}

impl ModelArtifact {
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ArtifactError> {
        let artifact: ModelArtifact = serde_json::from_reader(reader)?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Checks the artifact against the live feature schema.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                expected: ARTIFACT_FORMAT_VERSION,
                found: self.format_version,
            });
        }

        if !self.feature_schema.iter().map(String::as_str).eq(FEATURE_SCHEMA) {
            return Err(ArtifactError::SchemaMismatch {
                expected: FEATURE_SCHEMA.iter().map(|s| s.to_string()).collect(),
                found: self.feature_schema.clone(),
            });
        }

        let width = FEATURE_SCHEMA.len();
        for (what, values) in [
            ("scaler.mean", self.scaler.mean.as_slice()),
            ("scaler.scale", self.scaler.scale.as_slice()),
            ("model.coefficients", self.model.coefficients()),
        ] {
            if values.len() != width {
                return Err(ArtifactError::Dimension {
                    what,
                    expected: width,
                    found: values.len(),
                });
            }
            if values.iter().any(|v| !v.is_finite()) {
                return Err(ArtifactError::NonFinite(what));
            }
        }
        if !self.model.intercept().is_finite() {
            return Err(ArtifactError::NonFinite("model.intercept"));
        }

        let (lo, hi) = self.output_range;
        if !(lo < hi && lo >= SCORE_RANGE.0 && hi <= SCORE_RANGE.1) {
            return Err(ArtifactError::InvalidOutputRange(lo, hi));
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    pub(crate) fn artifact_json() -> serde_json::Value {
        json!({
            "format_version": 1,
            "feature_schema": FEATURE_SCHEMA,
            "scaler": {
                "mean": vec![0.0; 14],
                "scale": vec![1.0; 14]
            },
            "model": {
                "kind": "linear_regression",
                "coefficients": [0.0, 50.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 50.0, 0.0, 0.0, 0.0, 0.0, 0.0],
                "intercept": 0.0
            },
            "fitted_at": "2025-03-01T12:00:00Z"
        })
    }

    fn parse(value: serde_json::Value) -> Result<ModelArtifact, ArtifactError> {
        ModelArtifact::from_reader(value.to_string().as_bytes())
    }

    #[test]
    fn test_valid_artifact_loads_with_defaults() {
        let artifact = parse(artifact_json()).unwrap();
        assert_eq!(artifact.output_range, SCORE_RANGE);
        assert!(artifact.fitted_at.is_some());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", artifact_json()).unwrap();
        let artifact = ModelArtifact::load(file.path()).unwrap();
        assert_eq!(artifact.feature_schema.len(), 14);
    }

    #[test]
    fn test_wrong_version_rejected() {
        let mut value = artifact_json();
        value["format_version"] = json!(2);
        assert!(matches!(
            parse(value),
            Err(ArtifactError::UnsupportedVersion { found: 2, .. })
        ));
    }

    #[test]
    fn test_reordered_schema_rejected() {
        let mut value = artifact_json();
        let mut schema: Vec<&str> = FEATURE_SCHEMA.to_vec();
        schema.swap(0, 1);
        value["feature_schema"] = json!(schema);
        assert!(matches!(parse(value), Err(ArtifactError::SchemaMismatch { .. })));
    }

    #[test]
    fn test_short_coefficients_rejected() {
        let mut value = artifact_json();
        value["model"]["coefficients"] = json!([1.0, 2.0]);
        assert!(matches!(
            parse(value),
            Err(ArtifactError::Dimension {
                what: "model.coefficients",
                found: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_model_kind_rejected() {
        let mut value = artifact_json();
        value["model"]["kind"] = json!("random_forest");
        assert!(matches!(parse(value), Err(ArtifactError::Json(_))));
    }

    #[test]
    fn test_output_range_outside_bounds_rejected() {
        let mut value = artifact_json();
        value["output_range"] = json!([0.0, 150.0]);
        assert!(matches!(parse(value), Err(ArtifactError::InvalidOutputRange(..))));
    }

    #[test]
    fn test_scaler_leaves_zero_variance_features_unscaled() {
        let scaler = StandardScaler {
            mean: vec![1.0, 2.0],
            scale: vec![2.0, 0.0],
        };
        assert_eq!(scaler.transform(&[5.0, 7.0]), vec![2.0, 5.0]);
    }

    #[test]
    fn test_linear_prediction() {
        let model = RegressionModel::LinearRegression {
            coefficients: vec![2.0, -1.0],
            intercept: 3.0,
        };
        assert_eq!(model.predict(&[4.0, 1.0]), 10.0);
    }
}
