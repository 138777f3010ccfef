//! Precomputed resume × job similarity matrices, one per method.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The three similarity methods the model was trained with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SimilarityMethod {
    #[serde(rename = "TF-IDF")]
    TfIdf,
    #[serde(rename = "Word2Vec")]
    Word2Vec,
    #[serde(rename = "all-MiniLM-L6-v2")]
    Transformer,
}

impl SimilarityMethod {
    pub const ALL: [SimilarityMethod; 3] = [
        SimilarityMethod::TfIdf,
        SimilarityMethod::Word2Vec,
        SimilarityMethod::Transformer,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SimilarityMethod::TfIdf => "TF-IDF",
            SimilarityMethod::Word2Vec => "Word2Vec",
            SimilarityMethod::Transformer => "all-MiniLM-L6-v2",
        }
    }
}

impl fmt::Display for SimilarityMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the three similarity features are filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMode {
    /// All three features carry the Word2Vec value. The shipped model was
    /// fitted on vectors built this way.
    #[default]
    Parity,
    /// Each feature reads its own method's matrix.
    PerMethod,
}

impl FromStr for SimilarityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "parity" => Ok(SimilarityMode::Parity),
            "per_method" | "per-method" => Ok(SimilarityMode::PerMethod),
            other => Err(format!(
                "unknown similarity mode '{other}' (expected 'parity' or 'per_method')"
            )),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SimilarityError {
    #[error("similarity method '{0}' is missing")]
    MissingMethod(SimilarityMethod),

    #[error("{method}: row {row} has {found} columns, expected {expected}")]
    Ragged {
        method: SimilarityMethod,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("{method}: shape {found:?} does not match expected {expected:?}")]
    ShapeMismatch {
        method: SimilarityMethod,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("{method}: non-finite value at [{row}, {col}]")]
    NonFinite {
        method: SimilarityMethod,
        row: usize,
        col: usize,
    },
}

/// Dense row-major matrix. Rows are resumes, columns are jobs.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    pub fn from_rows(
        method: SimilarityMethod,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self, SimilarityError> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        let row_count = rows.len();
        let mut values = Vec::with_capacity(row_count * cols);

        for (r, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(SimilarityError::Ragged {
                    method,
                    row: r,
                    expected: cols,
                    found: row.len(),
                });
            }
            if let Some(c) = row.iter().position(|v| !v.is_finite()) {
                return Err(SimilarityError::NonFinite {
                    method,
                    row: r,
                    col: c,
                });
            }
            values.extend(row);
        }

        Ok(Self {
            rows: row_count,
            cols,
            values,
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.values.get(row * self.cols + col).copied()
    }
}

/// All three matrices, validated to share one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityTables {
    matrices: BTreeMap<SimilarityMethod, SimilarityMatrix>,
    shape: (usize, usize),
}

impl SimilarityTables {
    /// Builds the tables and checks every method is present with shape
    /// `(resume_count, job_count)`.
    pub fn new(
        mut raw: HashMap<SimilarityMethod, Vec<Vec<f64>>>,
        resume_count: usize,
        job_count: usize,
    ) -> Result<Self, SimilarityError> {
        let expected = (resume_count, job_count);
        let mut matrices = BTreeMap::new();

        for method in SimilarityMethod::ALL {
            let rows = raw
                .remove(&method)
                .ok_or(SimilarityError::MissingMethod(method))?;
            let matrix = SimilarityMatrix::from_rows(method, rows)?;
            // With no resumes there are no rows to carry a column count.
            let found = match matrix.shape() {
                (0, _) if resume_count == 0 => expected,
                shape => shape,
            };
            if found != expected {
                return Err(SimilarityError::ShapeMismatch {
                    method,
                    expected,
                    found,
                });
            }
            matrices.insert(method, matrix);
        }

        Ok(Self {
            matrices,
            shape: expected,
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn lookup(&self, method: SimilarityMethod, resume_id: usize, job_id: usize) -> Option<f64> {
        self.matrices
            .get(&method)
            .and_then(|m| m.get(resume_id, job_id))
    }
}
