use serde::{Deserialize, Serialize};

/// Field order the scaler and model were fitted on. Do not reorder.
pub const FEATURE_SCHEMA: [&str; 14] = [
    "skill_match_count",
    "skill_match_ratio",
    "skill_coverage",
    "edu_match_count",
    "edu_match_present",
    "exp_match_count",
    "exp_years_mentioned",
    "tfidf_similarity",
    "word2vec_similarity",
    "transformer_similarity",
    "resume_length",
    "jd_length",
    "length_ratio",
    "category_match",
];

/// Engineered features for one (resume, job) pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub skill_match_count: f64,
    pub skill_match_ratio: f64,
    pub skill_coverage: f64,
    pub edu_match_count: f64,
    pub edu_match_present: f64,
    pub exp_match_count: f64,
    pub exp_years_mentioned: f64,
    pub tfidf_similarity: f64,
    pub word2vec_similarity: f64,
    pub transformer_similarity: f64,
    pub resume_length: f64,
    pub jd_length: f64,
    pub length_ratio: f64,
    pub category_match: f64,
}

impl FeatureVector {
    pub fn schema(&self) -> &'static [&'static str] {
        &FEATURE_SCHEMA
    }

    /// Values in `FEATURE_SCHEMA` order.
    pub fn to_array(&self) -> [f64; 14] {
        [
            self.skill_match_count,
            self.skill_match_ratio,
            self.skill_coverage,
            self.edu_match_count,
            self.edu_match_present,
            self.exp_match_count,
            self.exp_years_mentioned,
            self.tfidf_similarity,
            self.word2vec_similarity,
            self.transformer_similarity,
            self.resume_length,
            self.jd_length,
            self.length_ratio,
            self.category_match,
        ]
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        FEATURE_SCHEMA.into_iter().zip(self.to_array())
    }

    /// Name of the first non-finite field, if any.
    pub fn first_non_finite(&self) -> Option<&'static str> {
        self.iter().find(|(_, v)| !v.is_finite()).map(|(name, _)| name)
    }
}
