//! Ranking: scores one anchor (a job or a resume) against every entity on the
//! other side, sorts, and keeps the top k.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::features::engineer::FeatureEngineer;
use crate::scoring::PairScorer;
use crate::store::Corpus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub resume_id: usize,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobScore {
    pub job_id: usize,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairScore {
    pub resume_id: usize,
    pub job_id: usize,
    pub score: f64,
}

pub struct RankingService {
    corpus: Arc<Corpus>,
    engineer: FeatureEngineer,
    scorer: Arc<dyn PairScorer>,
}

impl RankingService {
    pub fn new(corpus: Arc<Corpus>, engineer: FeatureEngineer, scorer: Arc<dyn PairScorer>) -> Self {
        Self {
            corpus,
            engineer,
            scorer,
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Builds features for one pair and scores them. Ids must already be in range.
    fn score_indices(&self, resume_id: usize, job_id: usize) -> Result<f64, AppError> {
        let features = self.engineer.create_comprehensive_features(
            resume_id,
            job_id,
            &self.corpus.resumes,
            &self.corpus.jobs,
            &self.corpus.similarity,
        )?;
        Ok(self.scorer.score(&features)?)
    }

    /// Best resumes for a job, highest score first. Ties keep ascending resume id.
    pub fn top_candidates(&self, job_id: i64, k: usize) -> Result<Vec<CandidateScore>, AppError> {
        let job_id = resolve_index(job_id, self.corpus.job_count())
            .ok_or_else(|| AppError::NotFound("Job ID out of range".to_string()))?;

        let scores = (0..self.corpus.resume_count())
            .map(|resume_id| {
                self.score_indices(resume_id, job_id)
                    .map(|score| CandidateScore { resume_id, score })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        debug!("Scored {} candidates for job {job_id}", scores.len());
        Ok(top_k(scores, k, |c| c.score))
    }

    /// Best jobs for a resume, highest score first. Ties keep ascending job id.
    pub fn top_jobs(&self, resume_id: i64, k: usize) -> Result<Vec<JobScore>, AppError> {
        let resume_id = resolve_index(resume_id, self.corpus.resume_count())
            .ok_or_else(|| AppError::NotFound("Resume ID out of range".to_string()))?;

        let scores = (0..self.corpus.job_count())
            .map(|job_id| {
                self.score_indices(resume_id, job_id)
                    .map(|score| JobScore { job_id, score })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        debug!("Scored {} jobs for resume {resume_id}", scores.len());
        Ok(top_k(scores, k, |j| j.score))
    }

    pub fn score_pair(&self, resume_id: i64, job_id: i64) -> Result<PairScore, AppError> {
        let resume_id = resolve_index(resume_id, self.corpus.resume_count())
            .ok_or_else(|| AppError::NotFound("Resume ID out of range".to_string()))?;
        let job_id = resolve_index(job_id, self.corpus.job_count())
            .ok_or_else(|| AppError::NotFound("Job ID out of range".to_string()))?;

        Ok(PairScore {
            resume_id,
            job_id,
            score: self.score_indices(resume_id, job_id)?,
        })
    }
}

fn resolve_index(id: i64, len: usize) -> Option<usize> {
    usize::try_from(id).ok().filter(|&i| i < len)
}

/// Stable descending sort, then truncate. Input order breaks ties.
fn top_k<T>(mut items: Vec<T>, k: usize, score: impl Fn(&T) -> f64) -> Vec<T> {
    items.sort_by(|a, b| score(b).total_cmp(&score(a)));
    items.truncate(k);
    items
}
