//! Feature engineering: builds the fixed 14-field vector for one (resume, job) pair.
//!
//! Match features come from the job's parsed annotation against the resume
//! text; similarity features are lookups into the precomputed tables; length
//! and category features come straight from the records.

use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::features::schema::FeatureVector;
use crate::features::similarity::{SimilarityMethod, SimilarityMode, SimilarityTables};
use crate::models::records::{JobRecord, ResumeRecord};
use crate::parsing::response_parser::{AnnotationParser, RawAnnotation};

/// A phrase counts towards coverage at or above this token overlap.
const COVERAGE_THRESHOLD: f64 = 0.5;

const EDUCATION_KEYWORDS: &[&str] = &[
    "bachelor",
    "master",
    "phd",
    "degree",
    "diploma",
    "university",
    "college",
    "graduate",
    "undergraduate",
];

static YEARS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([0-9]{1,2})\s*(?:years?|yrs?)\b").expect("years pattern is a valid regex")
});

#[derive(Debug, Error, PartialEq)]
pub enum FeatureError {
    #[error("resume {0} is out of range")]
    ResumeOutOfRange(usize),

    #[error("job {0} is out of range")]
    JobOutOfRange(usize),

    #[error("no {method} similarity for resume {resume_id}, job {job_id}")]
    MissingSimilarity {
        method: SimilarityMethod,
        resume_id: usize,
        job_id: usize,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SkillMatch {
    /// Sum of per-phrase token overlap fractions.
    pub count: f64,
    pub ratio: f64,
    pub coverage: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhraseMatch {
    pub count: usize,
    /// `edu_match_present` or `exp_years_mentioned` depending on the section.
    pub signal: u32,
}

pub struct FeatureEngineer {
    parser: Arc<dyn AnnotationParser>,
    similarity_mode: SimilarityMode,
}

impl FeatureEngineer {
    pub fn new(parser: Arc<dyn AnnotationParser>, similarity_mode: SimilarityMode) -> Self {
        Self {
            parser,
            similarity_mode,
        }
    }

    pub fn similarity_mode(&self) -> SimilarityMode {
        self.similarity_mode
    }

    pub fn create_comprehensive_features(
        &self,
        resume_id: usize,
        job_id: usize,
        resumes: &[ResumeRecord],
        jobs: &[JobRecord],
        similarity: &SimilarityTables,
    ) -> Result<FeatureVector, FeatureError> {
        let resume = resumes
            .get(resume_id)
            .ok_or(FeatureError::ResumeOutOfRange(resume_id))?;
        let job = jobs.get(job_id).ok_or(FeatureError::JobOutOfRange(job_id))?;

        let parsed = self
            .parser
            .extract_all_features(RawAnnotation::from(job.annotation.as_str()));
        let skills = parsed.skills.phrases();

        let skill = skill_match_features(&resume.text, &skills);
        let edu = education_match_features(&resume.text, parsed.education.iter());
        let exp = experience_match_features(&resume.text, parsed.experience.iter());

        let lookup = |method: SimilarityMethod| {
            similarity
                .lookup(method, resume_id, job_id)
                .ok_or(FeatureError::MissingSimilarity {
                    method,
                    resume_id,
                    job_id,
                })
        };
        let (tfidf, word2vec, transformer) = match self.similarity_mode {
            SimilarityMode::Parity => {
                let w2v = lookup(SimilarityMethod::Word2Vec)?;
                (w2v, w2v, w2v)
            }
            SimilarityMode::PerMethod => (
                lookup(SimilarityMethod::TfIdf)?,
                lookup(SimilarityMethod::Word2Vec)?,
                lookup(SimilarityMethod::Transformer)?,
            ),
        };

        let resume_length = resume.text.chars().count();
        let jd_length = job.text.chars().count();
        let length_ratio = if jd_length > 0 {
            resume_length as f64 / jd_length as f64
        } else {
            0.0
        };

        Ok(FeatureVector {
            skill_match_count: skill.count,
            skill_match_ratio: skill.ratio,
            skill_coverage: skill.coverage,
            edu_match_count: edu.count as f64,
            edu_match_present: edu.signal as f64,
            exp_match_count: exp.count as f64,
            exp_years_mentioned: exp.signal as f64,
            tfidf_similarity: tfidf,
            word2vec_similarity: word2vec,
            transformer_similarity: transformer,
            resume_length: resume_length as f64,
            jd_length: jd_length as f64,
            length_ratio,
            category_match: f64::from(u8::from(category_match(
                &resume.category,
                &job.position_title,
            ))),
        })
    }
}

/// Lowercases, turns every non-`[a-z0-9]` character into a separator, splits.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Partial-credit token overlap between each skill phrase and the resume.
pub fn skill_match_features(resume_text: &str, skills: &[String]) -> SkillMatch {
    let resume_tokens: HashSet<String> = tokenize(resume_text).into_iter().collect();

    let mut total = 0.0_f64;
    let mut covered: HashSet<&str> = HashSet::new();

    for skill in skills {
        let tokens = tokenize(skill);
        if tokens.is_empty() {
            continue;
        }
        let hits = tokens.iter().filter(|t| resume_tokens.contains(*t)).count();
        let fraction = hits as f64 / tokens.len() as f64;
        total += fraction;
        if fraction >= COVERAGE_THRESHOLD {
            covered.insert(skill.as_str());
        }
    }

    let n = skills.len();
    let distinct = skills.iter().collect::<HashSet<_>>().len();

    SkillMatch {
        count: total,
        ratio: if n > 0 { total / n as f64 } else { 0.0 },
        coverage: if distinct > 0 {
            covered.len() as f64 / distinct as f64
        } else {
            0.0
        },
    }
}

fn count_substring_hits<'a>(resume_lower: &str, phrases: impl Iterator<Item = &'a String>) -> usize {
    phrases
        .map(|p| p.to_lowercase())
        .filter(|p| !p.is_empty() && resume_lower.contains(p.as_str()))
        .count()
}

/// Literal phrase hits plus a generic "mentions any degree" flag.
pub fn education_match_features<'a>(
    resume_text: &str,
    education: impl ExactSizeIterator<Item = &'a String>,
) -> PhraseMatch {
    if education.len() == 0 {
        return PhraseMatch::default();
    }
    let resume_lower = resume_text.to_lowercase();
    let present = EDUCATION_KEYWORDS.iter().any(|k| resume_lower.contains(k));
    PhraseMatch {
        count: count_substring_hits(&resume_lower, education),
        signal: u32::from(present),
    }
}

/// Literal phrase hits plus the largest "N years" mention in the resume.
pub fn experience_match_features<'a>(
    resume_text: &str,
    experience: impl ExactSizeIterator<Item = &'a String>,
) -> PhraseMatch {
    if experience.len() == 0 {
        return PhraseMatch::default();
    }
    let resume_lower = resume_text.to_lowercase();
    PhraseMatch {
        count: count_substring_hits(&resume_lower, experience),
        signal: max_years_mentioned(&resume_lower),
    }
}

pub fn max_years_mentioned(text: &str) -> u32 {
    YEARS_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .max()
        .unwrap_or(0)
}

/// Whole category, or any word of it, found inside the position title.
/// An empty category is a substring of every title.
pub fn category_match(category: &str, position_title: &str) -> bool {
    let category = category.to_lowercase();
    let title = position_title.to_lowercase();
    title.contains(category.as_str()) || category.split_whitespace().any(|w| title.contains(w))
}
