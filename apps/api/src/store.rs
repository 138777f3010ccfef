//! Loads the resume/job tables and similarity matrices once at startup.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::info;

use crate::features::similarity::{SimilarityError, SimilarityMethod, SimilarityTables};
use crate::models::records::{JobCsvRow, JobRecord, ResumeCsvRow, ResumeRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("similarity file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Similarity(#[from] SimilarityError),

    #[error("similarity tables are {found:?} but the corpus is {expected:?} (resumes, jobs)")]
    Misaligned {
        expected: (usize, usize),
        found: (usize, usize),
    },
}

/// Everything the ranking service reads. Immutable after load.
#[derive(Debug)]
pub struct Corpus {
    pub resumes: Vec<ResumeRecord>,
    pub jobs: Vec<JobRecord>,
    pub similarity: SimilarityTables,
}

impl Corpus {
    /// Assembles a corpus, checking the similarity tables align index-for-index
    /// with the two record sets.
    pub fn new(
        resumes: Vec<ResumeRecord>,
        jobs: Vec<JobRecord>,
        similarity: SimilarityTables,
    ) -> Result<Self, StoreError> {
        let expected = (resumes.len(), jobs.len());
        if similarity.shape() != expected {
            return Err(StoreError::Misaligned {
                expected,
                found: similarity.shape(),
            });
        }
        Ok(Self {
            resumes,
            jobs,
            similarity,
        })
    }

    pub fn load(resumes_path: &Path, jobs_path: &Path, similarity_path: &Path) -> Result<Self> {
        let resumes = read_resumes(open(resumes_path)?)
            .with_context(|| format!("Failed to load resumes from {}", resumes_path.display()))?;
        info!("Loaded {} resumes", resumes.len());

        let jobs = read_jobs(open(jobs_path)?)
            .with_context(|| format!("Failed to load jobs from {}", jobs_path.display()))?;
        info!("Loaded {} jobs", jobs.len());

        let similarity = read_similarity(open(similarity_path)?, resumes.len(), jobs.len())
            .with_context(|| {
                format!(
                    "Failed to load similarity tables from {}",
                    similarity_path.display()
                )
            })?;
        info!(
            "Loaded similarity tables {:?} for {:?}",
            similarity.shape(),
            SimilarityMethod::ALL.map(SimilarityMethod::name)
        );

        Ok(Self::new(resumes, jobs, similarity)?)
    }

    pub fn resume_count(&self) -> usize {
        self.resumes.len()
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    Ok(BufReader::new(file))
}

pub fn read_resumes<R: Read>(reader: R) -> Result<Vec<ResumeRecord>, StoreError> {
    csv::Reader::from_reader(reader)
        .deserialize::<ResumeCsvRow>()
        .enumerate()
        .map(|(id, row)| row.map(|r| r.into_record(id)).map_err(StoreError::from))
        .collect()
}

pub fn read_jobs<R: Read>(reader: R) -> Result<Vec<JobRecord>, StoreError> {
    csv::Reader::from_reader(reader)
        .deserialize::<JobCsvRow>()
        .enumerate()
        .map(|(id, row)| row.map(|r| r.into_record(id)).map_err(StoreError::from))
        .collect()
}

/// Reads `{method name: [[f64; job_count]; resume_count]}`.
pub fn read_similarity<R: Read>(
    reader: R,
    resume_count: usize,
    job_count: usize,
) -> Result<SimilarityTables, StoreError> {
    let raw: HashMap<SimilarityMethod, Vec<Vec<f64>>> = serde_json::from_reader(reader)?;
    Ok(SimilarityTables::new(raw, resume_count, job_count)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const RESUMES_CSV: &str = "\
cleaned_resume,Category,extra
\"python developer, 5 years\",Data Science,x
,HR,y
";

    const JOBS_CSV: &str = "\
cleaned_job_description,position_title,model_response
build pipelines,Data Engineer,\"{\"\"required_skills\"\": [\"\"Python\"\"]}\"
";

    const SIMILARITY_JSON: &str = r#"{
        "TF-IDF": [[0.1], [0.2]],
        "Word2Vec": [[0.3], [0.4]],
        "all-MiniLM-L6-v2": [[0.5], [0.6]]
    }"#;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_read_resumes_indexes_rows_and_defaults_empty_cells() {
        let resumes = read_resumes(RESUMES_CSV.as_bytes()).unwrap();
        assert_eq!(resumes.len(), 2);
        assert_eq!(resumes[0].id, 0);
        assert_eq!(resumes[0].text, "python developer, 5 years");
        assert_eq!(resumes[0].category, "Data Science");
        assert_eq!(resumes[1].id, 1);
        assert_eq!(resumes[1].text, "");
    }

    #[test]
    fn test_read_jobs_keeps_annotation_verbatim() {
        let jobs = read_jobs(JOBS_CSV.as_bytes()).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].position_title, "Data Engineer");
        assert_eq!(jobs[0].annotation, r#"{"required_skills": ["Python"]}"#);
    }

    #[test]
    fn test_read_similarity_checks_shape() {
        let tables = read_similarity(SIMILARITY_JSON.as_bytes(), 2, 1).unwrap();
        assert_eq!(tables.shape(), (2, 1));
        assert!(matches!(
            read_similarity(SIMILARITY_JSON.as_bytes(), 1, 1),
            Err(StoreError::Similarity(SimilarityError::ShapeMismatch { .. }))
        ));
    }

    #[test]
    fn test_unknown_similarity_method_is_rejected() {
        let json = r#"{"BM25": [[0.1]]}"#;
        assert!(matches!(
            read_similarity(json.as_bytes(), 1, 1),
            Err(StoreError::Json(_))
        ));
    }

    #[test]
    fn test_corpus_load_from_files() {
        let resumes = write_temp(RESUMES_CSV);
        let jobs = write_temp(JOBS_CSV);
        let similarity = write_temp(SIMILARITY_JSON);

        let corpus = Corpus::load(resumes.path(), jobs.path(), similarity.path()).unwrap();
        assert_eq!(corpus.resume_count(), 2);
        assert_eq!(corpus.job_count(), 1);
    }

    #[test]
    fn test_corpus_load_reports_missing_file() {
        let jobs = write_temp(JOBS_CSV);
        let similarity = write_temp(SIMILARITY_JSON);
        let err = Corpus::load(Path::new("/nonexistent/resumes.csv"), jobs.path(), similarity.path())
            .unwrap_err();
        assert!(err.to_string().contains("Cannot open"));
    }
}
