use serde::{Deserialize, Serialize};

/// A cleaned resume, addressed by its 0-based row index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResumeRecord {
    pub id: usize,
    pub text: String,
    pub category: String,
}

/// A cleaned job description with its raw annotation blob, addressed by its 0-based row index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobRecord {
    pub id: usize,
    pub text: String,
    pub position_title: String,
    /// Free-form extraction output attached upstream. Often JSON, sometimes not.
    pub annotation: String,
}

/// Row shape of `processed_resumes.csv`. Unknown columns are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ResumeCsvRow {
    #[serde(default)]
    pub cleaned_resume: Option<String>,
    #[serde(rename = "Category", default)]
    pub category: Option<String>,
}

/// Row shape of `processed_jds.csv`. Unknown columns are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct JobCsvRow {
    #[serde(default)]
    pub cleaned_job_description: Option<String>,
    #[serde(default)]
    pub position_title: Option<String>,
    #[serde(default)]
    pub model_response: Option<String>,
}

impl ResumeCsvRow {
    pub fn into_record(self, id: usize) -> ResumeRecord {
        ResumeRecord {
            id,
            text: self.cleaned_resume.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
        }
    }
}

impl JobCsvRow {
    pub fn into_record(self, id: usize) -> JobRecord {
        JobRecord {
            id,
            text: self.cleaned_job_description.unwrap_or_default(),
            position_title: self.position_title.unwrap_or_default(),
            annotation: self.model_response.unwrap_or_default(),
        }
    }
}
