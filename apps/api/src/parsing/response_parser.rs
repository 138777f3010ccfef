#![allow(dead_code)]

//! Response parser: turns a job's raw annotation blob into normalized
//! skill / education / experience phrase sets.
//!
//! The blob is whatever the upstream extractor produced: a JSON object, a
//! printed dict in literal notation, or garbage. Decoding never fails outward;
//! anything that is not a mapping degrades to an empty one, which in turn
//! yields empty phrase sets and zero-valued match features.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::parsing::literal::parse_literal;
use crate::parsing::vocabulary::VocabularyAccumulator;

const SKILL_FIELDS: &[&str] = &[
    "required_skills",
    "core_responsibilities",
    "preferred_qualifications",
];

/// Sub-keys tried, in order, when a skill list element is itself a mapping.
const SKILL_SUB_KEYS: &[&str] = &["name", "skill", "value", "title"];

const EDUCATION_FIELDS: &[&str] = &["educational_requirements", "education"];

const EXPERIENCE_FIELDS: &[&str] = &["experience_level", "experience", "years_experience"];

/// The shapes an annotation blob arrives in.
#[derive(Debug, Clone, PartialEq)]
pub enum RawAnnotation {
    Mapping(Map<String, Value>),
    Sequence(Vec<Value>),
    Text(String),
    Unrecognized,
}

impl From<Value> for RawAnnotation {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => RawAnnotation::Mapping(map),
            Value::Array(items) => RawAnnotation::Sequence(items),
            Value::String(text) => RawAnnotation::Text(text),
            _ => RawAnnotation::Unrecognized,
        }
    }
}

impl From<&str> for RawAnnotation {
    fn from(text: &str) -> Self {
        RawAnnotation::Text(text.to_string())
    }
}

impl From<Option<&str>> for RawAnnotation {
    fn from(text: Option<&str>) -> Self {
        text.map(RawAnnotation::from)
            .unwrap_or(RawAnnotation::Unrecognized)
    }
}

impl RawAnnotation {
    /// Decodes into a mapping. Only mappings survive; everything else is empty.
    pub fn into_mapping(self) -> Map<String, Value> {
        match self {
            RawAnnotation::Mapping(map) => map,
            RawAnnotation::Text(text) => decode_text(&text),
            RawAnnotation::Sequence(_) | RawAnnotation::Unrecognized => Map::new(),
        }
    }
}

fn decode_text(text: &str) -> Map<String, Value> {
    if text.trim().is_empty() {
        return Map::new();
    }

    let decoded = match serde_json::from_str::<Value>(text) {
        Ok(value) => Some(value),
        Err(json_err) => match parse_literal(text) {
            Ok(value) => Some(value),
            Err(literal_err) => {
                debug!("Annotation undecodable (json: {json_err}; literal: {literal_err})");
                None
            }
        },
    };

    match decoded {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Skill phrases as handed to feature engineering.
///
/// `Joined` covers parsers that emit one comma-joined string instead of a
/// list; it is split on commas before matching.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SkillList {
    Phrases(BTreeSet<String>),
    Joined(String),
}

impl Default for SkillList {
    fn default() -> Self {
        SkillList::Phrases(BTreeSet::new())
    }
}

impl SkillList {
    /// Phrases in match order. The joined form may contain repeats.
    pub fn phrases(&self) -> Vec<String> {
        match self {
            SkillList::Phrases(set) => set.iter().cloned().collect(),
            SkillList::Joined(joined) => joined
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.phrases().is_empty()
    }
}

/// Normalized output of one parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedJdFeatures {
    pub skills: SkillList,
    pub education: BTreeSet<String>,
    pub experience: BTreeSet<String>,
    /// The decoded blob with normalized keys.
    pub raw: Map<String, Value>,
}

/// Anything that can turn an annotation blob into parsed JD features.
///
/// Carried by the feature engineer as `Arc<dyn AnnotationParser>`.
pub trait AnnotationParser: Send + Sync {
    fn extract_all_features(&self, raw: RawAnnotation) -> ParsedJdFeatures;
}

/// Default parser. Records every extracted phrase in the shared vocabulary.
pub struct ResponseParser {
    vocabulary: Arc<VocabularyAccumulator>,
}

impl ResponseParser {
    pub fn new(vocabulary: Arc<VocabularyAccumulator>) -> Self {
        Self { vocabulary }
    }
}

impl AnnotationParser for ResponseParser {
    fn extract_all_features(&self, raw: RawAnnotation) -> ParsedJdFeatures {
        let data = normalize_keys(raw.into_mapping());

        let parsed = ParsedJdFeatures {
            skills: SkillList::Phrases(extract_skills(&data)),
            education: extract_plain(&data, EDUCATION_FIELDS),
            experience: extract_plain(&data, EXPERIENCE_FIELDS),
            raw: data,
        };

        self.vocabulary.record(&parsed);
        parsed
    }
}

/// Lowercase, trim, spaces to underscores. Later keys win on collision.
fn normalize_keys(data: Map<String, Value>) -> Map<String, Value> {
    data.into_iter()
        .map(|(k, v)| (k.to_lowercase().trim().replace(' ', "_"), v))
        .collect()
}

/// Splits on periods, semicolons and newlines; drops empty pieces.
fn split_phrases(text: &str) -> impl Iterator<Item = &str> {
    text.split(['.', ';', '\n'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
}

fn normalize_phrase(phrase: &str) -> Option<String> {
    let phrase = phrase.trim().to_lowercase();
    (!phrase.is_empty()).then_some(phrase)
}

fn extract_skills(data: &Map<String, Value>) -> BTreeSet<String> {
    let mut skills = BTreeSet::new();
    let mut push_split = |text: &str| {
        skills.extend(split_phrases(text).filter_map(normalize_phrase));
    };

    for field in SKILL_FIELDS {
        match data.get(*field) {
            Some(Value::String(text)) => push_split(text),
            Some(Value::Array(items)) => {
                for item in items {
                    match item {
                        Value::String(text) => push_split(text),
                        Value::Object(entry) => {
                            let named = SKILL_SUB_KEYS
                                .iter()
                                .find_map(|key| entry.get(*key).and_then(Value::as_str));
                            if let Some(text) = named {
                                push_split(text);
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    skills
}

/// Education and experience: lists taken element-wise, strings split. No sub-keys.
fn extract_plain(data: &Map<String, Value>, fields: &[&str]) -> BTreeSet<String> {
    let mut phrases = BTreeSet::new();
    for field in fields {
        match data.get(*field) {
            Some(Value::Array(items)) => {
                phrases.extend(items.iter().filter_map(Value::as_str).filter_map(normalize_phrase));
            }
            Some(Value::String(text)) => {
                phrases.extend(split_phrases(text).filter_map(normalize_phrase));
            }
            _ => {}
        }
    }
    phrases
}
