use std::collections::BTreeSet;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::parsing::response_parser::ParsedJdFeatures;

/// Every phrase extracted so far, by kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub skills: BTreeSet<String>,
    pub education: BTreeSet<String>,
    pub experience: BTreeSet<String>,
}

impl Vocabulary {
    pub fn len(&self) -> usize {
        self.skills.len() + self.education.len() + self.experience.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Append-only vocabulary shared by every parse. Never cleared.
///
/// Injected into the parser rather than living in a global so tests and
/// callers can hold their own instance. The lock is only held for the union.
#[derive(Debug, Default)]
pub struct VocabularyAccumulator {
    inner: RwLock<Vocabulary>,
}

impl VocabularyAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unions the phrases of one parse into the vocabulary.
    pub fn record(&self, parsed: &ParsedJdFeatures) {
        // Sets are always internally consistent, so a poisoned lock is still usable.
        let mut vocab = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        vocab.skills.extend(parsed.skills.phrases());
        vocab.education.extend(parsed.education.iter().cloned());
        vocab.experience.extend(parsed.experience.iter().cloned());
    }

    pub fn snapshot(&self) -> Vocabulary {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
