//! Concept metadata lookup
//!
//! The domain checks need the vocabulary domain and concept class of the
//! concepts a concept set is built from. Callers inject that knowledge
//! through [`ConceptLookup`]; exports usually embed it in each item, which is
//! used when no lookup is given or the lookup does not know the concept.

use cohort_check_model::Concept;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Vocabulary metadata of one concept
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConceptInfo {
    #[serde(alias = "CONCEPT_ID", alias = "conceptId")]
    pub concept_id: i64,
    #[serde(default, alias = "CONCEPT_NAME", alias = "conceptName")]
    pub concept_name: Option<String>,
    #[serde(default, alias = "DOMAIN_ID", alias = "domainId")]
    pub domain_id: Option<String>,
    #[serde(default, alias = "CONCEPT_CLASS_ID", alias = "conceptClassId")]
    pub concept_class_id: Option<String>,
    #[serde(default, alias = "VOCABULARY_ID", alias = "vocabularyId")]
    pub vocabulary_id: Option<String>,
}

impl ConceptInfo {
    /// Metadata embedded in a concept set item, if it carries an id
    pub fn from_embedded(concept: &Concept) -> Option<Self> {
        Some(Self {
            concept_id: concept.concept_id?,
            concept_name: concept.concept_name.clone(),
            domain_id: concept.domain_id.clone(),
            concept_class_id: concept.concept_class_id.clone(),
            vocabulary_id: concept.vocabulary_id.clone(),
        })
    }
}

/// Read-only source of concept metadata
pub trait ConceptLookup: Send + Sync {
    /// Metadata for a concept id, `None` when unknown
    fn concept(&self, concept_id: i64) -> Option<ConceptInfo>;
}

impl<T: ConceptLookup + ?Sized> ConceptLookup for Arc<T> {
    fn concept(&self, concept_id: i64) -> Option<ConceptInfo> {
        (**self).concept(concept_id)
    }
}

impl<T: ConceptLookup + ?Sized> ConceptLookup for &T {
    fn concept(&self, concept_id: i64) -> Option<ConceptInfo> {
        (**self).concept(concept_id)
    }
}

/// Errors loading concept metadata
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("cannot read concept file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid concept metadata: {0}")]
    Json(#[from] serde_json::Error),
}

/// Concept metadata held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryConceptLookup {
    concepts: IndexMap<i64, ConceptInfo>,
}

impl InMemoryConceptLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a concept
    pub fn insert(&mut self, info: ConceptInfo) {
        self.concepts.insert(info.concept_id, info);
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Load from a JSON array of concept records
    pub fn from_json(input: &str) -> Result<Self, LookupError> {
        let records: Vec<ConceptInfo> = serde_json::from_str(input)?;
        Ok(records.into_iter().collect())
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LookupError> {
        let records: Vec<ConceptInfo> = serde_json::from_reader(reader)?;
        Ok(records.into_iter().collect())
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LookupError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| LookupError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let lookup = Self::from_reader(std::io::BufReader::new(file))?;
        log::debug!("loaded {} concepts from {}", lookup.len(), path.display());
        Ok(lookup)
    }
}

impl FromIterator<ConceptInfo> for InMemoryConceptLookup {
    fn from_iter<I: IntoIterator<Item = ConceptInfo>>(iter: I) -> Self {
        let mut lookup = Self::new();
        for info in iter {
            lookup.insert(info);
        }
        lookup
    }
}

impl ConceptLookup for InMemoryConceptLookup {
    fn concept(&self, concept_id: i64) -> Option<ConceptInfo> {
        self.concepts.get(&concept_id).cloned()
    }
}
