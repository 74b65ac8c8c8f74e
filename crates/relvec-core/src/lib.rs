//! relvec Core - Domain records, errors, and shared utilities
//!
//! This crate defines the abstractions shared by the relvec workspace:
//! - Stand-off annotation records (documents, tags, relation instances)
//! - Token spans and the tokenizer collaborator contract
//! - Common error types
//! - Configuration management

pub mod config;
pub mod token;

pub use config::{
    AppConfig, ConfigError, EmbeddingConfig, FeatureFlags, LoggingConfig, ReaderConfig,
    TokenizerKind, VectorizerConfig,
};
pub use token::{reconstruct_spans, tokenize_with_spans, Span, Token, Tokenizer};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for relvec operations
#[derive(Error, Debug)]
pub enum RelvecError {
    #[error("Malformed annotation line {line_no}: {reason} ({line:?})")]
    MalformedLine {
        line_no: usize,
        line: String,
        reason: String,
    },

    #[error("Relation {relation_id} references unknown tag {argument}")]
    UnresolvedArgument {
        relation_id: String,
        argument: String,
    },

    #[error("Document {id}: {source}")]
    Document {
        id: String,
        source: Box<RelvecError>,
    },

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RelvecError {
    /// Attach the owning document id to an error
    pub fn in_document(self, id: impl Into<String>) -> Self {
        Self::Document {
            id: id.into(),
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, RelvecError>;

// ============================================================================
// Documents
// ============================================================================

/// A brat document: raw text plus its annotation file, keyed by base name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier (file base name without extension)
    pub id: String,

    /// Contents of the `.txt` file
    pub text: String,

    /// Contents of the `.ann` file
    pub annotation: String,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        annotation: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            annotation: annotation.into(),
        }
    }
}

// ============================================================================
// Tags
// ============================================================================

/// Label given to synthesized tags covering untagged tokens
pub const OUTSIDE_LABEL: &str = "OUT";

/// An entity tag, either read from the annotation file or synthesized
/// for a token outside every explicit range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag identifier (e.g., "T3")
    pub id: String,

    /// Entity label, or the outside label for synthesized tags
    pub label: String,

    /// Start offset (inclusive)
    pub start: usize,

    /// End offset (exclusive)
    pub end: usize,

    /// Surface text
    pub text: String,
}

impl Tag {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        start: usize,
        end: usize,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            start,
            end,
            text: text.into(),
        }
    }

    /// Offset range of this tag
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// Whether this tag was synthesized for an untagged token
    pub fn is_outside(&self) -> bool {
        self.label == OUTSIDE_LABEL
    }
}

/// Merged tag sequence of one document, sorted by start offset
///
/// Sorting is stable: tags sharing a start offset keep their insertion
/// order, so explicit tags stay ahead of synthesized ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSequence {
    tags: Vec<Tag>,
}

impl TagSequence {
    /// Build a sequence from unsorted tags
    pub fn new(mut tags: Vec<Tag>) -> Self {
        tags.sort_by_key(|t| t.start);
        Self { tags }
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.tags.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Tag> {
        self.tags.get(index)
    }

    pub fn as_slice(&self) -> &[Tag] {
        &self.tags
    }

    /// Index of the tag with the given id (linear scan)
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.tags.iter().position(|t| t.id == id)
    }

    /// Surface text of every tag, in order
    pub fn segments(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.text.clone()).collect()
    }

    /// Label of every tag, in order
    pub fn segment_labels(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.label.clone()).collect()
    }

    /// Index of the first tag whose range intersects `span`
    pub fn tag_for_span(&self, span: Span) -> Option<usize> {
        self.tags.iter().position(|t| t.span().intersects(span))
    }

    /// Check that every token is claimed by a tag, and that no token is
    /// claimed by more than one synthesized tag
    pub fn covers(&self, tokens: &[Token]) -> bool {
        tokens.iter().all(|token| {
            let span = token.span();
            let claims: Vec<&Tag> = self
                .tags
                .iter()
                .filter(|t| t.span().intersects(span))
                .collect();
            !claims.is_empty() && claims.iter().filter(|t| t.is_outside()).count() <= 1
        })
    }
}

impl<'a> IntoIterator for &'a TagSequence {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}

// ============================================================================
// Relation Instances
// ============================================================================

/// One labeled example: the document's segment sequence and the indices
/// of the two related tags within it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationInstance {
    /// Owning document id
    pub document_id: String,

    /// Surface text of every tag in the merged sequence
    pub segments: Vec<String>,

    /// Label of every tag in the merged sequence
    pub segment_labels: Vec<String>,

    /// Index of the first argument in `segments`
    pub entity1: usize,

    /// Index of the second argument in `segments`
    pub entity2: usize,

    /// Relation label
    pub label: String,
}

impl RelationInstance {
    /// Create an instance from a merged tag sequence
    pub fn from_tags(
        document_id: impl Into<String>,
        tags: &TagSequence,
        entity1: usize,
        entity2: usize,
        label: impl Into<String>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            segments: tags.segments(),
            segment_labels: tags.segment_labels(),
            entity1,
            entity2,
            label: label.into(),
        }
    }

    /// Create an instance directly from a token sequence
    pub fn from_tokens<S: Into<String>>(
        tokens: impl IntoIterator<Item = S>,
        entity1: usize,
        entity2: usize,
        label: impl Into<String>,
    ) -> Self {
        Self {
            document_id: String::new(),
            segments: tokens.into_iter().map(Into::into).collect(),
            segment_labels: Vec::new(),
            entity1,
            entity2,
            label: label.into(),
        }
    }

    /// Token sequence used for vectorization
    pub fn tokens(&self) -> &[String] {
        &self.segments
    }
}

// ============================================================================
// Corpus
// ============================================================================

/// All relation instances of a corpus pass, with their labels aligned 1:1
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    /// Raw text per document id
    pub texts: BTreeMap<String, String>,

    /// Relation instances, in document-id order
    pub instances: Vec<RelationInstance>,

    /// Relation label of each instance
    pub labels: Vec<String>,
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Number of instances per relation label
    pub fn label_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for label in &self.labels {
            *counts.entry(label.clone()).or_insert(0) += 1;
        }
        counts
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(id: &str, label: &str, start: usize, end: usize) -> Tag {
        Tag::new(id, label, start, end, "x")
    }

    #[test]
    fn test_tag_sequence_sorts_stably() {
        let seq = TagSequence::new(vec![
            tag("T2", "Object", 10, 14),
            tag("T1", "Subject", 0, 4),
            tag("T3", OUTSIDE_LABEL, 0, 4),
        ]);

        let ids: Vec<_> = seq.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["T1", "T3", "T2"]);
        assert_eq!(seq.index_of("T2"), Some(2));
        assert_eq!(seq.index_of("T9"), None);
    }

    #[test]
    fn test_covers_detects_gap() {
        let tokens = tokenize_with_spans(vec!["ab".to_string(), "cd".to_string()]);
        let partial = TagSequence::new(vec![tag("T1", "Subject", 0, 2)]);
        assert!(!partial.covers(&tokens));

        let full = TagSequence::new(vec![
            tag("T1", "Subject", 0, 2),
            tag("T2", OUTSIDE_LABEL, 3, 5),
        ]);
        assert!(full.covers(&tokens));
        assert_eq!(full.tag_for_span(Span::new(3, 5)), Some(1));
    }

    #[test]
    fn test_relation_instance_from_tags() {
        let mut t1 = tag("T1", "Subject", 0, 5);
        t1.text = "Alice".to_string();
        let mut t2 = tag("T2", "Object", 6, 9);
        t2.text = "Bob".to_string();
        let seq = TagSequence::new(vec![t2, t1]);

        let rel = RelationInstance::from_tags("doc1", &seq, 0, 1, "knows");
        assert_eq!(rel.tokens(), &["Alice".to_string(), "Bob".to_string()]);
        assert_eq!(rel.segment_labels, vec!["Subject", "Object"]);
        assert_eq!(rel.document_id, "doc1");
    }

    #[test]
    fn test_label_counts() {
        let corpus = Corpus {
            labels: vec!["a".into(), "b".into(), "a".into()],
            ..Default::default()
        };
        let counts = corpus.label_counts();
        assert_eq!(counts["a"], 2);
        assert_eq!(counts["b"], 1);
    }

    #[test]
    fn test_document_error_context() {
        let err = RelvecError::InvalidInput("bad".into()).in_document("doc7");
        assert!(err.to_string().contains("doc7"));
    }
}
