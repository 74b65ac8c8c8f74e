//! relvec Annotation - brat stand-off annotation reader
//!
//! Turns a document's raw text and `.ann` file into a merged tag
//! sequence covering every token, and resolves relation lines into
//! relation instances that index into that sequence.

use serde::{Deserialize, Serialize};

use relvec_core::{RelationInstance, TagSequence, Token};

/// Reader output for one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedDocument {
    pub document_id: String,
    /// Tokens with reconstructed spans
    pub tokens: Vec<Token>,
    /// Explicit and synthesized tags, sorted by start offset
    pub tags: TagSequence,
    /// One instance per resolved relation line
    pub relations: Vec<RelationInstance>,
    /// Relation labels, aligned with `relations`
    pub labels: Vec<String>,
    /// Relation lines whose arguments could not be resolved
    pub skipped: Vec<SkippedRelation>,
}

/// A relation line dropped because an argument is not in the tag sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRelation {
    pub document_id: String,
    pub relation_id: String,
    pub line_no: usize,
    /// The unresolved tag id
    pub missing: String,
}

pub mod brat;
pub mod reader;
pub mod tokenize;

pub use reader::AnnotationReader;
pub use tokenize::{create_tokenizer, TreebankTokenizer, WhitespaceTokenizer};
