//! Annotation reader
//!
//! Builds the merged tag sequence of a document and extracts its
//! relation instances.

use std::collections::HashSet;

use relvec_core::{
    tokenize_with_spans, Corpus, Document, ReaderConfig, RelationInstance, RelvecError, Result,
    Tag, TagSequence, Token, Tokenizer,
};

use crate::brat::{marked_lines, parse_relation_line, parse_tag_line};
use crate::tokenize::create_tokenizer;
use crate::{AnnotatedDocument, SkippedRelation};

/// Reads brat documents into tag sequences and relation instances
pub struct AnnotationReader {
    config: ReaderConfig,
    tokenizer: Box<dyn Tokenizer>,
}

impl AnnotationReader {
    /// Create a reader using the tokenizer named in the config
    pub fn new(config: ReaderConfig) -> Self {
        let tokenizer = create_tokenizer(config.tokenizer);
        Self { config, tokenizer }
    }

    /// Create a reader with a caller-supplied tokenizer
    pub fn with_tokenizer(config: ReaderConfig, tokenizer: impl Tokenizer + 'static) -> Self {
        Self {
            config,
            tokenizer: Box::new(tokenizer),
        }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Tokenize text and rebuild token spans
    pub fn tokens(&self, text: &str) -> Vec<Token> {
        tokenize_with_spans(self.tokenizer.tokenize(text))
    }

    /// Parse every explicit tag line of an annotation file
    pub fn explicit_tags(&self, annotation: &str) -> Result<Vec<Tag>> {
        marked_lines(annotation, self.config.tag_marker)
            .map(|(line_no, line)| parse_tag_line(line_no, line))
            .collect()
    }

    /// Merge explicit tags with an outside tag for every token that no
    /// explicit tag touches
    pub fn merge_tags(&self, tokens: &[Token], annotation: &str) -> Result<TagSequence> {
        let mut tags = self.explicit_tags(annotation)?;
        let explicit_count = tags.len();

        let mut used: HashSet<String> = tags.iter().map(|t| t.id.clone()).collect();
        let mut next_id = explicit_count + 1;

        for token in tokens {
            let span = token.span();
            let tagged = tags[..explicit_count]
                .iter()
                .any(|t| t.span().intersects(span));
            if tagged {
                continue;
            }

            let id = loop {
                let candidate = format!("{}{}", self.config.tag_marker, next_id);
                next_id += 1;
                if !used.contains(&candidate) {
                    break candidate;
                }
            };
            used.insert(id.clone());
            tags.push(Tag::new(
                id,
                self.config.outside_label.clone(),
                token.start,
                token.end,
                token.text.clone(),
            ));
        }

        tracing::debug!(
            explicit = explicit_count,
            synthesized = tags.len() - explicit_count,
            "Merged tags"
        );

        Ok(TagSequence::new(tags))
    }

    /// Resolve relation lines against the merged tags
    ///
    /// Arguments only name explicit tags; an id that exists solely as a
    /// synthesized outside tag is unresolved. Returns the instances, their
    /// labels, and the lines skipped for an unresolved argument. In strict
    /// mode an unresolved argument is an error instead.
    pub fn extract_relations(
        &self,
        document_id: &str,
        annotation: &str,
        tags: &TagSequence,
    ) -> Result<(Vec<RelationInstance>, Vec<String>, Vec<SkippedRelation>)> {
        let explicit: HashSet<String> = self
            .explicit_tags(annotation)?
            .into_iter()
            .map(|t| t.id)
            .collect();
        let resolve = |id: &str| {
            if explicit.contains(id) {
                tags.index_of(id)
            } else {
                None
            }
        };

        let mut relations = Vec::new();
        let mut labels = Vec::new();
        let mut skipped = Vec::new();

        for (line_no, line) in marked_lines(annotation, self.config.relation_marker) {
            let rel = parse_relation_line(line_no, line)?;

            let (entity1, entity2) = match (resolve(&rel.arg1), resolve(&rel.arg2)) {
                (Some(e1), Some(e2)) => (e1, e2),
                (e1, _) => {
                    let missing = if e1.is_none() { rel.arg1 } else { rel.arg2 };
                    if self.config.strict_relations {
                        return Err(RelvecError::UnresolvedArgument {
                            relation_id: rel.id,
                            argument: missing,
                        });
                    }
                    tracing::warn!(
                        "Skipping relation {} in {} (line {}): unknown tag {}",
                        rel.id,
                        document_id,
                        line_no,
                        missing
                    );
                    skipped.push(SkippedRelation {
                        document_id: document_id.to_string(),
                        relation_id: rel.id,
                        line_no,
                        missing,
                    });
                    continue;
                }
            };

            relations.push(RelationInstance::from_tags(
                document_id,
                tags,
                entity1,
                entity2,
                rel.label.clone(),
            ));
            labels.push(rel.label);
        }

        Ok((relations, labels, skipped))
    }

    /// Read one document
    pub fn read_document(&self, document: &Document) -> Result<AnnotatedDocument> {
        let tokens = self.tokens(&document.text);
        let tags = self.merge_tags(&tokens, &document.annotation)?;
        let (relations, labels, skipped) =
            self.extract_relations(&document.id, &document.annotation, &tags)?;

        tracing::debug!(
            "Read document {}: {} tokens, {} tags, {} relations",
            document.id,
            tokens.len(),
            tags.len(),
            relations.len()
        );

        Ok(AnnotatedDocument {
            document_id: document.id.clone(),
            tokens,
            tags,
            relations,
            labels,
            skipped,
        })
    }

    /// Read every document in ascending id order
    ///
    /// A structural failure in any document aborts the pass and is
    /// returned with the document id attached.
    pub fn read_corpus(
        &self,
        documents: impl IntoIterator<Item = Document>,
    ) -> Result<(Corpus, Vec<SkippedRelation>)> {
        let mut documents: Vec<Document> = documents.into_iter().collect();
        documents.sort_by(|a, b| a.id.cmp(&b.id));

        let mut corpus = Corpus::default();
        let mut skipped = Vec::new();

        for document in documents {
            let annotated = self
                .read_document(&document)
                .map_err(|e| e.in_document(&document.id))?;

            corpus.instances.extend(annotated.relations);
            corpus.labels.extend(annotated.labels);
            skipped.extend(annotated.skipped);
            corpus.texts.insert(document.id, document.text);
        }

        tracing::info!(
            "Read {} documents: {} relation instances, {} skipped relations",
            corpus.texts.len(),
            corpus.len(),
            skipped.len()
        );

        Ok((corpus, skipped))
    }
}

impl Default for AnnotationReader {
    fn default() -> Self {
        Self::new(ReaderConfig::default())
    }
}

// ============================================================================
// Tests
// ============================================================================
