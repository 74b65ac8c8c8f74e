//! Relation vectorizer
//!
//! Each instance becomes an `M x N` matrix:
//!
//! ```text
//!           D columns          P columns       P columns
//! row 0   [ word vector  | pos(0 - e1)    | pos(0 - e2)    ]
//! ...
//! row t   [ word vector  | pos(t - e1)    | pos(t - e2)    ]
//! ...
//! row M-1 [ zeros (pad)  | pos(M-1 - e1)  | pos(M-1 - e2)  ]
//! ```
//!
//! Instances that cannot be vectorized are dropped and reported; the
//! output tensor and label list stay aligned.

use std::collections::BTreeMap;

use ndarray::{s, Array2, Array3, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use relvec_core::{EmbeddingConfig, RelationInstance, RelvecError, Result, VectorizerConfig};

use crate::embedding::load_embedding;
use crate::position::PositionEmbeddingTable;
use crate::trim::{trim_long_sentence, CannotTrim};
use crate::WordEmbedding;

// ============================================================================
// Drop diagnostics
// ============================================================================

/// Why an instance was left out of the output
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DropReason {
    #[error("no vector for token {token:?}")]
    UnresolvedToken { token: String },

    #[error("cannot trim: {reason}")]
    CannotTrim { reason: CannotTrim },

    #[error("entity positions ({entity1}, {entity2}) outside sentence of {length} tokens")]
    EntityOutOfRange {
        entity1: usize,
        entity2: usize,
        length: usize,
    },
}

impl DropReason {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnresolvedToken { .. } => "unresolved_token",
            Self::CannotTrim { .. } => "cannot_trim",
            Self::EntityOutOfRange { .. } => "entity_out_of_range",
        }
    }
}

/// A dropped input instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedInstance {
    /// Position in the input collection
    pub index: usize,
    pub document_id: String,
    pub reason: DropReason,
}

/// Every instance dropped during a `transform` call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DropReport {
    pub dropped: Vec<DroppedInstance>,
}

impl DropReport {
    fn record(&mut self, index: usize, document_id: &str, reason: DropReason) {
        self.dropped.push(DroppedInstance {
            index,
            document_id: document_id.to_string(),
            reason,
        });
    }

    pub fn len(&self) -> usize {
        self.dropped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dropped.is_empty()
    }

    /// Number of drops per reason kind
    pub fn counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for dropped in &self.dropped {
            *counts.entry(dropped.reason.kind()).or_insert(0) += 1;
        }
        counts
    }

    pub fn unresolved_tokens(&self) -> usize {
        self.count_kind("unresolved_token")
    }

    pub fn infeasible_trims(&self) -> usize {
        self.count_kind("cannot_trim")
    }

    pub fn out_of_range(&self) -> usize {
        self.count_kind("entity_out_of_range")
    }

    fn count_kind(&self, kind: &str) -> usize {
        self.dropped
            .iter()
            .filter(|d| d.reason.kind() == kind)
            .count()
    }
}

// ============================================================================
// Output
// ============================================================================

/// Result of vectorizing one instance
#[derive(Debug, Clone, PartialEq)]
pub enum Vectorized {
    Matrix(Array2<f32>),
    Dropped(DropReason),
}

/// Output of a `transform` call
#[derive(Debug, Clone)]
pub struct VectorizedBatch {
    /// `(kept instances, M, N)`
    pub tensor: Array3<f32>,
    /// Labels of the kept instances, in tensor order
    pub labels: Vec<String>,
    pub report: DropReport,
}

impl VectorizedBatch {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

enum TokenLookup {
    Found(Array2<f32>),
    Missing(String),
}

// ============================================================================
// Vectorizer
// ============================================================================

/// Builds fixed-shape matrices from relation instances
pub struct RelationVectorizer<E = Box<dyn WordEmbedding>> {
    config: VectorizerConfig,
    embedding: E,
    /// `None` when position vectors are disabled
    positions: Option<PositionEmbeddingTable>,
    feature_width: usize,
}

impl RelationVectorizer<Box<dyn WordEmbedding>> {
    /// Create a vectorizer, loading word vectors from the embedding config
    pub fn from_config(config: VectorizerConfig, embedding: &EmbeddingConfig) -> Result<Self> {
        let source = load_embedding(embedding)?;
        Self::new(config, source)
    }
}

impl<E: WordEmbedding> RelationVectorizer<E> {
    /// Create a vectorizer with a random position table
    pub fn new(config: VectorizerConfig, embedding: E) -> Result<Self> {
        config.validate()?;
        let positions = config.position_vectors.then(|| {
            PositionEmbeddingTable::seeded(config.max_length, config.position_size, config.seed)
        });
        Self::build(config, embedding, positions)
    }

    /// Create a vectorizer around an existing position table
    pub fn with_position_table(
        config: VectorizerConfig,
        embedding: E,
        table: PositionEmbeddingTable,
    ) -> Result<Self> {
        config.validate()?;
        if !config.position_vectors {
            return Self::build(config, embedding, None);
        }
        if table.max_length() != config.max_length || table.width() != config.position_size {
            return Err(RelvecError::InvalidInput(format!(
                "position table is for length {} width {}, config wants {} and {}",
                table.max_length(),
                table.width(),
                config.max_length,
                config.position_size
            )));
        }
        Self::build(config, embedding, Some(table))
    }

    fn build(
        config: VectorizerConfig,
        embedding: E,
        positions: Option<PositionEmbeddingTable>,
    ) -> Result<Self> {
        let position_width = positions.as_ref().map_or(0, |t| 2 * t.width());
        let feature_width = embedding.dimension() + position_width;

        tracing::debug!(
            max_length = config.max_length,
            feature_width,
            "Vectorizer ready"
        );

        Ok(Self {
            config,
            embedding,
            positions,
            feature_width,
        })
    }

    /// Rows per instance (M)
    pub fn max_length(&self) -> usize {
        self.config.max_length
    }

    /// Columns per row (N)
    pub fn feature_width(&self) -> usize {
        self.feature_width
    }

    /// Width of the word-vector part of a row (D)
    pub fn semantic_width(&self) -> usize {
        self.embedding.dimension()
    }

    pub fn position_table(&self) -> Option<&PositionEmbeddingTable> {
        self.positions.as_ref()
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    /// Word vectors for every token, stopping at the first unknown one
    fn lookup_tokens(&self, tokens: &[String]) -> Result<TokenLookup> {
        let width = self.embedding.dimension();
        let mut matrix = Array2::zeros((tokens.len(), width));

        for (i, token) in tokens.iter().enumerate() {
            let Some(vector) = self.embedding.vector_for(token) else {
                return Ok(TokenLookup::Missing(token.clone()));
            };
            if vector.len() != width {
                return Err(RelvecError::Embedding(format!(
                    "vector for {token:?} has width {} (expected {width})",
                    vector.len()
                )));
            }
            matrix.row_mut(i).assign(&ArrayView1::from(vector.as_slice()));
        }

        Ok(TokenLookup::Found(matrix))
    }

    /// Vectorize a single instance
    ///
    /// Sentences longer than M are trimmed first. Errors are reserved for
    /// an embedding source breaking its width contract; everything else
    /// that prevents vectorization yields [`Vectorized::Dropped`].
    pub fn vectorize(&self, instance: &RelationInstance) -> Result<Vectorized> {
        let max_length = self.config.max_length;
        let tokens = instance.tokens();

        let (tokens, entity1, entity2) = if tokens.len() > max_length {
            match trim_long_sentence(tokens, max_length, instance.entity1, instance.entity2) {
                Ok(window) => (window.tokens, window.entity1, window.entity2),
                Err(reason) => return Ok(Vectorized::Dropped(DropReason::CannotTrim { reason })),
            }
        } else {
            (tokens, instance.entity1, instance.entity2)
        };

        if entity1 >= tokens.len() || entity2 >= tokens.len() {
            return Ok(Vectorized::Dropped(DropReason::EntityOutOfRange {
                entity1,
                entity2,
                length: tokens.len(),
            }));
        }

        let semantic = match self.lookup_tokens(tokens)? {
            TokenLookup::Found(matrix) => matrix,
            TokenLookup::Missing(token) => {
                return Ok(Vectorized::Dropped(DropReason::UnresolvedToken { token }))
            }
        };

        let width = self.embedding.dimension();
        let mut matrix = Array2::zeros((max_length, self.feature_width));
        matrix
            .slice_mut(s![..semantic.nrows(), ..width])
            .assign(&semantic);

        if let Some(table) = &self.positions {
            let p = table.width();
            matrix
                .slice_mut(s![.., width..width + p])
                .assign(&table.window(entity1)?);
            matrix
                .slice_mut(s![.., width + p..width + 2 * p])
                .assign(&table.window(entity2)?);
        }

        Ok(Vectorized::Matrix(matrix))
    }

    /// Vectorize a whole collection
    ///
    /// Kept instances appear in input order; labels are aligned with the
    /// first tensor axis.
    pub fn transform(&self, instances: &[RelationInstance]) -> Result<VectorizedBatch> {
        let mut matrices = Vec::with_capacity(instances.len());
        let mut labels = Vec::with_capacity(instances.len());
        let mut report = DropReport::default();

        for (index, instance) in instances.iter().enumerate() {
            match self.vectorize(instance)? {
                Vectorized::Matrix(matrix) => {
                    matrices.push(matrix);
                    labels.push(instance.label.clone());
                }
                Vectorized::Dropped(reason) => {
                    tracing::debug!(
                        "Dropping instance {} ({}): {}",
                        index,
                        instance.document_id,
                        reason
                    );
                    report.record(index, &instance.document_id, reason);
                }
            }
        }

        let mut tensor = Array3::zeros((matrices.len(), self.config.max_length, self.feature_width));
        for (i, matrix) in matrices.iter().enumerate() {
            tensor.index_axis_mut(Axis(0), i).assign(matrix);
        }

        tracing::info!(
            "Vectorized {} of {} instances ({} unresolved, {} untrimmable, {} out of range)",
            labels.len(),
            instances.len(),
            report.unresolved_tokens(),
            report.infeasible_trims(),
            report.out_of_range()
        );

        Ok(VectorizedBatch {
            tensor,
            labels,
            report,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
