//! relvec Vector - Sequence vectorization for relation classification
//!
//! Turns relation instances into fixed-shape matrices: one row per token
//! holding its word vector followed by the relative position vectors of
//! both entities, padded or trimmed to the configured maximum length.

/// Source of per-token semantic vectors
pub trait WordEmbedding: Send + Sync {
    /// Vector for a token, or `None` when the token is unknown
    fn vector_for(&self, token: &str) -> Option<Vec<f32>>;

    /// Width of every returned vector
    fn dimension(&self) -> usize;
}

impl<T: WordEmbedding + ?Sized> WordEmbedding for Box<T> {
    fn vector_for(&self, token: &str) -> Option<Vec<f32>> {
        (**self).vector_for(token)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }
}

pub mod embedding;
pub mod position;
pub mod trim;
pub mod vectorizer;

pub use embedding::{load_embedding, WordVectors};
pub use position::PositionEmbeddingTable;
pub use trim::{trim_long_sentence, CannotTrim, TrimmedWindow};
pub use vectorizer::{
    DropReason, DropReport, DroppedInstance, RelationVectorizer, Vectorized, VectorizedBatch,
};
