//! Word vectors for token lookup
//!
//! Reads the word2vec text format:
//!
//! ```text
//! 3 4
//! the 0.1 0.2 0.3 0.4
//! cat 0.5 0.1 0.0 0.2
//! sat 0.3 0.3 0.1 0.9
//! ```
//!
//! The `count dim` header is optional.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use relvec_core::{EmbeddingConfig, FeatureFlags, RelvecError, Result};

use crate::WordEmbedding;

/// In-memory word vector table
#[derive(Debug, Clone)]
pub struct WordVectors {
    dimension: usize,
    vectors: HashMap<String, Vec<f32>>,
    features: FeatureFlags,
}

impl WordVectors {
    /// Create an empty table of the given width
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: HashMap::new(),
            features: FeatureFlags::default(),
        }
    }

    /// Add or replace a word vector
    pub fn insert(&mut self, word: impl Into<String>, vector: Vec<f32>) -> Result<()> {
        let word = word.into();
        if vector.len() != self.dimension {
            return Err(RelvecError::Embedding(format!(
                "vector for {word:?} has width {} (expected {})",
                vector.len(),
                self.dimension
            )));
        }
        self.vectors.insert(word, vector);
        Ok(())
    }

    /// Request linguistic features from this source
    ///
    /// Plain word vectors carry no such features; the flags are kept so
    /// callers can inspect them, and a warning is logged.
    pub fn with_features(mut self, features: FeatureFlags) -> Self {
        if features.any() {
            tracing::warn!(
                "Word vectors provide no linguistic features; ignoring ner={} pos={} dependency={}",
                features.ner,
                features.pos,
                features.dependency
            );
        }
        self.features = features;
        self
    }

    pub fn features(&self) -> FeatureFlags {
        self.features
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Parse word2vec text format
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut table: Option<Self> = None;
        let mut expected_count = None;

        for (i, line) in reader.lines().enumerate() {
            let line_no = i + 1;
            let line = line.map_err(|e| {
                RelvecError::Embedding(format!("failed to read line {line_no}: {e}"))
            })?;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }

            if line_no == 1 && fields.len() == 2 {
                if let (Ok(count), Ok(dim)) = (fields[0].parse::<usize>(), fields[1].parse()) {
                    expected_count = Some(count);
                    table = Some(Self::new(dim));
                    continue;
                }
            }

            let table = table.get_or_insert_with(|| Self::new(fields.len() - 1));
            let vector = fields[1..]
                .iter()
                .map(|v| v.parse::<f32>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| {
                    RelvecError::Embedding(format!("invalid value on line {line_no}: {e}"))
                })?;
            table.insert(fields[0], vector).map_err(|e| {
                RelvecError::Embedding(format!("line {line_no}: {e}"))
            })?;
        }

        let table = table
            .ok_or_else(|| RelvecError::Embedding("word vector file is empty".to_string()))?;

        if let Some(count) = expected_count {
            if count != table.len() {
                tracing::warn!(
                    "Word vector header announces {} words, read {}",
                    count,
                    table.len()
                );
            }
        }

        Ok(table)
    }

    /// Load word2vec text format from a file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| RelvecError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let table = Self::from_reader(std::io::BufReader::new(file))?;

        tracing::info!(
            "Loaded {} word vectors of width {} from {}",
            table.len(),
            table.dimension,
            path.display()
        );
        Ok(table)
    }

    fn lookup_word(&self, word: &str) -> Option<&Vec<f32>> {
        self.vectors
            .get(word)
            .or_else(|| self.vectors.get(&word.to_lowercase()))
    }

    /// Mean of the word vectors of a multi-word segment
    fn phrase_vector(&self, phrase: &str) -> Option<Vec<f32>> {
        let mut sum = vec![0.0f32; self.dimension];
        let mut count = 0usize;
        for word in phrase.split_whitespace() {
            let vector = self.lookup_word(word)?;
            for (acc, v) in sum.iter_mut().zip(vector) {
                *acc += v;
            }
            count += 1;
        }
        if count == 0 {
            return None;
        }
        sum.iter_mut().for_each(|v| *v /= count as f32);
        Some(sum)
    }
}

impl WordEmbedding for WordVectors {
    fn vector_for(&self, token: &str) -> Option<Vec<f32>> {
        if let Some(vector) = self.lookup_word(token) {
            return Some(vector.clone());
        }
        if token.split_whitespace().nth(1).is_some() {
            return self.phrase_vector(token);
        }
        None
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Load the embedding source named in the config
pub fn load_embedding(config: &EmbeddingConfig) -> Result<Box<dyn WordEmbedding>> {
    let vectors = WordVectors::from_path(&config.path)?.with_features(config.features);
    Ok(Box::new(vectors))
}
