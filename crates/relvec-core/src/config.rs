//! relvec Configuration Management
//!
//! Handles configuration from environment variables and TOML files,
//! with defaults matching the original preprocessing setup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Annotation reader settings
    pub reader: ReaderConfig,

    /// Sequence vectorizer settings
    pub vectorizer: VectorizerConfig,

    /// Word-embedding source
    pub embedding: EmbeddingConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Vectorizer
        if let Ok(value) = std::env::var("RELVEC_MAX_LENGTH") {
            config.vectorizer.max_length = parse_var("RELVEC_MAX_LENGTH", value)?;
        }
        if let Ok(value) = std::env::var("RELVEC_POSITION_SIZE") {
            config.vectorizer.position_size = parse_var("RELVEC_POSITION_SIZE", value)?;
        }
        if let Ok(value) = std::env::var("RELVEC_POSITION_VECTORS") {
            config.vectorizer.position_vectors = parse_var("RELVEC_POSITION_VECTORS", value)?;
        }
        if let Ok(value) = std::env::var("RELVEC_SEED") {
            config.vectorizer.seed = Some(parse_var("RELVEC_SEED", value)?);
        }

        // Embedding
        if let Ok(path) = std::env::var("RELVEC_EMBEDDINGS") {
            config.embedding.path = PathBuf::from(path);
        }

        // Reader
        if let Ok(value) = std::env::var("RELVEC_STRICT_RELATIONS") {
            config.reader.strict_relations = parse_var("RELVEC_STRICT_RELATIONS", value)?;
        }
        if let Ok(value) = std::env::var("RELVEC_TOKENIZER") {
            config.reader.tokenizer = value.parse()?;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;
        let defaults = Self::default();

        // Only override if env values differ from defaults
        if env_config.vectorizer.max_length != defaults.vectorizer.max_length {
            self.vectorizer.max_length = env_config.vectorizer.max_length;
        }
        if env_config.vectorizer.position_size != defaults.vectorizer.position_size {
            self.vectorizer.position_size = env_config.vectorizer.position_size;
        }
        if env_config.vectorizer.position_vectors != defaults.vectorizer.position_vectors {
            self.vectorizer.position_vectors = env_config.vectorizer.position_vectors;
        }
        if env_config.vectorizer.seed.is_some() {
            self.vectorizer.seed = env_config.vectorizer.seed;
        }
        if env_config.embedding.path != defaults.embedding.path {
            self.embedding.path = env_config.embedding.path;
        }
        if env_config.reader.strict_relations {
            self.reader.strict_relations = true;
        }
        if env_config.reader.tokenizer != defaults.reader.tokenizer {
            self.reader.tokenizer = env_config.reader.tokenizer;
        }
        if env_config.logging.level != defaults.logging.level {
            self.logging.level = env_config.logging.level;
        }

        Ok(self)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.vectorizer.validate()
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Annotation reader configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Line prefix of entity tags
    pub tag_marker: char,

    /// Line prefix of relations
    pub relation_marker: char,

    /// Label for tokens outside every explicit tag
    pub outside_label: String,

    /// Fail the document when a relation argument cannot be resolved
    /// instead of skipping the relation
    pub strict_relations: bool,

    /// Tokenizer used on the raw text
    pub tokenizer: TokenizerKind,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            tag_marker: 'T',
            relation_marker: 'R',
            outside_label: crate::OUTSIDE_LABEL.to_string(),
            strict_relations: false,
            tokenizer: TokenizerKind::Treebank,
        }
    }
}

/// Available tokenizers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    #[default]
    Treebank,
    Whitespace,
}

impl std::str::FromStr for TokenizerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "treebank" => Ok(Self::Treebank),
            "whitespace" => Ok(Self::Whitespace),
            _ => Err(ConfigError::InvalidValue {
                key: "RELVEC_TOKENIZER".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Sequence vectorizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Maximum sentence length M (rows per instance)
    pub max_length: usize,

    /// Append relative position vectors for both entities
    pub position_vectors: bool,

    /// Width P of each position vector
    pub position_size: usize,

    /// Seed for the position table; random when unset
    pub seed: Option<u64>,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_length: 100,
            position_vectors: true,
            position_size: 10,
            seed: None,
        }
    }
}

impl VectorizerConfig {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            ..Default::default()
        }
    }

    pub fn with_position_size(mut self, size: usize) -> Self {
        self.position_size = size;
        self
    }

    pub fn with_position_vectors(mut self, enabled: bool) -> Self {
        self.position_vectors = enabled;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_length == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_length".to_string(),
                value: "0".to_string(),
            });
        }
        if self.position_vectors && self.position_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "position_size".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// Word-embedding source configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Path to a word2vec text-format vector file
    pub path: PathBuf,

    /// Linguistic features requested from the embedding source
    pub features: FeatureFlags,
}

/// Linguistic feature switches handed to the embedding source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub ner: bool,
    pub pos: bool,
    pub dependency: bool,
}

impl FeatureFlags {
    pub fn any(&self) -> bool {
        self.ner || self.pos || self.dependency
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.vectorizer.max_length, 100);
        assert_eq!(config.vectorizer.position_size, 10);
        assert!(config.vectorizer.position_vectors);
        assert_eq!(config.reader.tag_marker, 'T');
        assert_eq!(config.reader.outside_label, "OUT");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tokenizer_parse() {
        assert_eq!(
            "treebank".parse::<TokenizerKind>().unwrap(),
            TokenizerKind::Treebank
        );
        assert_eq!(
            "Whitespace".parse::<TokenizerKind>().unwrap(),
            TokenizerKind::Whitespace
        );
        assert!("spacy".parse::<TokenizerKind>().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        assert!(VectorizerConfig::new(0).validate().is_err());
        assert!(VectorizerConfig::new(5)
            .with_position_size(0)
            .validate()
            .is_err());
        assert!(VectorizerConfig::new(5)
            .with_position_size(0)
            .with_position_vectors(false)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[vectorizer]\nmax_length = 40\nseed = 7\n\n[embedding.features]\npos = true"
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.vectorizer.max_length, 40);
        assert_eq!(config.vectorizer.seed, Some(7));
        assert_eq!(config.vectorizer.position_size, 10);
        assert!(config.embedding.features.pos);
        assert!(!config.embedding.features.ner);
    }

    #[test]
    fn test_from_file_missing() {
        let err = AppConfig::from_file("/nonexistent/relvec.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileReadError { .. }));
    }
}
