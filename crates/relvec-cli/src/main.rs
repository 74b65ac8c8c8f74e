//! relvec CLI - Command-line interface
//!
//! Usage:
//!   relvec inspect <dir>
//!   relvec vectorize <dir> --embeddings <file> [--max-length M] [--position-size P]

mod corpus;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use relvec_annotation::AnnotationReader;
use relvec_core::{AppConfig, ConfigError, Corpus, LoggingConfig};
use relvec_vector::RelationVectorizer;

#[derive(Parser)]
#[command(name = "relvec")]
#[command(about = "brat relation annotations to fixed-shape tensors")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize the tags and relations of a corpus
    Inspect {
        /// Directory of .txt/.ann pairs
        dir: PathBuf,

        /// Fail on relations that reference unknown tags
        #[arg(long)]
        strict: bool,
    },
    /// Vectorize a corpus and print a summary of the result
    Vectorize {
        /// Directory of .txt/.ann pairs
        dir: PathBuf,

        /// Word vectors in word2vec text format
        #[arg(long)]
        embeddings: Option<PathBuf>,

        /// Maximum tokens per instance
        #[arg(long)]
        max_length: Option<usize>,

        /// Width of each position vector
        #[arg(long)]
        position_size: Option<usize>,

        /// Leave out position vectors
        #[arg(long)]
        no_position_vectors: bool,

        /// Seed for the position table
        #[arg(long)]
        seed: Option<u64>,

        /// Request named-entity features from the embedding source
        #[arg(long)]
        ner: bool,

        /// Request part-of-speech features from the embedding source
        #[arg(long)]
        pos: bool,

        /// Request dependency features from the embedding source
        #[arg(long)]
        dependency: bool,

        /// Fail on relations that reference unknown tags
        #[arg(long)]
        strict: bool,

        /// Include every dropped instance in the summary
        #[arg(long)]
        list_dropped: bool,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn inspect(config: AppConfig, dir: &Path) -> anyhow::Result<()> {
    let reader = AnnotationReader::new(config.reader);
    let documents = corpus::load_documents(dir)?;

    let mut read = Corpus::default();
    let mut skipped = 0;

    for document in &documents {
        let annotated = reader
            .read_document(document)
            .map_err(|e| e.in_document(&document.id))?;
        let outside = annotated.tags.iter().filter(|t| t.is_outside()).count();

        println!(
            "{}: {} tokens, {} tags ({} explicit), {} relations, {} skipped",
            annotated.document_id,
            annotated.tokens.len(),
            annotated.tags.len(),
            annotated.tags.len() - outside,
            annotated.relations.len(),
            annotated.skipped.len()
        );

        read.instances.extend(annotated.relations);
        read.labels.extend(annotated.labels);
        skipped += annotated.skipped.len();
    }

    println!();
    println!("{} documents, {} skipped relations", documents.len(), skipped);
    for (label, count) in &read.label_counts() {
        println!("  {label}: {count}");
    }

    Ok(())
}

fn vectorize(config: AppConfig, dir: &Path, list_dropped: bool) -> anyhow::Result<()> {
    if config.embedding.path.as_os_str().is_empty() {
        return Err(ConfigError::MissingRequired(
            "embedding file (--embeddings or RELVEC_EMBEDDINGS)".to_string(),
        )
        .into());
    }

    let reader = AnnotationReader::new(config.reader);
    let documents = corpus::load_documents(dir)?;
    let (corpus, skipped) = reader.read_corpus(documents)?;

    let vectorizer = RelationVectorizer::from_config(config.vectorizer, &config.embedding)
        .context("Failed to set up vectorizer")?;
    let batch = vectorizer.transform(&corpus.instances)?;

    let mut kept_labels: BTreeMap<&str, usize> = BTreeMap::new();
    for label in &batch.labels {
        *kept_labels.entry(label.as_str()).or_insert(0) += 1;
    }

    let (instances, rows, width) = batch.tensor.dim();
    let mut summary = json!({
        "documents": corpus.texts.len(),
        "relation_instances": corpus.len(),
        "skipped_relations": skipped.len(),
        "kept": instances,
        "shape": [instances, rows, width],
        "dropped": batch.report.counts(),
        "labels": kept_labels,
    });
    if list_dropped {
        summary["dropped_instances"] = serde_json::to_value(&batch.report.dropped)?;
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if cli.json_logs {
        config.logging.json_format = true;
    }
    init_logging(&config.logging);

    match cli.command {
        Commands::Inspect { dir, strict } => {
            config.reader.strict_relations |= strict;
            inspect(config, &dir)?;
        }
        Commands::Vectorize {
            dir,
            embeddings,
            max_length,
            position_size,
            no_position_vectors,
            seed,
            ner,
            pos,
            dependency,
            strict,
            list_dropped,
        } => {
            if let Some(path) = embeddings {
                config.embedding.path = path;
            }
            if let Some(max_length) = max_length {
                config.vectorizer.max_length = max_length;
            }
            if let Some(size) = position_size {
                config.vectorizer.position_size = size;
            }
            if no_position_vectors {
                config.vectorizer.position_vectors = false;
            }
            if seed.is_some() {
                config.vectorizer.seed = seed;
            }
            config.embedding.features.ner |= ner;
            config.embedding.features.pos |= pos;
            config.embedding.features.dependency |= dependency;
            config.reader.strict_relations |= strict;
            config.validate()?;

            vectorize(config, &dir, list_dropped)?;
        }
    }

    Ok(())
}
