//! End-to-end tests: brat documents through the reader and vectorizer

use ndarray::s;

use relvec_annotation::{AnnotationReader, WhitespaceTokenizer};
use relvec_core::{Document, ReaderConfig, VectorizerConfig};
use relvec_vector::{RelationVectorizer, WordVectors};

const WORDS: &str = "\
alice 1 0
bob 0 1
met 1 1
in 2 0
paris 0 2
yesterday 3 3
";

fn reader() -> AnnotationReader {
    AnnotationReader::with_tokenizer(ReaderConfig::default(), WhitespaceTokenizer)
}

fn documents() -> Vec<Document> {
    vec![
        Document::new(
            "001",
            "alice met bob in paris",
            "T1\tPerson 0 5\talice\nT2\tPerson 10 13\tbob\nT3\tPlace 17 22\tparis\n\
             R1\tmet Arg1:T1 Arg2:T2\nR2\tlocated Arg1:T2 Arg2:T3\n",
        ),
        Document::new(
            "002",
            "bob met carol yesterday",
            "T1\tPerson 0 3\tbob\nT2\tPerson 8 13\tcarol\nR1\tmet Arg1:T1 Arg2:T2\n",
        ),
    ]
}

#[test]
fn test_corpus_to_tensor() {
    let (corpus, skipped) = reader().read_corpus(documents()).unwrap();
    assert!(skipped.is_empty());
    assert_eq!(corpus.len(), 3);
    assert_eq!(corpus.labels, vec!["met", "located", "met"]);

    let vectors = WordVectors::from_reader(WORDS.as_bytes()).unwrap();
    let config = VectorizerConfig::new(6).with_position_size(4).with_seed(7);
    let vectorizer = RelationVectorizer::new(config, vectors).unwrap();

    let batch = vectorizer.transform(&corpus.instances).unwrap();

    // "carol" has no vector, so the instance from 002 is dropped
    assert_eq!(batch.tensor.dim(), (2, 6, 2 + 2 * 4));
    assert_eq!(batch.labels, vec!["met", "located"]);
    assert_eq!(batch.report.unresolved_tokens(), 1);
    assert_eq!(batch.report.dropped[0].document_id, "002");

    // five tokens, one padding row
    let first = batch.tensor.index_axis(ndarray::Axis(0), 0);
    assert_eq!(first.slice(s![0, ..2]).to_vec(), vec![1.0, 0.0]);
    assert!(first.slice(s![5, ..2]).iter().all(|v| *v == 0.0));
}

#[test]
fn test_position_columns_follow_entities() {
    let (corpus, _) = reader().read_corpus(documents()).unwrap();
    let vectors = WordVectors::from_reader(WORDS.as_bytes()).unwrap();
    let config = VectorizerConfig::new(6).with_position_size(4).with_seed(3);
    let vectorizer = RelationVectorizer::new(config, vectors).unwrap();
    let table = vectorizer.position_table().unwrap();
    let zero = table.row_for_offset(0).unwrap().to_vec();

    let batch = vectorizer.transform(&corpus.instances).unwrap();

    // "located": bob (index 2) -> paris (index 4)
    let located = batch.tensor.index_axis(ndarray::Axis(0), 1);
    assert_eq!(located.slice(s![2, 2..6]).to_vec(), zero);
    assert_eq!(located.slice(s![4, 6..10]).to_vec(), zero);
}

#[test]
fn test_disabled_position_vectors() {
    let (corpus, _) = reader().read_corpus(documents()).unwrap();
    let vectors = WordVectors::from_reader(WORDS.as_bytes()).unwrap();
    let config = VectorizerConfig::new(5).with_position_vectors(false);
    let vectorizer = RelationVectorizer::new(config, vectors).unwrap();

    let batch = vectorizer.transform(&corpus.instances).unwrap();
    assert_eq!(batch.tensor.dim(), (2, 5, 2));
}

#[test]
fn test_long_document_is_trimmed() {
    let text = "in in alice in in in bob in in";
    let ann = "T1\tPerson 6 11\talice\nT2\tPerson 21 24\tbob\nR1\tknows Arg1:T1 Arg2:T2\n";
    let (corpus, _) = reader()
        .read_corpus(vec![Document::new("long", text, ann)])
        .unwrap();
    assert_eq!(corpus.instances[0].segments.len(), 9);
    assert_eq!(
        (corpus.instances[0].entity1, corpus.instances[0].entity2),
        (2, 6)
    );

    let vectors = WordVectors::from_reader(WORDS.as_bytes()).unwrap();
    let config = VectorizerConfig::new(5).with_position_size(2).with_seed(1);
    let vectorizer = RelationVectorizer::new(config, vectors).unwrap();
    let batch = vectorizer.transform(&corpus.instances).unwrap();

    assert_eq!(batch.len(), 1);
    // window starts at alice
    assert_eq!(batch.tensor.slice(s![0, 0, ..2]).to_vec(), vec![1.0, 0.0]);
    assert_eq!(batch.tensor.slice(s![0, 4, ..2]).to_vec(), vec![0.0, 1.0]);

    let tight = RelationVectorizer::new(
        VectorizerConfig::new(4).with_seed(1),
        WordVectors::from_reader(WORDS.as_bytes()).unwrap(),
    )
    .unwrap();
    let batch = tight.transform(&corpus.instances).unwrap();
    assert!(batch.is_empty());
    assert_eq!(batch.report.infeasible_trims(), 1);
}
