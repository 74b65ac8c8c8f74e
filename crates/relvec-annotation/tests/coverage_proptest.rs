//! Property tests for tag merging

use proptest::prelude::*;

use relvec_annotation::{AnnotationReader, WhitespaceTokenizer};
use relvec_core::{reconstruct_spans, Document, ReaderConfig};

fn reader() -> AnnotationReader {
    AnnotationReader::with_tokenizer(ReaderConfig::default(), WhitespaceTokenizer)
}

proptest! {
    #[test]
    fn prop_every_token_has_one_tag(
        words in prop::collection::vec(("[a-z]{1,6}", any::<bool>()), 1..20),
    ) {
        let tokens: Vec<&str> = words.iter().map(|(w, _)| w.as_str()).collect();
        let text = tokens.join(" ");
        let spans = reconstruct_spans(&tokens);

        let mut ann = String::new();
        for (i, ((word, tagged), span)) in words.iter().zip(&spans).enumerate() {
            if *tagged {
                ann.push_str(&format!("T{}\tEntity {} {}\t{}\n", i + 1, span.start, span.end, word));
            }
        }

        let doc = reader().read_document(&Document::new("p", text, ann)).unwrap();
        let tags = &doc.tags;

        prop_assert_eq!(tags.len(), tokens.len());
        prop_assert!(tags.covers(&doc.tokens));
        prop_assert!(tags.as_slice().windows(2).all(|w| w[0].start <= w[1].start));

        for token in &doc.tokens {
            let claims = tags.iter().filter(|t| t.span().intersects(token.span())).count();
            prop_assert_eq!(claims, 1);
        }

        let mut ids: Vec<&str> = tags.iter().map(|t| t.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        prop_assert_eq!(ids.len(), tags.len());
    }

    #[test]
    fn prop_multi_token_tags_absorb_tokens(
        words in prop::collection::vec("[a-z]{1,6}", 3..15),
        start in any::<prop::sample::Index>(),
    ) {
        let spans = reconstruct_spans(&words);
        let first = start.index(words.len() - 1);
        let last = first + 1;
        let ann = format!(
            "T1\tEntity {} {}\t{} {}\nR1\tself Arg1:T1 Arg2:T1\n",
            spans[first].start, spans[last].end, words[first], words[last]
        );

        let doc = reader()
            .read_document(&Document::new("p", words.join(" "), ann))
            .unwrap();

        prop_assert_eq!(doc.tags.len(), words.len() - 1);
        prop_assert_eq!(doc.relations[0].entity1, first);
        let labels = doc.tags.segment_labels();
        prop_assert_eq!(labels[first].as_str(), "Entity");
    }
}
