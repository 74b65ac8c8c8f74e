//! Token spans and the tokenizer contract
//!
//! Tokenizers only return token strings. Offsets are rebuilt here by
//! assuming the text is the tokens joined with exactly one separator,
//! counted in characters to line up with brat offsets. Text with
//! irregular whitespace (double spaces, newlines, punctuation glued to
//! words) will drift out of alignment with the annotation offsets.

use serde::{Deserialize, Serialize};

/// Half-open character range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the two ranges share at least one position.
    /// Empty ranges never intersect anything.
    pub fn intersects(&self, other: Span) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.start < other.end
            && other.start < self.end
    }
}

/// A token and its reconstructed span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

/// Splits text into an ordered sequence of tokens
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Rebuild token spans assuming single-separator joins
///
/// `["hello", "hi", "a"]` → `[0..5, 6..8, 9..10]`
pub fn reconstruct_spans<S: AsRef<str>>(tokens: &[S]) -> Vec<Span> {
    let mut start = 0;
    tokens
        .iter()
        .map(|token| {
            let len = token.as_ref().chars().count();
            let span = Span::new(start, start + len);
            start += len + 1;
            span
        })
        .collect()
}

/// Pair each token with its reconstructed span
pub fn tokenize_with_spans(tokens: Vec<String>) -> Vec<Token> {
    let spans = reconstruct_spans(&tokens);
    tokens
        .into_iter()
        .zip(spans)
        .map(|(text, span)| Token {
            text,
            start: span.start,
            end: span.end,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconstruct_spans() {
        let spans = reconstruct_spans(&["hello", "hi", "a"]);
        assert_eq!(
            spans,
            vec![Span::new(0, 5), Span::new(6, 8), Span::new(9, 10)]
        );
    }

    #[test]
    fn test_spans_count_characters() {
        let spans = reconstruct_spans(&["café", "€50"]);
        assert_eq!(spans, vec![Span::new(0, 4), Span::new(5, 8)]);
    }

    #[test]
    fn test_irregular_whitespace_drifts() {
        // "a  b" has b at offset 3; reconstruction assumes 2
        let tokens = tokenize_with_spans(vec!["a".into(), "b".into()]);
        assert_eq!(tokens[1].start, 2);
    }

    #[test]
    fn test_intersects() {
        let a = Span::new(0, 5);
        assert!(a.intersects(Span::new(4, 6)));
        assert!(!a.intersects(Span::new(5, 6)));
        assert!(!a.intersects(Span::new(2, 2)));
        assert!(!Span::new(3, 3).intersects(a));
    }
}
