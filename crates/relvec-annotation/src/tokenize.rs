//! Tokenizers for raw document text
//!
//! `TreebankTokenizer` follows the Penn Treebank conventions (punctuation,
//! brackets and clitics become their own tokens) but keeps quotes as-is
//! rather than rewriting them to ``` `` ``` / `''`, so every token stays a
//! substring of the input.

use regex::Regex;

use relvec_core::{TokenizerKind, Tokenizer};

/// Splits on Unicode whitespace
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }
}

/// Regex-driven Penn Treebank style tokenizer
pub struct TreebankTokenizer {
    /// Ordered (pattern, replacement) rewrites applied before splitting
    rules: Vec<(Regex, &'static str)>,
}

impl TreebankTokenizer {
    pub fn new() -> Self {
        let mut tokenizer = Self { rules: Vec::new() };
        tokenizer.init_rules();
        tokenizer
    }

    fn init_rules(&mut self) {
        // Quotes
        self.add_rule(r#"""#, r#" " "#);

        // Punctuation
        self.add_rule(r"([:,])([^\d])", " ${1} ${2}");
        self.add_rule(r"([:,])$", " ${1} ");
        self.add_rule(r"\.\.\.", " ... ");
        self.add_rule(r"[;@#$%&]", " ${0} ");
        self.add_rule(r#"([^\.])(\.)([\]\)}>"']*)\s*$"#, "${1} ${2}${3} ");
        self.add_rule(r"[?!]", " ${0} ");
        self.add_rule(r"([^'])' ", "${1} ' ");

        // Brackets and dashes
        self.add_rule(r"[\]\[\(\)\{\}<>]", " ${0} ");
        self.add_rule(r"--", " -- ");

        // Clitics
        self.add_rule(r"([^' ])('[sS]|'[mM]|'[dD]|') ", "${1} ${2} ");
        self.add_rule(
            r"([^' ])('ll|'LL|'re|'RE|'ve|'VE|n't|N'T) ",
            "${1} ${2} ",
        );
    }

    fn add_rule(&mut self, pattern: &str, replacement: &'static str) {
        if let Ok(regex) = Regex::new(pattern) {
            self.rules.push((regex, replacement));
        }
    }
}

impl Default for TreebankTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for TreebankTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let mut padded = format!(" {text} ");
        for (regex, replacement) in &self.rules {
            padded = regex.replace_all(&padded, *replacement).into_owned();
        }
        padded.split_whitespace().map(str::to_string).collect()
    }
}

/// Create the tokenizer selected in the reader configuration
pub fn create_tokenizer(kind: TokenizerKind) -> Box<dyn Tokenizer> {
    match kind {
        TokenizerKind::Treebank => Box::new(TreebankTokenizer::new()),
        TokenizerKind::Whitespace => Box::new(WhitespaceTokenizer),
    }
}
