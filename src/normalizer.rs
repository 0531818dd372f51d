use std::collections::HashMap;

use rust_stemmers::{Algorithm, Stemmer};
use unicode_segmentation::UnicodeSegmentation;

/// Turns raw document text into a stream of canonical terms.
///
/// Any deterministic implementation of `normalize` is accepted by the
/// builder; `DefaultNormalizer` is the pipeline the CLI wires up.
pub trait Normalizer {
    fn normalize(&mut self, token: &str) -> Option<String>;
}

/// Sentence/word split, ASCII punctuation strip, case fold, Porter-style
/// stem, numeric-token rejection. See §4.1.
pub struct DefaultNormalizer {
    stemmer: Stemmer,
    memo: HashMap<String, String>,
}

impl DefaultNormalizer {
    pub fn new() -> Self {
        DefaultNormalizer {
            stemmer: Stemmer::create(Algorithm::English),
            memo: HashMap::new(),
        }
    }

    /// Splits `text` into sentences, then words, normalizing each and
    /// dropping rejected tokens. Order follows §4.1: documents are walked
    /// one sentence at a time so term order within a document is preserved.
    pub fn terms_in(&mut self, text: &str) -> Vec<String> {
        let mut terms = Vec::new();
        for sentence in text.unicode_sentences() {
            for word in sentence.split_word_bounds() {
                if word.trim().is_empty() {
                    continue;
                }
                if let Some(term) = self.normalize(word) {
                    terms.push(term);
                }
            }
        }
        terms
    }

    fn stem_cached(&mut self, lower: &str) -> String {
        if let Some(stemmed) = self.memo.get(lower) {
            return stemmed.clone();
        }
        let stemmed = self.stemmer.stem(lower).into_owned();
        self.memo.insert(lower.to_string(), stemmed.clone());
        stemmed
    }
}

impl Default for DefaultNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer for DefaultNormalizer {
    fn normalize(&mut self, token: &str) -> Option<String> {
        let stripped: String = token.chars().filter(|c| !c.is_ascii_punctuation()).collect();

        // Pre-stem numeric rejection: a token that is entirely digits is dropped.
        if !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        let lower = stripped.to_lowercase();
        let stemmed = self.stem_cached(&lower);

        if stemmed.is_empty() {
            None
        } else {
            Some(stemmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_lowercases() {
        let mut norm = DefaultNormalizer::new();
        assert_eq!(norm.normalize("Hello,"), Some("hello".to_string()));
    }

    #[test]
    fn rejects_pure_numeric_tokens() {
        let mut norm = DefaultNormalizer::new();
        assert_eq!(norm.normalize("12345"), None);
    }

    #[test]
    fn keeps_alphanumeric_tokens() {
        let mut norm = DefaultNormalizer::new();
        assert!(norm.normalize("covid19").is_some());
    }

    #[test]
    fn rejects_pure_punctuation() {
        let mut norm = DefaultNormalizer::new();
        assert_eq!(norm.normalize("---"), None);
        assert_eq!(norm.normalize(""), None);
    }

    #[test]
    fn stems_to_a_common_root() {
        let mut norm = DefaultNormalizer::new();
        let running = norm.normalize("running").unwrap();
        let runs = norm.normalize("runs").unwrap();
        assert_eq!(running, runs);
    }

    #[test]
    fn memo_does_not_change_output() {
        let mut norm = DefaultNormalizer::new();
        let first = norm.normalize("jumping");
        let second = norm.normalize("jumping");
        assert_eq!(first, second);
    }

    #[test]
    fn splits_sentences_and_words() {
        let mut norm = DefaultNormalizer::new();
        let terms = norm.terms_in("The cat sat. The dog ran!");
        assert!(terms.contains(&"cat".to_string()));
        assert!(terms.contains(&"sat".to_string()));
        assert!(terms.contains(&"dog".to_string()));
        assert!(terms.contains(&"ran".to_string()));
    }
}
