//! Tokenizer / keyword extractor capability.
//!
//! The pipeline only depends on [`TextAnalyzer`]; [`DefaultTextAnalyzer`]
//! is a deterministic lexicon + TextRank implementation.

pub mod lexicon;
pub mod sentences;
pub mod textrank;
pub mod tokenizer;

use std::collections::HashSet;

pub use sentences::{ensure_terminated, split_sentences};
pub use textrank::RankedKeyword;
pub use tokenizer::LexiconTokenizer;

/// Pluggable tokenization and extraction.
pub trait TextAnalyzer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;

    /// Ranked keywords, most important first, at most `top_k`.
    fn extract_keywords(&self, text: &str, top_k: usize) -> Vec<String> {
        self.keyword_weights(text, top_k)
            .into_iter()
            .map(|k| k.word)
            .collect()
    }

    /// Ranked keywords with normalized weights.
    fn keyword_weights(&self, text: &str, top_k: usize) -> Vec<RankedKeyword>;

    /// Generic top-`n` sentences in document order.
    fn extractive_summary(&self, text: &str, n: usize) -> Vec<String>;
}

/// Lexicon tokenizer + TextRank keywords + TextRank sentence baseline.
#[derive(Debug, Clone)]
pub struct DefaultTextAnalyzer {
    tokenizer: LexiconTokenizer,
    stopwords: HashSet<String>,
}

impl Default for DefaultTextAnalyzer {
    fn default() -> Self {
        Self {
            tokenizer: LexiconTokenizer::new(lexicon::default_vocabulary()),
            stopwords: lexicon::default_stopwords(),
        }
    }
}

impl DefaultTextAnalyzer {
    /// Adds domain terms (e.g. configured legal term lists) to the vocabulary.
    pub fn with_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokenizer = self.tokenizer.with_terms(terms);
        self
    }

    pub fn stopwords(&self) -> &HashSet<String> {
        &self.stopwords
    }
}

impl TextAnalyzer for DefaultTextAnalyzer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        self.tokenizer.tokenize(text)
    }

    fn keyword_weights(&self, text: &str, top_k: usize) -> Vec<RankedKeyword> {
        let tokens = self.tokenizer.tokenize(text);
        textrank::rank_keywords(&tokens, &self.stopwords, top_k)
    }

    fn extractive_summary(&self, text: &str, n: usize) -> Vec<String> {
        let sentences = split_sentences(text);
        textrank::rank_sentences(&sentences, |s| self.tokenizer.tokenize(s), &self.stopwords, n)
            .into_iter()
            .map(|s| ensure_terminated(&s))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY: &str = "本政策说明我们如何收集个人信息。我们仅在用户同意后处理个人信息。\
        用户有权随时撤回同意并要求删除个人信息。第三方共享须另行告知。";

    #[test]
    fn keywords_are_bounded_and_meaningful() {
        let a = DefaultTextAnalyzer::default();
        let kws = a.extract_keywords(POLICY, 5);
        assert!(kws.len() <= 5);
        assert!(kws.contains(&"个人信息".to_string()));
        assert!(kws.iter().all(|k| !a.stopwords().contains(k)));
    }

    #[test]
    fn summary_sentences_are_terminated() {
        let a = DefaultTextAnalyzer::default();
        let s = a.extractive_summary(POLICY, 2);
        assert_eq!(s.len(), 2);
        assert!(s.iter().all(|x| x.ends_with('。')));
    }

    #[test]
    fn empty_text_is_harmless() {
        let a = DefaultTextAnalyzer::default();
        assert!(a.tokenize("").is_empty());
        assert!(a.extract_keywords("", 5).is_empty());
        assert!(a.extractive_summary("", 3).is_empty());
    }
}
