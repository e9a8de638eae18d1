//! Deterministic dictionary tokenizer.

use std::collections::HashSet;

/// Forward maximum-matching tokenizer over a fixed vocabulary.
///
/// - CJK runs are segmented greedily against the vocabulary; unknown
///   characters become single-character tokens.
/// - ASCII letters/digits are grouped into words.
/// - Whitespace and punctuation are dropped.
#[derive(Debug, Clone)]
pub struct LexiconTokenizer {
    vocab: HashSet<String>,
    max_word_chars: usize,
}

impl LexiconTokenizer {
    pub fn new(vocab: HashSet<String>) -> Self {
        let max_word_chars = vocab.iter().map(|w| w.chars().count()).max().unwrap_or(1);
        Self {
            vocab,
            max_word_chars,
        }
    }

    /// Adds extra terms (e.g. a domain term list) to the vocabulary.
    pub fn with_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for t in terms {
            let t = t.into();
            if t.trim().is_empty() {
                continue;
            }
            self.max_word_chars = self.max_word_chars.max(t.chars().count());
            self.vocab.insert(t);
        }
        self
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let mut out = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            if c.is_ascii_alphanumeric() {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                out.push(chars[start..i].iter().collect());
                continue;
            }
            if !is_cjk(c) {
                i += 1;
                continue;
            }

            let limit = self.max_word_chars.min(chars.len() - i);
            let mut matched = 1;
            for len in (2..=limit).rev() {
                if !chars[i..i + len].iter().all(|c| is_cjk(*c)) {
                    continue;
                }
                let candidate: String = chars[i..i + len].iter().collect();
                if self.vocab.contains(&candidate) {
                    matched = len;
                    break;
                }
            }
            out.push(chars[i..i + matched].iter().collect());
            i += matched;
        }
        out
    }
}

/// CJK unified ideographs (basic + extension A + compatibility).
pub fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x4E00..=0x9FFF | 0x3400..=0x4DBF | 0xF900..=0xFAFF)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::lexicon::default_vocabulary;

    #[test]
    fn longest_match_wins() {
        let t = LexiconTokenizer::new(default_vocabulary());
        let tokens = t.tokenize("我们收集个人信息保护法规定的信息。");
        assert!(tokens.contains(&"个人信息保护法".to_string()));
        assert!(tokens.contains(&"收集".to_string()));
        assert!(!tokens.iter().any(|t| t == "。"));
    }

    #[test]
    fn ascii_words_are_grouped() {
        let t = LexiconTokenizer::new(default_vocabulary());
        assert_eq!(t.tokenize("使用Cookie 3次"), vec!["使用", "Cookie", "3", "次"]);
    }

    #[test]
    fn extra_terms_extend_vocabulary() {
        let t = LexiconTokenizer::new(HashSet::new()).with_terms(["数据出境"]);
        assert_eq!(t.tokenize("数据出境"), vec!["数据出境"]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        let t = LexiconTokenizer::new(default_vocabulary());
        assert!(t.tokenize("").is_empty());
        assert!(t.tokenize(" ，。").is_empty());
    }
}
