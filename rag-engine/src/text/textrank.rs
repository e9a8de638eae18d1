//! TextRank over word co-occurrence and sentence overlap graphs.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

const DAMPING: f64 = 0.85;
const MAX_ITERATIONS: usize = 100;
const TOLERANCE: f64 = 1e-6;

/// Co-occurrence window (in candidate tokens).
pub const WINDOW: usize = 5;

/// Ranked keyword with its normalized weight in `(0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedKeyword {
    pub word: String,
    pub weight: f64,
}

/// A token can be a keyword if it is not a stopword, has at least two
/// characters and is not purely numeric.
pub fn is_candidate(token: &str, stopwords: &HashSet<String>) -> bool {
    token.chars().count() >= 2
        && !stopwords.contains(token)
        && !token.chars().all(|c| c.is_ascii_digit())
}

/// Ranks candidate tokens by TextRank; ties keep first occurrence order.
pub fn rank_keywords(
    tokens: &[String],
    stopwords: &HashSet<String>,
    top_k: usize,
) -> Vec<RankedKeyword> {
    if top_k == 0 {
        return Vec::new();
    }
    let candidates: Vec<&str> = tokens
        .iter()
        .map(String::as_str)
        .filter(|t| is_candidate(t, stopwords))
        .collect();
    if candidates.is_empty() {
        return Vec::new();
    }

    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    for (i, w) in candidates.iter().enumerate() {
        first_seen.entry(*w).or_insert(i);
    }

    // BTreeMap keeps the iteration order independent of hashing.
    let mut edges: BTreeMap<&str, BTreeMap<&str, f64>> = BTreeMap::new();
    for w in first_seen.keys() {
        edges.entry(*w).or_default();
    }
    for i in 0..candidates.len() {
        for j in (i + 1)..candidates.len().min(i + WINDOW) {
            let (a, b) = (candidates[i], candidates[j]);
            if a == b {
                continue;
            }
            *edges.entry(a).or_default().entry(b).or_insert(0.0) += 1.0;
            *edges.entry(b).or_default().entry(a).or_insert(0.0) += 1.0;
        }
    }

    let scores = pagerank(&edges);

    let mut ranked: Vec<(&str, f64)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.1.total_cmp(&a.1)
            .then_with(|| first_seen[a.0].cmp(&first_seen[b.0]))
    });
    ranked.truncate(top_k);

    let max = ranked.first().map(|(_, s)| *s).unwrap_or(0.0);
    ranked
        .into_iter()
        .map(|(w, s)| RankedKeyword {
            word: w.to_string(),
            weight: if max > 0.0 { s / max } else { 1.0 },
        })
        .collect()
}

/// Picks the `n` most central sentences and returns them in document order.
///
/// Sentence similarity is `common / (ln(|a|+1) + ln(|b|+1))` over the
/// candidate-token sets.
pub fn rank_sentences(
    sentences: &[String],
    tokenize: impl Fn(&str) -> Vec<String>,
    stopwords: &HashSet<String>,
    n: usize,
) -> Vec<String> {
    if n == 0 || sentences.is_empty() {
        return Vec::new();
    }
    if sentences.len() <= n {
        return sentences.to_vec();
    }

    let bags: Vec<BTreeSet<String>> = sentences
        .iter()
        .map(|s| {
            tokenize(s)
                .into_iter()
                .filter(|t| is_candidate(t, stopwords))
                .collect()
        })
        .collect();

    let mut edges: BTreeMap<usize, BTreeMap<usize, f64>> = BTreeMap::new();
    for i in 0..bags.len() {
        edges.entry(i).or_default();
        for j in (i + 1)..bags.len() {
            let common = bags[i].intersection(&bags[j]).count();
            if common == 0 {
                continue;
            }
            let norm = ((bags[i].len() + 1) as f64).ln() + ((bags[j].len() + 1) as f64).ln();
            if norm <= 0.0 {
                continue;
            }
            let w = common as f64 / norm;
            edges.entry(i).or_default().insert(j, w);
            edges.entry(j).or_default().insert(i, w);
        }
    }

    let scores = pagerank(&edges);
    let mut order: Vec<usize> = (0..sentences.len()).collect();
    order.sort_by(|a, b| {
        let sa = scores.get(a).copied().unwrap_or(0.0);
        let sb = scores.get(b).copied().unwrap_or(0.0);
        sb.total_cmp(&sa).then_with(|| a.cmp(b))
    });
    let mut picked: Vec<usize> = order.into_iter().take(n).collect();
    picked.sort_unstable();
    picked.into_iter().map(|i| sentences[i].clone()).collect()
}

/// Weighted PageRank with damping, iterated to convergence.
fn pagerank<K: Ord + Copy>(edges: &BTreeMap<K, BTreeMap<K, f64>>) -> BTreeMap<K, f64> {
    let n = edges.len();
    if n == 0 {
        return BTreeMap::new();
    }
    let out_weight: BTreeMap<K, f64> = edges
        .iter()
        .map(|(k, nbrs)| (*k, nbrs.values().sum()))
        .collect();

    let init = 1.0 / n as f64;
    let mut scores: BTreeMap<K, f64> = edges.keys().map(|k| (*k, init)).collect();

    for _ in 0..MAX_ITERATIONS {
        let mut next = BTreeMap::new();
        let mut delta = 0.0;
        for (node, nbrs) in edges {
            let mut acc = 0.0;
            for (nbr, w) in nbrs {
                let total = out_weight.get(nbr).copied().unwrap_or(0.0);
                if total > 0.0 {
                    acc += w / total * scores.get(nbr).copied().unwrap_or(0.0);
                }
            }
            let s = (1.0 - DAMPING) + DAMPING * acc;
            delta += (s - scores.get(node).copied().unwrap_or(0.0)).abs();
            next.insert(*node, s);
        }
        scores = next;
        if delta < TOLERANCE {
            break;
        }
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &[&str]) -> Vec<String> {
        s.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn central_word_ranks_first() {
        let stop = HashSet::new();
        let tokens = toks(&[
            "个人信息", "收集", "个人信息", "使用", "个人信息", "共享", "个人信息", "删除",
        ]);
        let kws = rank_keywords(&tokens, &stop, 3);
        assert_eq!(kws[0].word, "个人信息");
        assert!((kws[0].weight - 1.0).abs() < 1e-12);
        assert!(kws.len() <= 3);
    }

    #[test]
    fn stopwords_digits_and_single_chars_are_excluded() {
        let stop: HashSet<String> = ["我们".to_string()].into_iter().collect();
        let tokens = toks(&["我们", "的", "2024", "合同", "条款"]);
        let words: Vec<_> = rank_keywords(&tokens, &stop, 10)
            .into_iter()
            .map(|k| k.word)
            .collect();
        assert_eq!(words.len(), 2);
        assert!(words.contains(&"合同".to_string()));
        assert!(words.contains(&"条款".to_string()));
    }

    #[test]
    fn ranking_is_deterministic() {
        let stop = HashSet::new();
        let tokens = toks(&["甲方", "乙方", "违约", "甲方", "赔偿", "乙方"]);
        assert_eq!(rank_keywords(&tokens, &stop, 4), rank_keywords(&tokens, &stop, 4));
    }

    #[test]
    fn sentences_keep_document_order() {
        let stop = HashSet::new();
        let sentences = toks(&["甲方 违约 赔偿。", "天气 很好。", "乙方 违约 赔偿。", "甲方 乙方 违约。"]);
        let split = |s: &str| s.split_whitespace().map(str::to_string).collect::<Vec<_>>();
        let picked = rank_sentences(&sentences, split, &stop, 2);
        assert_eq!(picked.len(), 2);
        let idx: Vec<_> = picked
            .iter()
            .map(|p| sentences.iter().position(|s| s == p).unwrap())
            .collect();
        assert!(idx[0] < idx[1]);
        assert!(!picked.contains(&"天气 很好。".to_string()));
    }
}
