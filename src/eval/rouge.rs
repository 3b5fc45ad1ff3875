// ============================================================
// Layer 5 — ROUGE Metrics
// ============================================================
// ROUGE-1 and ROUGE-2 are F1 scores over unigram/bigram overlap;
// ROUGE-L is an F1 score over the longest common subsequence.
// All three are computed per (prediction, reference) pair and
// averaged once over the full corpus — never per batch, since a
// per-batch average of averages gives different values.
//
// Tokenisation for scoring is whitespace splitting on the
// decoded text; the model tokenizer plays no role here.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The per-epoch overlap score set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RougeScores {
    pub rouge1: f64,
    pub rouge2: f64,
    #[serde(rename = "rougeL")]
    pub rouge_l: f64,
}

/// Score a whole corpus of (prediction, reference) pairs.
///
/// Requires at least one pair: ROUGE over an empty corpus is
/// undefined and the caller must guard against it.
pub fn corpus_rouge(predictions: &[String], references: &[String]) -> Result<RougeScores> {
    if predictions.is_empty() {
        bail!("ROUGE requires at least one (prediction, reference) pair");
    }
    if predictions.len() != references.len() {
        bail!(
            "ROUGE pair mismatch: {} predictions vs {} references",
            predictions.len(),
            references.len()
        );
    }

    let n = predictions.len() as f64;
    let mut rouge1 = 0.0;
    let mut rouge2 = 0.0;
    let mut rouge_l = 0.0;

    for (pred, reference) in predictions.iter().zip(references) {
        rouge1 += rouge_n(reference, pred, 1);
        rouge2 += rouge_n(reference, pred, 2);
        rouge_l += lcs_f1(reference, pred);
    }

    Ok(RougeScores {
        rouge1:  rouge1 / n,
        rouge2:  rouge2 / n,
        rouge_l: rouge_l / n,
    })
}

/// ROUGE-N F1 for a single pair.
pub fn rouge_n(reference: &str, hypothesis: &str, n: usize) -> f64 {
    let ref_tokens: Vec<&str> = reference.split_whitespace().collect();
    let hyp_tokens: Vec<&str> = hypothesis.split_whitespace().collect();

    if ref_tokens.len() < n || hyp_tokens.len() < n {
        return 0.0;
    }

    let ref_ngrams = extract_ngrams(&ref_tokens, n);
    let hyp_ngrams = extract_ngrams(&hyp_tokens, n);

    let mut overlap = 0usize;
    for (ngram, &hyp_count) in &hyp_ngrams {
        let ref_count = ref_ngrams.get(ngram).copied().unwrap_or(0);
        overlap += hyp_count.min(ref_count);
    }

    let ref_total: usize = ref_ngrams.values().sum();
    let hyp_total: usize = hyp_ngrams.values().sum();
    f1(overlap as f64 / hyp_total as f64, overlap as f64 / ref_total as f64)
}

/// ROUGE-L F1 for a single pair, via longest common subsequence.
pub fn lcs_f1(reference: &str, hypothesis: &str) -> f64 {
    let ref_tokens: Vec<&str> = reference.split_whitespace().collect();
    let hyp_tokens: Vec<&str> = hypothesis.split_whitespace().collect();

    if ref_tokens.is_empty() || hyp_tokens.is_empty() {
        return 0.0;
    }

    let lcs = lcs_length(&ref_tokens, &hyp_tokens);
    f1(
        lcs as f64 / hyp_tokens.len() as f64,
        lcs as f64 / ref_tokens.len() as f64,
    )
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        return 0.0;
    }
    2.0 * precision * recall / (precision + recall)
}

/// Count n-gram occurrences in a token sequence.
fn extract_ngrams<'a>(tokens: &[&'a str], n: usize) -> HashMap<Vec<&'a str>, usize> {
    let mut counts = HashMap::new();
    if tokens.len() >= n {
        for window in tokens.windows(n) {
            *counts.entry(window.to_vec()).or_insert(0) += 1;
        }
    }
    counts
}

/// Length of the longest common subsequence of two token slices.
fn lcs_length(a: &[&str], b: &[&str]) -> usize {
    let n = a.len();
    let m = b.len();
    let mut dp = vec![vec![0usize; m + 1]; n + 1];

    for i in 1..=n {
        for j in 1..=m {
            if a[i - 1] == b[j - 1] {
                dp[i][j] = dp[i - 1][j - 1] + 1;
            } else {
                dp[i][j] = dp[i - 1][j].max(dp[i][j - 1]);
            }
        }
    }

    dp[n][m]
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_identical_corpus_scores_ceiling() {
        let texts = strings(&["the cat sat", "a dog ran"]);
        let scores = corpus_rouge(&texts, &texts).unwrap();
        assert_eq!(scores.rouge1, 1.0);
        assert_eq!(scores.rouge2, 1.0);
        assert_eq!(scores.rouge_l, 1.0);
    }

    #[test]
    fn test_disjoint_corpus_scores_floor() {
        let preds = strings(&["alpha beta gamma", "delta epsilon"]);
        let refs = strings(&["one two three", "four five"]);
        let scores = corpus_rouge(&preds, &refs).unwrap();
        assert_eq!(scores.rouge1, 0.0);
        assert_eq!(scores.rouge2, 0.0);
        assert_eq!(scores.rouge_l, 0.0);
    }

    #[test]
    fn test_empty_corpus_is_an_error() {
        assert!(corpus_rouge(&[], &[]).is_err());
    }

    #[test]
    fn test_pair_count_mismatch_is_an_error() {
        let preds = strings(&["the cat sat"]);
        let refs = strings(&["the cat sat", "a dog ran"]);
        assert!(corpus_rouge(&preds, &refs).is_err());
    }

    #[test]
    fn test_corpus_average_is_not_a_batch_average() {
        // Pair 1 scores 1.0 on ROUGE-1, pair 2 scores 0.0, so the
        // corpus value is their mean over all pairs at once.
        let preds = strings(&["the cat sat", "zebra"]);
        let refs = strings(&["the cat sat", "one two"]);
        let scores = corpus_rouge(&preds, &refs).unwrap();
        assert!((scores.rouge1 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_rouge_l_rewards_order() {
        // Same unigrams, different order: ROUGE-1 is perfect while
        // ROUGE-L drops below it.
        let reference = "the cat sat on the mat";
        let shuffled = "mat the on sat cat the";
        assert_eq!(rouge_n(reference, shuffled, 1), 1.0);
        assert!(lcs_f1(reference, shuffled) < 1.0);
    }

    #[test]
    fn test_partial_overlap_is_between_floor_and_ceiling() {
        let score = rouge_n("the cat sat on the mat", "the cat ran", 1);
        assert!(score > 0.0 && score < 1.0);
    }
}
