// ============================================================
// Layer 4 — Summary Encoder
// ============================================================
// Converts one (text, summary) pair into the fixed-length token
// sequences the model consumes.
//
// Input side:  "summarize: " + text → ids, truncated/padded to
//              exactly INPUT_LEN, with a 1/0 attention mask.
// Label side:  summary → ids, truncated/padded to exactly
//              SUMMARY_LEN, then every pad position replaced by
//              IGNORE_INDEX so the loss skips padding. The
//              substitution is reversed before labels are ever
//              decoded back to text.
//
// The "summarize: " prefix is the task convention the T5 family
// was pretrained with, not a framing of our own.
//
// Reference: Raffel et al. (2020) — Exploring the Limits of
//            Transfer Learning with a Unified Text-to-Text
//            Transformer

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokenizers::Tokenizer;

use crate::domain::example::SummaryExample;

/// Maximum source length in tokens.
pub const INPUT_LEN: usize = 512;

/// Maximum reference-summary length in tokens.
pub const SUMMARY_LEN: usize = 128;

/// Task prefix prepended to every source text before encoding.
pub const TASK_PREFIX: &str = "summarize: ";

/// Label value meaning "exclude this position from the loss".
/// Must never collide with a real vocabulary id, which is why
/// it is negative and labels are stored signed.
pub const IGNORE_INDEX: i32 = -100;

/// One fully tokenised, fixed-length training example.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodedExample {
    /// Source token ids — length exactly `input_len`
    pub input_ids:      Vec<u32>,
    /// 1 = real token, 0 = padding — same length as input_ids
    pub attention_mask: Vec<u32>,
    /// Summary token ids with pad positions replaced by
    /// IGNORE_INDEX — length exactly `summary_len`
    pub labels:         Vec<i32>,
}

/// Encodes (text, summary) pairs against a shared tokenizer.
/// Pure apart from the tokenizer capability: same inputs, same
/// outputs, no side effects.
pub struct SummaryEncoder {
    tokenizer:   Tokenizer,
    pad_id:      u32,
    input_len:   usize,
    summary_len: usize,
}

impl SummaryEncoder {
    /// Build an encoder with the standard lengths (512 / 128).
    pub fn new(tokenizer: Tokenizer) -> Result<Self> {
        Self::with_lengths(tokenizer, INPUT_LEN, SUMMARY_LEN)
    }

    /// Build an encoder with custom lengths. Used by tests and
    /// small-model experiments; production code goes through
    /// `new`.
    pub fn with_lengths(tokenizer: Tokenizer, input_len: usize, summary_len: usize) -> Result<Self> {
        let pad_id = tokenizer
            .token_to_id("<pad>")
            .ok_or_else(|| anyhow::anyhow!("Tokenizer has no <pad> token"))?;
        Ok(Self { tokenizer, pad_id, input_len, summary_len })
    }

    pub fn pad_id(&self) -> u32 {
        self.pad_id
    }

    /// Encode one example to fixed-length tensor-ready sequences.
    pub fn encode(&self, example: &SummaryExample) -> Result<EncodedExample> {
        let prefixed = format!("{TASK_PREFIX}{}", example.text);
        let (input_ids, attention_mask) = self.encode_to_length(&prefixed, self.input_len)?;

        let (summary_ids, _) = self.encode_to_length(&example.summary, self.summary_len)?;
        let labels = mask_pad_labels(&summary_ids, self.pad_id);

        Ok(EncodedExample { input_ids, attention_mask, labels })
    }

    /// Tokenise `text`, keep the earliest `len` ids, pad with the
    /// pad token up to exactly `len`. Returns (ids, mask).
    fn encode_to_length(&self, text: &str, len: usize) -> Result<(Vec<u32>, Vec<u32>)> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow::anyhow!("Tokenisation error: {e}"))?;

        let mut ids = encoding.get_ids().to_vec();
        ids.truncate(len);

        let real = ids.len();
        let mut mask = vec![1u32; real];

        while ids.len() < len {
            ids.push(self.pad_id);
            mask.push(0);
        }

        Ok((ids, mask))
    }
}

/// Replace every pad position with the ignore sentinel.
pub fn mask_pad_labels(ids: &[u32], pad_id: u32) -> Vec<i32> {
    ids.iter()
        .map(|&id| if id == pad_id { IGNORE_INDEX } else { id as i32 })
        .collect()
}

/// Undo `mask_pad_labels`: map the sentinel back to the pad token
/// so label sequences can be decoded as text.
pub fn unmask_pad_labels(labels: &[i32], pad_id: u32) -> Vec<u32> {
    labels
        .iter()
        .map(|&id| if id == IGNORE_INDEX { pad_id } else { id as u32 })
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::tokenizer_store::TokenizerStore;

    fn test_tokenizer() -> Tokenizer {
        let tmp = tempfile::tempdir().unwrap();
        let texts = vec![
            "the cat sat on the mat".to_string(),
            "a dog ran across the park and barked".to_string(),
        ];
        TokenizerStore::new(tmp.path().to_str().unwrap())
            .load_or_build(&texts, 100)
            .unwrap()
    }

    fn encoder() -> SummaryEncoder {
        SummaryEncoder::with_lengths(test_tokenizer(), 16, 8).unwrap()
    }

    #[test]
    fn test_output_lengths_are_fixed() {
        let enc = encoder();
        // Empty, single-word, and far-too-long texts all encode
        // to exactly the configured lengths.
        let texts = [
            String::new(),
            "cat".to_string(),
            "the cat sat on the mat ".repeat(40),
        ];
        for text in texts {
            let example = SummaryExample::new(text, "the cat sat");
            let out = enc.encode(&example).unwrap();
            assert_eq!(out.input_ids.len(), 16);
            assert_eq!(out.attention_mask.len(), 16);
            assert_eq!(out.labels.len(), 8);
        }
    }

    #[test]
    fn test_mask_marks_real_tokens_only() {
        let enc = encoder();
        let out = enc
            .encode(&SummaryExample::new("the cat", "cat"))
            .unwrap();
        for (id, mask) in out.input_ids.iter().zip(&out.attention_mask) {
            if *mask == 0 {
                assert_eq!(*id, enc.pad_id());
            }
        }
        assert!(out.attention_mask.iter().any(|&m| m == 1));
    }

    #[test]
    fn test_labels_use_sentinel_for_padding() {
        let enc = encoder();
        let out = enc
            .encode(&SummaryExample::new("the cat sat on the mat", "cat sat"))
            .unwrap();
        // Short summary → trailing positions are all the sentinel,
        // and no pad id survives in the labels.
        assert_eq!(*out.labels.last().unwrap(), IGNORE_INDEX);
        assert!(!out.labels.contains(&(enc.pad_id() as i32)));
    }

    #[test]
    fn test_sentinel_round_trip() {
        let pad = 0u32;
        let original = vec![5, 9, 1, pad, pad, pad];
        let masked = mask_pad_labels(&original, pad);
        assert_eq!(unmask_pad_labels(&masked, pad), original);
    }

    #[test]
    fn test_truncation_keeps_earliest_tokens() {
        let tok = test_tokenizer();
        let enc = SummaryEncoder::with_lengths(tok.clone(), 4, 4).unwrap();
        let long = "the cat sat on the mat".to_string();
        let out = enc
            .encode(&SummaryExample::new(long.clone(), long.clone()))
            .unwrap();

        let full = tok.encode(long.as_str(), true).unwrap().get_ids().to_vec();
        assert_eq!(out.labels.len(), 4);
        for (label, id) in out.labels.iter().zip(full.iter()) {
            assert_eq!(*label, *id as i32);
        }
    }

}
