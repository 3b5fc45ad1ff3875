// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Loads the tokenizer the pretrained model was built with, or
// builds a word-level fallback vocabulary from the corpus when
// no tokenizer.json is present (offline development and tests).
//
// The fallback follows the T5 special-token convention:
//   <pad> = 0, </s> = 1, <unk> = 2
// so the rest of the pipeline can resolve pad/terminator ids the
// same way for both tokenizers.
//
// Reference: Sennrich et al. (2016) BPE paper

use anyhow::{Context, Result};
use std::path::PathBuf;
use tokenizers::Tokenizer;

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load the existing tokenizer, or build one from texts.
    pub fn load_or_build(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        let tok_path = self.dir.join("tokenizer.json");
        if tok_path.exists() {
            tracing::info!("Loading existing tokenizer from disk");
            self.load()
        } else {
            tracing::info!("Building fallback tokenizer (vocab_size={})", vocab_size);
            self.build_and_save(texts, vocab_size)
        }
    }

    /// Load a previously saved tokenizer from its JSON file.
    pub fn load(&self) -> Result<Tokenizer> {
        let path = self.dir.join("tokenizer.json");
        Tokenizer::from_file(&path).map_err(|e| {
            anyhow::anyhow!("Cannot load tokenizer from '{}': {}", path.display(), e)
        })
    }

    /// Build a word-level vocabulary from corpus texts and write
    /// a valid tokenizer JSON directly, then load it back.
    fn build_and_save(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        std::fs::create_dir_all(&self.dir).ok();

        // ── Step 1: Word frequencies over the corpus ──────────────────────────
        use std::collections::HashMap;
        let mut freq: HashMap<String, usize> = HashMap::new();

        for text in texts {
            for word in text.split_whitespace() {
                let w = word.to_lowercase();
                let w = w.trim_matches(|c: char| !c.is_alphanumeric());
                if !w.is_empty() {
                    *freq.entry(w.to_string()).or_insert(0) += 1;
                }
            }
        }

        // Sort by frequency descending, reserve 3 slots for the
        // special tokens.
        let mut words: Vec<(String, usize)> = freq.into_iter().collect();
        words.sort_by(|a, b| b.1.cmp(&a.1));
        words.truncate(vocab_size.saturating_sub(3));

        // ── Step 2: Vocab JSON with T5-convention special ids ─────────────────
        let mut vocab = serde_json::json!({
            "<pad>": 0,
            "</s>":  1,
            "<unk>": 2,
        });

        let mut next_id = 3usize;
        for (word, _) in &words {
            if vocab.get(word).is_none() {
                vocab[word] = serde_json::json!(next_id);
                next_id += 1;
            }
        }

        // ── Step 3: Tokenizer JSON in the format from_file expects ────────────
        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [
                {"id": 0, "content": "<pad>", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 1, "content": "</s>",  "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 2, "content": "<unk>", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
            ],
            "normalizer": {
                "type": "Lowercase"
            },
            "pre_tokenizer": {
                "type": "Whitespace"
            },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": "<unk>"
            }
        });

        let tok_path = self.dir.join("tokenizer.json");
        std::fs::write(&tok_path, serde_json::to_string_pretty(&tokenizer_json)?)
            .with_context(|| "Cannot write tokenizer JSON")?;

        tracing::info!(
            "Fallback tokenizer built with {} entries, saved to '{}'",
            next_id,
            tok_path.display()
        );

        Tokenizer::from_file(&tok_path)
            .map_err(|e| anyhow::anyhow!("Cannot reload tokenizer: {e}"))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_has_t5_special_ids() {
        let tmp = tempfile::tempdir().unwrap();
        let store = TokenizerStore::new(tmp.path());
        let tok = store
            .load_or_build(&["the cat sat on the mat".to_string()], 50)
            .unwrap();

        assert_eq!(tok.token_to_id("<pad>"), Some(0));
        assert_eq!(tok.token_to_id("</s>"), Some(1));
        assert_eq!(tok.token_to_id("<unk>"), Some(2));
    }

    #[test]
    fn test_round_trips_known_words() {
        let tmp = tempfile::tempdir().unwrap();
        let store = TokenizerStore::new(tmp.path());
        let tok = store
            .load_or_build(&["the cat sat on the mat".to_string()], 50)
            .unwrap();

        let ids = tok.encode("the cat sat", true).unwrap().get_ids().to_vec();
        assert!(!ids.is_empty());
        let text = tok.decode(&ids, true).unwrap();
        assert_eq!(text, "the cat sat");
    }

    #[test]
    fn test_second_call_loads_saved_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = TokenizerStore::new(tmp.path());
        let first = store
            .load_or_build(&["alpha beta gamma".to_string()], 50)
            .unwrap();
        // Different texts, same directory: the saved file wins.
        let second = store
            .load_or_build(&["totally different words".to_string()], 50)
            .unwrap();
        assert_eq!(
            first.token_to_id("alpha"),
            second.token_to_id("alpha")
        );
    }
}
