// ============================================================
// Layer 5 — Summarizer Model Facade
// ============================================================
// Owns the encoder-decoder model, the tokenizer and the device,
// and exposes the two operations everything else needs:
//
//   loss(batch)            — teacher-forced training loss
//   generate_summary(text) — beam-search decoding to text
//
// Generation runs beam search with a fixed width of 4, a 150
// token cap and early stopping once every beam has emitted the
// terminator, matching how the summaries are produced at
// serving time. Device placement is fixed at construction and
// never changes for the facade's lifetime.

use anyhow::{anyhow, bail, Result};
use burn::{
    module::AutodiffModule,
    prelude::*,
    tensor::{activation, backend::AutodiffBackend},
};
use tokenizers::Tokenizer;

use crate::data::batcher::SummaryBatch;
use crate::data::encode::TASK_PREFIX;
use crate::ml::model::EncoderDecoderModel;

/// Beam width for all generation.
pub const NUM_BEAMS: usize = 4;

/// Maximum generated summary length in tokens.
pub const MAX_SUMMARY_TOKENS: usize = 150;

pub struct SummarizerModel<B: Backend> {
    pub model:     EncoderDecoderModel<B>,
    pub tokenizer: Tokenizer,
    pub device:    B::Device,
    pad_id:        u32,
    eos_id:        u32,
}

/// One candidate output prefix during beam search.
#[derive(Debug, Clone)]
struct Beam {
    /// Token ids including the leading start symbol
    ids:      Vec<i32>,
    /// Sum of log-probabilities of the generated tokens
    score:    f32,
    finished: bool,
}

impl Beam {
    /// Length-normalized score used for ranking, so longer
    /// candidates are not penalised for accumulating more
    /// (negative) log-probability terms.
    fn normalized(&self) -> f32 {
        self.score / self.ids.len().saturating_sub(1).max(1) as f32
    }
}

impl<B: Backend> SummarizerModel<B> {
    pub fn new(
        model:     EncoderDecoderModel<B>,
        tokenizer: Tokenizer,
        device:    B::Device,
    ) -> Result<Self> {
        let pad_id = tokenizer
            .token_to_id("<pad>")
            .ok_or_else(|| anyhow!("Tokenizer has no <pad> token"))?;
        let eos_id = tokenizer
            .token_to_id("</s>")
            .ok_or_else(|| anyhow!("Tokenizer has no </s> token"))?;
        Ok(Self { model, tokenizer, device, pad_id, eos_id })
    }

    pub fn pad_id(&self) -> u32 {
        self.pad_id
    }

    /// Teacher-forced loss for one training batch. The only
    /// operation gradients flow through.
    pub fn loss(&self, batch: SummaryBatch<B>) -> Tensor<B, 1>
    where
        B: AutodiffBackend,
    {
        self.model
            .forward_loss(batch.input_ids, batch.attention_mask, batch.labels)
    }

    /// Summarize one piece of raw text.
    pub fn generate_summary(&self, text: &str) -> Result<String> {
        let prefixed = format!("{TASK_PREFIX}{text}");
        let encoding = self
            .tokenizer
            .encode(prefixed.as_str(), true)
            .map_err(|e| anyhow!("Tokenisation error: {e}"))?;

        let mut ids = encoding.get_ids().to_vec();
        ids.truncate(self.model.max_source_len);
        if ids.is_empty() {
            bail!("Input text encodes to zero tokens — nothing to summarize");
        }

        let len = ids.len();
        let flat: Vec<i32> = ids.iter().map(|&x| x as i32).collect();
        let input_ids = Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &self.device)
            .reshape([1, len]);
        let attention_mask = Tensor::<B, 2, Int>::ones([1, len], &self.device);

        let mut generated = self.generate_batch(input_ids, attention_mask)?;
        self.decode(&generated.remove(0))
    }

    /// Beam-search decode every row of a batch. Used by the
    /// evaluator, which already holds batched tensors.
    pub fn generate_batch(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
    ) -> Result<Vec<Vec<u32>>> {
        let [batch_size, src_len] = input_ids.dims();

        // Encode once for the whole batch; beams share the memory.
        let memory_pad = attention_mask.clone().equal_elem(0);
        let memory = self.model.encode(input_ids, attention_mask);
        let [_, _, d_model] = memory.dims();

        let mut outputs = Vec::with_capacity(batch_size);
        for row in 0..batch_size {
            let row_memory = memory.clone().slice([row..row + 1, 0..src_len, 0..d_model]);
            let row_pad = memory_pad.clone().slice([row..row + 1, 0..src_len]);
            outputs.push(self.beam_search(row_memory, row_pad)?);
        }
        Ok(outputs)
    }

    /// Decode token ids to text, stripping special tokens.
    pub fn decode(&self, ids: &[u32]) -> Result<String> {
        self.tokenizer
            .decode(ids, true)
            .map_err(|e| anyhow!("Decode error: {e}"))
    }

    /// Beam search over one source sequence.
    /// memory: [1, src_len, d_model], memory_pad: [1, src_len]
    fn beam_search(
        &self,
        memory:     Tensor<B, 3>,
        memory_pad: Tensor<B, 2, Bool>,
    ) -> Result<Vec<u32>> {
        // The target position table bounds how far decoding can
        // run; one slot is taken by the start symbol.
        let max_steps = MAX_SUMMARY_TOKENS.min(self.model.max_target_len.saturating_sub(1));

        let mut beams = vec![Beam {
            ids:      vec![self.pad_id as i32],
            score:    0.0,
            finished: false,
        }];

        for _ in 0..max_steps {
            let alive: Vec<usize> = beams
                .iter()
                .enumerate()
                .filter(|(_, b)| !b.finished)
                .map(|(i, _)| i)
                .collect();
            // Early stopping: every beam has emitted the terminator.
            if alive.is_empty() {
                break;
            }

            // All alive beams grew in lockstep, so they share a length.
            let cur_len = beams[alive[0]].ids.len();
            let flat: Vec<i32> = alive
                .iter()
                .flat_map(|&i| beams[i].ids.iter().copied())
                .collect();
            let target = Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &self.device)
                .reshape([alive.len(), cur_len]);

            let logits = self.model.decode(
                target,
                memory.clone().repeat_dim(0, alive.len()),
                memory_pad.clone().repeat_dim(0, alive.len()),
            );
            let [rows, _, vocab] = logits.dims();
            let last = logits
                .slice([0..rows, cur_len - 1..cur_len, 0..vocab])
                .reshape([rows, vocab]);
            let log_probs: Vec<f32> = activation::log_softmax(last, 1)
                .into_data()
                .convert::<f32>()
                .to_vec()
                .map_err(|e| anyhow!("Cannot read decoder output: {e:?}"))?;

            // Finished beams keep competing with their frozen score.
            let mut candidates: Vec<Beam> =
                beams.iter().filter(|b| b.finished).cloned().collect();

            for (row, &beam_idx) in alive.iter().enumerate() {
                let beam = &beams[beam_idx];
                let row_probs = &log_probs[row * vocab..(row + 1) * vocab];
                for (token, log_prob) in top_k(row_probs, NUM_BEAMS) {
                    let mut ids = beam.ids.clone();
                    ids.push(token as i32);
                    candidates.push(Beam {
                        ids,
                        score:    beam.score + log_prob,
                        finished: token as u32 == self.eos_id,
                    });
                }
            }

            candidates.sort_by(|a, b| b.normalized().total_cmp(&a.normalized()));
            candidates.truncate(NUM_BEAMS);
            beams = candidates;
        }

        let best = beams
            .into_iter()
            .max_by(|a, b| a.normalized().total_cmp(&b.normalized()))
            .ok_or_else(|| anyhow!("Beam search produced no candidates"))?;

        // Drop the start symbol; `decode` strips the terminator.
        Ok(best.ids[1..].iter().map(|&t| t as u32).collect())
    }
}

impl<B: AutodiffBackend> SummarizerModel<B> {
    /// An inference copy on the inner backend: no autodiff graph,
    /// dropout disabled. Used for the per-epoch evaluation pass.
    pub fn valid(&self) -> SummarizerModel<B::InnerBackend> {
        SummarizerModel {
            model:     self.model.valid(),
            tokenizer: self.tokenizer.clone(),
            device:    self.device.clone(),
            pad_id:    self.pad_id,
            eos_id:    self.eos_id,
        }
    }
}

/// Indices and values of the k largest entries of a row.
fn top_k(row: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut indexed: Vec<(usize, f32)> = row.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| b.1.total_cmp(&a.1));
    indexed.truncate(k);
    indexed
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_k_orders_descending() {
        let row = [0.1f32, -3.0, 2.5, 0.9];
        let top = top_k(&row, 2);
        assert_eq!(top[0].0, 2);
        assert_eq!(top[1].0, 3);
    }

    #[test]
    fn test_beam_normalization_divides_by_generated_length() {
        let beam = Beam { ids: vec![0, 7, 8], score: -1.0, finished: false };
        // Two generated tokens after the start symbol.
        assert!((beam.normalized() + 0.5).abs() < 1e-6);
    }
}
