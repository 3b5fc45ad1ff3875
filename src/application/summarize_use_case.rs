// ============================================================
// Layer 2 — Summarize Use Case
// ============================================================
// Loads one fine-tuned checkpoint by (dataset, epoch) and runs
// beam-search generation on user-supplied text.
//
// A caller wanting a different dataset's weights constructs a
// fresh use case — there is no ambient "current model" switch.

use anyhow::{anyhow, Result};
use burn::backend::wgpu::WgpuDevice;

use crate::domain::traits::Summarizer;
use crate::infra::{checkpoint::CheckpointManager, tokenizer_store::TokenizerStore};
use crate::ml::summarizer::SummarizerModel;

type InferBackend = burn::backend::Wgpu;

pub struct SummarizeUseCase {
    summarizer: SummarizerModel<InferBackend>,
}

impl SummarizeUseCase {
    /// Rebuild the trained architecture from its saved config and
    /// load the requested epoch's weights (latest if unspecified).
    pub fn new(checkpoint_dir: &str, dataset: &str, epoch: Option<usize>) -> Result<Self> {
        let ckpt_manager = CheckpointManager::new(checkpoint_dir);
        let cfg = ckpt_manager.load_config(dataset)?;

        let tokenizer = TokenizerStore::new(checkpoint_dir).load()?;
        let pad_id = tokenizer
            .token_to_id("<pad>")
            .ok_or_else(|| anyhow!("Tokenizer has no <pad> token"))? as usize;

        let device = WgpuDevice::default();
        let mut model_cfg = cfg.model_config(tokenizer.get_vocab_size(true), pad_id);
        model_cfg.dropout = 0.0;
        let model = model_cfg.init::<InferBackend>(&device);

        let epoch = match epoch {
            Some(e) => e,
            None    => ckpt_manager.latest_epoch(dataset)?,
        };
        let model = ckpt_manager.load_model(model, dataset, epoch, &device)?;
        tracing::info!("Loaded '{}' checkpoint from epoch {}", dataset, epoch);

        let summarizer = SummarizerModel::new(model, tokenizer, device)?;
        Ok(Self { summarizer })
    }
}

impl Summarizer for SummarizeUseCase {
    fn summarize(&self, text: &str) -> Result<String> {
        self.summarizer.generate_summary(text)
    }
}
