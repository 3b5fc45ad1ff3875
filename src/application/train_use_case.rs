// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates one fine-tuning run in order:
//
//   Step 1: Validate configuration     (this layer)
//   Step 2: Load dataset splits        (Layer 4 - data)
//   Step 3: Load / build tokenizer     (Layer 6 - infra)
//   Step 4: Encode examples            (Layer 4 - data)
//   Step 5: Save config                (Layer 6 - infra)
//   Step 6: Build model facade         (Layer 5 - ml)
//   Step 7: Run training loop          (Layer 5 - ml)
//   Step 8: Write example summaries    (this layer)
//
// Configuration is checked up front so a bad dataset name or a
// zero batch size fails before any expensive work starts.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::{
    corpus::corpus_for,
    dataset::SummaryDataset,
    encode::{SummaryEncoder, INPUT_LEN, SUMMARY_LEN},
    loader::JsonlCorpus,
};
use crate::domain::traits::ExampleSource;
use crate::infra::{
    checkpoint::CheckpointManager,
    history::HistoryLogger,
    tokenizer_store::TokenizerStore,
};
use crate::ml::model::EncoderDecoderConfig;
use crate::ml::summarizer::SummarizerModel;
use crate::ml::trainer::run_training;

type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

/// Number of test-split articles summarized after training for
/// the examples file.
const EXAMPLE_COUNT: usize = 3;

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for one dataset run. Serialisable so it
// can be saved next to the checkpoints and reloaded at
// inference time to rebuild the same architecture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub dataset:            String,
    pub data_dir:           String,
    pub checkpoint_dir:     String,
    pub results_dir:        String,
    pub train_size:         usize,
    pub val_size:           usize,
    pub batch_size:         usize,
    pub epochs:             usize,
    pub lr:                 f64,
    pub seed:               u64,
    pub max_source_len:     usize,
    pub max_target_len:     usize,
    pub d_model:            usize,
    pub num_heads:          usize,
    pub num_encoder_layers: usize,
    pub num_decoder_layers: usize,
    pub d_ff:               usize,
    pub dropout:            f64,
    pub vocab_size:         usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            dataset:            "xsum".to_string(),
            data_dir:           "data".to_string(),
            checkpoint_dir:     "models".to_string(),
            results_dir:        "results".to_string(),
            train_size:         30_000,
            val_size:           1_000,
            batch_size:         16,
            epochs:             5,
            lr:                 5e-5,
            seed:               42,
            max_source_len:     512,
            max_target_len:     256,
            d_model:            512,
            num_heads:          8,
            num_encoder_layers: 6,
            num_decoder_layers: 6,
            d_ff:               2048,
            dropout:            0.1,
            vocab_size:         32_128,
        }
    }
}

impl TrainConfig {
    /// Reject bad configurations before any data loading or
    /// training work starts.
    pub fn validate(&self) -> Result<()> {
        corpus_for(&self.dataset)?;
        if self.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }
        if self.epochs == 0 {
            bail!("epochs must be at least 1");
        }
        if self.train_size == 0 || self.val_size == 0 {
            bail!("train_size and val_size must be at least 1");
        }
        if !(self.lr.is_finite() && self.lr > 0.0) {
            bail!("lr must be a positive finite number, got {}", self.lr);
        }
        if self.d_model % self.num_heads != 0 {
            bail!(
                "d_model ({}) must be divisible by num_heads ({})",
                self.d_model,
                self.num_heads
            );
        }
        if self.max_source_len < INPUT_LEN {
            bail!(
                "max_source_len ({}) must cover the {}-token encoder input",
                self.max_source_len,
                INPUT_LEN
            );
        }
        if self.max_target_len < SUMMARY_LEN {
            bail!(
                "max_target_len ({}) must cover the {}-token label length",
                self.max_target_len,
                SUMMARY_LEN
            );
        }
        Ok(())
    }

    /// Model architecture for this run. Vocabulary size and pad
    /// id come from the tokenizer actually in use, not from the
    /// fallback-vocabulary cap in `vocab_size`.
    pub fn model_config(&self, vocab_size: usize, pad_id: usize) -> EncoderDecoderConfig {
        EncoderDecoderConfig::new(
            vocab_size,
            self.max_source_len,
            self.max_target_len,
            self.d_model,
            self.num_heads,
            self.num_encoder_layers,
            self.num_decoder_layers,
            self.d_ff,
            self.dropout,
            pad_id,
        )
    }
}

/// One rendered example for `{dataset}_examples.json`.
#[derive(Debug, Serialize)]
struct GeneratedExample {
    text:       String,
    reference:  String,
    prediction: String,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the full fine-tuning pipeline.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full fine-tuning pipeline end to end.
    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;

        // ── Step 1: Validate configuration ────────────────────────────────────
        cfg.validate()?;
        let spec = corpus_for(&cfg.dataset)?;

        // ── Step 2: Load dataset splits ───────────────────────────────────────
        // A fixed-size prefix of each split, in file order.
        tracing::info!(
            "Loading '{}' from '{}' ({} train / {} validation)",
            cfg.dataset,
            cfg.data_dir,
            cfg.train_size,
            cfg.val_size
        );
        let corpus = JsonlCorpus::new(&cfg.data_dir, spec);
        let train_examples = corpus.load_split("train", cfg.train_size)?;
        let val_examples   = corpus.load_split("validation", cfg.val_size)?;

        // ── Step 3: Load / build tokenizer ────────────────────────────────────
        // A pretrained tokenizer.json wins; the fallback builds a
        // word-level vocabulary from the training texts.
        let tok_store = TokenizerStore::new(&cfg.checkpoint_dir);
        let fallback_texts: Vec<String> = train_examples
            .iter()
            .flat_map(|e| [e.text.clone(), e.summary.clone()])
            .collect();
        let tokenizer = tok_store.load_or_build(&fallback_texts, cfg.vocab_size)?;

        // ── Step 4: Encode examples to fixed-length sequences ─────────────────
        let encoder = SummaryEncoder::new(tokenizer.clone())?;
        let train_dataset = SummaryDataset::from_examples(&train_examples, &encoder)?;
        let val_dataset   = SummaryDataset::from_examples(&val_examples, &encoder)?;
        tracing::info!(
            "Encoded {} train / {} validation examples",
            train_dataset.sample_count(),
            val_dataset.sample_count()
        );

        // ── Step 5: Save config for inference ─────────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.save_config(cfg)?;

        // ── Step 6: Build the model facade ────────────────────────────────────
        let device = burn::backend::wgpu::WgpuDevice::default();
        tracing::info!("Using WGPU device: {:?}", device);

        let model_cfg = cfg.model_config(
            tokenizer.get_vocab_size(true),
            encoder.pad_id() as usize,
        );
        let model = model_cfg.init::<TrainBackend>(&device);
        let model = ckpt_manager.init_from_pretrained(model, &device)?;
        let summarizer = SummarizerModel::new(model, tokenizer, device)?;

        // ── Step 7: Run the training loop (Layer 5) ───────────────────────────
        let history_log = HistoryLogger::new(&cfg.results_dir, &cfg.dataset)?;
        let (summarizer, _history) = run_training(
            cfg,
            summarizer,
            train_dataset,
            val_dataset,
            &ckpt_manager,
            &history_log,
        )?;

        // ── Step 8: Render example summaries from the test split ──────────────
        self.write_example_summaries(&corpus, &summarizer)?;

        Ok(())
    }

    /// Summarize the first few test-split articles and write
    /// them next to the history record, for eyeballing quality.
    fn write_example_summaries(
        &self,
        corpus:     &JsonlCorpus,
        summarizer: &SummarizerModel<TrainBackend>,
    ) -> Result<()> {
        let cfg = &self.config;
        let test_examples = corpus.load_split("test", EXAMPLE_COUNT)?;

        let inference = summarizer.valid();
        let rendered = test_examples
            .iter()
            .map(|e| {
                Ok(GeneratedExample {
                    text:       e.text.clone(),
                    reference:  e.summary.clone(),
                    prediction: inference.generate_summary(&e.text)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let path = Path::new(&cfg.results_dir).join(format!("{}_examples.json", cfg.dataset));
        std::fs::write(&path, serde_json::to_string_pretty(&rendered)?)
            .with_context(|| format!("Cannot write examples to '{}'", path.display()))?;

        tracing::info!("Example summaries saved to '{}'", path.display());
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(TrainConfig::default().validate().is_ok());
    }

    #[test]
    fn test_unknown_dataset_is_rejected() {
        let cfg = TrainConfig { dataset: "gigaword".to_string(), ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let cfg = TrainConfig { batch_size: 0, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_zero_epochs_is_rejected() {
        let cfg = TrainConfig { epochs: 0, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_indivisible_heads_are_rejected() {
        let cfg = TrainConfig { d_model: 512, num_heads: 7, ..Default::default() };
        assert!(cfg.validate().is_err());
    }
}
