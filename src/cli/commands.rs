// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `summarize`, and all
// their configurable flags.
//
// clap's derive macros generate help text, error messages for
// missing args, and type conversion (string → usize, f64, etc.).

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fine-tune the summarizer on one dataset (or both)
    Train(TrainArgs),

    /// Summarize text with a trained checkpoint
    Summarize(SummarizeArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Dataset to fine-tune on: xsum or cnn_dailymail.
    /// Omit to train both, one after the other.
    #[arg(long)]
    pub dataset: Option<String>,

    /// Directory containing {dataset}/{split}.jsonl files
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    /// Directory for model checkpoints, config and tokenizer
    #[arg(long, default_value = "models")]
    pub checkpoint_dir: String,

    /// Directory for metric history and example summaries
    #[arg(long, default_value = "results")]
    pub results_dir: String,

    /// Number of training examples (a prefix of the train split)
    #[arg(long, default_value_t = 30_000)]
    pub train_size: usize,

    /// Number of validation examples used for ROUGE each epoch
    #[arg(long, default_value_t = 1_000)]
    pub val_size: usize,

    /// Number of examples processed together in one forward pass
    #[arg(long, default_value_t = 16)]
    pub batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 5)]
    pub epochs: usize,

    /// Peak learning rate after warmup
    #[arg(long, default_value_t = 5e-5)]
    pub lr: f64,

    /// Seed for the per-epoch training shuffle
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Source position table size (must cover the 512-token input)
    #[arg(long, default_value_t = 512)]
    pub max_source_len: usize,

    /// Target position table size (bounds generation length)
    #[arg(long, default_value_t = 256)]
    pub max_target_len: usize,

    /// Hidden dimension of the transformer (d_model)
    #[arg(long, default_value_t = 512)]
    pub d_model: usize,

    /// Number of attention heads — d_model must be divisible by it
    #[arg(long, default_value_t = 8)]
    pub num_heads: usize,

    /// Number of stacked encoder layers
    #[arg(long, default_value_t = 6)]
    pub num_encoder_layers: usize,

    /// Number of stacked decoder layers
    #[arg(long, default_value_t = 6)]
    pub num_decoder_layers: usize,

    /// Inner dimension of the feed-forward network
    #[arg(long, default_value_t = 2048)]
    pub d_ff: usize,

    /// Dropout probability during training
    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Vocabulary size cap when building the fallback tokenizer
    #[arg(long, default_value_t = 32_128)]
    pub vocab_size: usize,
}

impl TrainArgs {
    /// Convert CLI args into the application-layer TrainConfig
    /// for one dataset run. This is the boundary between Layer 1
    /// and Layer 2 — the application layer never sees clap types.
    pub fn config_for(&self, dataset: &str) -> TrainConfig {
        TrainConfig {
            dataset:            dataset.to_string(),
            data_dir:           self.data_dir.clone(),
            checkpoint_dir:     self.checkpoint_dir.clone(),
            results_dir:        self.results_dir.clone(),
            train_size:         self.train_size,
            val_size:           self.val_size,
            batch_size:         self.batch_size,
            epochs:             self.epochs,
            lr:                 self.lr,
            seed:               self.seed,
            max_source_len:     self.max_source_len,
            max_target_len:     self.max_target_len,
            d_model:            self.d_model,
            num_heads:          self.num_heads,
            num_encoder_layers: self.num_encoder_layers,
            num_decoder_layers: self.num_decoder_layers,
            d_ff:               self.d_ff,
            dropout:            self.dropout,
            vocab_size:         self.vocab_size,
        }
    }
}

/// All arguments for the `summarize` command
#[derive(Args, Debug)]
pub struct SummarizeArgs {
    /// The text to summarize
    #[arg(long)]
    pub text: String,

    /// Which dataset's fine-tuned weights to use
    #[arg(long, default_value = "cnn_dailymail")]
    pub dataset: String,

    /// Checkpoint epoch to load (defaults to the latest saved)
    #[arg(long)]
    pub epoch: Option<usize>,

    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "models")]
    pub checkpoint_dir: String,
}
