// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with `clap`.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`     — fine-tunes on one dataset, or both when no
//                    --dataset is given
//   2. `summarize` — loads a checkpoint and summarizes text
//
// Reference: Rust Book §12 (CLI programs)

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, SummarizeArgs, TrainArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "text-summarizer",
    version = "0.1.0",
    about = "Fine-tune a T5-style summarizer on XSum and CNN/DailyMail, then summarize text."
)]
pub struct Cli {
    /// The subcommand to run (train or summarize)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    /// This keeps the CLI layer thin — it only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)     => Self::run_train(args),
            Commands::Summarize(args) => Self::run_summarize(args),
        }
    }

    /// Handles the `train` subcommand. Without --dataset, both
    /// corpora are fine-tuned in sequence.
    fn run_train(args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;
        use crate::data::corpus;

        let datasets: Vec<String> = match &args.dataset {
            Some(name) => vec![name.clone()],
            None       => corpus::ALL.iter().map(|s| s.name.to_string()).collect(),
        };

        for dataset in datasets {
            tracing::info!("Starting fine-tuning on '{}'", dataset);
            let use_case = TrainUseCase::new(args.config_for(&dataset));
            use_case.execute()?;
            println!("Training on '{dataset}' complete. Checkpoints saved.");
        }
        Ok(())
    }

    /// Handles the `summarize` subcommand.
    /// Loads the model from a checkpoint and prints the summary.
    fn run_summarize(args: SummarizeArgs) -> Result<()> {
        use crate::application::summarize_use_case::SummarizeUseCase;
        use crate::domain::traits::Summarizer;

        let use_case = SummarizeUseCase::new(&args.checkpoint_dir, &args.dataset, args.epoch)?;
        let summary = use_case.summarize(&args.text)?;
        println!("\nSummary: {summary}");
        Ok(())
    }
}
