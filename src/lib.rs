// ============================================================
// text-summarizer
// ============================================================
// Fine-tunes a T5-style encoder-decoder transformer for
// abstractive summarization and serves the result from the CLI.
//
// The crate is organised in layers:
//
//   Layer 1  cli          — argument parsing, dispatch
//   Layer 2  application  — use cases (train, summarize)
//   Layer 3  domain       — plain structs and traits
//   Layer 4  data         — corpus loading, encoding, batching
//   Layer 5  ml / eval    — model, training loop, ROUGE evaluation
//   Layer 6  infra        — checkpoints, history, tokenizer store
//
// Lower layers never import from higher ones; all Burn framework
// code is confined to Layers 4-6.

#![recursion_limit = "256"]

pub mod cli;
pub mod application;
pub mod domain;
pub mod data;
pub mod ml;
pub mod eval;
pub mod infra;
