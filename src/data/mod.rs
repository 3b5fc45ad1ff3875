// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from raw dataset files to GPU-ready tensor batches.
//
// The pipeline flows in this order:
//
//   {split}.jsonl files
//       │
//       ▼
//   JsonlCorpus       → reads rows, extracts (text, summary) fields
//       │
//       ▼
//   SummaryEncoder    → "summarize: " prefix, token ids,
//                       fixed-length pad/truncate, label sentinel
//       │
//       ▼
//   SummaryDataset    → implements Burn's Dataset trait
//       │
//       ▼
//   SummaryBatcher    → stacks encoded examples into tensor batches
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Each module is responsible for exactly one step.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Named dataset descriptions (field mapping per corpus)
pub mod corpus;

/// Reads JSONL split files from disk
pub mod loader;

/// Tokenises and pads (text, summary) pairs to fixed lengths
pub mod encode;

/// Implements Burn's Dataset trait for encoded examples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
