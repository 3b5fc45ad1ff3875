// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer programs against these traits instead
// of concrete types, so implementations can be swapped without
// touching the workflows that use them.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::example::SummaryExample;

// ─── ExampleSource ────────────────────────────────────────────────────────────
/// Any component that can supply named splits of a summarization
/// dataset.
///
/// Implementations:
///   - JsonlCorpus → reads {split}.jsonl files from disk
pub trait ExampleSource {
    /// Load the first `limit` examples of the named split,
    /// in file order (a prefix by index, never a random sample).
    fn load_split(&self, split: &str, limit: usize) -> Result<Vec<SummaryExample>>;
}

// ─── Summarizer ───────────────────────────────────────────────────────────────
/// Any component that can produce an abstractive summary for a
/// piece of raw text.
///
/// Implementations:
///   - SummarizeUseCase → loads a fine-tuned checkpoint and decodes
pub trait Summarizer {
    fn summarize(&self, text: &str) -> Result<String>;
}
