// ============================================================
// Layer 3 — SummaryExample Domain Type
// ============================================================
// One labelled example for abstractive summarization:
// a source text and the reference summary a human wrote for it.
// The model generates new text rather than pointing at a span,
// so there are no position annotations here.

use serde::{Deserialize, Serialize};

/// A (source text, reference summary) pair.
///
/// Owned by the dataset source; everything downstream treats
/// it as read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryExample {
    /// The full article or document to be summarized
    pub text: String,

    /// The human-written reference summary
    pub summary: String,
}

impl SummaryExample {
    pub fn new(text: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            text:    text.into(),
            summary: summary.into(),
        }
    }
}
