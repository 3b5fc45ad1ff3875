// ============================================================
// Layer 4 — Corpus Registry
// ============================================================
// The two supported summarization corpora and the JSON field
// names their rows use. An unknown dataset name is a
// configuration error and is rejected here, before any data
// is read or any model is built.

use anyhow::{bail, Result};

/// Description of one named summarization corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorpusSpec {
    /// Dataset name, also used in checkpoint and history file names
    pub name: &'static str,

    /// JSON field holding the source document
    pub text_field: &'static str,

    /// JSON field holding the reference summary
    pub summary_field: &'static str,
}

/// BBC articles with single-sentence summaries.
pub const XSUM: CorpusSpec = CorpusSpec {
    name:          "xsum",
    text_field:    "document",
    summary_field: "summary",
};

/// News articles with multi-sentence highlight summaries.
pub const CNN_DAILYMAIL: CorpusSpec = CorpusSpec {
    name:          "cnn_dailymail",
    text_field:    "article",
    summary_field: "highlights",
};

/// All corpora, in the order a full run trains them.
pub const ALL: [CorpusSpec; 2] = [XSUM, CNN_DAILYMAIL];

/// Look a corpus up by name.
pub fn corpus_for(name: &str) -> Result<CorpusSpec> {
    match name {
        "xsum"          => Ok(XSUM),
        "cnn_dailymail" => Ok(CNN_DAILYMAIL),
        other => bail!(
            "Unknown dataset '{other}'. Supported datasets: xsum, cnn_dailymail"
        ),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_corpora_resolve() {
        assert_eq!(corpus_for("xsum").unwrap(), XSUM);
        assert_eq!(corpus_for("cnn_dailymail").unwrap(), CNN_DAILYMAIL);
    }

    #[test]
    fn test_unknown_corpus_is_rejected() {
        assert!(corpus_for("gigaword").is_err());
    }
}
