// ============================================================
// Layer 4 — Corpus Loader
// ============================================================
// Reads dataset splits from JSONL files on disk.
//
// Expected layout:
//   {data_dir}/{dataset}/train.jsonl
//   {data_dir}/{dataset}/validation.jsonl
//   {data_dir}/{dataset}/test.jsonl
//
// One JSON object per line; the field names for the source text
// and the reference summary come from the CorpusSpec (XSum uses
// document/summary, CNN/DailyMail uses article/highlights).
//
// A row missing either field is a malformed example and aborts
// the load — there is no skip-and-log path. Splits are consumed
// as a fixed-size prefix by index, never sampled.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use anyhow::{bail, Context, Result};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::PathBuf,
};

use crate::data::corpus::CorpusSpec;
use crate::domain::example::SummaryExample;
use crate::domain::traits::ExampleSource;

/// Loads splits of one corpus from a directory of JSONL files.
pub struct JsonlCorpus {
    data_dir: PathBuf,
    spec:     CorpusSpec,
}

impl JsonlCorpus {
    pub fn new(data_dir: impl Into<PathBuf>, spec: CorpusSpec) -> Self {
        Self { data_dir: data_dir.into(), spec }
    }

    fn split_path(&self, split: &str) -> PathBuf {
        self.data_dir
            .join(self.spec.name)
            .join(format!("{split}.jsonl"))
    }
}

impl ExampleSource for JsonlCorpus {
    fn load_split(&self, split: &str, limit: usize) -> Result<Vec<SummaryExample>> {
        let path = self.split_path(split);
        let file = File::open(&path).with_context(|| {
            format!(
                "Cannot open split '{}' of dataset '{}' at '{}'",
                split,
                self.spec.name,
                path.display()
            )
        })?;

        let mut examples = Vec::with_capacity(limit);

        for (line_no, line) in BufReader::new(file).lines().enumerate() {
            if examples.len() == limit {
                break;
            }

            let line = line.with_context(|| {
                format!("I/O error reading '{}' line {}", path.display(), line_no + 1)
            })?;
            if line.trim().is_empty() {
                continue;
            }

            let row: serde_json::Value = serde_json::from_str(&line).with_context(|| {
                format!("Malformed JSON in '{}' line {}", path.display(), line_no + 1)
            })?;

            let text = field_str(&row, self.spec.text_field, &path, line_no)?;
            let summary = field_str(&row, self.spec.summary_field, &path, line_no)?;

            examples.push(SummaryExample::new(text, summary));
        }

        if examples.len() < limit {
            bail!(
                "Split '{}' of dataset '{}' has only {} examples, {} requested",
                split,
                self.spec.name,
                examples.len(),
                limit
            );
        }

        tracing::info!(
            "Loaded {} examples from {} split '{}'",
            examples.len(),
            self.spec.name,
            split
        );
        Ok(examples)
    }
}

/// Extract a required string field from a JSONL row.
fn field_str(
    row: &serde_json::Value,
    field: &str,
    path: &std::path::Path,
    line_no: usize,
) -> Result<String> {
    match row.get(field).and_then(serde_json::Value::as_str) {
        Some(s) => Ok(s.to_string()),
        None => bail!(
            "Row {} of '{}' is missing required text field '{}'",
            line_no + 1,
            path.display(),
            field
        ),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::corpus::XSUM;
    use std::io::Write;

    fn write_split(dir: &std::path::Path, split: &str, rows: &[&str]) {
        let corpus_dir = dir.join("xsum");
        std::fs::create_dir_all(&corpus_dir).unwrap();
        let mut f = std::fs::File::create(corpus_dir.join(format!("{split}.jsonl"))).unwrap();
        for row in rows {
            writeln!(f, "{row}").unwrap();
        }
    }

    #[test]
    fn test_loads_prefix_in_file_order() {
        let tmp = tempfile::tempdir().unwrap();
        write_split(
            tmp.path(),
            "train",
            &[
                r#"{"document": "first article", "summary": "first"}"#,
                r#"{"document": "second article", "summary": "second"}"#,
                r#"{"document": "third article", "summary": "third"}"#,
            ],
        );

        let corpus = JsonlCorpus::new(tmp.path(), XSUM);
        let examples = corpus.load_split("train", 2).unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].text, "first article");
        assert_eq!(examples[1].summary, "second");
    }

    #[test]
    fn test_missing_field_aborts() {
        let tmp = tempfile::tempdir().unwrap();
        write_split(tmp.path(), "train", &[r#"{"document": "no summary here"}"#]);

        let corpus = JsonlCorpus::new(tmp.path(), XSUM);
        let err = corpus.load_split("train", 1).unwrap_err();
        assert!(err.to_string().contains("summary"));
    }

    #[test]
    fn test_short_split_aborts() {
        let tmp = tempfile::tempdir().unwrap();
        write_split(
            tmp.path(),
            "validation",
            &[r#"{"document": "only one", "summary": "one"}"#],
        );

        let corpus = JsonlCorpus::new(tmp.path(), XSUM);
        assert!(corpus.load_split("validation", 5).is_err());
    }

    #[test]
    fn test_missing_file_aborts() {
        let tmp = tempfile::tempdir().unwrap();
        let corpus = JsonlCorpus::new(tmp.path(), XSUM);
        assert!(corpus.load_split("train", 1).is_err());
    }
}
