// ============================================================
// Layer 6 — Training History
// ============================================================
// Records per-epoch metrics in two forms:
//
//   - a CSV row appended after every epoch, for watching a run
//     as it progresses
//   - one JSON document per dataset written at run completion,
//     the durable record the plotting consumer reads
//
// Metrics recorded per epoch:
//   epoch, train_loss (average over the epoch's batches),
//   rouge1, rouge2, rougeL (validation, corpus-level)
//
// Example CSV output:
//   epoch,train_loss,rouge1,rouge2,rougeL
//   1,3.124500,0.241000,0.062000,0.198000
//   2,2.890100,0.276000,0.081000,0.225000

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

use crate::eval::rouge::RougeScores;

/// One row of metrics for a single training epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochRecord {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Average teacher-forced loss over all training batches
    pub train_loss: f64,

    /// Validation ROUGE-1 F1, corpus-level
    pub rouge1: f64,

    /// Validation ROUGE-2 F1, corpus-level
    pub rouge2: f64,

    /// Validation ROUGE-L F1, corpus-level
    #[serde(rename = "rougeL")]
    pub rouge_l: f64,
}

impl EpochRecord {
    pub fn new(epoch: usize, train_loss: f64, scores: RougeScores) -> Self {
        Self {
            epoch,
            train_loss,
            rouge1:  scores.rouge1,
            rouge2:  scores.rouge2,
            rouge_l: scores.rouge_l,
        }
    }
}

/// The full, append-only record of one training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub dataset: String,
    pub records: Vec<EpochRecord>,
}

impl TrainingHistory {
    pub fn new(dataset: impl Into<String>) -> Self {
        Self { dataset: dataset.into(), records: Vec::new() }
    }

    pub fn push(&mut self, record: EpochRecord) {
        self.records.push(record);
    }
}

/// Writes epoch metrics to the results directory.
pub struct HistoryLogger {
    results_dir: PathBuf,
    dataset:     String,
    csv_path:    PathBuf,
}

impl HistoryLogger {
    /// Create a logger for one dataset run.
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(results_dir: impl Into<PathBuf>, dataset: impl Into<String>) -> Result<Self> {
        let results_dir = results_dir.into();
        let dataset = dataset.into();
        fs::create_dir_all(&results_dir)?;

        let csv_path = results_dir.join(format!("{dataset}_metrics.csv"));
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,train_loss,rouge1,rouge2,rougeL")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { results_dir, dataset, csv_path })
    }

    /// Append one epoch's metrics as a new CSV row.
    pub fn append(&self, r: &EpochRecord) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{:.6}",
            r.epoch, r.train_loss, r.rouge1, r.rouge2, r.rouge_l,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, rouge1={:.4}",
            r.epoch,
            r.train_loss,
            r.rouge1,
        );
        Ok(())
    }

    /// Write the full history as `{dataset}_history.json`.
    /// Called once, when the run completes.
    pub fn write_history(&self, history: &TrainingHistory) -> Result<PathBuf> {
        let path = self
            .results_dir
            .join(format!("{}_history.json", self.dataset));

        let json = serde_json::to_string_pretty(history)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write history to '{}'", path.display()))?;

        tracing::info!("Training history saved to '{}'", path.display());
        Ok(path)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn record(epoch: usize) -> EpochRecord {
        EpochRecord::new(
            epoch,
            2.5,
            RougeScores { rouge1: 0.3, rouge2: 0.1, rouge_l: 0.25 },
        )
    }

    #[test]
    fn test_csv_appends_one_row_per_epoch() {
        let tmp = tempfile::tempdir().unwrap();
        let logger = HistoryLogger::new(tmp.path(), "xsum").unwrap();
        logger.append(&record(1)).unwrap();
        logger.append(&record(2)).unwrap();

        let csv = std::fs::read_to_string(tmp.path().join("xsum_metrics.csv")).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "epoch,train_loss,rouge1,rouge2,rougeL");
        assert!(lines[2].starts_with("2,"));
    }

    #[test]
    fn test_history_json_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let logger = HistoryLogger::new(tmp.path(), "xsum").unwrap();

        let mut history = TrainingHistory::new("xsum");
        history.push(record(1));
        let path = logger.write_history(&history).unwrap();

        let loaded: TrainingHistory =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(loaded.dataset, "xsum");
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].epoch, 1);
    }

    #[test]
    fn test_history_json_uses_rouge_l_key() {
        let json = serde_json::to_string(&record(1)).unwrap();
        assert!(json.contains("\"rougeL\""));
    }
}
