// ============================================================
// Layer 5 — Metric Evaluator
// ============================================================
// Runs the model in inference mode over the full validation
// loader once per epoch and scores the generated summaries
// against the references with ROUGE.
//
// The pass never touches model parameters: the caller hands in
// an inner-backend model (no autodiff graph), and this module
// only reads from it. All (prediction, reference) pairs are
// accumulated first and scored once at the end — corpus-level
// aggregation, see eval::rouge.
//
// References are rebuilt from the label tensors by mapping the
// ignore sentinel back to the pad token before decoding, so the
// decoded text matches what the encoder originally saw.

use anyhow::{anyhow, bail, Result};
use burn::{data::dataloader::DataLoader, prelude::*};

use crate::data::batcher::SummaryBatch;
use crate::data::encode::unmask_pad_labels;
use crate::eval::rouge::{corpus_rouge, RougeScores};
use crate::ml::summarizer::SummarizerModel;

/// Score the model over a full validation pass.
///
/// Fails on an empty validation sequence: ROUGE needs at least
/// one pair and a silent zero would look like a real score.
pub fn evaluate<B: Backend>(
    summarizer: &SummarizerModel<B>,
    val_loader: &dyn DataLoader<SummaryBatch<B>>,
) -> Result<RougeScores> {
    let mut predictions: Vec<String> = Vec::new();
    let mut references: Vec<String> = Vec::new();

    for batch in val_loader.iter() {
        let [rows, summary_len] = batch.labels.dims();

        // Decode beam-search predictions for the whole batch.
        for ids in summarizer.generate_batch(batch.input_ids, batch.attention_mask)? {
            predictions.push(summarizer.decode(&ids)?);
        }

        // Decode references: sentinel → pad, then strip specials.
        let labels: Vec<i32> = batch
            .labels
            .into_data()
            .convert::<i32>()
            .to_vec()
            .map_err(|e| anyhow!("Cannot read label tensor: {e:?}"))?;

        for row in 0..rows {
            let row_labels = &labels[row * summary_len..(row + 1) * summary_len];
            let ids = unmask_pad_labels(row_labels, summarizer.pad_id());
            references.push(summarizer.decode(&ids)?);
        }
    }

    if predictions.is_empty() {
        bail!("Validation set is empty — cannot compute ROUGE over zero pairs");
    }

    tracing::debug!(
        "Scoring {} (prediction, reference) pairs",
        predictions.len()
    );
    corpus_rouge(&predictions, &references)
}
