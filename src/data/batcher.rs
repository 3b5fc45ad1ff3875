// ============================================================
// Layer 4 — Summary Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec of encoded
// examples into stacked tensors.
//
// Input:  Vec of N EncodedExamples, each with fixed-length fields
// Output: SummaryBatch with tensors of shape [N, len]
//
// All sequences are pre-padded to the same length by the
// SummaryEncoder, so stacking is a flatten-and-reshape with no
// dynamic padding here.
//
// Reference: Burn Book §4 (Batcher)

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::encode::EncodedExample;

// ─── SummaryBatch ─────────────────────────────────────────────────────────────
/// A batch of encoded examples ready for a model forward pass.
/// All three tensors share batch_size as their leading dimension.
#[derive(Debug, Clone)]
pub struct SummaryBatch<B: Backend> {
    /// Source token ids — shape: [batch_size, input_len]
    pub input_ids: Tensor<B, 2, Int>,

    /// 1 = real token, 0 = padding — shape: [batch_size, input_len]
    pub attention_mask: Tensor<B, 2, Int>,

    /// Summary token ids with the ignore sentinel at pad
    /// positions — shape: [batch_size, summary_len]
    pub labels: Tensor<B, 2, Int>,
}

// ─── SummaryBatcher ───────────────────────────────────────────────────────────
/// Holds the target device so tensors are created where the
/// model lives.
#[derive(Clone, Debug)]
pub struct SummaryBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> SummaryBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<EncodedExample, SummaryBatch<B>> for SummaryBatcher<B> {
    fn batch(&self, items: Vec<EncodedExample>) -> SummaryBatch<B> {
        let batch_size  = items.len();
        let input_len   = items[0].input_ids.len();
        let summary_len = items[0].labels.len();

        let input_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.input_ids.iter().map(|&x| x as i32))
            .collect();

        let mask_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.attention_mask.iter().map(|&x| x as i32))
            .collect();

        // Labels are already signed: real ids plus the ignore
        // sentinel at pad positions.
        let label_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.labels.iter().copied())
            .collect();

        let input_ids = Tensor::<B, 1, Int>::from_ints(input_flat.as_slice(), &self.device)
            .reshape([batch_size, input_len]);

        let attention_mask = Tensor::<B, 1, Int>::from_ints(mask_flat.as_slice(), &self.device)
            .reshape([batch_size, input_len]);

        let labels = Tensor::<B, 1, Int>::from_ints(label_flat.as_slice(), &self.device)
            .reshape([batch_size, summary_len]);

        SummaryBatch { input_ids, attention_mask, labels }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::data::dataloader::DataLoaderBuilder;

    use crate::data::dataset::SummaryDataset;

    type TestBackend = burn::backend::NdArray;

    fn example(seed: i32) -> EncodedExample {
        EncodedExample {
            input_ids:      vec![seed as u32, 2, 3, 0],
            attention_mask: vec![1, 1, 1, 0],
            labels:         vec![seed, 5, -100],
        }
    }

    #[test]
    fn test_batch_shapes_share_leading_dimension() {
        let batcher = SummaryBatcher::<TestBackend>::new(Default::default());
        let batch = batcher.batch(vec![example(10), example(11), example(12)]);

        assert_eq!(batch.input_ids.dims(), [3, 4]);
        assert_eq!(batch.attention_mask.dims(), [3, 4]);
        assert_eq!(batch.labels.dims(), [3, 3]);
    }

    #[test]
    fn test_row_order_is_preserved() {
        let batcher = SummaryBatcher::<TestBackend>::new(Default::default());
        let batch = batcher.batch(vec![example(10), example(20)]);

        let flat: Vec<i32> = batch
            .input_ids
            .into_data()
            .convert::<i32>()
            .to_vec()
            .unwrap();
        assert_eq!(flat[0], 10);
        assert_eq!(flat[4], 20);
    }

    #[test]
    fn test_full_batches_have_exactly_batch_size_rows() {
        // 5 examples at batch size 2 → 2 full batches and a kept
        // remainder of 1.
        let dataset = SummaryDataset::new((0..5).map(|i| example(i)).collect());
        let batcher = SummaryBatcher::<TestBackend>::new(Default::default());
        let loader = DataLoaderBuilder::new(batcher)
            .batch_size(2)
            .num_workers(1)
            .build(dataset);

        let sizes: Vec<usize> = loader.iter().map(|b| b.input_ids.dims()[0]).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn test_validation_order_is_deterministic() {
        let batcher = SummaryBatcher::<TestBackend>::new(Default::default());

        let collect_pass = || -> Vec<i32> {
            let dataset = SummaryDataset::new((0..6).map(|i| example(i)).collect());
            let loader = DataLoaderBuilder::new(batcher.clone())
                .batch_size(2)
                .num_workers(1)
                .build(dataset);
            loader
                .iter()
                .flat_map(|b| {
                    b.labels.into_data().convert::<i32>().to_vec::<i32>().unwrap()
                })
                .collect()
        };

        assert_eq!(collect_pass(), collect_pass());
    }
}
