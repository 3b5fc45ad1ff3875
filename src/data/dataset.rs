use anyhow::Result;
use burn::data::dataset::Dataset;

use crate::data::encode::{EncodedExample, SummaryEncoder};
use crate::domain::example::SummaryExample;

/// In-memory dataset of fully encoded examples, in a fixed order.
/// Shuffling (for training) happens in the data loader, not here,
/// so a validation pass always sees the same order.
pub struct SummaryDataset {
    examples: Vec<EncodedExample>,
}

impl SummaryDataset {
    pub fn new(examples: Vec<EncodedExample>) -> Self {
        Self { examples }
    }

    /// Encode a slice of raw examples in order. Any encoding
    /// failure aborts the whole build.
    pub fn from_examples(examples: &[SummaryExample], encoder: &SummaryEncoder) -> Result<Self> {
        let encoded = examples
            .iter()
            .map(|e| encoder.encode(e))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(encoded))
    }

    pub fn sample_count(&self) -> usize {
        self.examples.len()
    }
}

impl Dataset<EncodedExample> for SummaryDataset {
    fn get(&self, index: usize) -> Option<EncodedExample> {
        self.examples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.examples.len()
    }
}
