// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// What gets saved per training run:
//   {dataset}_epoch_{n}.mpk.gz     — weights after epoch n,
//                                    one file per epoch, never
//                                    mutated after creation
//   {dataset}_latest.json          — number of the last epoch saved
//   {dataset}_train_config.json    — hyperparameters, so inference
//                                    can rebuild the architecture
//
// Every epoch is persisted unconditionally — no best-only policy.
// That costs storage but any epoch's weights stay available.
//
// Writes go to a temporary name first and are renamed into place,
// so a run killed mid-write never strands a half-written file
// under a valid checkpoint name.
//
// An optional pretrained.mpk.gz in the same directory seeds the
// model weights before fine-tuning starts.

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{HalfPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
};
use std::{fs, path::PathBuf};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::EncoderDecoderModel;

/// Extension the recorder appends to every weight file.
const FILE_EXT: &str = "mpk.gz";

/// Manages saving and loading of model checkpoints.
/// All files live in the configured directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager.
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Save model weights for one (dataset, epoch).
    ///
    /// The recorder writes to a temporary name; the finished file
    /// is then renamed to `{dataset}_epoch_{epoch}.mpk.gz`.
    pub fn save_model<B: Backend>(
        &self,
        model:   &EncoderDecoderModel<B>,
        dataset: &str,
        epoch:   usize,
    ) -> Result<()> {
        let tmp_stem = self.dir.join(format!("tmp-{dataset}_epoch_{epoch}"));

        NamedMpkGzFileRecorder::<HalfPrecisionSettings>::new()
            .record(model.clone().into_record(), tmp_stem.clone())
            .with_context(|| {
                format!("Failed to write checkpoint '{}'", tmp_stem.display())
            })?;

        let written = tmp_stem.with_extension(FILE_EXT);
        let final_path = self.dir.join(format!("{dataset}_epoch_{epoch}.{FILE_EXT}"));
        fs::rename(&written, &final_path).with_context(|| {
            format!(
                "Failed to move checkpoint into place at '{}'",
                final_path.display()
            )
        })?;

        // Update the latest-epoch pointer for this dataset.
        let latest_path = self.dir.join(format!("{dataset}_latest.json"));
        fs::write(&latest_path, serde_json::to_string(&epoch)?)
            .with_context(|| format!("Failed to write '{}'", latest_path.display()))?;

        tracing::debug!("Saved checkpoint: {} epoch {}", dataset, epoch);
        Ok(())
    }

    /// Load the weights saved for one (dataset, epoch) into a
    /// freshly built model of the matching architecture.
    pub fn load_model<B: Backend>(
        &self,
        model:   EncoderDecoderModel<B>,
        dataset: &str,
        epoch:   usize,
        device:  &B::Device,
    ) -> Result<EncoderDecoderModel<B>> {
        let path = self.dir.join(format!("{dataset}_epoch_{epoch}"));

        let record = NamedMpkGzFileRecorder::<HalfPrecisionSettings>::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Have you trained '{}' first?",
                    path.display(),
                    dataset
                )
            })?;

        Ok(model.load_record(record))
    }

    /// The last epoch saved for a dataset.
    pub fn latest_epoch(&self, dataset: &str) -> Result<usize> {
        let path = self.dir.join(format!("{dataset}_latest.json"));

        let s = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot find '{}'. Have you trained '{}' first?",
                path.display(),
                dataset
            )
        })?;

        Ok(serde_json::from_str::<usize>(&s)?)
    }

    /// Seed a freshly built model from pretrained.mpk.gz when the
    /// file exists; otherwise the model keeps its random init.
    /// The training loop is identical either way.
    pub fn init_from_pretrained<B: Backend>(
        &self,
        model:  EncoderDecoderModel<B>,
        device: &B::Device,
    ) -> Result<EncoderDecoderModel<B>> {
        let stem = self.dir.join("pretrained");
        if !stem.with_extension(FILE_EXT).exists() {
            tracing::warn!(
                "No pretrained weights at '{}' — starting from random init",
                stem.with_extension(FILE_EXT).display()
            );
            return Ok(model);
        }

        let record = NamedMpkGzFileRecorder::<HalfPrecisionSettings>::new()
            .load(stem.clone(), device)
            .with_context(|| {
                format!("Cannot load pretrained weights '{}'", stem.display())
            })?;

        tracing::info!("Loaded pretrained weights from '{}'", stem.display());
        Ok(model.load_record(record))
    }

    /// Save the training configuration for a dataset run.
    /// Must happen before training starts so inference can
    /// reconstruct the exact model architecture afterwards.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(format!("{}_train_config.json", cfg.dataset));
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the training configuration saved for a dataset run.
    pub fn load_config(&self, dataset: &str) -> Result<TrainConfig> {
        let path = self.dir.join(format!("{dataset}_train_config.json"));

        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. \
                 Make sure you have run 'train' before 'summarize'.",
                path.display()
            )
        })?;

        Ok(serde_json::from_str(&json)?)
    }
}
