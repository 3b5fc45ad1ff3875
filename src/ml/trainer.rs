// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Drives the fine-tuning run as a plain sequence of states:
// for each epoch, a training pass, then a full-validation
// evaluation pass, then a checkpoint; at the end, one durable
// history record.
//
// Every batch step is: forward loss → backward → AdamW step →
// schedule step. Any failure inside a step aborts the whole run;
// there is no per-batch retry and no checkpoint rollback — the
// last fully written checkpoint stays the most recent
// recoverable state.
//
// Training batches are reshuffled each epoch from a fixed seed;
// validation batches keep dataset order so the ROUGE pass sees
// the same sequence every epoch.
//
// Reference: Burn Book §5, Loshchilov & Hutter (2019) AdamW

use anyhow::{bail, Result};
use burn::{
    data::dataloader::DataLoaderBuilder,
    optim::{AdamWConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::SummaryBatcher, dataset::SummaryDataset};
use crate::eval::evaluator::evaluate;
use crate::infra::{
    checkpoint::CheckpointManager,
    history::{EpochRecord, HistoryLogger, TrainingHistory},
};
use crate::ml::schedule::{LinearWithWarmup, WARMUP_STEPS};
use crate::ml::summarizer::SummarizerModel;

pub fn run_training<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    mut summarizer: SummarizerModel<B>,
    train_dataset: SummaryDataset,
    val_dataset:   SummaryDataset,
    ckpt_manager:  &CheckpointManager,
    history_log:   &HistoryLogger,
) -> Result<(SummarizerModel<B>, TrainingHistory)> {
    let device = summarizer.device.clone();

    // ── AdamW optimiser ───────────────────────────────────────────────────────
    let optim_cfg = AdamWConfig::new().with_epsilon(1e-8);
    let mut optim = optim_cfg.init();

    // ── Learning-rate schedule ────────────────────────────────────────────────
    // Linear warmup then linear decay over every optimizer step
    // of the run. The final partial batch counts as a step too.
    let batches_per_epoch =
        (train_dataset.sample_count() + cfg.batch_size - 1) / cfg.batch_size;
    let total_steps = cfg.epochs * batches_per_epoch;
    let mut schedule = LinearWithWarmup::new(cfg.lr, WARMUP_STEPS, total_steps);

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_batcher = SummaryBatcher::<B>::new(device.clone());
    let train_loader  = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train_dataset);

    // ── Validation data loader (InnerBackend — no autodiff overhead) ──────────
    let val_batcher = SummaryBatcher::<B::InnerBackend>::new(device.clone());
    let val_loader  = DataLoaderBuilder::new(val_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(val_dataset);

    let mut history = TrainingHistory::new(&cfg.dataset);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let loss = summarizer.loss(batch);

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            train_loss_sum += loss_val;
            train_batches  += 1;

            // Backward pass + AdamW update at the scheduled rate
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &summarizer.model);
            let lr = schedule.next_lr();
            summarizer.model = optim.step(lr, summarizer.model, grads);
        }

        if train_batches == 0 {
            bail!("Training split produced no batches — nothing to train on");
        }
        let avg_train_loss = train_loss_sum / train_batches as f64;

        // ── Evaluation phase ──────────────────────────────────────────────────
        // summarizer.valid() → inference model on the inner
        // backend: no gradients, no parameter mutation, dropout
        // disabled. The pass covers the full validation loader.
        let model_valid = summarizer.valid();
        let scores = evaluate(&model_valid, val_loader.as_ref())?;

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | rouge1={:.4} | rouge2={:.4} | rougeL={:.4}",
            epoch, cfg.epochs, avg_train_loss, scores.rouge1, scores.rouge2, scores.rouge_l,
        );

        // ── Checkpoint phase ──────────────────────────────────────────────────
        // Unconditional: every epoch's weights are persisted.
        let record = EpochRecord::new(epoch, avg_train_loss, scores);
        history_log.append(&record)?;
        history.push(record);

        ckpt_manager.save_model(&summarizer.model, &cfg.dataset, epoch)?;
        tracing::info!("Checkpoint saved for {} epoch {}", cfg.dataset, epoch);
    }

    // ── Completed ─────────────────────────────────────────────────────────────
    history_log.write_history(&history)?;
    tracing::info!("Training complete for '{}'", cfg.dataset);

    Ok((summarizer, history))
}
