// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn framework specific code lives in this layer (and in
// eval, which drives it); no other layer imports burn directly.
//
//   model.rs      — The encoder-decoder transformer
//                   Shared token embedding, learned positional
//                   embeddings, encoder blocks (self-attention +
//                   FFN), decoder blocks (causal self-attention +
//                   cross-attention + FFN), LM head, and the
//                   teacher-forced loss.
//
//   summarizer.rs — The model facade
//                   Owns the model, the tokenizer and the device;
//                   exposes the training loss and beam-search
//                   text generation.
//
//   schedule.rs   — Linear learning-rate schedule with warmup
//
//   trainer.rs    — The epoch loop
//                   Forward, backward, AdamW step, schedule step,
//                   per-epoch ROUGE evaluation, checkpointing and
//                   history recording.
//
// Reference: Vaswani et al. (2017) Attention Is All You Need
//            Raffel et al. (2020) T5
//            Burn Book §3 (Building Blocks), §5 (Training)

/// Encoder-decoder transformer architecture
pub mod model;

/// Model + tokenizer facade with beam-search generation
pub mod summarizer;

/// Linear warmup/decay learning-rate schedule
pub mod schedule;

/// Full training loop with evaluation and checkpointing
pub mod trainer;
