// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns that don't belong to any one business
// layer:
//
//   checkpoint.rs      — Saving and loading model weights.
//                        One artifact per (dataset, epoch) via
//                        Burn's CompactRecorder, written
//                        atomically (temp name, then rename).
//                        Also persists the training config so
//                        inference can rebuild the architecture.
//
//   history.rs         — The per-epoch metric history.
//                        Appended in memory during the run, a
//                        CSV row per epoch for live inspection,
//                        and one JSON document per dataset at
//                        run completion.
//
//   tokenizer_store.rs — Tokenizer persistence.
//                        Loads a pretrained tokenizer.json, or
//                        builds a word-level fallback vocabulary
//                        from the corpus when none exists.
//
// Reference: Rust Book §9 (Error Handling)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Epoch metric records, CSV log and JSON history document
pub mod history;

/// Tokenizer loading, with a corpus-built fallback
pub mod tokenizer_store;
