// ============================================================
// Layer 5 — Evaluation
// ============================================================
// Generation-based quality measurement for the fine-tuned model.
//
//   rouge.rs     — ROUGE-1/2/L n-gram and LCS overlap scores,
//                  computed over a whole corpus of
//                  (prediction, reference) pairs
//
//   evaluator.rs — runs the model in inference mode over the
//                  validation loader, decodes predictions and
//                  references, and hands the accumulated pairs
//                  to the scorer
//
// Reference: Lin (2004) — ROUGE: A Package for Automatic
//            Evaluation of Summaries

/// ROUGE-1/2/L overlap scoring
pub mod rouge;

/// Validation-pass driver producing a RougeScores per epoch
pub mod evaluator;
